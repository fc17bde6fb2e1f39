//! Wire contract of the steganography server.
//!
//! Both operations are multipart POSTs. `/encode` answers with the encoded
//! artifact as a binary body (optionally naming it via `Content-Disposition`);
//! `/decode` answers with the extracted message, either as plain text or
//! wrapped in a `{"message": ...}` JSON envelope.

use serde::{Deserialize, Serialize};

pub const ENCODE_PATH: &str = "/encode";
pub const DECODE_PATH: &str = "/decode";

pub const FILE_FIELD: &str = "file";
pub const MESSAGE_FIELD: &str = "message";
pub const PASSWORD_FIELD: &str = "password";

/// Envelope form of a successful `/decode` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeResponseBody {
    pub message: String,
}
