use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body the server attaches to non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// A request the server refused, with whatever detail it offered.
#[derive(Debug, Error)]
#[error("server rejected request ({status}): {message}")]
pub struct ApiRejection {
    pub status: u16,
    pub message: String,
}

impl ApiRejection {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}
