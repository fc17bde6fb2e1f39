//! HTTP client for the steganography server.
//!
//! The server does the actual embedding and extraction; this crate only
//! stages user input into multipart forms, performs the `/encode` and
//! `/decode` POSTs, and gives the caller explicit success/failure branches.
//! Each call is a one-shot request/response cycle with no retry, no
//! cancellation, and no configured timeout beyond the transport defaults.

use async_trait::async_trait;
use reqwest::{
    header::CONTENT_DISPOSITION,
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    domain::StagedFile,
    error::{ApiErrorBody, ApiRejection},
    protocol::{
        DecodeResponseBody, DECODE_PATH, ENCODE_PATH, FILE_FIELD, MESSAGE_FIELD, PASSWORD_FIELD,
    },
};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum StegoClientError {
    #[error("no file is staged for upload")]
    NoFileStaged,
    #[error("message to hide must not be empty")]
    EmptyMessage,
    #[error("unsupported cover format: {filename}")]
    UnsupportedFormat { filename: String },
    #[error("invalid server url: {0}")]
    InvalidServerUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Rejected(#[from] ApiRejection),
}

/// The encoded cover file returned by `/encode`, held in memory until the
/// user saves it somewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Seam for substituting the remote server with a test double.
#[async_trait]
pub trait StegoApi: Send + Sync {
    async fn encode_message(
        &self,
        file: &StagedFile,
        message: &str,
        password: Option<&str>,
    ) -> Result<EncodedArtifact, StegoClientError>;

    async fn decode_message(
        &self,
        file: &StagedFile,
        password: Option<&str>,
    ) -> Result<String, StegoClientError>;
}

#[derive(Debug)]
pub struct StegoClient {
    http: Client,
    server_url: String,
}

impl StegoClient {
    pub fn new(server_url: &str) -> Result<Self, StegoClientError> {
        Self::with_http_client(Client::new(), server_url)
    }

    pub fn with_http_client(http: Client, server_url: &str) -> Result<Self, StegoClientError> {
        // Parse up front so a malformed URL fails here instead of mid-upload.
        let parsed = Url::parse(server_url.trim())?;
        Ok(Self {
            http,
            server_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Uploads the staged cover file and message as a multipart form and
    /// returns the encoded artifact from the binary response body.
    pub async fn encode(
        &self,
        file: &StagedFile,
        message: &str,
        password: Option<&str>,
    ) -> Result<EncodedArtifact, StegoClientError> {
        validate_cover(file)?;
        if message.trim().is_empty() {
            return Err(StegoClientError::EmptyMessage);
        }

        let form = with_password(
            cover_form(file)?.text(MESSAGE_FIELD, message.to_string()),
            password,
        );
        debug!(filename = %file.filename, size_bytes = file.size_bytes(), "posting encode request");
        let response = self
            .http
            .post(format!("{}{ENCODE_PATH}", self.server_url))
            .multipart(form)
            .send()
            .await?;
        let response = reject_on_error_status(response).await?;

        let suggested = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition);
        let filename = suggested.unwrap_or_else(|| encoded_filename(&file.filename));
        let bytes = response.bytes().await?.to_vec();
        info!(filename = %filename, size_bytes = bytes.len(), "encode finished");
        Ok(EncodedArtifact { filename, bytes })
    }

    /// Uploads the staged stego file and returns the extracted message.
    pub async fn decode(
        &self,
        file: &StagedFile,
        password: Option<&str>,
    ) -> Result<String, StegoClientError> {
        validate_cover(file)?;

        let form = with_password(cover_form(file)?, password);
        debug!(filename = %file.filename, size_bytes = file.size_bytes(), "posting decode request");
        let response = self
            .http
            .post(format!("{}{DECODE_PATH}", self.server_url))
            .multipart(form)
            .send()
            .await?;
        let response = reject_on_error_status(response).await?;

        let body = response.text().await?;
        let message = extract_decoded_message(&body);
        info!(chars = message.chars().count(), "decode finished");
        Ok(message)
    }
}

#[async_trait]
impl StegoApi for StegoClient {
    async fn encode_message(
        &self,
        file: &StagedFile,
        message: &str,
        password: Option<&str>,
    ) -> Result<EncodedArtifact, StegoClientError> {
        self.encode(file, message, password).await
    }

    async fn decode_message(
        &self,
        file: &StagedFile,
        password: Option<&str>,
    ) -> Result<String, StegoClientError> {
        self.decode(file, password).await
    }
}

fn validate_cover(file: &StagedFile) -> Result<(), StegoClientError> {
    if file.filename.is_empty() {
        return Err(StegoClientError::NoFileStaged);
    }
    if file.format().is_none() {
        return Err(StegoClientError::UnsupportedFormat {
            filename: file.filename.clone(),
        });
    }
    Ok(())
}

fn cover_form(file: &StagedFile) -> Result<Form, StegoClientError> {
    let part = Part::bytes(file.bytes.clone())
        .file_name(file.filename.clone())
        .mime_str(file.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE))?;
    Ok(Form::new().part(FILE_FIELD, part))
}

fn with_password(form: Form, password: Option<&str>) -> Form {
    match password {
        Some(password) if !password.is_empty() => form.text(PASSWORD_FIELD, password.to_string()),
        _ => form,
    }
}

async fn reject_on_error_status(response: Response) -> Result<Response, StegoClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) if !body.is_empty() => body,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    Err(ApiRejection::new(status.as_u16(), message).into())
}

/// The server answers `/decode` with either a bare text body or a
/// `{"message": ...}` envelope; unwrap the envelope, render anything else
/// verbatim.
fn extract_decoded_message(body: &str) -> String {
    match serde_json::from_str::<DecodeResponseBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.to_string(),
    }
}

fn filename_from_content_disposition(value: &str) -> Option<String> {
    let after = value.split("filename=").nth(1)?;
    let name = after.split(';').next()?.trim().trim_matches('"');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Mirrors the server's output naming: `cover.png` becomes
/// `cover_encoded.png`.
fn encoded_filename(cover_filename: &str) -> String {
    match cover_filename.find('.') {
        Some(dot) => format!(
            "{}_encoded{}",
            &cover_filename[..dot],
            &cover_filename[dot..]
        ),
        None => format!("{cover_filename}_encoded"),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
