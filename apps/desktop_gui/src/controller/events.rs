//! UI/backend events and error modeling for the upload controller.

use client_core::EncodedArtifact;

pub enum UiEvent {
    Info(String),
    EncodeFinished(EncodedArtifact),
    DecodeFinished { message: String },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Encode,
    Decode,
}

/// A failed operation as the UI reports it: a fixed alert text per context,
/// with the underlying detail kept for the log only.
#[derive(Debug, Clone)]
pub struct UiError {
    context: UiErrorContext,
    detail: String,
}

impl UiError {
    pub fn from_detail(context: UiErrorContext, detail: impl Into<String>) -> Self {
        Self {
            context,
            detail: detail.into(),
        }
    }

    pub fn alert_text(&self) -> &'static str {
        match self.context {
            UiErrorContext::Encode => "Encoding failed!",
            UiErrorContext::Decode => "Decoding failed!",
            UiErrorContext::BackendStartup => "Upload worker failed to start!",
        }
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}
