use std::path::Path;

use serde::{Deserialize, Serialize};

/// Cover formats the steganography server knows how to embed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverFormat {
    Png,
    Jpeg,
    Txt,
    Pdf,
    Docx,
    Wav,
    Mp3,
    Mp4,
    Avi,
    Mov,
}

impl CoverFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "txt" => Some(Self::Txt),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            "mp4" => Some(Self::Mp4),
            "avi" => Some(Self::Avi),
            "mov" => Some(Self::Mov),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG image",
            Self::Jpeg => "JPEG image",
            Self::Txt => "plain text",
            Self::Pdf => "PDF document",
            Self::Docx => "Word document",
            Self::Wav => "WAV audio",
            Self::Mp3 => "MP3 audio",
            Self::Mp4 => "MP4 video",
            Self::Avi => "AVI video",
            Self::Mov => "QuickTime video",
        }
    }

    pub const fn supported_extensions() -> &'static [&'static str] {
        &[
            "png", "jpg", "jpeg", "txt", "pdf", "docx", "wav", "mp3", "mp4", "avi", "mov",
        ]
    }
}

/// A file the user has selected for upload, held in memory until submission.
///
/// At most one file is staged per operation; staging a new one replaces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedFile {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl StagedFile {
    pub fn new(filename: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type,
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string());
        Ok(Self {
            filename,
            mime_type,
            bytes,
        })
    }

    pub fn format(&self) -> Option<CoverFormat> {
        CoverFormat::from_filename(&self.filename)
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}
