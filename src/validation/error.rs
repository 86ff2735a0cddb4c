//! Error types for logo validation.

use crate::constants::messages;

/// Failure of the byte-read primitive.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// I/O error while reading a local file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The platform reader reported an error
    #[error("Reader error: {0}")]
    Reader(String),
}

/// Failure of the image-decode primitive.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Payload does not start with `data:` or has no `,` separator
    #[error("Payload is not a data URL")]
    NotDataUrl,

    /// Data URL body is not base64
    #[error("Data URL is not base64 encoded")]
    NotBase64,

    /// Base64 body could not be decoded
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Bytes are not a decodable image
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The platform decoder reported an error
    #[error("Decoder error: {0}")]
    Decoder(String),
}

/// Why a selected logo file was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// The file could not be read
    InvalidFile,
    /// The file declares an image type but does not decode as one
    InvalidImage,
    /// The file is outside the accepted size window
    InvalidSize,
}

impl RejectionKind {
    /// User-facing message shown in the alert.
    pub fn message(&self) -> &'static str {
        match self {
            RejectionKind::InvalidFile => messages::INVALID_FILE,
            RejectionKind::InvalidImage => messages::INVALID_IMAGE,
            RejectionKind::InvalidSize => messages::INVALID_SIZE,
        }
    }
}

impl std::fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
