//! File input source and byte-read primitive.
//!
//! `FileBlob` is the native stand-in for a browser `File`: a name, a declared
//! MIME type, a byte length and somewhere to read the bytes from.

use std::borrow::Cow;
use std::future::Future;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use super::decode::encode_data_url;
use super::error::ReadError;

/// Supported image file extensions and the MIME type each maps to.
const IMAGE_MIME_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("svg", "image/svg+xml"),
];

/// Guess a MIME type from a file name the way a browser file input does.
///
/// Unknown extensions give an empty string, like `File.type`.
pub fn guess_mime_type(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    let Some((_, ext)) = lower.rsplit_once('.') else {
        return "";
    };
    match ext {
        "txt" => "text/plain",
        "json" => "application/json",
        "pdf" => "application/pdf",
        _ => IMAGE_MIME_TYPES
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, mime)| *mime)
            .unwrap_or(""),
    }
}

/// Anything that looks like a selected file.
pub trait FileLike {
    fn name(&self) -> &str;
    /// Declared MIME type, possibly empty.
    fn mime_type(&self) -> &str;
    /// Declared size in bytes.
    fn size(&self) -> u64;
}

/// Asynchronous byte-read primitive.
pub trait ByteReader {
    type Blob: FileLike;

    /// Read the blob's bytes into a base64 `data:` URL.
    fn read_data_url(&self, blob: &Self::Blob) -> impl Future<Output = Result<String, ReadError>>;
}

/// Where a [`FileBlob`]'s bytes live.
#[derive(Debug, Clone)]
pub enum BlobSource {
    Memory(Vec<u8>),
    #[cfg(not(target_arch = "wasm32"))]
    Path(PathBuf),
}

/// A selected file, held in memory or on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileBlob {
    name: String,
    mime_type: String,
    size: u64,
    source: BlobSource,
}

impl FileBlob {
    /// Create a blob from in-memory bytes. The size is the byte length.
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            source: BlobSource::Memory(bytes),
        }
    }

    /// Create a blob for a local file. Size comes from the file metadata and
    /// the MIME type is guessed from the extension; bytes are read lazily.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = guess_mime_type(&name).to_string();

        Ok(Self {
            name,
            mime_type,
            size: metadata.len(),
            source: BlobSource::Path(path.to_path_buf()),
        })
    }

    /// Override the declared MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn source(&self) -> &BlobSource {
        &self.source
    }
}

impl FileLike for FileBlob {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Reads [`FileBlob`]s from memory or the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalReader;

impl ByteReader for LocalReader {
    type Blob = FileBlob;

    async fn read_data_url(&self, blob: &FileBlob) -> Result<String, ReadError> {
        let bytes: Cow<'_, [u8]> = match &blob.source {
            BlobSource::Memory(bytes) => Cow::Borrowed(bytes),
            #[cfg(not(target_arch = "wasm32"))]
            BlobSource::Path(path) => Cow::Owned(std::fs::read(path)?),
        };
        log::debug!("📂 Read {} ({} bytes)", blob.name, bytes.len());
        Ok(encode_data_url(&blob.mime_type, &bytes))
    }
}
