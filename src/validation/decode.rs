//! Data URL codec and the image-decode primitive.

use std::future::Future;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::error::DecodeError;
use crate::constants::FALLBACK_MIME_TYPE;

/// Encode bytes as a base64 `data:` URL, as `FileReader.readAsDataURL` does.
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let mime_type = match mime_type.trim() {
        "" => FALLBACK_MIME_TYPE,
        declared => declared,
    };
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Decode the body of a base64 `data:` URL.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, DecodeError> {
    let (header, body) = data_url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or(DecodeError::NotDataUrl)?;

    if !header.ends_with(";base64") {
        return Err(DecodeError::NotBase64);
    }

    Ok(STANDARD.decode(body)?)
}

/// Asynchronous image-decode primitive.
pub trait ImageDecoder {
    /// Decode an encoded payload, returning its pixel dimensions.
    fn decode(&self, data_url: &str) -> impl Future<Output = Result<(u32, u32), DecodeError>>;
}

/// Decodes payloads in-process with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    async fn decode(&self, data_url: &str) -> Result<(u32, u32), DecodeError> {
        let bytes = decode_data_url(data_url)?;
        let image = image::load_from_memory(&bytes)?;
        Ok((image.width(), image.height()))
    }
}
