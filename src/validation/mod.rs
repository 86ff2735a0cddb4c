//! Logo upload validation.
//!
//! The pipeline is generic over two asynchronous primitives so that the same
//! stages run natively and in the browser:
//!
//! - [`ByteReader`]: reads a selected file into a `data:` URL
//! - [`ImageDecoder`]: checks that a `data:` URL decodes as an image
//!
//! Native builds use [`LocalReader`] and [`ImageCrateDecoder`]; the wasm build
//! provides `FileReader`/`HtmlImageElement` backed versions.

mod decode;
mod error;
mod pipeline;
mod source;

pub use decode::{ImageCrateDecoder, ImageDecoder, decode_data_url, encode_data_url};
pub use error::{DecodeError, ReadError, RejectionKind};
pub use pipeline::{
    FileSummary, FileValidationPipeline, LogoLimits, ValidationOutcome, ValidationTask,
    is_image_mime,
};
pub use source::{BlobSource, ByteReader, FileBlob, FileLike, LocalReader, guess_mime_type};

/// Generated image fixtures for tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    fn next_byte(state: &mut u32) -> u8 {
        *state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (*state >> 24) as u8
    }

    fn noise(side: u32) -> DynamicImage {
        let mut state = 0x1234_5678;
        DynamicImage::ImageRgb8(RgbImage::from_fn(side, side, |_, _| {
            Rgb([next_byte(&mut state), next_byte(&mut state), next_byte(&mut state)])
        }))
    }

    fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), format)
            .expect("encode fixture");
        bytes
    }

    /// A noise PNG of the given side length.
    pub(crate) fn noise_png(side: u32) -> Vec<u8> {
        encode(&noise(side), ImageFormat::Png)
    }

    /// The smallest square noise JPEG (in steps of 8 px) of at least `min_bytes`.
    pub(crate) fn noise_jpeg(min_bytes: usize) -> Vec<u8> {
        let mut side = 96;
        loop {
            let bytes = encode(&noise(side), ImageFormat::Jpeg);
            if bytes.len() >= min_bytes {
                return bytes;
            }
            side += 8;
        }
    }
}
