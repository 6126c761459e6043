//! Best-effort image recompression for proof uploads.
//!
//! Oversized photos dominate proof storage, so image proofs are resized to
//! a maximum width and re-encoded as JPEG before they are stored. Every
//! failure path degrades silently to the original bytes; recompression is
//! never allowed to fail a submission.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::config::{PROOF_IMAGE_JPEG_QUALITY, PROOF_IMAGE_MAX_WIDTH};

/// Recompress image bytes when it pays off.
///
/// Returns the original bytes unchanged for non-image MIME types, GIFs
/// (re-encoding would drop animation), decode failures, and results that
/// come out larger than the input.
pub fn compress_image(data: &Bytes, mime_type: &str) -> Bytes {
    if !mime_type.starts_with("image/") || mime_type == "image/gif" {
        return data.clone();
    }

    match try_compress(data) {
        Some(compressed) if compressed.len() < data.len() => {
            tracing::debug!(
                original = data.len(),
                compressed = compressed.len(),
                "proof image recompressed"
            );
            Bytes::from(compressed)
        }
        Some(_) => data.clone(),
        None => {
            tracing::debug!(mime = %mime_type, "proof image recompression skipped");
            data.clone()
        }
    }
}

fn try_compress(data: &Bytes) -> Option<Vec<u8>> {
    let img = image::load_from_memory(data).ok()?;

    let img = if img.width() > PROOF_IMAGE_MAX_WIDTH {
        let height = (u64::from(img.height()) * u64::from(PROOF_IMAGE_MAX_WIDTH)
            / u64::from(img.width())) as u32;
        img.resize(PROOF_IMAGE_MAX_WIDTH, height.max(1), FilterType::Lanczos3)
    } else {
        img
    };

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, PROOF_IMAGE_JPEG_QUALITY);
    // Alpha channels are not representable in JPEG
    let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());
    rgb.write_with_encoder(encoder).ok()?;

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn sample_png(width: u32, height: u32) -> Bytes {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    #[test]
    fn test_wide_image_is_resized() {
        let original = sample_png(2400, 1200);
        let compressed = compress_image(&original, "image/png");

        let result = image::load_from_memory(&compressed).unwrap();
        assert!(result.width() <= PROOF_IMAGE_MAX_WIDTH);
    }

    #[test]
    fn test_non_image_passes_through() {
        let pdf = Bytes::from_static(b"%PDF-1.4 fake document");
        let out = compress_image(&pdf, "application/pdf");
        assert_eq!(out, pdf);
    }

    #[test]
    fn test_gif_passes_through() {
        let gif = Bytes::from_static(b"GIF89a fake");
        let out = compress_image(&gif, "image/gif");
        assert_eq!(out, gif);
    }

    #[test]
    fn test_corrupt_image_degrades_to_original() {
        let garbage = Bytes::from_static(b"not really a jpeg");
        let out = compress_image(&garbage, "image/jpeg");
        assert_eq!(out, garbage);
    }
}
