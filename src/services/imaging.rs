//! Image payload decoding and normalization.

use crate::error::AppError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{DynamicImage, RgbImage};
use std::io::Cursor;

/// Decode a data-URI-style payload into a raster image.
///
/// Only the segment after the first comma is base64-decoded; the prefix is
/// not inspected.
pub fn decode_image_payload(payload: &str) -> Result<DynamicImage, AppError> {
    let (_, encoded) = payload.split_once(',').ok_or_else(|| {
        AppError::Decode("image payload has no comma separator".to_string())
    })?;

    let bytes = BASE64.decode(encoded.trim())?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Flatten any alpha channel over an opaque white background.
///
/// The model always receives a fully-opaque 3-channel image; pixels that
/// were already opaque keep their exact color.
pub fn flatten_alpha(image: DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return image;
    }

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgb = RgbImage::new(width, height);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let blend = |channel: u8| -> u8 {
            let alpha = a as u16;
            ((channel as u16 * alpha + 255 * (255 - alpha)) / 255) as u8
        };
        rgb.put_pixel(x, y, image::Rgb([blend(r), blend(g), blend(b)]));
    }

    DynamicImage::ImageRgb8(rgb)
}

/// Re-encode an image as PNG for transport to the vision model.
pub fn to_png_bytes(image: &DynamicImage) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}
