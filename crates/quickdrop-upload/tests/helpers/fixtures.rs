//! Image fixtures generated in memory.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

fn encode(img: RgbaImage, format: ImageFormat) -> Bytes {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buffer), format)
        .unwrap();
    Bytes::from(buffer)
}

/// Noisy gradient: a PNG large enough that lossy WebP beats it.
pub fn create_photo_png(width: u32, height: u32) -> Bytes {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let noise = ((x.wrapping_mul(2654435761) ^ y.wrapping_mul(40503)) >> 3) as u8 % 24;
        Rgba([
            ((x * 255 / width.max(1)) as u8).saturating_add(noise),
            ((y * 255 / height.max(1)) as u8).saturating_add(noise),
            (((x + y) * 3) % 256) as u8,
            255,
        ])
    });
    encode(img, ImageFormat::Png)
}

pub fn create_solid_png(width: u32, height: u32, color: [u8; 4]) -> Bytes {
    encode(RgbaImage::from_pixel(width, height, Rgba(color)), ImageFormat::Png)
}

pub fn is_webp(data: &[u8]) -> bool {
    data.len() > 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

/// Width and height of encoded image bytes.
pub fn dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(data).unwrap();
    (img.width(), img.height())
}

/// Lossless WebP, for pass-through checks.
pub fn create_webp(width: u32, height: u32) -> Bytes {
    encode(
        RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255])),
        ImageFormat::WebP,
    )
}
