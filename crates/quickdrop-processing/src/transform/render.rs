use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};
use quickdrop_core::{CropRect, TransformSpec, UploadError};

use super::geometry::{check_dimensions, compute_geometry};
use super::orientation::ImageOrientation;

/// Draw `img` into a working surface matching [`compute_geometry`], then run
/// the crop pass if one is requested.
pub fn render(img: &DynamicImage, transform: &TransformSpec) -> Result<RgbaImage, UploadError> {
    let (width, height) = img.dimensions();
    let geometry = compute_geometry(width, height, transform)?;

    tracing::debug!(
        source_width = width,
        source_height = height,
        canvas_width = geometry.canvas_width,
        canvas_height = geometry.canvas_height,
        rotation = transform.rotation,
        flip_x = transform.flip_x,
        flip_y = transform.flip_y,
        "Rendering image"
    );

    let surface = if (geometry.scaled_width, geometry.scaled_height) == (width, height) {
        img.to_rgba8()
    } else {
        imageops::resize(
            &img.to_rgba8(),
            geometry.scaled_width,
            geometry.scaled_height,
            FilterType::Lanczos3,
        )
    };

    let canvas = ImageOrientation::apply(
        surface,
        transform.rotation,
        transform.flip_x,
        transform.flip_y,
    );

    match transform.crop {
        Some(ref crop) => crop_surface(&canvas, crop),
        None => Ok(canvas),
    }
}

/// Copy `crop` out of `canvas` into a new surface of exactly the crop's size.
/// Parts of the rectangle outside the canvas stay transparent.
pub fn crop_surface(canvas: &RgbaImage, crop: &CropRect) -> Result<RgbaImage, UploadError> {
    let (x, y, width, height) = crop.to_pixels()?;
    check_dimensions("Crop", width, height)?;
    let mut out = RgbaImage::new(width, height);
    imageops::overlay(&mut out, canvas, -x, -y);
    Ok(out)
}
