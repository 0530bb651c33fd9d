use image::{imageops, Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

/// Image orientation operations (rotation and flipping)
pub struct ImageOrientation;

impl ImageOrientation {
    /// Flip in image space, then rotate clockwise about the center.
    ///
    /// This matches drawing through a `translate(center) → rotate → scale(±1)`
    /// canvas transform: the mirror is applied to the source before it turns.
    pub fn apply(img: RgbaImage, degrees: i32, flip_x: bool, flip_y: bool) -> RgbaImage {
        let mut img = img;

        if flip_x {
            img = Self::apply_flip_horizontal(&img);
        }
        if flip_y {
            img = Self::apply_flip_vertical(&img);
        }

        Self::rotate_by_angle(img, degrees)
    }

    /// Rotate clockwise. Quarter turns are exact and swap the axes; any other
    /// angle turns the content about the center of a same-sized canvas with
    /// transparent corners.
    pub fn rotate_by_angle(img: RgbaImage, degrees: i32) -> RgbaImage {
        match degrees.rem_euclid(360) {
            0 => img,
            90 => imageops::rotate90(&img),
            180 => imageops::rotate180(&img),
            270 => imageops::rotate270(&img),
            other => {
                tracing::debug!(degrees = other, "Applying free rotation");
                rotate_about_center(
                    &img,
                    (other as f32).to_radians(),
                    Interpolation::Bilinear,
                    Rgba([0, 0, 0, 0]),
                )
            }
        }
    }

    /// Apply horizontal flip (mirror)
    pub fn apply_flip_horizontal(img: &RgbaImage) -> RgbaImage {
        imageops::flip_horizontal(img)
    }

    /// Apply vertical flip
    pub fn apply_flip_vertical(img: &RgbaImage) -> RgbaImage {
        imageops::flip_vertical(img)
    }
}
