use quickdrop_core::{TransformSpec, UploadError};

use crate::compression::WEBP_MAX_DIMENSION;

/// Output dimensions for a transform applied to a `width × height` image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Size after scaling, before rotation
    pub scaled_width: u32,
    pub scaled_height: u32,
    /// Canvas size after rotation (axes swapped for ±90/±270)
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Final surface size: the crop size when cropping, the canvas otherwise
    pub output_width: u32,
    pub output_height: u32,
}

fn scale_dimension(value: u32, scale: f64) -> u32 {
    (value as f64 * scale).round().clamp(1.0, u32::MAX as f64) as u32
}

/// Reject a surface that could not be encoded, before anything is allocated.
pub fn check_dimensions(stage: &str, width: u32, height: u32) -> Result<(), UploadError> {
    if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
        return Err(UploadError::invalid_input(format!(
            "{} size {}x{} exceeds the {}px limit",
            stage, width, height, WEBP_MAX_DIMENSION
        )));
    }
    Ok(())
}

/// `scale * (width, height)` rounded, swapped for quarter turns, then
/// replaced by the crop size when a crop is requested.
pub fn compute_geometry(
    width: u32,
    height: u32,
    transform: &TransformSpec,
) -> Result<Geometry, UploadError> {
    transform.validate()?;

    let scaled_width = scale_dimension(width, transform.scale);
    let scaled_height = scale_dimension(height, transform.scale);

    let (canvas_width, canvas_height) = if transform.swaps_axes() {
        (scaled_height, scaled_width)
    } else {
        (scaled_width, scaled_height)
    };

    let (output_width, output_height) = match transform.crop {
        Some(crop) => {
            let (_, _, w, h) = crop.to_pixels()?;
            (w, h)
        }
        None => (canvas_width, canvas_height),
    };

    check_dimensions("Scaled", scaled_width, scaled_height)?;
    check_dimensions("Output", output_width, output_height)?;

    Ok(Geometry {
        scaled_width,
        scaled_height,
        canvas_width,
        canvas_height,
        output_width,
        output_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickdrop_core::CropRect;

    #[test]
    fn test_scale_rounds() {
        let spec = TransformSpec::default().with_scale(0.5);
        let geometry = compute_geometry(101, 33, &spec).unwrap();
        assert_eq!((geometry.output_width, geometry.output_height), (51, 17));
    }

    #[test]
    fn test_scale_never_reaches_zero() {
        let spec = TransformSpec::default().with_scale(0.001);
        let geometry = compute_geometry(10, 10, &spec).unwrap();
        assert_eq!((geometry.output_width, geometry.output_height), (1, 1));
    }

    #[test]
    fn test_quarter_turns_swap_after_scaling() {
        for rotation in [90, -90, 270, -270] {
            let spec = TransformSpec::default().with_scale(2.0).with_rotation(rotation);
            let geometry = compute_geometry(40, 10, &spec).unwrap();
            assert_eq!((geometry.scaled_width, geometry.scaled_height), (80, 20));
            assert_eq!((geometry.canvas_width, geometry.canvas_height), (20, 80));
        }
    }

    #[test]
    fn test_half_turn_and_odd_angles_keep_axes() {
        for rotation in [180, -180, 45, 360] {
            let spec = TransformSpec::default().with_rotation(rotation);
            let geometry = compute_geometry(40, 10, &spec).unwrap();
            assert_eq!((geometry.canvas_width, geometry.canvas_height), (40, 10));
        }
    }

    #[test]
    fn test_four_quarter_turns_restore_dimensions() {
        let spec = TransformSpec::default().with_rotation(90);
        let (mut width, mut height) = (640, 480);
        for _ in 0..4 {
            let geometry = compute_geometry(width, height, &spec).unwrap();
            width = geometry.output_width;
            height = geometry.output_height;
        }
        assert_eq!((width, height), (640, 480));
    }

    #[test]
    fn test_crop_sets_output() {
        let spec = TransformSpec::default()
            .with_rotation(90)
            .with_crop(CropRect::new(5.0, 5.0, 12.0, 7.0));
        let geometry = compute_geometry(40, 10, &spec).unwrap();
        assert_eq!((geometry.canvas_width, geometry.canvas_height), (10, 40));
        assert_eq!((geometry.output_width, geometry.output_height), (12, 7));
    }

    #[test]
    fn test_oversized_scale_rejected() {
        let spec = TransformSpec::default().with_scale(1000.0);
        assert!(matches!(
            compute_geometry(100, 10, &spec),
            Err(UploadError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_oversized_crop_rejected() {
        let spec = TransformSpec::default().with_crop(CropRect::new(0.0, 0.0, 1e6, 1e6));
        assert!(matches!(
            compute_geometry(4, 4, &spec),
            Err(UploadError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_largest_encodable_size_accepted() {
        let spec = TransformSpec::default().with_crop(CropRect::new(
            0.0,
            0.0,
            WEBP_MAX_DIMENSION as f64,
            1.0,
        ));
        let geometry = compute_geometry(4, 4, &spec).unwrap();
        assert_eq!(geometry.output_width, WEBP_MAX_DIMENSION);
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let spec = TransformSpec::default().with_scale(0.0);
        assert!(matches!(
            compute_geometry(10, 10, &spec),
            Err(UploadError::InvalidInput(_))
        ));
    }
}
