use serde::{Deserialize, Serialize};

use crate::error::UploadError;

/// Crop rectangle in post-transform canvas coordinates.
///
/// Width and height are optional so partially specified requests can be
/// reported as input errors instead of failing to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: Some(width),
            height: Some(height),
        }
    }

    /// Rounded pixel rectangle `(x, y, width, height)`.
    pub fn to_pixels(&self) -> Result<(i64, i64, u32, u32), UploadError> {
        let width = positive_dimension("width", self.width)?;
        let height = positive_dimension("height", self.height)?;
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(UploadError::invalid_input("Crop origin must be finite"));
        }
        Ok((self.x.round() as i64, self.y.round() as i64, width, height))
    }
}

fn positive_dimension(name: &str, value: Option<f64>) -> Result<u32, UploadError> {
    let value = value.ok_or_else(|| UploadError::invalid_input(format!("Crop {} is required", name)))?;
    if !value.is_finite() || value.round() < 1.0 {
        return Err(UploadError::invalid_input(format!(
            "Crop {} must be positive, got {}",
            name, value
        )));
    }
    Ok(value.round().min(u32::MAX as f64) as u32)
}

fn default_scale() -> f64 {
    1.0
}

/// Geometric edits applied before encoding: scale, then rotate/flip, then crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSpec {
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Clockwise rotation in degrees.
    #[serde(default)]
    pub rotation: i32,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
    #[serde(default)]
    pub crop: Option<CropRect>,
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            rotation: 0,
            flip_x: false,
            flip_y: false,
            crop: None,
        }
    }
}

impl TransformSpec {
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_flip(mut self, flip_x: bool, flip_y: bool) -> Self {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
        self
    }

    pub fn with_crop(mut self, crop: CropRect) -> Self {
        self.crop = Some(crop);
        self
    }

    /// Rotation folded into `[0, 360)`.
    pub fn normalized_rotation(&self) -> i32 {
        self.rotation.rem_euclid(360)
    }

    /// Whether the rotation swaps width and height (±90, ±270).
    pub fn swaps_axes(&self) -> bool {
        matches!(self.normalized_rotation(), 90 | 270)
    }

    pub fn is_identity(&self) -> bool {
        self.scale == 1.0
            && self.normalized_rotation() == 0
            && !self.flip_x
            && !self.flip_y
            && self.crop.is_none()
    }

    /// Reject values that cannot be applied. Crop dimensions are checked when
    /// the crop pass runs.
    pub fn validate(&self) -> Result<(), UploadError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(UploadError::invalid_input(format!(
                "Scale must be greater than zero, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}
