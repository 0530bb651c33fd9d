use bytes::Bytes;
use image::RgbaImage;
use quickdrop_core::config::clamp_quality;
use quickdrop_core::{Settings, UploadError};

/// Largest edge libwebp accepts.
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// Compression inputs taken from one settings snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityPolicy {
    pub compress_enabled: bool,
    /// 0.1 to 1.0; ignored when compression is disabled
    pub quality: f32,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl QualityPolicy {
    pub fn new(compress_enabled: bool, quality: f32) -> Self {
        Self {
            compress_enabled,
            quality,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.compress_enabled, settings.compress_quality)
    }

    /// Encoder quality in `[0.1, 1.0]`. Disabled compression still encodes,
    /// at full quality.
    pub fn effective_quality(&self) -> f32 {
        if self.compress_enabled {
            clamp_quality(self.quality)
        } else {
            1.0
        }
    }

    /// Get quality value for WebP (0-100)
    pub fn webp_quality(&self) -> f32 {
        self.effective_quality() * 100.0
    }
}

/// Canonical encoder: every processed surface leaves as lossy WebP.
pub struct ImageCompressor;

impl ImageCompressor {
    pub fn encode_webp(img: &RgbaImage, policy: QualityPolicy) -> Result<Bytes, UploadError> {
        let (width, height) = img.dimensions();

        if width == 0 || height == 0 {
            return Err(UploadError::encode("surface has no pixels"));
        }
        if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
            return Err(UploadError::encode(format!(
                "{}x{} exceeds the WebP limit of {} pixels per side",
                width, height, WEBP_MAX_DIMENSION
            )));
        }

        let quality = policy.webp_quality();
        let start = std::time::Instant::now();

        let encoder = webp::Encoder::from_rgba(img.as_raw(), width, height);
        let webp_data = encoder.encode(quality);

        if webp_data.is_empty() {
            return Err(UploadError::encode("encoder produced no output"));
        }

        tracing::debug!(
            width = width,
            height = height,
            quality = quality,
            output_size = webp_data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Encoded WebP"
        );

        Ok(Bytes::copy_from_slice(&webp_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};

    #[test]
    fn test_effective_quality() {
        assert_eq!(QualityPolicy::new(true, 0.8).effective_quality(), 0.8);
        assert_eq!(QualityPolicy::new(true, 0.0).effective_quality(), 0.1);
        assert_eq!(QualityPolicy::new(true, 3.0).effective_quality(), 1.0);
        assert_eq!(QualityPolicy::new(false, 0.3).effective_quality(), 1.0);
    }

    #[test]
    fn test_webp_quality_scale() {
        assert_eq!(QualityPolicy::new(true, 0.5).webp_quality(), 50.0);
        assert_eq!(QualityPolicy::new(false, 0.5).webp_quality(), 100.0);
    }

    #[test]
    fn test_default_policy_follows_settings() {
        let policy = QualityPolicy::default();
        assert!(policy.compress_enabled);
        assert_eq!(policy.quality, 0.8);
    }

    #[test]
    fn test_encode_webp_output() {
        let img = RgbaImage::from_pixel(16, 9, Rgba([255, 0, 0, 255]));
        let data = ImageCompressor::encode_webp(&img, QualityPolicy::default()).unwrap();

        assert!(!data.is_empty());
        assert_eq!(image::guess_format(&data).unwrap(), ImageFormat::WebP);

        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 9));
    }

    #[test]
    fn test_lower_quality_is_not_larger() {
        let img = RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([(x * 4) as u8, (y * 4) as u8, ((x ^ y) * 4) as u8, 255])
        });
        let high = ImageCompressor::encode_webp(&img, QualityPolicy::new(true, 1.0)).unwrap();
        let low = ImageCompressor::encode_webp(&img, QualityPolicy::new(true, 0.1)).unwrap();
        assert!(low.len() <= high.len());
    }

    #[test]
    fn test_empty_surface_fails() {
        let img = RgbaImage::new(0, 0);
        assert!(matches!(
            ImageCompressor::encode_webp(&img, QualityPolicy::default()),
            Err(UploadError::EncodeFailure(_))
        ));
    }
}
