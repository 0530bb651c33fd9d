use quickdrop_core::{CropRect, TransformSpec};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "quickdrop=info";

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays clean
/// for JSON output.
pub fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Parse `X,Y,W,H` (canvas pixels) into a crop rectangle.
pub fn parse_crop(raw: &str) -> Result<CropRect, String> {
    let values = raw
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match values[..] {
        [x, y, width, height] => Ok(CropRect::new(x, y, width, height)),
        _ => Err(format!(
            "expected X,Y,W,H but got {} value(s)",
            values.len()
        )),
    }
}

/// Transform from the command-line flags, `None` when no flag was given.
pub fn build_transform(
    scale: Option<f64>,
    rotate: Option<i32>,
    flip_x: bool,
    flip_y: bool,
    crop: Option<CropRect>,
) -> Option<TransformSpec> {
    if scale.is_none() && rotate.is_none() && !flip_x && !flip_y && crop.is_none() {
        return None;
    }

    let mut spec = TransformSpec::default().with_flip(flip_x, flip_y);
    if let Some(scale) = scale {
        spec = spec.with_scale(scale);
    }
    if let Some(degrees) = rotate {
        spec = spec.with_rotation(degrees);
    }
    if let Some(crop) = crop {
        spec = spec.with_crop(crop);
    }
    Some(spec)
}
