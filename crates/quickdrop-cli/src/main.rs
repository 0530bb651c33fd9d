//! Quickdrop CLI: convert an image to WebP and upload it to the configured
//! storage.
//!
//! Configuration comes from QUICKDROP_* environment variables (and `.env`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use quickdrop_cli::{build_transform, init_tracing, parse_crop};
use quickdrop_core::{
    CropRect, EntityKind, ErrorMetadata, ImageSource, RecordRef, Settings, UploadRequest,
};
use quickdrop_processing::ImageEngine;
use quickdrop_storage::create_router;
use quickdrop_upload::{FilenameAndPathPolicy, UploadOrchestrator};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "quickdrop", about = "Image upload pipeline CLI")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an image to WebP and upload it
    Upload {
        /// Entity kind the image belongs to (Actor, Item, Scene, ...)
        #[arg(long)]
        kind: EntityKind,
        /// Field on the entity (portrait, token, image, ...)
        #[arg(long)]
        field: String,
        /// Display name used in the filename
        #[arg(long)]
        name: Option<String>,
        /// Record id the image is for
        #[arg(long, default_value = "cli")]
        record: String,
        /// Local image file
        #[arg(required_unless_present = "url", conflicts_with = "url")]
        file: Option<PathBuf>,
        /// Image URL (http, https or data)
        #[arg(long)]
        url: Option<String>,
        /// Scale factor
        #[arg(long)]
        scale: Option<f64>,
        /// Clockwise rotation in degrees
        #[arg(long, allow_hyphen_values = true)]
        rotate: Option<i32>,
        #[arg(long)]
        flip_x: bool,
        #[arg(long)]
        flip_y: bool,
        /// Crop rectangle X,Y,W,H in transformed-canvas pixels
        #[arg(long, value_parser = parse_crop, allow_hyphen_values = true)]
        crop: Option<CropRect>,
    },
    /// Print the destination an upload would use
    Resolve {
        #[arg(long)]
        kind: EntityKind,
        #[arg(long)]
        field: String,
        #[arg(long, default_value = "image")]
        name: String,
    },
    /// List buckets offered by the bucket backend
    Buckets,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let settings = Settings::from_env().context("Failed to load QUICKDROP_* settings")?;
    tracing::debug!(
        storage_source = %settings.storage_source,
        compress_enabled = settings.compress_enabled,
        compress_quality = settings.compress_quality,
        isolation_id = ?settings.isolation_id,
        "Settings loaded"
    );

    match cli.command {
        Commands::Upload {
            kind,
            field,
            name,
            record,
            file,
            url,
            scale,
            rotate,
            flip_x,
            flip_y,
            crop,
        } => {
            let source = match (file, url) {
                (Some(path), _) => {
                    let data = tokio::fs::read(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    ImageSource::blob(data)
                }
                (None, Some(url)) => ImageSource::url(url),
                (None, None) => anyhow::bail!("Either a file or --url is required"),
            };

            let mut request = UploadRequest::new(RecordRef::new(record), kind, field, source);
            if let Some(name) = name {
                request = request.with_name(name);
            }
            if let Some(spec) = build_transform(scale, rotate, flip_x, flip_y, crop) {
                request = request.with_transform(spec);
            }

            let router = create_router(&settings)
                .await
                .context("Failed to configure storage")?;
            let orchestrator =
                UploadOrchestrator::new(Arc::new(settings), ImageEngine::new(), router);

            let result = orchestrator
                .execute(request)
                .await
                .map_err(|e| anyhow::anyhow!("{} [{}]", e, e.error_code()))?;
            print_json(&result)?;
        }
        Commands::Resolve { kind, field, name } => {
            let destination = FilenameAndPathPolicy::new(&settings)
                .resolve(&name, kind, &field)
                .map_err(|e| anyhow::anyhow!("{} [{}]", e, e.error_code()))?;
            print_json(&destination)?;
        }
        Commands::Buckets => {
            let router = create_router(&settings)
                .await
                .context("Failed to configure storage")?;
            let buckets = router.list_buckets().await?;
            print_json(&buckets)?;
        }
    }

    Ok(())
}
