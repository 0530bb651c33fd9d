use std::io::Cursor;
use std::time::Instant;

use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, RgbaImage};
use quickdrop_core::{ImageSource, TransformSpec, UploadError};

use crate::compression::{ImageCompressor, QualityPolicy};
use crate::source::{
    decode_data_url, load_from_clipboard, BlobRegistry, ClipboardProvider, ObjectUrl,
    RemoteFetcher, SourceUrl,
};
use crate::transform::{self, Geometry};

/// Turns an [`ImageSource`] into canonical WebP bytes.
///
/// Decode and fetch are the only suspension points. Pixel work runs on the
/// blocking pool.
#[derive(Clone, Default)]
pub struct ImageEngine {
    fetcher: RemoteFetcher,
    blobs: BlobRegistry,
}

impl ImageEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parts(fetcher: RemoteFetcher, blobs: BlobRegistry) -> Self {
        Self { fetcher, blobs }
    }

    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    /// Decode any supported source.
    ///
    /// A blob is registered under a temporary `blob:` handle for exactly the
    /// duration of this decode, whatever the outcome.
    pub async fn decode(
        &self,
        source: &ImageSource,
        origin: Option<&str>,
    ) -> Result<DynamicImage, UploadError> {
        match source {
            ImageSource::Blob(data) => {
                let handle = self.blobs.create_object_url(data.clone());
                let decoded = self.decode_object_url(&handle).await;
                drop(handle);
                decoded
            }
            ImageSource::Url(raw) => {
                let data = self.read_url(raw, origin).await?;
                decode_bytes(data).await
            }
        }
    }

    async fn decode_object_url(&self, handle: &ObjectUrl) -> Result<DynamicImage, UploadError> {
        let data = self
            .blobs
            .resolve(handle.url())
            .ok_or_else(|| UploadError::decode("object URL was revoked before decode"))?;
        decode_bytes(data).await
    }

    /// Raw bytes behind a URL source, after the protocol allow-list.
    async fn read_url(&self, raw: &str, origin: Option<&str>) -> Result<Bytes, UploadError> {
        match SourceUrl::parse(raw, origin)? {
            SourceUrl::Remote(url) => Ok(self.fetcher.fetch(&url).await?.data),
            SourceUrl::Data(raw) => decode_data_url(&raw),
            SourceUrl::Blob(raw) => self.blobs.resolve(&raw).ok_or_else(|| {
                UploadError::decode(format!("{} has been revoked or was never created", raw))
            }),
        }
    }

    pub fn compute_geometry(
        img: &DynamicImage,
        spec: &TransformSpec,
    ) -> Result<Geometry, UploadError> {
        let (width, height) = img.dimensions();
        transform::compute_geometry(width, height, spec)
    }

    pub async fn render(
        &self,
        img: DynamicImage,
        spec: TransformSpec,
    ) -> Result<RgbaImage, UploadError> {
        tokio::task::spawn_blocking(move || transform::render(&img, &spec))
            .await
            .map_err(|e| UploadError::encode(format!("render task failed: {}", e)))?
    }

    pub async fn encode(
        &self,
        surface: RgbaImage,
        policy: QualityPolicy,
    ) -> Result<Bytes, UploadError> {
        tokio::task::spawn_blocking(move || ImageCompressor::encode_webp(&surface, policy))
            .await
            .map_err(|e| UploadError::encode(format!("encode task failed: {}", e)))?
    }

    /// Fetch an http(s) URL that must serve an image.
    pub async fn load_from_url(&self, raw: &str, origin: Option<&str>) -> Result<Bytes, UploadError> {
        let url = match SourceUrl::parse(raw, origin)? {
            SourceUrl::Remote(url) => url,
            _ => {
                return Err(UploadError::unsupported_source(
                    "only http and https URLs can be loaded",
                ))
            }
        };

        let body = self.fetcher.fetch(&url).await?;
        if !body.is_image() {
            return Err(UploadError::unsupported_source(format!(
                "{} is not an image (content type {})",
                url,
                body.content_type.as_deref().unwrap_or("missing")
            )));
        }

        Ok(body.data)
    }

    pub async fn load_from_clipboard(
        &self,
        provider: &dyn ClipboardProvider,
    ) -> Result<Bytes, UploadError> {
        load_from_clipboard(provider).await
    }

    /// `decode → render → encode`.
    ///
    /// A blob that is already WebP goes through untouched when compression is
    /// disabled and there is nothing to transform.
    pub async fn process(
        &self,
        source: &ImageSource,
        transform: Option<&TransformSpec>,
        policy: QualityPolicy,
        origin: Option<&str>,
    ) -> Result<Bytes, UploadError> {
        let start = Instant::now();
        let transform = transform.cloned().unwrap_or_default();
        transform.validate()?;

        if let ImageSource::Blob(data) = source {
            if !policy.compress_enabled
                && transform.is_identity()
                && image::guess_format(data).ok() == Some(ImageFormat::WebP)
            {
                tracing::debug!(size = data.len(), "Source is already WebP, passing through");
                return Ok(data.clone());
            }
        }

        let img = self.decode(source, origin).await?;
        let (width, height) = img.dimensions();

        let surface = self.render(img, transform).await?;
        let (out_width, out_height) = surface.dimensions();

        let encoded = self.encode(surface, policy).await?;

        tracing::info!(
            source = %source.describe(),
            width = width,
            height = height,
            out_width = out_width,
            out_height = out_height,
            quality = policy.effective_quality(),
            output_size = encoded.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image processed"
        );

        Ok(encoded)
    }
}

async fn decode_bytes(data: Bytes) -> Result<DynamicImage, UploadError> {
    if data.is_empty() {
        return Err(UploadError::decode("image data is empty"));
    }

    tokio::task::spawn_blocking(move || {
        ImageReader::new(Cursor::new(&data[..]))
            .with_guessed_format()
            .map_err(|e| UploadError::decode(e.to_string()))?
            .decode()
            .map_err(|e| UploadError::decode(e.to_string()))
    })
    .await
    .map_err(|e| UploadError::decode(format!("decode task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ClipboardItem, MemoryClipboard};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use image::Rgba;
    use quickdrop_core::CropRect;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn png_bytes(width: u32, height: u32) -> Bytes {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 128, 255])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        Bytes::from(buffer)
    }

    /// Engine whose client ignores proxy settings from the environment.
    fn local_engine() -> ImageEngine {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        ImageEngine::with_parts(RemoteFetcher::with_client(client), BlobRegistry::new())
    }

    /// Serve one canned HTTP response, returning the base URL.
    async fn serve_once(status: &'static str, content_type: &'static str, body: Bytes) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                content_type,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_decode_blob_releases_handle() {
        let engine = ImageEngine::new();
        let img = engine
            .decode(&ImageSource::blob(png_bytes(12, 8)), None)
            .await
            .unwrap();
        assert_eq!(img.dimensions(), (12, 8));
        assert!(engine.blobs().is_empty());
    }

    #[tokio::test]
    async fn test_decode_failure_releases_handle() {
        let engine = ImageEngine::new();
        let result = engine
            .decode(&ImageSource::blob(Bytes::from_static(b"not an image")), None)
            .await;
        assert!(matches!(result, Err(UploadError::DecodeFailure(_))));
        assert!(engine.blobs().is_empty());
    }

    #[tokio::test]
    async fn test_decode_data_url() {
        let engine = ImageEngine::new();
        let url = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(3, 5)));
        let img = engine.decode(&ImageSource::url(url), None).await.unwrap();
        assert_eq!(img.dimensions(), (3, 5));
    }

    #[tokio::test]
    async fn test_decode_registered_blob_url() {
        let engine = ImageEngine::new();
        let handle = engine.blobs().create_object_url(png_bytes(4, 4));
        let img = engine
            .decode(&ImageSource::url(handle.url()), None)
            .await
            .unwrap();
        assert_eq!(img.dimensions(), (4, 4));
    }

    #[tokio::test]
    async fn test_decode_unknown_blob_url() {
        let engine = ImageEngine::new();
        let result = engine
            .decode(&ImageSource::url("blob:quickdrop/missing"), None)
            .await;
        assert!(matches!(result, Err(UploadError::DecodeFailure(_))));
    }

    #[tokio::test]
    async fn test_decode_rejects_file_protocol() {
        let engine = ImageEngine::new();
        let result = engine
            .decode(&ImageSource::url("file:///tmp/a.png"), None)
            .await;
        assert!(matches!(result, Err(UploadError::UnsupportedSource(_))));
    }

    #[tokio::test]
    async fn test_decode_remote_url() {
        let base = serve_once("200 OK", "image/png", png_bytes(6, 2)).await;
        let engine = local_engine();
        let img = engine
            .decode(&ImageSource::url(format!("{}/a.png", base)), None)
            .await
            .unwrap();
        assert_eq!(img.dimensions(), (6, 2));
    }

    #[tokio::test]
    async fn test_relative_url_resolves_against_origin() {
        let base = serve_once("200 OK", "image/png", png_bytes(2, 2)).await;
        let engine = local_engine();
        let img = engine
            .decode(&ImageSource::url("/tokens/a.png"), Some(&base))
            .await
            .unwrap();
        assert_eq!(img.dimensions(), (2, 2));
    }

    #[tokio::test]
    async fn test_load_from_url_error_status() {
        let base = serve_once("404 Not Found", "text/plain", Bytes::from_static(b"nope")).await;
        let engine = local_engine();
        let result = engine.load_from_url(&format!("{}/gone.png", base), None).await;
        assert!(matches!(result, Err(UploadError::DecodeFailure(_))));
    }

    #[tokio::test]
    async fn test_load_from_url_requires_image_content_type() {
        let base = serve_once("200 OK", "text/html", Bytes::from_static(b"<html>")).await;
        let engine = local_engine();
        let result = engine.load_from_url(&format!("{}/page", base), None).await;
        assert!(matches!(result, Err(UploadError::UnsupportedSource(_))));
    }

    #[tokio::test]
    async fn test_load_from_url_rejects_data_url() {
        let engine = ImageEngine::new();
        let result = engine.load_from_url("data:image/png;base64,AAAA", None).await;
        assert!(matches!(result, Err(UploadError::UnsupportedSource(_))));
    }

    #[tokio::test]
    async fn test_load_from_clipboard() {
        let engine = ImageEngine::new();
        let clipboard = MemoryClipboard::new(vec![
            ClipboardItem::new().with_type("image/png", png_bytes(2, 3))
        ]);
        let data = engine.load_from_clipboard(&clipboard).await.unwrap();
        let img = engine.decode(&ImageSource::Blob(data), None).await.unwrap();
        assert_eq!(img.dimensions(), (2, 3));
    }

    #[tokio::test]
    async fn test_process_outputs_webp_with_geometry() {
        let engine = ImageEngine::new();
        let transform = TransformSpec::default().with_scale(0.5).with_rotation(90);
        let data = engine
            .process(
                &ImageSource::blob(png_bytes(40, 20)),
                Some(&transform),
                QualityPolicy::default(),
                None,
            )
            .await
            .unwrap();

        assert_eq!(image::guess_format(&data).unwrap(), ImageFormat::WebP);
        let out = image::load_from_memory(&data).unwrap();
        assert_eq!(out.dimensions(), (10, 20));
    }

    #[tokio::test]
    async fn test_process_with_crop() {
        let engine = ImageEngine::new();
        let transform = TransformSpec::default().with_crop(CropRect::new(2.0, 2.0, 5.0, 4.0));
        let data = engine
            .process(
                &ImageSource::blob(png_bytes(16, 16)),
                Some(&transform),
                QualityPolicy::default(),
                None,
            )
            .await
            .unwrap();
        let out = image::load_from_memory(&data).unwrap();
        assert_eq!(out.dimensions(), (5, 4));
    }

    #[tokio::test]
    async fn test_process_passes_webp_through() {
        let engine = ImageEngine::new();
        let webp = ImageCompressor::encode_webp(
            &RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])),
            QualityPolicy::default(),
        )
        .unwrap();

        let out = engine
            .process(
                &ImageSource::Blob(webp.clone()),
                None,
                QualityPolicy::new(false, 0.5),
                None,
            )
            .await
            .unwrap();
        assert_eq!(out, webp);
    }

    #[tokio::test]
    async fn test_process_invalid_scale() {
        let engine = ImageEngine::new();
        let transform = TransformSpec::default().with_scale(-1.0);
        let result = engine
            .process(
                &ImageSource::blob(png_bytes(4, 4)),
                Some(&transform),
                QualityPolicy::default(),
                None,
            )
            .await;
        assert!(matches!(result, Err(UploadError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_process_oversized_crop_is_input_error() {
        let engine = ImageEngine::new();
        let transform =
            TransformSpec::default().with_crop(CropRect::new(0.0, 0.0, 1e6, 1e6));
        let result = engine
            .process(
                &ImageSource::blob(png_bytes(4, 4)),
                Some(&transform),
                QualityPolicy::default(),
                None,
            )
            .await;
        assert!(matches!(result, Err(UploadError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_process_oversized_scale_is_input_error() {
        let engine = ImageEngine::new();
        let transform = TransformSpec::default().with_scale(1e5);
        let result = engine
            .process(
                &ImageSource::blob(png_bytes(4, 4)),
                Some(&transform),
                QualityPolicy::default(),
                None,
            )
            .await;
        assert!(matches!(result, Err(UploadError::InvalidInput(_))));
    }

    #[test]
    fn test_compute_geometry_from_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(30, 10));
        let geometry =
            ImageEngine::compute_geometry(&img, &TransformSpec::default().with_rotation(270))
                .unwrap();
        assert_eq!((geometry.output_width, geometry.output_height), (10, 30));
    }
}
