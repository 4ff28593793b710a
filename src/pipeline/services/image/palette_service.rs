use std::{
    future::Future,
    path::PathBuf,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use image::DynamicImage;
use tower::Service;
use tracing::{debug, instrument};

use super::palette_sampler::{PaletteSampler, QuantizedSampler};
use crate::common::{ImageId, Rgb};
use crate::error::PaletteError;

/// Where the pixels of an image come from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
    Decoded(DynamicImage),
}

impl ImageSource {
    fn decode(self) -> Result<DynamicImage, PaletteError> {
        match self {
            ImageSource::Path(path) => {
                let bytes = std::fs::read(&path)?;
                Ok(image::load_from_memory(&bytes)?)
            }
            ImageSource::Bytes(bytes) => Ok(image::load_from_memory(&bytes)?),
            ImageSource::Decoded(image) => Ok(image),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(image: DynamicImage) -> Self {
        ImageSource::Decoded(image)
    }
}

#[derive(Debug, Clone)]
pub struct PaletteRequest {
    pub image_id: ImageId,
    pub source: ImageSource,
    pub color_count: usize,
    pub quality: usize,
}

impl PaletteRequest {
    pub fn new(image_id: ImageId, source: impl Into<ImageSource>, color_count: usize) -> Self {
        Self {
            image_id,
            source: source.into(),
            color_count,
            quality: 1,
        }
    }

    pub fn with_quality(mut self, quality: usize) -> Self {
        self.quality = quality;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub image_id: ImageId,
    pub colors: Vec<Rgb>,
}

/// Decodes and samples images off the async runtime.
#[derive(Clone)]
pub struct PaletteService {
    sampler: Arc<dyn PaletteSampler>,
}

impl Default for PaletteService {
    fn default() -> Self {
        Self::new(QuantizedSampler::new())
    }
}

impl PaletteService {
    pub fn new(sampler: impl PaletteSampler + 'static) -> Self {
        Self {
            sampler: Arc::new(sampler),
        }
    }
}

#[instrument(skip(sampler, request), fields(image_id = %request.image_id))]
async fn extract_palette(
    sampler: Arc<dyn PaletteSampler>,
    request: PaletteRequest,
) -> Result<Palette, PaletteError> {
    let PaletteRequest {
        image_id,
        source,
        color_count,
        quality,
    } = request;

    let colors = tokio::task::spawn_blocking(move || -> Result<Vec<Rgb>, PaletteError> {
        let image = source.decode()?;
        Ok(sampler.sample(&image, color_count, quality))
    })
    .await??;

    if colors.is_empty() {
        return Err(PaletteError::EmptyPalette(image_id));
    }

    debug!("Sampled {} colors", colors.len());
    Ok(Palette { image_id, colors })
}

impl Service<PaletteRequest> for PaletteService {
    type Response = Palette;
    type Error = PaletteError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: PaletteRequest) -> Self::Future {
        Box::pin(extract_palette(Arc::clone(&self.sampler), request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb as Pixel};
    use std::io::Cursor;
    use tower::ServiceExt;

    fn solid(r: u8, g: u8, b: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(8, 8, Pixel([r, g, b])))
    }

    #[tokio::test]
    async fn test_extracts_from_decoded_image() {
        let image_id = ImageId::new();
        let palette = PaletteService::default()
            .oneshot(PaletteRequest::new(image_id, solid(20, 120, 220), 6))
            .await
            .unwrap();

        assert_eq!(palette.image_id, image_id);
        assert_eq!(palette.colors, vec![Rgb::new(20, 120, 220)]);
    }

    #[tokio::test]
    async fn test_extracts_from_encoded_bytes() {
        let mut bytes = Vec::new();
        solid(90, 10, 10)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let palette = PaletteService::default()
            .oneshot(PaletteRequest::new(ImageId::new(), ImageSource::Bytes(bytes), 6).with_quality(3))
            .await
            .unwrap();
        assert_eq!(palette.colors, vec![Rgb::new(90, 10, 10)]);
    }

    #[tokio::test]
    async fn test_white_image_yields_empty_palette_error() {
        let image_id = ImageId::new();
        let result = PaletteService::default()
            .oneshot(PaletteRequest::new(image_id, solid(255, 255, 255), 6))
            .await;
        assert!(matches!(result, Err(PaletteError::EmptyPalette(id)) if id == image_id));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let result = PaletteService::default()
            .oneshot(PaletteRequest::new(
                ImageId::new(),
                PathBuf::from("/nonexistent/chroma-sort/input.png"),
                6,
            ))
            .await;
        assert!(matches!(result, Err(PaletteError::Io(_))));
    }

    #[tokio::test]
    async fn test_garbage_bytes_fail_to_decode() {
        let result = PaletteService::default()
            .oneshot(PaletteRequest::new(
                ImageId::new(),
                ImageSource::Bytes(vec![0, 1, 2, 3]),
                6,
            ))
            .await;
        assert!(matches!(result, Err(PaletteError::Decode(_))));
    }
}
