use tower::limit::ConcurrencyLimit;
use tower::ServiceBuilder;

use super::palette_service::PaletteService;

/// Palette extraction with at most `concurrency` decodes in flight.
/// Clones share the limit.
pub fn create_palette_pipeline(
    service: PaletteService,
    concurrency: usize,
) -> ConcurrencyLimit<PaletteService> {
    ServiceBuilder::new()
        .concurrency_limit(concurrency.max(1))
        .service(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ImageId, Rgb};
    use crate::pipeline::services::image::PaletteRequest;
    use futures::future::join_all;
    use image::{DynamicImage, ImageBuffer, Rgb as Pixel};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_pipeline_runs_requests_concurrently() {
        let pipeline = create_palette_pipeline(PaletteService::default(), 2);
        let requests: Vec<_> = (0..5u8)
            .map(|i| {
                let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
                    4,
                    4,
                    Pixel([i * 40, 10, 10]),
                ));
                PaletteRequest::new(ImageId::new(), image, 6)
            })
            .collect();

        let palettes = join_all(
            requests
                .into_iter()
                .map(|request| pipeline.clone().oneshot(request)),
        )
        .await;

        let firsts: Vec<Rgb> = palettes
            .into_iter()
            .map(|palette| palette.unwrap().colors[0])
            .collect();
        assert_eq!(firsts[4], Rgb::new(160, 10, 10));
        assert_eq!(firsts.len(), 5);
    }
}
