use std::cmp::Reverse;
use std::collections::HashMap;

use image::DynamicImage;

use crate::common::Rgb;

/// Pixels with alpha below this are skipped.
const MIN_ALPHA: u8 = 125;
/// Pixels with every channel above this are treated as background.
const NEAR_WHITE: u8 = 250;
/// Bits kept per channel when bucketing.
const BUCKET_BITS: u8 = 5;

/// Picks the dominant colors of a decoded image.
pub trait PaletteSampler: Send + Sync {
    /// Returns at most `color_count` colors, most dominant first. Only every
    /// `quality`-th pixel is visited; 1 visits all of them.
    fn sample(&self, image: &DynamicImage, color_count: usize, quality: usize) -> Vec<Rgb>;
}

#[derive(Default)]
struct Bucket {
    count: u64,
    sum: [u64; 3],
}

impl Bucket {
    fn add(&mut self, px: [u8; 4]) {
        self.count += 1;
        for (sum, channel) in self.sum.iter_mut().zip(px) {
            *sum += u64::from(channel);
        }
    }

    fn average(&self) -> Rgb {
        let n = self.count.max(1) as f64;
        Rgb::clamped(
            self.sum[0] as f64 / n,
            self.sum[1] as f64 / n,
            self.sum[2] as f64 / n,
        )
    }
}

/// Histogram sampler: buckets colors at 5 bits per channel and returns the
/// average color of the most populated buckets.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantizedSampler;

impl QuantizedSampler {
    pub fn new() -> Self {
        Self
    }

    fn bucket_key(px: [u8; 4]) -> (u8, u8, u8) {
        let shift = 8 - BUCKET_BITS;
        (px[0] >> shift, px[1] >> shift, px[2] >> shift)
    }

    fn is_sampled(px: [u8; 4]) -> bool {
        let [r, g, b, a] = px;
        a >= MIN_ALPHA && !(r > NEAR_WHITE && g > NEAR_WHITE && b > NEAR_WHITE)
    }
}

impl PaletteSampler for QuantizedSampler {
    fn sample(&self, image: &DynamicImage, color_count: usize, quality: usize) -> Vec<Rgb> {
        let rgba = image.to_rgba8();
        let mut buckets: HashMap<(u8, u8, u8), Bucket> = HashMap::new();

        for px in rgba.pixels().step_by(quality.max(1)) {
            if Self::is_sampled(px.0) {
                buckets.entry(Self::bucket_key(px.0)).or_default().add(px.0);
            }
        }

        let mut ranked: Vec<_> = buckets.into_iter().collect();
        // key as secondary order keeps equal counts deterministic
        ranked.sort_by_key(|(key, bucket)| (Reverse(bucket.count), *key));

        ranked
            .iter()
            .take(color_count)
            .map(|(_, bucket)| bucket.average())
            .collect()
    }
}
