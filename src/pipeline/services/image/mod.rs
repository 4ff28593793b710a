pub mod image_pipeline;
pub mod palette_sampler;
pub mod palette_service;

pub use image_pipeline::create_palette_pipeline;
pub use palette_sampler::{PaletteSampler, QuantizedSampler};
pub use palette_service::{ImageSource, Palette, PaletteRequest, PaletteService};
