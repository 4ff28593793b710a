pub mod services;
pub mod types;

pub use services::export::{ExportConfig, ExportReport};
pub use services::image::{ImageSource, PaletteSampler, QuantizedSampler};
pub use types::{ColorGroup, Image, ImageColor, SortState, StoreEvent};
