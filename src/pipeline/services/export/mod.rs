pub mod download;
pub mod export_config;
pub mod export_projector;

pub use download::{export_file_name, write_export};
pub use export_config::{camel_to_snake, ExportConfig, FieldInclusion, KeyCasing};
pub use export_projector::{ExportProjector, ExportReport};
