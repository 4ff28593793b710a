pub mod color_pool;
pub mod group_registry;
pub mod image_store;

pub use color_pool::{ColorPool, DEFAULT_SLOT_COUNT};
pub use group_registry::{GroupRegistry, DEFAULT_MAX_LEAD_COLOR_ATTEMPTS};
pub use image_store::ImageStore;
