mod color_group;
mod image;
mod image_color;
mod store_event;
mod transfer;

pub use color_group::ColorGroup;
pub use image::{Image, ImageOrigin};
pub use image_color::{ColorCollection, ImageColor, SharedImageColor, SortState};
pub use store_event::StoreEvent;
pub use transfer::{TransferChannel, TransferPayload};
