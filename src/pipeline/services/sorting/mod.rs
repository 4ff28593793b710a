pub mod drag_drop;
pub mod sort_engine;

pub use drag_drop::{drag_start, drop_on, read_payload};
pub use sort_engine::SortEngine;
