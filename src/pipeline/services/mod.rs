pub mod export;
pub mod image;
pub mod managers;
pub mod sorting;
