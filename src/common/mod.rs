pub mod color;
pub mod color_space;
pub mod delta_e;
pub mod ids;

pub use color::{Color, ColorHex, Hsl, Lab, Rgb, Xyz};
pub use delta_e::delta_e_2000;
pub use ids::{GroupId, ImageId, PivotId};
