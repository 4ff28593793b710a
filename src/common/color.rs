use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::color_space::{self, brightness, hex_to_rgb, luminance, rgb_to_hex, rgb_to_hsl};
use crate::error::ColorError;

/// 8-bit sRGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Rounds and clamps each channel into 0..=255.
    pub fn clamped(r: f64, g: f64, b: f64) -> Self {
        let channel = |v: f64| {
            if v.is_nan() {
                0
            } else {
                v.round().clamp(0.0, 255.0) as u8
            }
        };
        Self::new(channel(r), channel(g), channel(b))
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(rgb: Rgb) -> Self {
        rgb.to_array()
    }
}

impl From<image::Rgb<u8>> for Rgb {
    fn from(px: image::Rgb<u8>) -> Self {
        Self::new(px[0], px[1], px[2])
    }
}

/// Hue in degrees [0, 360), saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub const fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.h, self.s, self.l]
    }
}

/// CIE XYZ, D50 adapted, Y of the reference white = 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Xyz {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }
}

/// Canonical `#RRGGBB` uppercase hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorHex(String);

impl ColorHex {
    pub fn from_rgb(rgb: Rgb) -> Self {
        Self(rgb_to_hex(rgb))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_rgb(&self) -> Rgb {
        // canonical by construction
        hex_to_rgb(&self.0).unwrap_or(Rgb::new(0, 0, 0))
    }
}

impl FromStr for ColorHex {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex_to_rgb(s).map(Self::from_rgb)
    }
}

impl TryFrom<String> for ColorHex {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColorHex> for String {
    fn from(hex: ColorHex) -> Self {
        hex.0
    }
}

impl fmt::Display for ColorHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fully derived color. Every field is a pure function of `rgb`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub hex: ColorHex,
    pub rgb: Rgb,
    pub hsl: Hsl,
    pub luminance: f64,
    pub brightness: f64,
}

impl Color {
    pub fn from_rgb(rgb: Rgb) -> Self {
        Self {
            hex: ColorHex::from_rgb(rgb),
            rgb,
            hsl: rgb_to_hsl(rgb),
            luminance: luminance(rgb),
            brightness: brightness(rgb),
        }
    }

    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        hex_to_rgb(hex).map(Self::from_rgb)
    }

    /// `rgb(r, g, b)`
    pub fn css_rgb(&self) -> String {
        format!("rgb({}, {}, {})", self.rgb.r, self.rgb.g, self.rgb.b)
    }

    /// `hsl(h, s%, l%)`
    pub fn css_hsl(&self) -> String {
        format!("hsl({}, {}%, {}%)", self.hsl.h, self.hsl.s, self.hsl.l)
    }

    pub fn lab(&self) -> Lab {
        color_space::rgb_to_lab(self.rgb)
    }

    pub fn contrast_text_color(&self) -> Color {
        Color::from_rgb(color_space::contrast_text_color(self.rgb))
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::from_rgb(rgb)
    }
}
