//! Pure conversions between sRGB, HSL, CIE XYZ (D50) and CIELAB.
//!
//! All functions are total over their input domain. Only the RGB producing
//! helpers clamp, everything else returns values in the documented range.

use rand::Rng;

use super::color::{Hsl, Lab, Rgb, Xyz};
use crate::error::ColorError;

/// Normalized threshold below which an sRGB channel is linear.
const SRGB_LINEAR_THRESHOLD: f64 = 0.04045;

/// Brightness (0-255 scale) above which dark text reads better.
const BRIGHTNESS_BREAKPOINT: f64 = 170.0;

// Linear sRGB -> XYZ, D65 reference white.
const SRGB_TO_XYZ_D65: [[f64; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

// Bradford chromatic adaptation D65 -> D50.
const BRADFORD_D65_TO_D50: [[f64; 3]; 3] = [
    [1.0478112, 0.0228866, -0.0501270],
    [0.0295424, 0.9904844, -0.0170491],
    [-0.0092345, 0.0150436, 0.7521316],
];

/// D50 reference white used for Lab.
const D50_WHITE: [f64; 3] = [0.96422, 1.0, 0.82521];

const LAB_DELTA: f64 = 6.0 / 29.0;

pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb.r, rgb.g, rgb.b)
}

/// Parses `#RRGGBB` (or `RRGGBB`), case-insensitive.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);

    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(hex.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| ColorError::InvalidHex(hex.to_string()))
    };

    Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl::new(0.0, 0.0, l * 100.0);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl::new(h / 6.0 * 360.0, s * 100.0, l * 100.0)
}

pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let h = hsl.h / 360.0;
    let s = hsl.s / 100.0;
    let l = hsl.l / 100.0;

    if s == 0.0 {
        return Rgb::clamped(l * 255.0, l * 255.0, l * 255.0);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Rgb::clamped(
        hue_to_channel(p, q, h + 1.0 / 3.0) * 255.0,
        hue_to_channel(p, q, h) * 255.0,
        hue_to_channel(p, q, h - 1.0 / 3.0) * 255.0,
    )
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// sRGB gamma expansion of one 0-255 channel into [0, 1].
fn linearize(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= SRGB_LINEAR_THRESHOLD {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn mul(matrix: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        matrix[0][0] * v[0] + matrix[0][1] * v[1] + matrix[0][2] * v[2],
        matrix[1][0] * v[0] + matrix[1][1] * v[1] + matrix[1][2] * v[2],
        matrix[2][0] * v[0] + matrix[2][1] * v[1] + matrix[2][2] * v[2],
    ]
}

/// sRGB -> XYZ adapted to the D50 white point (Y of white = 1.0).
pub fn rgb_to_xyz(rgb: Rgb) -> Xyz {
    let linear = [linearize(rgb.r), linearize(rgb.g), linearize(rgb.b)];
    let d65 = mul(&SRGB_TO_XYZ_D65, linear);
    let [x, y, z] = mul(&BRADFORD_D65_TO_D50, d65);
    Xyz::new(x, y, z)
}

pub fn xyz_to_lab(xyz: Xyz) -> Lab {
    let f = |t: f64| {
        if t > LAB_DELTA.powi(3) {
            t.cbrt()
        } else {
            t / (3.0 * LAB_DELTA * LAB_DELTA) + 4.0 / 29.0
        }
    };

    let fx = f(xyz.x / D50_WHITE[0]);
    let fy = f(xyz.y / D50_WHITE[1]);
    let fz = f(xyz.z / D50_WHITE[2]);

    Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

pub fn rgb_to_lab(rgb: Rgb) -> Lab {
    xyz_to_lab(rgb_to_xyz(rgb))
}

/// Relative luminance in [0, 1].
pub fn luminance(rgb: Rgb) -> f64 {
    0.2126 * linearize(rgb.r) + 0.7152 * linearize(rgb.g) + 0.0722 * linearize(rgb.b)
}

/// Weighted brightness on the 0-255 scale, no gamma expansion.
pub fn brightness(rgb: Rgb) -> f64 {
    0.2126 * rgb.r as f64 + 0.7152 * rgb.g as f64 + 0.0722 * rgb.b as f64
}

/// Black or white, whichever reads better on top of `background`.
pub fn contrast_text_color(background: Rgb) -> Rgb {
    if brightness(background) > BRIGHTNESS_BREAKPOINT {
        Rgb::new(0, 0, 0)
    } else {
        Rgb::new(255, 255, 255)
    }
}

pub fn generate_random_rgb<R: Rng>(rng: &mut R) -> Rgb {
    let [r, g, b] = rng.random::<[u8; 3]>();
    Rgb::new(r, g, b)
}

/// `count` evenly spaced colors from `start` to `end`, both included.
pub fn generate_colors_between(start: Rgb, end: Rgb, count: usize) -> Vec<Rgb> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let steps = (count - 1) as f64;
            let lerp = |a: u8, b: u8, i: usize| a as f64 + (b as f64 - a as f64) * i as f64 / steps;

            (0..count)
                .map(|i| {
                    Rgb::clamped(
                        lerp(start.r, end.r, i).round(),
                        lerp(start.g, end.g, i).round(),
                        lerp(start.b, end.b, i).round(),
                    )
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_hex_round_trip() {
        for rgb in [
            Rgb::new(0, 0, 0),
            Rgb::new(255, 255, 255),
            Rgb::new(18, 52, 86),
            Rgb::new(171, 205, 239),
        ] {
            assert_eq!(hex_to_rgb(&rgb_to_hex(rgb)).unwrap(), rgb);
        }
        assert_eq!(rgb_to_hex(Rgb::new(171, 205, 239)), "#ABCDEF");
    }

    #[test]
    fn test_hex_parsing_is_lenient_on_case_and_prefix() {
        assert_eq!(hex_to_rgb("abcdef").unwrap(), Rgb::new(171, 205, 239));
        assert_eq!(hex_to_rgb("#aBcDeF").unwrap(), Rgb::new(171, 205, 239));
    }

    #[test]
    fn test_hex_parsing_rejects_garbage() {
        assert!(hex_to_rgb("#12345").is_err());
        assert!(hex_to_rgb("#12345G").is_err());
        assert!(hex_to_rgb("").is_err());
        assert!(hex_to_rgb("#ÄBCDE").is_err());
    }

    #[test]
    fn test_rgb_to_hsl_anchors() {
        let red = rgb_to_hsl(Rgb::new(255, 0, 0));
        assert_close(red.h, 0.0, 1e-9);
        assert_close(red.s, 100.0, 1e-9);
        assert_close(red.l, 50.0, 1e-9);

        let blue = rgb_to_hsl(Rgb::new(0, 0, 255));
        assert_close(blue.h, 240.0, 1e-9);

        let grey = rgb_to_hsl(Rgb::new(128, 128, 128));
        assert_close(grey.h, 0.0, 1e-9);
        assert_close(grey.s, 0.0, 1e-9);
    }

    #[test]
    fn test_hsl_round_trip_is_exact_on_bytes() {
        for rgb in [
            Rgb::new(255, 0, 0),
            Rgb::new(12, 200, 99),
            Rgb::new(250, 10, 10),
            Rgb::new(77, 77, 77),
        ] {
            assert_eq!(hsl_to_rgb(rgb_to_hsl(rgb)), rgb);
        }
    }

    #[test]
    fn test_lab_anchors() {
        let white = rgb_to_lab(Rgb::new(255, 255, 255));
        assert_close(white.l, 100.0, 0.05);
        assert_close(white.a, 0.0, 0.05);
        assert_close(white.b, 0.0, 0.05);

        let black = rgb_to_lab(Rgb::new(0, 0, 0));
        assert_close(black.l, 0.0, 1e-9);

        // sRGB red under D50 is roughly (54.3, 80.8, 69.9)
        let red = rgb_to_lab(Rgb::new(255, 0, 0));
        assert_close(red.l, 54.29, 0.1);
        assert_close(red.a, 80.8, 0.3);
        assert_close(red.b, 69.9, 0.3);
    }

    #[test]
    fn test_luminance_bounds() {
        assert_close(luminance(Rgb::new(0, 0, 0)), 0.0, 1e-12);
        assert_close(luminance(Rgb::new(255, 255, 255)), 1.0, 1e-9);
        assert_close(luminance(Rgb::new(0, 255, 0)), 0.7152, 1e-9);
    }

    #[test]
    fn test_contrast_text_color() {
        assert_eq!(contrast_text_color(Rgb::new(255, 255, 255)), Rgb::new(0, 0, 0));
        assert_eq!(contrast_text_color(Rgb::new(20, 20, 60)), Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_generate_colors_between() {
        let colors = generate_colors_between(Rgb::new(0, 0, 0), Rgb::new(255, 255, 255), 3);
        assert_eq!(
            colors,
            vec![Rgb::new(0, 0, 0), Rgb::new(128, 128, 128), Rgb::new(255, 255, 255)]
        );
        assert!(generate_colors_between(Rgb::new(0, 0, 0), Rgb::new(1, 1, 1), 0).is_empty());
        assert_eq!(
            generate_colors_between(Rgb::new(9, 9, 9), Rgb::new(1, 1, 1), 1),
            vec![Rgb::new(9, 9, 9)]
        );
    }

    #[test]
    fn test_random_rgb_is_seed_deterministic() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(generate_random_rgb(&mut a), generate_random_rgb(&mut b));
    }
}
