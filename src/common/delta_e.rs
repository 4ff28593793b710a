//! CIEDE2000 color difference (kL = kC = kH = 1).

use std::f64::consts::PI;

use super::color::Lab;

/// 25^7
const POW25_7: f64 = 6_103_515_625.0;

/// Hue angle in degrees [0, 360). Zero when both components are zero.
fn hue_angle(a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    let h = b.atan2(a).to_degrees();
    if h < 0.0 { h + 360.0 } else { h }
}

/// Perceptual distance between two Lab colors. Lower is more similar.
pub fn delta_e_2000(lab1: Lab, lab2: Lab) -> f64 {
    let Lab { l: l1, a: a1, b: b1 } = lab1;
    let Lab { l: l2, a: a2, b: b2 } = lab2;

    let c1 = a1.hypot(b1);
    let c2 = a2.hypot(b2);
    let c_mean = (c1 + c2) / 2.0;

    let c_mean_7 = c_mean.powi(7);
    let g = 0.5 * (1.0 - (c_mean_7 / (c_mean_7 + POW25_7)).sqrt());

    let a1_prime = a1 * (1.0 + g);
    let a2_prime = a2 * (1.0 + g);

    let c1_prime = a1_prime.hypot(b1);
    let c2_prime = a2_prime.hypot(b2);

    let h1_prime = hue_angle(a1_prime, b1);
    let h2_prime = hue_angle(a2_prime, b2);

    let delta_l = l2 - l1;
    let delta_c = c2_prime - c1_prime;

    let chroma_product = c1_prime * c2_prime;

    let delta_h = if chroma_product == 0.0 {
        0.0
    } else {
        let diff = h2_prime - h1_prime;
        if diff.abs() <= 180.0 {
            diff
        } else if diff > 180.0 {
            diff - 360.0
        } else {
            diff + 360.0
        }
    };
    let delta_big_h = 2.0 * chroma_product.sqrt() * (delta_h.to_radians() / 2.0).sin();

    let l_mean = (l1 + l2) / 2.0;
    let c_prime_mean = (c1_prime + c2_prime) / 2.0;

    let h_mean = if chroma_product == 0.0 {
        h1_prime + h2_prime
    } else if (h1_prime - h2_prime).abs() <= 180.0 {
        (h1_prime + h2_prime) / 2.0
    } else if h1_prime + h2_prime < 360.0 {
        (h1_prime + h2_prime + 360.0) / 2.0
    } else {
        (h1_prime + h2_prime - 360.0) / 2.0
    };

    let h_mean_rad = h_mean.to_radians();
    let t = 1.0 - 0.17 * (h_mean_rad - PI / 6.0).cos()
        + 0.24 * (2.0 * h_mean_rad).cos()
        + 0.32 * (3.0 * h_mean_rad + PI / 30.0).cos()
        - 0.20 * (4.0 * h_mean_rad - 63f64.to_radians()).cos();

    let l_offset_sq = (l_mean - 50.0).powi(2);
    let s_l = 1.0 + (0.015 * l_offset_sq) / (20.0 + l_offset_sq).sqrt();
    let s_c = 1.0 + 0.045 * c_prime_mean;
    let s_h = 1.0 + 0.015 * c_prime_mean * t;

    let delta_theta = 30.0 * (-((h_mean - 275.0) / 25.0).powi(2)).exp();
    let c_prime_mean_7 = c_prime_mean.powi(7);
    let r_c = 2.0 * (c_prime_mean_7 / (c_prime_mean_7 + POW25_7)).sqrt();
    let r_t = -(2.0 * delta_theta).to_radians().sin() * r_c;

    let term_l = delta_l / s_l;
    let term_c = delta_c / s_c;
    let term_h = delta_big_h / s_h;

    (term_l * term_l + term_c * term_c + term_h * term_h + r_t * term_c * term_h).sqrt()
}
