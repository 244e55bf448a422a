//! CIEDE2000 color difference (ΔE00, CIE Technical Report 142-2001).
//!
//! Every palette-compatibility and tone-matching decision goes through this
//! metric. Euclidean Lab distance diverges badly from perception in the
//! blue/green region and around the low-chroma skin tones the classifier
//! separates.

use serde::{Deserialize, Serialize};

use super::lab::LabColor;

// 25^7
const POW25_7: f64 = 6_103_515_625.0;

/// Parametric weighting factors (1.0 for graphic arts conditions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ciede2000Options {
    pub kl: f64,
    pub kc: f64,
    pub kh: f64,
}

impl Default for Ciede2000Options {
    fn default() -> Self {
        Self {
            kl: 1.0,
            kc: 1.0,
            kh: 1.0,
        }
    }
}

/// ΔE00 with default parametric factors.
pub fn ciede2000(lab1: &LabColor, lab2: &LabColor) -> f64 {
    calculate_ciede2000(lab1, lab2, &Ciede2000Options::default())
}

pub fn calculate_ciede2000(lab1: &LabColor, lab2: &LabColor, options: &Ciede2000Options) -> f64 {
    let (l1, a1, b1) = (lab1.l, lab1.a, lab1.b);
    let (l2, a2, b2) = (lab2.l, lab2.a, lab2.b);

    let c1_ab = a1.hypot(b1);
    let c2_ab = a2.hypot(b2);
    let c_ab_mean = (c1_ab + c2_ab) / 2.0;

    let c_ab_mean_pow7 = c_ab_mean.powi(7);
    let g = 0.5 * (1.0 - (c_ab_mean_pow7 / (c_ab_mean_pow7 + POW25_7)).sqrt());

    let a1_prime = a1 * (1.0 + g);
    let a2_prime = a2 * (1.0 + g);

    let c1_prime = a1_prime.hypot(b1);
    let c2_prime = a2_prime.hypot(b2);

    let h1_prime = hue_angle(a1_prime, b1);
    let h2_prime = hue_angle(a2_prime, b2);

    let delta_l_prime = l2 - l1;
    let delta_c_prime = c2_prime - c1_prime;

    let chroma_product_zero = c1_prime * c2_prime == 0.0;

    let delta_h_prime = if chroma_product_zero {
        0.0
    } else {
        let delta_h = h2_prime - h1_prime;
        if delta_h.abs() <= 180.0 {
            delta_h
        } else if delta_h > 180.0 {
            delta_h - 360.0
        } else {
            delta_h + 360.0
        }
    };

    let delta_big_h_prime =
        2.0 * (c1_prime * c2_prime).sqrt() * (delta_h_prime.to_radians() / 2.0).sin();

    let l_prime_mean = (l1 + l2) / 2.0;
    let c_prime_mean = (c1_prime + c2_prime) / 2.0;

    let h_prime_mean = if chroma_product_zero {
        h1_prime + h2_prime
    } else if (h1_prime - h2_prime).abs() <= 180.0 {
        (h1_prime + h2_prime) / 2.0
    } else if h1_prime + h2_prime < 360.0 {
        (h1_prime + h2_prime + 360.0) / 2.0
    } else {
        (h1_prime + h2_prime - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (h_prime_mean - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_prime_mean).to_radians().cos()
        + 0.32 * (3.0 * h_prime_mean + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_prime_mean - 63.0).to_radians().cos();

    let l_offset_sq = (l_prime_mean - 50.0).powi(2);
    let sl = 1.0 + (0.015 * l_offset_sq) / (20.0 + l_offset_sq).sqrt();
    let sc = 1.0 + 0.045 * c_prime_mean;
    let sh = 1.0 + 0.015 * c_prime_mean * t;

    // Rotation term for the blue region
    let delta_theta = 30.0 * (-((h_prime_mean - 275.0) / 25.0).powi(2)).exp();
    let c_prime_mean_pow7 = c_prime_mean.powi(7);
    let rc = 2.0 * (c_prime_mean_pow7 / (c_prime_mean_pow7 + POW25_7)).sqrt();
    let rt = -(2.0 * delta_theta).to_radians().sin() * rc;

    let term_l = delta_l_prime / (options.kl * sl);
    let term_c = delta_c_prime / (options.kc * sc);
    let term_h = delta_big_h_prime / (options.kh * sh);

    (term_l * term_l + term_c * term_c + term_h * term_h + rt * term_c * term_h)
        .max(0.0)
        .sqrt()
}

fn hue_angle(a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    let h = b.atan2(a).to_degrees();
    if h < 0.0 {
        h + 360.0
    } else {
        h
    }
}
