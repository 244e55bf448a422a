#![allow(clippy::excessive_precision)]

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

// D65 reference white
const D65_XN: f64 = 0.95047;
const D65_YN: f64 = 1.00000;
const D65_ZN: f64 = 1.08883;

/// CIE ε, the linear-segment threshold of the Lab transfer function
const LAB_EPSILON: f64 = 216.0 / 24389.0;
/// CIE κ
const LAB_KAPPA: f64 = 24389.0 / 27.0;

/// A color in CIE L*a*b* space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabColor {
    /// Lightness (0-100)
    #[serde(rename = "L")]
    pub l: f64,
    /// Green-Red axis
    pub a: f64,
    /// Blue-Yellow axis
    pub b: f64,
}

impl LabColor {
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    /// Replaces non-finite components with 0 and clamps each channel to its
    /// nominal range.
    pub fn sanitized(self) -> Self {
        fn finite_or_zero(v: f64) -> f64 {
            if v.is_finite() {
                v
            } else {
                0.0
            }
        }

        Self {
            l: finite_or_zero(self.l).clamp(0.0, 100.0),
            a: finite_or_zero(self.a).clamp(-128.0, 127.0),
            b: finite_or_zero(self.b).clamp(-128.0, 127.0),
        }
    }

    pub fn derived(&self) -> LabDerivedMetrics {
        calculate_derived_metrics(self)
    }
}

/// Polar form of the a*/b* plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabDerivedMetrics {
    pub chroma: f64,
    /// Hue angle in degrees, [0, 360)
    pub hue: f64,
}

/// Converts an sRGB triple to Lab. Channels outside 0-255 are clamped.
pub fn rgb_to_lab(r: i32, g: i32, b: i32) -> LabColor {
    let r = srgb_to_linear(channel_unit(r));
    let g = srgb_to_linear(channel_unit(g));
    let b = srgb_to_linear(channel_unit(b));

    linear_rgb_to_lab(r, g, b)
}

/// Converts an `image` pixel to Lab.
pub fn pixel_to_lab(pixel: &image::Rgb<u8>) -> LabColor {
    let [r, g, b] = pixel.0;
    rgb_to_lab(r as i32, g as i32, b as i32)
}

/// Parses `#RRGGBB` (the leading `#` is optional, surrounding whitespace is
/// not accepted) and converts it to Lab.
pub fn hex_to_lab(hex: &str) -> Result<LabColor, ColorError> {
    let [r, g, b] = parse_hex(hex)?;
    Ok(rgb_to_lab(r as i32, g as i32, b as i32))
}

pub fn parse_hex(hex: &str) -> Result<[u8; 3], ColorError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);

    if digits.len() != 6 || !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidColorFormat(hex.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| ColorError::InvalidColorFormat(hex.to_string()))
    };

    Ok([channel(0)?, channel(2)?, channel(4)?])
}

pub fn calculate_derived_metrics(lab: &LabColor) -> LabDerivedMetrics {
    let chroma = lab.a.hypot(lab.b);
    let mut hue = lab.b.atan2(lab.a).to_degrees();
    if hue < 0.0 {
        hue += 360.0;
    }
    if hue >= 360.0 {
        hue -= 360.0;
    }

    LabDerivedMetrics { chroma, hue }
}

/// Euclidean distance (ΔE*76). Only good enough for coarse filtering.
pub fn calculate_lab_distance(a: &LabColor, b: &LabColor) -> f64 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Converts Lab back to sRGB, clipping out-of-gamut channels.
pub fn lab_to_rgb(lab: &LabColor) -> [u8; 3] {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = fy + lab.a / 500.0;
    let fz = fy - lab.b / 200.0;

    let xr = lab_f_inv(fx);
    let yr = if lab.l > LAB_KAPPA * LAB_EPSILON {
        fy * fy * fy
    } else {
        lab.l / LAB_KAPPA
    };
    let zr = lab_f_inv(fz);

    let x = xr * D65_XN;
    let y = yr * D65_YN;
    let z = zr * D65_ZN;

    let r = x * 3.2404542 + y * -1.5371385 + z * -0.4985314;
    let g = x * -0.9692660 + y * 1.8760108 + z * 0.0415560;
    let b = x * 0.0556434 + y * -0.2040259 + z * 1.0572252;

    [linear_to_u8(r), linear_to_u8(g), linear_to_u8(b)]
}

pub fn lab_to_hex(lab: &LabColor) -> String {
    let [r, g, b] = lab_to_rgb(lab);
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// Linear-light RGB (each channel 0-1) to Lab.
pub(crate) fn linear_rgb_to_lab(r: f64, g: f64, b: f64) -> LabColor {
    let x = r * 0.4124564 + g * 0.3575761 + b * 0.1804375;
    let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
    let z = r * 0.0193339 + g * 0.1191920 + b * 0.9503041;

    let fx = lab_f(x / D65_XN);
    let fy = lab_f(y / D65_YN);
    let fz = lab_f(z / D65_ZN);

    LabColor {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

pub(crate) fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn channel_unit(c: i32) -> f64 {
    c.clamp(0, 255) as f64 / 255.0
}

fn linear_to_u8(c: f64) -> u8 {
    let c = if c.is_finite() { c.clamp(0.0, 1.0) } else { 0.0 };
    let encoded = if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (encoded * 255.0).round().clamp(0.0, 255.0) as u8
}

fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        (LAB_KAPPA * t + 16.0) / 116.0
    }
}

fn lab_f_inv(f: f64) -> f64 {
    let cubed = f * f * f;
    if cubed > LAB_EPSILON {
        cubed
    } else {
        (116.0 * f - 16.0) / LAB_KAPPA
    }
}
