use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::lab::{linear_rgb_to_lab, srgb_to_linear, LabColor};
use crate::error::SampleError;

/// Rectangular region of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ImageRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full_image(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Middle half of the image, where a centered face crop keeps the cheeks.
    pub fn center_half(width: u32, height: u32) -> Self {
        Self::new(width / 4, height / 4, width / 2, height / 2)
    }

    /// Intersection with a `width` x `height` image, `None` if empty.
    fn clamp_to(&self, width: u32, height: u32) -> Option<ImageRegion> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.width.min(width - self.x);
        let h = self.height.min(height - self.y);
        if w == 0 || h == 0 {
            None
        } else {
            Some(Self::new(self.x, self.y, w, h))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleOptions {
    /// Pixels darker than this Rec. 709 luma are treated as shadow.
    pub min_luma: f32,
    /// Pixels brighter than this are treated as specular highlight.
    pub max_luma: f32,
    pub step: u32,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            min_luma: 25.0,
            max_luma: 245.0,
            step: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkinSample {
    pub lab: LabColor,
    pub pixel_count: usize,
    pub rejected: usize,
}

/// Mean skin color of `region`, averaged in linear light.
pub fn sample_skin_lab(
    image: &RgbImage,
    region: ImageRegion,
    options: &SampleOptions,
) -> Result<SkinSample, SampleError> {
    let region = region
        .clamp_to(image.width(), image.height())
        .ok_or(SampleError::EmptyRegion)?;
    let step = options.step.max(1) as usize;

    let mut sum = [0.0f64; 3];
    let mut used = 0usize;
    let mut rejected = 0usize;

    for y in (region.y..region.y + region.height).step_by(step) {
        for x in (region.x..region.x + region.width).step_by(step) {
            let [r, g, b] = image.get_pixel(x, y).0;
            let luma = rgb_to_luma(r, g, b);
            if luma < options.min_luma || luma > options.max_luma {
                rejected += 1;
                continue;
            }
            sum[0] += srgb_to_linear(r as f64 / 255.0);
            sum[1] += srgb_to_linear(g as f64 / 255.0);
            sum[2] += srgb_to_linear(b as f64 / 255.0);
            used += 1;
        }
    }

    if used == 0 {
        return Err(SampleError::NoUsablePixels { rejected });
    }

    let n = used as f64;
    Ok(SkinSample {
        lab: linear_rgb_to_lab(sum[0] / n, sum[1] / n, sum[2] / n),
        pixel_count: used,
        rejected,
    })
}

fn rgb_to_luma(r: u8, g: u8, b: u8) -> f32 {
    // Rec. 709 luminance
    0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32
}
