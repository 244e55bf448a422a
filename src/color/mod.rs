pub mod ciede2000;
pub mod lab;
pub mod sample;

pub use ciede2000::{calculate_ciede2000, ciede2000, Ciede2000Options};
pub use lab::{
    calculate_derived_metrics, calculate_lab_distance, hex_to_lab, lab_to_hex, lab_to_rgb,
    parse_hex, pixel_to_lab, rgb_to_lab, LabColor, LabDerivedMetrics,
};
pub use sample::{sample_skin_lab, ImageRegion, SampleOptions, SkinSample};
