pub mod characteristics;
pub mod compatibility;
pub mod table;

pub use characteristics::{
    characteristics, get_subtype_characteristics, CharacteristicsTable, Contrast, Jewelry,
    SubtypeCharacteristics,
};
pub use compatibility::{
    get_tone_compatibility, rank_colors, score_against_palette, ColorCompatibility,
    CompatibilityGrade,
};
pub use table::{generate_tone_palette, ColorInfo, PaletteTable, TonePalette};
