use thiserror::Error;

use crate::config::LabelScheme;

/// Invalid parameter combinations, detected before any canvas is allocated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("canvas must be at least 1x1, got {width}x{height}")]
    EmptyCanvas { width: usize, height: usize },
    #[error("num_cells must be positive")]
    NoCells,
    #[error("{name} range is inverted: min {min} > max {max}")]
    InvertedRange {
        name: &'static str,
        min: u32,
        max: u32,
    },
    #[error("minimum cell radius must be at least 1")]
    ZeroRadius,
    #[error("radius {radius} does not fit a {width}x{height} canvas")]
    RadiusTooLarge {
        radius: u32,
        width: usize,
        height: usize,
    },
    #[error("{name} must be in 1..=16 bits, got {bits}")]
    BitDepth { name: &'static str, bits: u32 },
    #[error("label_bits must be 8 or 16, got {0}")]
    LabelBits(u32),
    #[error("intensity {intensity} exceeds the ceiling {max_intensity}")]
    IntensityCeiling { intensity: u32, max_intensity: u32 },
    #[error("noise level must be finite and non-negative, got {0}")]
    NoiseLevel(f64),
    #[error("blur factor must be finite and positive, got {0}")]
    BlurFactor(f32),
    #[error("inclusion threshold must lie in [0, 1), got {0}")]
    Threshold(f32),
    #[error("max_placement_attempts must be positive under the reject policy")]
    NoAttempts,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{requested} cells exceed the {capacity} labels the {scheme:?} scheme can represent")]
    Capacity {
        requested: usize,
        capacity: usize,
        scheme: LabelScheme,
    },
    #[error("cell {cell} found no free position after {attempts} attempts")]
    Placement { cell: usize, attempts: usize },
}

pub type GenResult<T> = std::result::Result<T, GenError>;
