use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GenError, GenResult};
use crate::label::LabelEncoder;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoiseKind {
    /// Poisson noise with rate `pixel * noise_level`.
    #[default]
    Shot,
    /// Gaussian noise with sigma `noise_level * max_intensity`.
    Sensor,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskStyle {
    Hard,
    #[default]
    Blurred,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    #[default]
    Reject,
    Overwrite,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnPlacementFailure {
    /// Return `GenError::Placement` and no canvases.
    #[default]
    Abort,
    /// Log the cell index, record it in `CellImage::skipped`, continue.
    Skip,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelScheme {
    #[default]
    Sequential,
    UniqueSampled,
    IntensityColor,
    PaletteColor,
}

impl LabelScheme {
    pub fn is_color(self) -> bool {
        matches!(self, LabelScheme::IntensityColor | LabelScheme::PaletteColor)
    }
}

/// All tunable generation parameters. Missing JSON fields fall back to defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // Canvas
    pub width: usize,
    pub height: usize,
    pub num_cells: usize,

    // Per-cell sampling
    pub size_range: (u32, u32),
    pub intensity_range: (u32, u32),
    pub intensity_jitter: bool,

    // Mask
    pub mask_style: MaskStyle,
    pub blur_factor: f32,
    pub inclusion_threshold: f32,

    // Placement
    pub overlap_policy: OverlapPolicy,
    pub max_placement_attempts: usize,
    pub on_placement_failure: OnPlacementFailure,

    // Labels
    pub label_scheme: LabelScheme,
    pub label_bits: u32,

    // Noise + precision
    pub noise_level: f64,
    pub noise_kind: NoiseKind,
    pub bit_depth: u32,
    pub display_bits: Option<u32>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            num_cells: 9,
            size_range: (5, 15),
            intensity_range: (500, 2500),
            intensity_jitter: false,
            mask_style: MaskStyle::Blurred,
            blur_factor: 0.3,
            inclusion_threshold: 0.5,
            overlap_policy: OverlapPolicy::Reject,
            max_placement_attempts: 100,
            on_placement_failure: OnPlacementFailure::Abort,
            label_scheme: LabelScheme::Sequential,
            label_bits: 8,
            noise_level: 0.1,
            noise_kind: NoiseKind::Shot,
            bit_depth: 16,
            display_bits: None,
        }
    }
}

impl Params {
    /// Largest valid fluorescence value, `2^bit_depth - 1`.
    pub fn max_intensity(&self) -> u32 {
        ((1u64 << self.bit_depth.min(32)) - 1) as u32
    }

    /// Configuration checks first, then label capacity. Nothing is generated
    /// when this fails.
    pub fn validate(&self) -> GenResult<()> {
        self.validate_config()?;

        let capacity = LabelEncoder::capacity(self.label_scheme, self.label_bits);
        if self.num_cells > capacity {
            return Err(GenError::Capacity {
                requested: self.num_cells,
                capacity,
                scheme: self.label_scheme,
            });
        }
        Ok(())
    }

    fn validate_config(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }
        if self.num_cells == 0 {
            return Err(ConfigError::NoCells);
        }

        let (rmin, rmax) = self.size_range;
        if rmin > rmax {
            return Err(ConfigError::InvertedRange {
                name: "size_range",
                min: rmin,
                max: rmax,
            });
        }
        if rmin == 0 {
            return Err(ConfigError::ZeroRadius);
        }
        if rmax as usize * 2 > self.width.min(self.height) {
            return Err(ConfigError::RadiusTooLarge {
                radius: rmax,
                width: self.width,
                height: self.height,
            });
        }

        let (imin, imax) = self.intensity_range;
        if imin > imax {
            return Err(ConfigError::InvertedRange {
                name: "intensity_range",
                min: imin,
                max: imax,
            });
        }

        if !(1..=16).contains(&self.bit_depth) {
            return Err(ConfigError::BitDepth {
                name: "bit_depth",
                bits: self.bit_depth,
            });
        }
        if let Some(bits) = self.display_bits {
            if !(1..=16).contains(&bits) {
                return Err(ConfigError::BitDepth {
                    name: "display_bits",
                    bits,
                });
            }
        }
        if self.label_bits != 8 && self.label_bits != 16 {
            return Err(ConfigError::LabelBits(self.label_bits));
        }
        if imax > self.max_intensity() {
            return Err(ConfigError::IntensityCeiling {
                intensity: imax,
                max_intensity: self.max_intensity(),
            });
        }

        if !self.noise_level.is_finite() || self.noise_level < 0.0 {
            return Err(ConfigError::NoiseLevel(self.noise_level));
        }
        if self.mask_style == MaskStyle::Blurred
            && (!self.blur_factor.is_finite() || self.blur_factor <= 0.0)
        {
            return Err(ConfigError::BlurFactor(self.blur_factor));
        }
        if !(0.0..1.0).contains(&self.inclusion_threshold) {
            return Err(ConfigError::Threshold(self.inclusion_threshold));
        }
        if self.overlap_policy == OverlapPolicy::Reject && self.max_placement_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        Ok(())
    }
}
