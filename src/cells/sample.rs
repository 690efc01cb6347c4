use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Params;

/// One candidate cell. Lives for a single placement attempt unless accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellSpec {
    /// 1-based position in the placement order.
    pub index: usize,
    pub cx: usize,
    pub cy: usize,
    pub radius: usize,
    /// Base intensity times `jitter` (if any).
    pub intensity: f64,
    pub jitter: Option<f64>,
}

/// Multiplicative intensity jitter bounds emulating biological variance.
pub const JITTER_RANGE: (f64, f64) = (0.8, 1.2);

/// Draws cell geometry and brightness from the configured ranges.
#[derive(Clone, Debug)]
pub struct ParameterSampler {
    size_range: (usize, usize),
    intensity_range: (u32, u32),
    w: usize,
    h: usize,
    jitter: bool,
}

impl ParameterSampler {
    /// `params` must already be validated: `2 * max radius <= min(w, h)`.
    pub fn new(params: &Params) -> Self {
        Self {
            size_range: (params.size_range.0 as usize, params.size_range.1 as usize),
            intensity_range: params.intensity_range,
            w: params.width,
            h: params.height,
            jitter: params.intensity_jitter,
        }
    }

    /// Radius first, then a center keeping the whole disk on the canvas, then
    /// intensity. The draw order is part of the reproducibility contract.
    pub fn sample<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> CellSpec {
        let radius = rng.random_range(self.size_range.0..=self.size_range.1);
        let cx = rng.random_range(radius..=self.w - radius);
        let cy = rng.random_range(radius..=self.h - radius);

        let base = rng.random_range(self.intensity_range.0..=self.intensity_range.1) as f64;
        let jitter = self
            .jitter
            .then(|| rng.random_range(JITTER_RANGE.0..=JITTER_RANGE.1));

        CellSpec {
            index,
            cx,
            cy,
            radius,
            intensity: base * jitter.unwrap_or(1.0),
            jitter,
        }
    }
}
