use rand::Rng;

use crate::cells::mask::{self, Mask};
use crate::cells::sample::{CellSpec, ParameterSampler};
use crate::config::{MaskStyle, OverlapPolicy};
use crate::grid::Grid;

/// Mask rendering settings shared by every attempt.
#[derive(Clone, Copy, Debug)]
pub struct MaskSettings {
    pub style: MaskStyle,
    pub blur_factor: f32,
    pub threshold: f32,
}

/// Outcome of the bounded rejection-sampling loop for one cell.
#[derive(Clone, Debug)]
pub enum Placement {
    Accepted {
        spec: CellSpec,
        mask: Mask,
        attempts: usize,
    },
    Exhausted { attempts: usize },
}

/// Whether `mask` may be committed given the current `occupancy`
/// (0 = background).
pub fn try_accept(mask: &Mask, occupancy: &Grid<u16>, policy: OverlapPolicy, threshold: f32) -> bool {
    match policy {
        OverlapPolicy::Overwrite => true,
        OverlapPolicy::Reject => mask.covered(threshold).all(|(x, y)| occupancy.get(x, y) == 0),
    }
}

/// Sample, render and test candidates for cell `index` until one is accepted
/// or `max_attempts` candidates have been rejected.
pub fn place_cell<R: Rng + ?Sized>(
    index: usize,
    sampler: &ParameterSampler,
    settings: MaskSettings,
    policy: OverlapPolicy,
    max_attempts: usize,
    occupancy: &Grid<u16>,
    rng: &mut R,
) -> Placement {
    let max_attempts = match policy {
        OverlapPolicy::Overwrite => 1,
        OverlapPolicy::Reject => max_attempts,
    };

    for attempt in 1..=max_attempts {
        let spec = sampler.sample(index, rng);
        let mask = mask::render(&spec, settings.style, settings.blur_factor, occupancy.w, occupancy.h);
        if try_accept(&mask, occupancy, policy, settings.threshold) {
            return Placement::Accepted {
                spec,
                mask,
                attempts: attempt,
            };
        }
    }
    Placement::Exhausted {
        attempts: max_attempts,
    }
}
