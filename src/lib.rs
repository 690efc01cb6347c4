pub mod blur;
pub mod cells;
pub mod config;
pub mod error;
pub mod grid;
pub mod label;
pub mod noise;
pub mod normalize;
pub mod render;
pub mod rng;

use std::time::Instant;

use log::{debug, info, warn};
use rand::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use cells::overlap::{self, MaskSettings, Placement};
use cells::{Canvases, CellSpec, ParameterSampler};
use config::{OnPlacementFailure, Params};
use error::{GenError, GenResult};
use grid::Grid;
use label::{LabelCanvas, LabelEncoder, LabelValue};

/// An accepted cell as it was committed to the canvases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedCell {
    pub spec: CellSpec,
    pub label: LabelValue,
    pub attempts: usize,
}

/// One generated fluorescence/label pair.
#[derive(Clone, Debug)]
pub struct CellImage {
    pub seed: u64,
    pub w: usize,
    pub h: usize,
    /// Noise-applied intensities in `[0, max_intensity]`, or the normalized
    /// canvas when `display_bits` was requested.
    pub fluorescence: Grid<u16>,
    pub labels: LabelCanvas,
    pub cells: Vec<PlacedCell>,
    /// Cell indices given up on under `OnPlacementFailure::Skip`.
    pub skipped: Vec<usize>,
    /// Ceiling of `fluorescence`: `2^display_bits - 1` when rescaled,
    /// otherwise `2^bit_depth - 1`.
    pub max_intensity: u16,
}

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

pub fn generate(seed: u64, params: &Params) -> GenResult<(CellImage, Vec<Timing>)> {
    params.validate()?;

    let mut timings = Vec::new();
    let total_start = Instant::now();
    let (w, h) = (params.width, params.height);
    let mut max_intensity = params.max_intensity() as u16;
    let mut rng = rng::cell_rng(seed);

    // 1. Place cells one by one, rejection-sampling under the overlap policy
    let t = Instant::now();
    let sampler = ParameterSampler::new(params);
    let mut encoder = LabelEncoder::new(params);
    let settings = MaskSettings {
        style: params.mask_style,
        blur_factor: params.blur_factor,
        threshold: params.inclusion_threshold,
    };
    let mut canvases = Canvases::new(w, h, params.label_scheme);
    let mut cells = Vec::with_capacity(params.num_cells);
    let mut skipped = Vec::new();

    for index in 1..=params.num_cells {
        let placement = overlap::place_cell(
            index,
            &sampler,
            settings,
            params.overlap_policy,
            params.max_placement_attempts,
            &canvases.occupancy,
            &mut rng,
        );
        match placement {
            Placement::Accepted {
                spec,
                mask,
                attempts,
            } => {
                let label = encoder.encode(&spec, &mut rng)?;
                canvases.commit(&mask, &spec, label, params.inclusion_threshold);
                debug!(
                    "cell {index}: r={} at ({}, {}) intensity={:.1} label={label:?} after {attempts} attempt(s)",
                    spec.radius, spec.cx, spec.cy, spec.intensity
                );
                cells.push(PlacedCell {
                    spec,
                    label,
                    attempts,
                });
            }
            Placement::Exhausted { attempts } => match params.on_placement_failure {
                OnPlacementFailure::Abort => {
                    return Err(GenError::Placement {
                        cell: index,
                        attempts,
                    });
                }
                OnPlacementFailure::Skip => {
                    warn!("cell {index}: no free position after {attempts} attempts, skipping");
                    skipped.push(index);
                }
            },
        }
    }
    timings.push(Timing {
        name: "placement",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Noise + clamp, once, on the finished canvas
    let t = Instant::now();
    let noise_seed = rng.next_u64();
    let mut fluorescence = noise::apply(
        &canvases.fluorescence,
        params.noise_level,
        params.noise_kind,
        max_intensity,
        noise_seed,
    );
    timings.push(Timing {
        name: "noise",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 3. Optional display rescale
    if let Some(bits) = params.display_bits {
        let t = Instant::now();
        fluorescence = normalize::normalize(&fluorescence, bits);
        max_intensity = ((1u32 << bits) - 1) as u16;
        timings.push(Timing {
            name: "normalize",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });
    }

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    timings.push(Timing {
        name: "TOTAL",
        ms: total_ms,
    });

    info!(
        "seed {seed}: placed {}/{} cells ({:?} labels), {} skipped, {total_ms:.1} ms",
        cells.len(),
        params.num_cells,
        encoder.scheme(),
        skipped.len()
    );

    let image = CellImage {
        seed,
        w,
        h,
        fluorescence,
        labels: canvases.labels,
        cells,
        skipped,
        max_intensity,
    };
    Ok((image, timings))
}

/// Generate `count` independent images in parallel. Image `i` is exactly
/// `generate(rng::derive_seed(base_seed, i), params)`.
pub fn generate_batch(base_seed: u64, count: usize, params: &Params) -> GenResult<Vec<CellImage>> {
    params.validate()?;
    (0..count)
        .into_par_iter()
        .map(|i| generate(rng::derive_seed(base_seed, i as u64), params).map(|(image, _)| image))
        .collect()
}
