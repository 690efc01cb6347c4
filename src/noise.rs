//! Sensor noise injection. The one place fluorescence values are clipped.

use rand_distr::{Distribution, Normal, Poisson};
use rayon::prelude::*;

use crate::config::NoiseKind;
use crate::grid::Grid;
use crate::rng::{cell_rng, derive_seed};

/// Add noise of `kind` to the accumulated canvas and clamp every pixel to
/// `[0, max_intensity]`. Never fails: out-of-range values saturate.
///
/// Each row draws from its own stream seeded by `(seed, row)`, so the output
/// does not depend on how rayon splits the rows.
pub fn apply(canvas: &Grid<u32>, level: f64, kind: NoiseKind, max_intensity: u16, seed: u64) -> Grid<u16> {
    let w = canvas.w;
    let max = max_intensity as f64;
    let mut out = Grid::<u16>::new(canvas.w, canvas.h);
    if w == 0 {
        return out;
    }

    // Sigma is fixed per canvas; a zero sigma means no sensor noise at all.
    let sensor = match kind {
        NoiseKind::Sensor if level > 0.0 => Normal::new(0.0, level * max).ok(),
        _ => None,
    };

    out.data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let mut rng = cell_rng(derive_seed(seed, y as u64));
        let src = &canvas.data[y * w..(y + 1) * w];
        for (out_px, &v) in row.iter_mut().zip(src) {
            let v = v as f64;
            let noisy = match kind {
                NoiseKind::Shot => {
                    let rate = v * level;
                    // Poisson::new rejects a zero rate; zero rate adds nothing.
                    match Poisson::new(rate) {
                        Ok(dist) if rate > 0.0 => v + dist.sample(&mut rng),
                        _ => v,
                    }
                }
                NoiseKind::Sensor => match &sensor {
                    Some(dist) => v + dist.sample(&mut rng),
                    None => v,
                },
            };
            *out_px = noisy.round().clamp(0.0, max) as u16;
        }
    });

    out
}
