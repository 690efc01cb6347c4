use rayon::prelude::*;

use crate::grid::{Grid, neighbors4};
use crate::label::LabelCanvas;
use crate::normalize::to_u8;
use crate::rng::splitmix32;

const BACKGROUND: [u8; 4] = [0, 0, 0, 255];
const OUTLINE: [u8; 4] = [255, 220, 40, 255];

/// Stable display color for a scalar label id.
#[inline]
fn id_color(id: u16) -> [u8; 4] {
    let h = splitmix32(id as u32 * 7 + 123);
    [
        (h & 0xFF) as u8 | 60,
        ((h >> 8) & 0xFF) as u8 | 60,
        ((h >> 16) & 0xFF) as u8 | 60,
        255,
    ]
}

/// Grayscale RGBA preview, min-max stretched to 8 bits.
pub fn render_fluorescence(fluorescence: &Grid<u16>) -> Vec<u8> {
    let w = fluorescence.w;
    let gray = to_u8(fluorescence);
    let mut rgba = vec![0u8; fluorescence.len() * 4];
    if w == 0 {
        return rgba;
    }

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            let v = gray.get(x, y);
            row[x * 4..x * 4 + 4].copy_from_slice(&[v, v, v, 255]);
        }
    });
    rgba
}

/// Label canvas as RGBA: scalar ids get hashed colors, RGB labels pass through.
pub fn render_labels(labels: &LabelCanvas) -> Vec<u8> {
    let (w, h) = labels.dims();
    let mut rgba = vec![0u8; w * h * 4];
    if w == 0 {
        return rgba;
    }

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            let color = match labels {
                LabelCanvas::Scalar(g) => match g.get(x, y) {
                    0 => BACKGROUND,
                    id => id_color(id),
                },
                LabelCanvas::Rgb(g) => {
                    let [r, gr, b] = g.get(x, y);
                    [r, gr, b, 255]
                }
            };
            row[x * 4..x * 4 + 4].copy_from_slice(&color);
        }
    });
    rgba
}

/// Fluorescence preview with the boundary of every labeled region drawn on
/// top. A boundary pixel is labeled and touches a pixel with another label.
pub fn render_outlines(fluorescence: &Grid<u16>, labels: &LabelCanvas) -> Vec<u8> {
    let (w, h) = labels.dims();
    let mut rgba = render_fluorescence(fluorescence);
    if w == 0 {
        return rgba;
    }

    let same = |x: usize, y: usize, nx: usize, ny: usize| match labels {
        LabelCanvas::Scalar(g) => g.get(x, y) == g.get(nx, ny),
        LabelCanvas::Rgb(g) => g.get(x, y) == g.get(nx, ny),
    };

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            if labels.is_background(x, y) {
                continue;
            }
            let edge = neighbors4(x, y, w, h).count() < 4
                || neighbors4(x, y, w, h).any(|(nx, ny)| !same(x, y, nx, ny));
            if edge {
                row[x * 4..x * 4 + 4].copy_from_slice(&OUTLINE);
            }
        }
    });
    rgba
}
