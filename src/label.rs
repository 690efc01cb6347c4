use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cells::sample::CellSpec;
use crate::config::{LabelScheme, Params};
use crate::error::{GenError, GenResult};
use crate::grid::Grid;
use crate::rng::splitmix32;

/// Number of distinct colors in the palette-color scheme.
pub const PALETTE_SIZE: usize = 255;

/// Value stamped into the label canvas for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelValue {
    Id(u16),
    Color([u8; 3]),
}

/// Instance labels: scalar ids (0 = background) or RGB (black = background).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LabelCanvas {
    Scalar(Grid<u16>),
    Rgb(Grid<[u8; 3]>),
}

impl LabelCanvas {
    pub fn new(scheme: LabelScheme, w: usize, h: usize) -> Self {
        if scheme.is_color() {
            LabelCanvas::Rgb(Grid::new(w, h))
        } else {
            LabelCanvas::Scalar(Grid::new(w, h))
        }
    }

    pub fn dims(&self) -> (usize, usize) {
        match self {
            LabelCanvas::Scalar(g) => (g.w, g.h),
            LabelCanvas::Rgb(g) => (g.w, g.h),
        }
    }

    pub fn is_background(&self, x: usize, y: usize) -> bool {
        match self {
            LabelCanvas::Scalar(g) => g.get(x, y) == 0,
            LabelCanvas::Rgb(g) => g.get(x, y) == [0, 0, 0],
        }
    }

    /// Write `value` at `(x, y)`. The encoder always produces the kind that
    /// matches the canvas; a mismatch is a bug.
    pub fn stamp(&mut self, x: usize, y: usize, value: LabelValue) {
        match (self, value) {
            (LabelCanvas::Scalar(g), LabelValue::Id(id)) => g.set(x, y, id),
            (LabelCanvas::Rgb(g), LabelValue::Color(c)) => g.set(x, y, c),
            _ => debug_assert!(false, "label kind does not match canvas"),
        }
    }

    pub fn as_scalar(&self) -> Option<&Grid<u16>> {
        match self {
            LabelCanvas::Scalar(g) => Some(g),
            LabelCanvas::Rgb(_) => None,
        }
    }

    pub fn as_rgb(&self) -> Option<&Grid<[u8; 3]>> {
        match self {
            LabelCanvas::Rgb(g) => Some(g),
            LabelCanvas::Scalar(_) => None,
        }
    }
}

/// Items drawn uniformly without replacement.
#[derive(Clone, Debug)]
pub struct Pool<T> {
    items: Vec<T>,
}

impl<T> Pool<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    /// Remove and return a random item; `None` once exhausted.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let i = rng.random_range(0..self.items.len());
        Some(self.items.swap_remove(i))
    }
}

/// `n` distinct non-black colors, stable across runs.
pub fn palette(n: usize) -> Vec<[u8; 3]> {
    let mut seen = HashSet::with_capacity(n);
    let mut colors = Vec::with_capacity(n);
    let mut i = 0u32;
    while colors.len() < n {
        let h = splitmix32(i * 7 + 123);
        i += 1;
        let c = [
            (h & 0xFF) as u8 | 40,
            ((h >> 8) & 0xFF) as u8 | 40,
            ((h >> 16) & 0xFF) as u8 | 40,
        ];
        if seen.insert(c) {
            colors.push(c);
        }
    }
    colors
}

/// Color ramp over the intensity range: dim cells are blue, bright cells
/// green with a red tint. Never black.
pub fn intensity_color(intensity: f64, range: (u32, u32)) -> [u8; 3] {
    let (lo, hi) = (range.0 as f64, range.1 as f64);
    let t = if hi > lo {
        ((intensity - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let green = (255.0 * t).round() as u8;
    [
        (127.5 * t).round() as u8,
        green,
        (255.0 * (1.0 - t)).round().max(1.0) as u8,
    ]
}

/// Maps accepted cells to label values under one scheme.
#[derive(Clone, Debug)]
pub struct LabelEncoder {
    scheme: LabelScheme,
    capacity: usize,
    intensity_range: (u32, u32),
    ids: Option<Pool<u16>>,
    colors: Option<Pool<[u8; 3]>>,
}

impl LabelEncoder {
    /// How many distinct cells `scheme` can label.
    pub fn capacity(scheme: LabelScheme, label_bits: u32) -> usize {
        match scheme {
            LabelScheme::Sequential | LabelScheme::UniqueSampled => {
                if label_bits >= 16 {
                    u16::MAX as usize
                } else {
                    (1usize << label_bits) - 1
                }
            }
            LabelScheme::PaletteColor => PALETTE_SIZE,
            LabelScheme::IntensityColor => u16::MAX as usize,
        }
    }

    pub fn new(params: &Params) -> Self {
        let capacity = Self::capacity(params.label_scheme, params.label_bits);
        let ids = (params.label_scheme == LabelScheme::UniqueSampled)
            .then(|| Pool::new((1..=capacity as u16).collect()));
        let colors = (params.label_scheme == LabelScheme::PaletteColor)
            .then(|| Pool::new(palette(PALETTE_SIZE)));
        Self {
            scheme: params.label_scheme,
            capacity,
            intensity_range: params.intensity_range,
            ids,
            colors,
        }
    }

    pub fn scheme(&self) -> LabelScheme {
        self.scheme
    }

    /// Label for the accepted cell `spec`. Pools only shrink on success, so
    /// a rejected candidate never consumes an id.
    pub fn encode<R: Rng + ?Sized>(&mut self, spec: &CellSpec, rng: &mut R) -> GenResult<LabelValue> {
        let exhausted = GenError::Capacity {
            requested: spec.index,
            capacity: self.capacity,
            scheme: self.scheme,
        };
        if spec.index == 0 || spec.index > self.capacity {
            return Err(exhausted);
        }
        match self.scheme {
            LabelScheme::Sequential => Ok(LabelValue::Id(spec.index as u16)),
            LabelScheme::UniqueSampled => self
                .ids
                .as_mut()
                .and_then(|pool| pool.draw(rng))
                .map(LabelValue::Id)
                .ok_or(exhausted),
            LabelScheme::PaletteColor => self
                .colors
                .as_mut()
                .and_then(|pool| pool.draw(rng))
                .map(LabelValue::Color)
                .ok_or(exhausted),
            LabelScheme::IntensityColor => Ok(LabelValue::Color(intensity_color(
                spec.intensity,
                self.intensity_range,
            ))),
        }
    }
}
