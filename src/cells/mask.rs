use crate::blur::{gaussian_blur, kernel_radius};
use crate::cells::sample::CellSpec;
use crate::config::MaskStyle;
use crate::grid::Grid;

/// Normalized [0, 1] footprint of one cell.
///
/// Only the window `[x0, x0 + values.w) x [y0, y0 + values.h)` is stored;
/// everything outside it is 0. The window is always clipped to the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    pub x0: usize,
    pub y0: usize,
    pub values: Grid<f32>,
}

impl Mask {
    /// Mask value at canvas coordinates.
    pub fn at(&self, x: usize, y: usize) -> f32 {
        if x < self.x0 || y < self.y0 {
            return 0.0;
        }
        let (lx, ly) = (x - self.x0, y - self.y0);
        if lx >= self.values.w || ly >= self.values.h {
            return 0.0;
        }
        self.values.get(lx, ly)
    }

    /// `(x, y, value)` in canvas coordinates for every stored pixel.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        let w = self.values.w;
        self.values
            .data
            .iter()
            .enumerate()
            .map(move |(i, &v)| (self.x0 + i % w, self.y0 + i / w, v))
    }

    /// Canvas pixels whose value exceeds `threshold`.
    pub fn covered(&self, threshold: f32) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pixels()
            .filter(move |&(_, _, v)| v > threshold)
            .map(|(x, y, _)| (x, y))
    }
}

/// Rasterize `spec` on a `w` x `h` canvas.
pub fn render(spec: &CellSpec, style: MaskStyle, blur_factor: f32, w: usize, h: usize) -> Mask {
    match style {
        MaskStyle::Hard => hard_disk(spec, 0, w, h),
        MaskStyle::Blurred => {
            let sigma = blur_factor * spec.radius as f32;
            let disk = hard_disk(spec, kernel_radius(sigma), w, h);
            let mut values = gaussian_blur(&disk.values, sigma);

            let peak = values.data.iter().cloned().fold(0.0f32, f32::max);
            if peak > 0.0 {
                for v in values.data.iter_mut() {
                    *v = (*v / peak).min(1.0);
                }
            }
            Mask { values, ..disk }
        }
    }
}

/// Hard disk in a window padded by `pad` pixels on every side. A pixel is
/// inside when its center `(x + 0.5, y + 0.5)` lies within the radius.
fn hard_disk(spec: &CellSpec, pad: usize, w: usize, h: usize) -> Mask {
    let reach = spec.radius + pad;
    let x0 = spec.cx.saturating_sub(reach);
    let y0 = spec.cy.saturating_sub(reach);
    let x1 = (spec.cx + reach).min(w);
    let y1 = (spec.cy + reach).min(h);

    let mut values = Grid::<f32>::new(x1 - x0, y1 - y0);
    let r2 = (spec.radius * spec.radius) as f32;
    for y in y0..y1 {
        let dy = y as f32 + 0.5 - spec.cy as f32;
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - spec.cx as f32;
            if dx * dx + dy * dy <= r2 {
                values.set(x - x0, y - y0, 1.0);
            }
        }
    }
    Mask { x0, y0, values }
}
