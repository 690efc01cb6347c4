use crate::cells::mask::Mask;
use crate::cells::sample::CellSpec;
use crate::config::LabelScheme;
use crate::grid::Grid;
use crate::label::{LabelCanvas, LabelValue};

/// The two output canvases plus the owner map placement decisions read.
#[derive(Clone, Debug)]
pub struct Canvases {
    /// Accumulated intensity, never clipped before noise.
    pub fluorescence: Grid<u32>,
    pub labels: LabelCanvas,
    /// 1-based index of the cell owning each pixel, 0 = background.
    pub occupancy: Grid<u16>,
}

impl Canvases {
    pub fn new(w: usize, h: usize, scheme: LabelScheme) -> Self {
        Self {
            fluorescence: Grid::new(w, h),
            labels: LabelCanvas::new(scheme, w, h),
            occupancy: Grid::new(w, h),
        }
    }

    /// Add `mask * intensity` to the fluorescence canvas and stamp `label`
    /// wherever the mask exceeds `threshold`. Only call for accepted cells.
    pub fn commit(&mut self, mask: &Mask, spec: &CellSpec, label: LabelValue, threshold: f32) {
        let owner = spec.index.min(u16::MAX as usize) as u16;
        for (x, y, m) in mask.pixels() {
            if m <= 0.0 {
                continue;
            }
            let i = self.fluorescence.idx(x, y);
            let add = (m as f64 * spec.intensity).round() as u32;
            self.fluorescence.data[i] = self.fluorescence.data[i].saturating_add(add);

            if m > threshold {
                self.labels.stamp(x, y, label);
                self.occupancy.data[i] = owner;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::mask;
    use crate::config::MaskStyle;

    fn spec(index: usize, cx: usize, cy: usize, radius: usize, intensity: f64) -> CellSpec {
        CellSpec {
            index,
            cx,
            cy,
            radius,
            intensity,
            jitter: None,
        }
    }

    #[test]
    fn hard_cell_writes_exact_intensity_and_label() {
        let mut c = Canvases::new(20, 20, LabelScheme::Sequential);
        let s = spec(1, 10, 10, 4, 1000.0);
        let m = mask::render(&s, MaskStyle::Hard, 0.3, 20, 20);
        c.commit(&m, &s, LabelValue::Id(1), 0.0);

        let labels = c.labels.as_scalar().unwrap();
        for y in 0..20 {
            for x in 0..20 {
                let inside = m.at(x, y) > 0.0;
                assert_eq!(c.fluorescence.get(x, y), if inside { 1000 } else { 0 });
                assert_eq!(labels.get(x, y), inside as u16);
                assert_eq!(c.occupancy.get(x, y), inside as u16);
            }
        }
    }

    #[test]
    fn intensity_accumulates_without_clipping() {
        let mut c = Canvases::new(12, 12, LabelScheme::Sequential);
        let a = spec(1, 6, 6, 3, 60000.0);
        let b = spec(2, 6, 6, 3, 60000.0);
        let m = mask::render(&a, MaskStyle::Hard, 0.3, 12, 12);
        c.commit(&m, &a, LabelValue::Id(1), 0.0);
        c.commit(&m, &b, LabelValue::Id(2), 0.0);
        assert_eq!(c.fluorescence.get(6, 6), 120000);
        assert_eq!(c.labels.as_scalar().unwrap().get(6, 6), 2);
        assert_eq!(c.occupancy.get(6, 6), 2);
    }

    #[test]
    fn blurred_halo_below_threshold_adds_light_but_no_label() {
        let mut c = Canvases::new(40, 40, LabelScheme::IntensityColor);
        let s = spec(1, 20, 20, 6, 2000.0);
        let m = mask::render(&s, MaskStyle::Blurred, 0.3, 40, 40);
        c.commit(&m, &s, LabelValue::Color([1, 2, 3]), 0.5);

        let rgb = c.labels.as_rgb().unwrap();
        let mut halo = 0;
        for (x, y, v) in m.pixels() {
            let expected = (v as f64 * 2000.0).round() as u32;
            assert_eq!(c.fluorescence.get(x, y), expected);
            if v > 0.5 {
                assert_eq!(rgb.get(x, y), [1, 2, 3]);
            } else {
                assert_eq!(rgb.get(x, y), [0, 0, 0]);
                if expected > 0 {
                    halo += 1;
                }
            }
        }
        assert!(halo > 0);
    }
}
