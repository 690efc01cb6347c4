use crate::grid::Grid;

/// Linear min-max rescale of the whole canvas to `[0, 2^target_bits - 1]`.
/// A flat canvas has no contrast to stretch and maps to zeros.
pub fn normalize(canvas: &Grid<u16>, target_bits: u32) -> Grid<u16> {
    let target_max = ((1u32 << target_bits.clamp(1, 16)) - 1) as f64;
    let lo = canvas.data.iter().copied().min().unwrap_or(0) as f64;
    let hi = canvas.data.iter().copied().max().unwrap_or(0) as f64;
    if hi <= lo {
        return Grid::new(canvas.w, canvas.h);
    }
    let scale = target_max / (hi - lo);
    canvas.map(|v| ((v as f64 - lo) * scale).round() as u16)
}

/// 8-bit display copy of the canvas.
pub fn to_u8(canvas: &Grid<u16>) -> Grid<u8> {
    normalize(canvas, 8).map(|v| v as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretches_to_full_range() {
        let g = Grid {
            data: vec![100u16, 200, 300, 500],
            w: 2,
            h: 2,
        };
        let n = normalize(&g, 8);
        assert_eq!(n.data, vec![0, 64, 128, 255]);
        assert_eq!(to_u8(&g).data, vec![0u8, 64, 128, 255]);
    }

    #[test]
    fn flat_canvas_maps_to_zero() {
        let g = Grid::from_value(3, 3, 777u16);
        assert!(normalize(&g, 12).data.iter().all(|&v| v == 0));
    }

    #[test]
    fn preserves_order() {
        let g = Grid {
            data: vec![5u16, 60000, 30000, 17],
            w: 4,
            h: 1,
        };
        let n = normalize(&g, 12);
        assert_eq!(n.data[0], 0);
        assert_eq!(n.data[1], 4095);
        assert!(n.data[2] > n.data[3]);
    }
}
