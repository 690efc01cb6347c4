use rayon::prelude::*;

use crate::grid::Grid;

/// Kernel half-width covering three sigma.
#[inline]
pub fn kernel_radius(sigma: f32) -> usize {
    if sigma > 0.0 { (sigma * 3.0).ceil() as usize } else { 0 }
}

/// One side of a normalized Gaussian kernel: `k[0]` is the center tap and
/// `k[0] + 2 * sum(k[1..]) == 1`.
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = kernel_radius(sigma);
    if radius == 0 {
        return vec![1.0];
    }
    let kernel: Vec<f32> = (0..=radius)
        .map(|i| (-(i as f32 * i as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel[0] + 2.0 * kernel[1..].iter().sum::<f32>();
    kernel.iter().map(|k| k / sum).collect()
}

/// Separable Gaussian blur. Pixels outside the grid count as zero, so mass
/// near the border leaks out instead of being reflected back in.
pub fn gaussian_blur(src: &Grid<f32>, sigma: f32) -> Grid<f32> {
    let kernel = gaussian_kernel(sigma);
    let radius = kernel.len() - 1;
    let (w, h) = (src.w, src.h);
    if radius == 0 || src.is_empty() {
        return src.clone();
    }

    // Horizontal pass
    let mut tmp = Grid::<f32>::new(w, h);
    tmp.data.par_chunks_mut(w).enumerate().for_each(|(y, out_row)| {
        let row = &src.data[y * w..(y + 1) * w];
        for (x, out) in out_row.iter_mut().enumerate() {
            let mut s = row[x] * kernel[0];
            for r in 1..=radius {
                if x >= r {
                    s += row[x - r] * kernel[r];
                }
                if x + r < w {
                    s += row[x + r] * kernel[r];
                }
            }
            *out = s;
        }
    });

    // Vertical pass
    let mut out = Grid::<f32>::new(w, h);
    out.data.par_chunks_mut(w).enumerate().for_each(|(y, out_row)| {
        for (x, out) in out_row.iter_mut().enumerate() {
            let mut s = tmp.data[y * w + x] * kernel[0];
            for r in 1..=radius {
                if y >= r {
                    s += tmp.data[(y - r) * w + x] * kernel[r];
                }
                if y + r < h {
                    s += tmp.data[(y + r) * w + x] * kernel[r];
                }
            }
            *out = s;
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized() {
        for sigma in [0.5f32, 1.5, 3.0, 4.5] {
            let k = gaussian_kernel(sigma);
            assert_eq!(k.len(), kernel_radius(sigma) + 1);
            let total = k[0] + 2.0 * k[1..].iter().sum::<f32>();
            assert!((total - 1.0).abs() < 1e-5, "sigma {sigma}: {total}");
            assert!(k.windows(2).all(|p| p[0] >= p[1]));
        }
    }

    #[test]
    fn zero_sigma_is_identity() {
        let mut g = Grid::<f32>::new(3, 3);
        g.set(1, 1, 1.0);
        assert_eq!(gaussian_blur(&g, 0.0), g);
    }

    #[test]
    fn interior_impulse_keeps_mass_and_symmetry() {
        let mut g = Grid::<f32>::new(21, 21);
        g.set(10, 10, 1.0);
        let b = gaussian_blur(&g, 1.5);
        let mass: f32 = b.data.iter().sum();
        assert!((mass - 1.0).abs() < 1e-4);
        assert!((b.get(8, 10) - b.get(12, 10)).abs() < 1e-7);
        assert!((b.get(10, 8) - b.get(8, 10)).abs() < 1e-7);
        assert_eq!(b.get(0, 0), 0.0);
    }

    #[test]
    fn border_mass_leaks_out() {
        let mut g = Grid::<f32>::new(5, 5);
        g.set(0, 0, 1.0);
        let b = gaussian_blur(&g, 1.0);
        let mass: f32 = b.data.iter().sum();
        assert!(mass < 0.6);
    }

    #[test]
    fn matches_direct_two_dimensional_convolution() {
        let (w, h) = (23, 17);
        let mut g = Grid::<f32>::new(w, h);
        for y in 0..h {
            for x in 0..w {
                g.set(x, y, ((x * 7 + y * 13) % 5) as f32);
            }
        }
        let sigma = 1.2;
        let k = gaussian_kernel(sigma);
        let r = k.len() as isize - 1;
        let b = gaussian_blur(&g, sigma);

        for y in 0..h as isize {
            for x in 0..w as isize {
                let mut expected = 0.0f32;
                for dy in -r..=r {
                    for dx in -r..=r {
                        let (sx, sy) = (x + dx, y + dy);
                        if sx < 0 || sy < 0 || sx >= w as isize || sy >= h as isize {
                            continue;
                        }
                        let weight = k[dx.unsigned_abs()] * k[dy.unsigned_abs()];
                        expected += g.get(sx as usize, sy as usize) * weight;
                    }
                }
                let got = b.get(x as usize, y as usize);
                assert!((got - expected).abs() < 1e-4, "({x}, {y}): {got} vs {expected}");
            }
        }
    }
}
