//! Gaussian blur approximated by repeated box filters.
//!
//! Each pass is a horizontal running box sum followed by a vertical running
//! box sum scaled by `1 / R^2`. Windows are truncated at the image border
//! but the scale stays the nominal one, so borders come out darker.

use log::debug;

use crate::image::GenericImage;
use crate::pixel::Plant;

/// Box widths for `passes` box filters whose combination approximates a
/// Gaussian of standard deviation `sigma`. All widths are odd.
pub fn box_sizes(sigma: f64, passes: usize) -> Vec<u32> {
    assert!(passes > 0, "blur needs at least one pass");
    let n = passes as f64;
    let ideal = (12.0 * sigma * sigma / n + 1.0).sqrt();
    let mut lower = ideal.floor() as u32;
    if lower % 2 == 0 {
        lower = lower.saturating_sub(1).max(1);
    }
    let upper = lower + 2;
    let l = lower as f64;
    let m = ((12.0 * sigma * sigma - n * l * l - 4.0 * n * l - 3.0 * n) / (-4.0 * l - 4.0)).round();
    (0..passes)
        .map(|i| if (i as f64) < m { lower } else { upper })
        .collect()
}

/// Blurs `image` in place with `passes` box filters.
///
/// Plants are read through [`Plant::to_u64`] and clamped to `u32::MAX`, so
/// negative values blur as 0 and wider values saturate. Sums run in `u64`.
pub fn fast_gaussian_blur<T: Plant, const N: usize>(image: &mut GenericImage<T, N>, sigma: f64, passes: usize) {
    let (width, height) = image.dimensions();
    if image.is_empty() {
        return;
    }
    let sizes = box_sizes(sigma, passes);
    debug!("Blurring {}x{} image, sigma {}, box sizes {:?}", width, height, sigma, sizes);

    let mut current: Vec<u64> = image
        .data()
        .iter()
        .map(|v| v.to_u64().min(u32::MAX as u64))
        .collect();
    let mut scratch = vec![0u64; current.len()];
    for &size in &sizes {
        horizontal_box_sum::<N>(&current, &mut scratch, width as usize, height as usize, size as usize);
        vertical_box_mean::<N>(&scratch, &mut current, width as usize, height as usize, size as usize);
    }

    for (dst, &v) in image.data_mut().iter_mut().zip(&current) {
        *dst = T::from_u64(v);
    }
}

/// Unscaled sum over `[x - r, x + r]` clipped to the row.
fn horizontal_box_sum<const N: usize>(src: &[u64], dst: &mut [u64], width: usize, height: usize, size: usize) {
    let r = (size - 1) / 2;
    let stride = width * N;
    for y in 0..height {
        let row = &src[y * stride..(y + 1) * stride];
        let out = &mut dst[y * stride..(y + 1) * stride];
        for plant in 0..N {
            let at = |x: usize| row[x * N + plant];
            let mut sum: u64 = (0..=r.min(width - 1)).map(at).sum();
            for x in 0..width {
                out[x * N + plant] = sum;
                if x + r + 1 < width {
                    sum += at(x + r + 1);
                }
                if x >= r {
                    sum -= at(x - r);
                }
            }
        }
    }
}

/// Sum over `[y - r, y + r]` clipped to the column, divided by `size^2`.
fn vertical_box_mean<const N: usize>(src: &[u64], dst: &mut [u64], width: usize, height: usize, size: usize) {
    let r = (size - 1) / 2;
    let stride = width * N;
    let area = (size * size) as f64;
    for i in 0..stride {
        let at = |y: usize| src[y * stride + i];
        let mut sum: u64 = (0..=r.min(height - 1)).map(at).sum();
        for y in 0..height {
            dst[y * stride + i] = (sum as f64 / area) as u64;
            if y + r + 1 < height {
                sum += at(y + r + 1);
            }
            if y >= r {
                sum -= at(y - r);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{GenericPixel, Mono16, Mono8, Rgb24};

    #[test]
    fn box_sizes_for_three_passes() {
        assert_eq!(box_sizes(4.0, 3), vec![7, 7, 9]);
        assert_eq!(box_sizes(1.0, 3), vec![1, 1, 3]);
        assert_eq!(box_sizes(0.0, 2), vec![1, 1]);
    }

    #[test]
    fn zero_sigma_is_identity() {
        let data: Vec<u8> = (0..20).map(|i| (i * 13 % 256) as u8).collect();
        let mut image = GenericImage::<u8, 1>::from_vec(5, 4, data.clone());
        fast_gaussian_blur(&mut image, 0.0, 3);
        assert_eq!(image.data(), data.as_slice());
    }

    #[test]
    fn flat_interior_is_preserved() {
        let mut image = GenericImage::filled(30, 30, Rgb24::rgb(100, 50, 200));
        fast_gaussian_blur(&mut image, 1.0, 3);
        assert_eq!(image.get_pixel(15, 15), Rgb24::rgb(100, 50, 200));
        // Truncated windows at the corner lose mass.
        assert!(image.get_plant(0, 0, 0) < 100);
    }

    #[test]
    fn spike_spreads_symmetrically() {
        let mut image = GenericImage::filled(21, 21, Mono8::from(0));
        image.set_plant(10, 10, 0, 255);
        fast_gaussian_blur(&mut image, 1.0, 1);
        // Single pass with a 3x3 box: 255 / 9.
        assert_eq!(image.get_plant(10, 10, 0), 28);
        assert_eq!(image.get_plant(9, 11, 0), 28);
        assert_eq!(image.get_plant(8, 10, 0), 0);
    }

    #[test]
    fn wide_box_on_saturated_u16() {
        let mut image = GenericImage::filled(400, 400, Mono16::from(u16::MAX));
        assert!(box_sizes(100.0, 1)[0] > 256);
        fast_gaussian_blur(&mut image, 100.0, 1);
        // Truncated windows only ever lose mass.
        assert!(image.data().iter().all(|&v| v > 0 && v <= u16::MAX));
        assert!(image.get_plant(200, 200, 0) > image.get_plant(0, 0, 0));
    }

    #[test]
    fn negative_plants_blur_as_zero() {
        let mut image = GenericImage::filled(5, 5, GenericPixel::<i32, 1>::splat(-40));
        fast_gaussian_blur(&mut image, 1.0, 1);
        assert!(image.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn window_wider_than_image() {
        let mut image = GenericImage::filled(3, 2, Mono8::from(90));
        fast_gaussian_blur(&mut image, 5.0, 1);
        assert!(image.data().iter().all(|&v| v < 90));
    }
}
