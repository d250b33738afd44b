//! 0/1 masks and the algorithms that produce them from intensity images.
//!
//! Every producer resizes the mask to its source and writes 1 where the
//! source value lies strictly above (or, for `threshold_down`, strictly
//! below) the threshold and 0 everywhere else.
//!
//! The local methods take their window statistics from integral images over
//! the square window of radius `window_size / 2`. Near the border the window
//! is clamped by the integral image but still divided by the nominal area
//! `(window_size + 1)^2`, so border means come out lower than the true
//! local mean.

use crate::geometry::Rect;
use crate::image::{derived_image, GenericImage};
use crate::integral_image::IntegralImage;
use crate::pixel::Plant;

derived_image!(
    /// Single-plant mask holding 0 or 1 per pixel.
    BinaryImage,
    u8,
    1
);

impl BinaryImage {
    fn binarize<T: Plant>(&mut self, src: &GenericImage<T, 1>, mut is_set: impl FnMut(T) -> bool) {
        self.create(src.width(), src.height());
        for (dst, &v) in self.data_mut().iter_mut().zip(src.data()) {
            *dst = is_set(v) as u8;
        }
    }

    pub fn threshold_up<T: Plant>(&mut self, src: &GenericImage<T, 1>, threshold: T) {
        self.binarize(src, |v| v > threshold);
    }

    pub fn threshold_down<T: Plant>(&mut self, src: &GenericImage<T, 1>, threshold: T) {
        self.binarize(src, |v| v < threshold);
    }

    /// Global threshold maximising the between-class variance of the
    /// histogram. On ties the lowest threshold wins. Returns the threshold.
    pub fn otsu(&mut self, src: &GenericImage<u8, 1>) -> u8 {
        let threshold = otsu_threshold(src);
        self.threshold_up(src, threshold);
        threshold
    }

    /// Local threshold `mean + k * stddev`.
    pub fn niblack<T: Plant>(&mut self, src: &GenericImage<T, 1>, window_size: u32, k: f64) {
        self.local_threshold(src, window_size, true, |mean, stddev| mean + k * stddev);
    }

    /// Local threshold `mean * (1 + k * (stddev / (window_size / 2) - 1))`.
    /// The dynamic range term uses the integer half window.
    ///
    /// # Panics
    ///
    /// A `window_size` below 2 has a zero range and is a programming error.
    pub fn sauvola<T: Plant>(&mut self, src: &GenericImage<T, 1>, window_size: u32, k: f64) {
        assert!(
            window_size >= 2,
            "sauvola needs a window of at least 2, got {}",
            window_size
        );
        let range = (window_size / 2) as f64;
        self.local_threshold(src, window_size, true, |mean, stddev| {
            mean * (1.0 + k * (stddev / range - 1.0))
        });
    }

    /// Local threshold `mean * k`.
    pub fn box_mean<T: Plant>(&mut self, src: &GenericImage<T, 1>, window_size: u32, k: f64) {
        self.local_threshold(src, window_size, false, |mean, _| mean * k);
    }

    fn local_threshold<T: Plant>(
        &mut self,
        src: &GenericImage<T, 1>,
        window_size: u32,
        with_variance: bool,
        threshold: impl Fn(f64, f64) -> f64,
    ) {
        let mean = IntegralImage::from_image(src);
        let mean_sq = if with_variance {
            Some(IntegralImage::squared_from_image(src))
        } else {
            None
        };
        let (width, height) = src.dimensions();
        self.create(width, height);

        let radius = (window_size / 2) as i32;
        let area = (1.0 + window_size as f64) * (1.0 + window_size as f64);
        let values = src.data();
        let mask = self.data_mut();

        for y in 0..height {
            for x in 0..width {
                let i = y as usize * width as usize + x as usize;
                let window = Rect::around(x as i32, y as i32, radius);
                let mx = mean.get_sum(window) as f64 / area;
                let stddev = match &mean_sq {
                    Some(sq) => {
                        let mx2 = sq.get_sum(window) as f64 / area;
                        (mx2 - mx * mx).max(0.0).sqrt()
                    }
                    None => 0.0,
                };
                mask[i] = (values[i].to_f64() > threshold(mx, stddev)) as u8;
            }
        }
    }

    /// Flips every 0/1 value.
    pub fn invert(&mut self) {
        for v in self.data_mut() {
            *v ^= 1;
        }
    }

    /// Number of set pixels.
    pub fn count_set(&self) -> usize {
        self.data().iter().filter(|&&v| v != 0).count()
    }
}

fn otsu_threshold(src: &GenericImage<u8, 1>) -> u8 {
    let mut histogram = [0u64; 256];
    for &v in src.data() {
        histogram[v as usize] += 1;
    }
    let total: u64 = histogram.iter().sum();
    let energy: u64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &n)| i as u64 * n)
        .sum();

    let mut partial_sum = 0u64;
    let mut partial_energy = 0u64;
    let mut max_sigma = -1.0f64;
    let mut threshold = 0u8;
    for (i, &n) in histogram.iter().enumerate() {
        partial_sum += n;
        partial_energy += i as u64 * n;
        // Empty classes have no mean and never win.
        if partial_sum == 0 || partial_sum == total {
            continue;
        }
        let w1 = partial_sum as f64 / total as f64;
        let a = partial_energy as f64 / partial_sum as f64
            - (energy - partial_energy) as f64 / (total - partial_sum) as f64;
        let sigma = w1 * (1.0 - w1) * a * a;
        if sigma > max_sigma {
            max_sigma = sigma;
            threshold = i as u8;
        }
    }
    threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gray_image::GrayImage;

    fn gray(width: u32, height: u32, data: Vec<u8>) -> GrayImage {
        GrayImage::from(GenericImage::from_vec(width, height, data))
    }

    #[test]
    fn thresholds_are_strict() {
        let src = gray(4, 1, vec![9, 10, 11, 200]);
        let mut mask = BinaryImage::new();
        mask.threshold_up(&src, 10);
        assert_eq!(mask.data(), &[0, 0, 1, 1]);
        mask.threshold_down(&src, 10);
        assert_eq!(mask.data(), &[1, 0, 0, 0]);
        mask.invert();
        assert_eq!(mask.data(), &[0, 1, 1, 1]);
        assert_eq!(mask.count_set(), 3);
    }

    #[test]
    fn threshold_on_wide_plants() {
        let src = GenericImage::<u16, 1>::from_vec(3, 1, vec![100, 1000, 60000]);
        let mut mask = BinaryImage::new();
        mask.threshold_up(&src, 999);
        assert_eq!(mask.data(), &[0, 1, 1]);
    }

    #[test]
    fn otsu_splits_bimodal_histogram() {
        let data: Vec<u8> = (0..400)
            .map(|i| if i % 2 == 0 { 40 + (i % 7) as u8 } else { 200 + (i % 5) as u8 })
            .collect();
        let src = gray(20, 20, data);
        let mut mask = BinaryImage::new();
        let t = mask.otsu(&src);
        assert!(t >= 46 && t < 200, "threshold {t}");
        for (m, v) in mask.data().iter().zip(src.data()) {
            assert_eq!(*m, (*v >= 200) as u8);
        }
        let mut again = BinaryImage::new();
        assert_eq!(again.otsu(&src), t);
        assert_eq!(again, mask);
    }

    #[test]
    fn otsu_prefers_lowest_threshold_on_ties() {
        // Two values only: every threshold between them scores the same.
        let src = gray(2, 1, vec![10, 90]);
        let mut mask = BinaryImage::new();
        assert_eq!(mask.otsu(&src), 10);
        assert_eq!(mask.data(), &[0, 1]);
    }

    #[test]
    fn flat_image_keeps_zero_threshold() {
        let src = gray(5, 5, vec![77; 25]);
        let mut mask = BinaryImage::new();
        assert_eq!(mask.otsu(&src), 0);
        assert_eq!(mask.count_set(), 25);
    }

    #[test]
    fn niblack_marks_bright_spot() {
        let mut data = vec![20u8; 15 * 15];
        data[7 * 15 + 7] = 250;
        let src = gray(15, 15, data);
        let mut mask = BinaryImage::new();
        mask.niblack(&src, 4, 0.5);
        assert_eq!(mask.get_plant(7, 7, 0), 1);
        assert_eq!(mask.get_plant(2, 7, 0), 0);
        assert_eq!(mask.get_plant(7, 3, 0), 0);
        // Clamped corner window: low mean, nonzero spread.
        assert_eq!(mask.get_plant(0, 0, 0), 1);
    }

    #[test]
    fn box_mean_uses_nominal_area() {
        // Window 2 -> radius 1, nominal divisor 9. An interior pixel of a flat
        // image sees exactly 9 values, a corner pixel only 4.
        let src = gray(5, 5, vec![90; 25]);
        let mut mask = BinaryImage::new();
        mask.box_mean(&src, 2, 1.0);
        assert_eq!(mask.get_plant(2, 2, 0), 0);
        assert_eq!(mask.get_plant(0, 0, 0), 1);
        assert_eq!(mask.get_plant(4, 4, 0), 1);
    }

    #[test]
    fn sauvola_on_flat_image() {
        let src = gray(6, 6, vec![100; 36]);
        let mut mask = BinaryImage::new();
        // Zero stddev: threshold = mean * (1 - k) below every interior value.
        mask.sauvola(&src, 2, 0.3);
        assert_eq!(mask.get_plant(3, 3, 0), 1);
    }

    #[test]
    #[should_panic(expected = "sauvola needs a window of at least 2")]
    fn sauvola_rejects_single_pixel_window() {
        let src = gray(3, 3, vec![10; 9]);
        let mut mask = BinaryImage::new();
        mask.sauvola(&*src, 1, 0.3);
    }
}
