//! Separable 3-tap convolution.
//!
//! Kernels are applied as `k1 * prev + k2 * current + k3 * next` along one
//! axis. Taps that fall outside the image contribute nothing, so the first
//! and last sample of every line use two taps only.

use std::ops::Deref;

use crate::image::GenericImage;
use crate::pixel::Plant;

/// Signed single-plant result image of a convolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Convolution2D(GenericImage<i32, 1>);

impl Convolution2D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> &GenericImage<i32, 1> {
        &self.0
    }

    pub fn into_image(self) -> GenericImage<i32, 1> {
        self.0
    }

    /// Convolves every row of `src`.
    pub fn convolve3_horizontal<T: Plant>(&mut self, src: &GenericImage<T, 1>, k1: i32, k2: i32, k3: i32) {
        self.load(src);
        self.convolve3_horizontal_in_place(k1, k2, k3);
    }

    /// Convolves every row of the current result.
    pub fn convolve3_horizontal_in_place(&mut self, k1: i32, k2: i32, k3: i32) {
        let width = self.0.width() as usize;
        if width == 0 {
            return;
        }
        for row in self.0.data_mut().chunks_exact_mut(width) {
            convolve_line(row.iter_mut(), k1, k2, k3);
        }
    }

    /// Convolves every column of `src`.
    pub fn convolve3_vertical<T: Plant>(&mut self, src: &GenericImage<T, 1>, k1: i32, k2: i32, k3: i32) {
        self.load(src);
        self.convolve3_vertical_in_place(k1, k2, k3);
    }

    /// Convolves every column of the current result.
    pub fn convolve3_vertical_in_place(&mut self, k1: i32, k2: i32, k3: i32) {
        let width = self.0.width() as usize;
        if width == 0 {
            return;
        }
        let data = self.0.data_mut();
        for x in 0..width {
            convolve_line(data.iter_mut().skip(x).step_by(width), k1, k2, k3);
        }
    }

    fn load<T: Plant>(&mut self, src: &GenericImage<T, 1>) {
        self.0.create(src.width(), src.height());
        for (dst, v) in self.0.data_mut().iter_mut().zip(src.data()) {
            *dst = v.to_f64() as i32;
        }
    }
}

fn convolve_line<'a>(line: impl Iterator<Item = &'a mut i32>, k1: i32, k2: i32, k3: i32) {
    let mut line = line.peekable();
    let mut prev: Option<i32> = None;
    while let Some(current) = line.next() {
        let value = *current;
        let next = line.peek().map(|n| **n);
        *current = prev.map_or(0, |p| k1 * p) + k2 * value + next.map_or(0, |n| k3 * n);
        prev = Some(value);
    }
}

impl Deref for Convolution2D {
    type Target = GenericImage<i32, 1>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
