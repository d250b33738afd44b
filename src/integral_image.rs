//! Summed-area tables.
//!
//! Cell `(x, y)` holds the sum of every source value in `[0, x] x [0, y]`.
//! Queries clamp coordinates past the far edge to the last row/column and
//! treat negative coordinates as contributing zero, so windows that hang
//! over the border are answered with the part that lies inside.

use std::ops::Deref;

use crate::geometry::Rect;
use crate::image::GenericImage;
use crate::pixel::Plant;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegralImage(GenericImage<u64, 1>);

impl IntegralImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table over plain source values.
    pub fn calculate<T: Plant>(&mut self, src: &GenericImage<T, 1>) {
        self.accumulate(src, |v| v);
    }

    /// Table over squared source values, for local variance.
    pub fn calculate_squared<T: Plant>(&mut self, src: &GenericImage<T, 1>) {
        self.accumulate(src, |v| v.wrapping_mul(v));
    }

    pub fn from_image<T: Plant>(src: &GenericImage<T, 1>) -> Self {
        let mut integral = Self::new();
        integral.calculate(src);
        integral
    }

    pub fn squared_from_image<T: Plant>(src: &GenericImage<T, 1>) -> Self {
        let mut integral = Self::new();
        integral.calculate_squared(src);
        integral
    }

    fn accumulate<T: Plant>(&mut self, src: &GenericImage<T, 1>, f: impl Fn(u64) -> u64) {
        let (width, height) = src.dimensions();
        self.0.create(width, height);
        if width == 0 || height == 0 {
            return;
        }
        let w = width as usize;
        let values = src.data();
        let table = self.0.data_mut();

        for y in 0..height as usize {
            let mut local_sum = 0u64;
            let row = y * w;
            for x in 0..w {
                local_sum = local_sum.wrapping_add(f(values[row + x].to_u64()));
                table[row + x] = if y == 0 {
                    local_sum
                } else {
                    local_sum.wrapping_add(table[row - w + x])
                };
            }
        }
    }

    /// Cumulative sum at `(x, y)` with the border policy applied.
    pub fn sum_at(&self, x: i32, y: i32) -> u64 {
        if x < 0 || y < 0 || self.0.is_empty() {
            return 0;
        }
        let x = (x as u32).min(self.0.width() - 1);
        let y = (y as u32).min(self.0.height() - 1);
        self.0.get_plant(x, y, 0)
    }

    /// Sum over the inclusive rectangle, clamped as described above.
    pub fn get_sum(&self, rect: Rect) -> u64 {
        let a = self.sum_at(rect.right, rect.bottom);
        let b = self.sum_at(rect.left - 1, rect.top - 1);
        let c = self.sum_at(rect.right, rect.top - 1);
        let d = self.sum_at(rect.left - 1, rect.bottom);
        a.wrapping_add(b).wrapping_sub(c).wrapping_sub(d)
    }

    /// Sum over a rectangle the caller has already checked to lie inside
    /// the image.
    pub fn get_sum_unchecked(&self, rect: Rect) -> u64 {
        debug_assert!(
            rect.check(self.0.width(), self.0.height()),
            "{:?} outside {}x{} integral image",
            rect,
            self.0.width(),
            self.0.height()
        );
        let at = |x: i32, y: i32| {
            if x < 0 || y < 0 {
                0
            } else {
                self.0.get_plant(x as u32, y as u32, 0)
            }
        };
        at(rect.right, rect.bottom)
            .wrapping_add(at(rect.left - 1, rect.top - 1))
            .wrapping_sub(at(rect.right, rect.top - 1))
            .wrapping_sub(at(rect.left - 1, rect.bottom))
    }

    /// Raw table value, no clamping.
    pub fn full_sum_unchecked(&self, x: u32, y: u32) -> u64 {
        self.0.get_plant(x, y, 0)
    }
}

impl Deref for IntegralImage {
    type Target = GenericImage<u64, 1>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
