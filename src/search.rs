//! Extremes and mean over every plant of an image.

use crate::image::GenericImage;
use crate::pixel::Plant;

/// Smallest plant value, `None` for an empty image.
pub fn min_value<T: Plant, const N: usize>(src: &GenericImage<T, N>) -> Option<T> {
    src.data()
        .iter()
        .copied()
        .reduce(|acc, v| if v < acc { v } else { acc })
}

/// Largest plant value, `None` for an empty image.
pub fn max_value<T: Plant, const N: usize>(src: &GenericImage<T, N>) -> Option<T> {
    src.data()
        .iter()
        .copied()
        .reduce(|acc, v| if v > acc { v } else { acc })
}

/// Mean over all plants, converted back to the plant type (truncating for
/// integer plants). Zero for an empty image.
pub fn mean_value<T: Plant, const N: usize>(src: &GenericImage<T, N>) -> T {
    let data = src.data();
    if data.is_empty() {
        return T::default();
    }
    let sum: f64 = data.iter().map(|v| v.to_f64()).sum();
    T::from_f64(sum / data.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn extremes_cover_all_plants() {
        let image = GenericImage::<u8, 3>::from_vec(2, 1, vec![5, 200, 7, 1, 9, 30]);
        assert_eq!(min_value(&image), Some(1));
        assert_eq!(max_value(&image), Some(200));
        assert_eq!(mean_value(&image), 42);
    }

    #[test]
    fn signed_and_float_plants() {
        let image = GenericImage::<i32, 1>::from_vec(3, 1, vec![-4, 10, 3]);
        assert_eq!(min_value(&image), Some(-4));
        assert_eq!(mean_value(&image), 3);
        let image = GenericImage::<f64, 1>::from_vec(2, 1, vec![0.5, 1.0]);
        assert_approx_eq!(mean_value(&image), 0.75);
    }

    #[test]
    fn empty_image() {
        let image = GenericImage::<u16, 1>::new();
        assert_eq!(min_value(&image), None);
        assert_eq!(max_value(&image), None);
        assert_eq!(mean_value(&image), 0);
    }
}
