//! Pixel model: a pixel is a fixed number of same-typed scalar plants.
//!
//! Arity and plant type are part of the pixel type, so every image knows its
//! layout at compile time and no per-pixel dispatch is needed.

use std::fmt::Debug;
use std::mem::size_of;
use std::ops::{Index, IndexMut};

/// Scalar type that can be stored in a single plant of a pixel.
pub trait Plant: Copy + Default + PartialEq + PartialOrd + Debug + Send + Sync + 'static {
    const MIN: Self;
    const MAX: Self;

    fn to_f64(self) -> f64;

    /// Non-negative integral view of the value; negative values map to 0 and
    /// fractional parts are truncated.
    fn to_u64(self) -> u64;

    /// Saturating conversion from a float (fractional part truncated).
    fn from_f64(value: f64) -> Self;

    /// Saturating conversion from an unsigned integer.
    fn from_u64(value: u64) -> Self;
}

macro_rules! impl_unsigned_plant {
    ($($t:ty),*) => {
        $(
            impl Plant for $t {
                const MIN: Self = <$t>::MIN;
                const MAX: Self = <$t>::MAX;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn to_u64(self) -> u64 {
                    self as u64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $t
                }

                #[inline]
                fn from_u64(value: u64) -> Self {
                    value.min(<$t>::MAX as u64) as $t
                }
            }
        )*
    };
}

macro_rules! impl_signed_plant {
    ($($t:ty),*) => {
        $(
            impl Plant for $t {
                const MIN: Self = <$t>::MIN;
                const MAX: Self = <$t>::MAX;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn to_u64(self) -> u64 {
                    self.max(0) as u64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $t
                }

                #[inline]
                fn from_u64(value: u64) -> Self {
                    value.min(<$t>::MAX as u64) as $t
                }
            }
        )*
    };
}

macro_rules! impl_float_plant {
    ($($t:ty),*) => {
        $(
            impl Plant for $t {
                const MIN: Self = <$t>::MIN;
                const MAX: Self = <$t>::MAX;

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn to_u64(self) -> u64 {
                    self as u64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $t
                }

                #[inline]
                fn from_u64(value: u64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_unsigned_plant!(u8, u16, u32, u64);
impl_signed_plant!(i16, i32, i64);
impl_float_plant!(f32, f64);

/// A pixel made of `N` plants of type `T`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GenericPixel<T, const N: usize>(pub [T; N]);

impl<T: Plant, const N: usize> GenericPixel<T, N> {
    pub const PLANTS: usize = N;
    pub const SIZE_OF_PLANT: usize = size_of::<T>();
    pub const SIZE_OF_PIXEL: usize = N * size_of::<T>();

    pub fn new(plants: [T; N]) -> Self {
        Self(plants)
    }

    /// Pixel with every plant set to `value`.
    pub fn splat(value: T) -> Self {
        Self([value; N])
    }

    /// Copies the first `N` values of `plants`.
    pub fn from_slice(plants: &[T]) -> Self {
        assert!(
            plants.len() >= N,
            "pixel needs {} plants, got {}",
            N,
            plants.len()
        );
        let mut pixel = Self::default();
        pixel.0.copy_from_slice(&plants[..N]);
        pixel
    }

    pub fn plants(&self) -> &[T] {
        &self.0
    }
}

impl<T: Plant, const N: usize> Default for GenericPixel<T, N> {
    fn default() -> Self {
        Self([T::default(); N])
    }
}

impl<T, const N: usize> Index<usize> for GenericPixel<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, plant: usize) -> &T {
        debug_assert!(plant < N, "plant {plant} out of range for {N}-plant pixel");
        &self.0[plant]
    }
}

impl<T, const N: usize> IndexMut<usize> for GenericPixel<T, N> {
    #[inline]
    fn index_mut(&mut self, plant: usize) -> &mut T {
        debug_assert!(plant < N, "plant {plant} out of range for {N}-plant pixel");
        &mut self.0[plant]
    }
}

impl<T: Plant> From<T> for GenericPixel<T, 1> {
    fn from(value: T) -> Self {
        Self([value])
    }
}

pub type Mono8 = GenericPixel<u8, 1>;
pub type Mono16 = GenericPixel<u16, 1>;
pub type Mono32 = GenericPixel<u32, 1>;
pub type Mono64 = GenericPixel<u64, 1>;
pub type Rgb24 = GenericPixel<u8, 3>;
pub type Rgba32 = GenericPixel<u8, 4>;
/// Source coordinates stored per destination pixel by transformation tables.
pub type CoordsXY = GenericPixel<u32, 2>;

impl GenericPixel<u8, 3> {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }
}

impl GenericPixel<u8, 4> {
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub fn a(&self) -> u8 {
        self.0[3]
    }
}

impl GenericPixel<u32, 2> {
    pub fn xy(x: u32, y: u32) -> Self {
        Self([x, y])
    }

    pub fn x(&self) -> u32 {
        self.0[0]
    }

    pub fn y(&self) -> u32 {
        self.0[1]
    }
}
