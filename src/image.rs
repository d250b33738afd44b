//! Generic image container and its cursor protocol.
//!
//! ## Memory layout
//! An image owns one contiguous row-major buffer of `width * height` pixels,
//! each pixel being `N` consecutive plants of type `T`. The pixel at `(x, y)`
//! starts at plant offset `(y * width + x) * N`, so there is no row padding and
//! linear traversal is a plain index increment.
//!
//! ## Cursors
//! A cursor is a typed pixel index into an image's buffer. It does not borrow
//! the image: reads and writes go through the image (`image[cursor][plant]`),
//! which keeps several cursors into the same image usable at once. Only a
//! [`CursorMut`] can be used for writes, and a `CursorMut` converts into a
//! [`Cursor`] but not the other way round. Any `create` call that changes the
//! buffer size invalidates previously issued cursors.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem::size_of;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub, SubAssign};
use std::slice::{ChunksExact, ChunksExactMut};

use crate::pixel::{GenericPixel, Plant};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericImage<T, const N: usize> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Plant, const N: usize> GenericImage<T, N> {
    pub const PLANTS: usize = N;
    pub const SIZE_OF_PLANT: usize = size_of::<T>();
    pub const SIZE_OF_PIXEL: usize = N * size_of::<T>();

    /// Empty image without a buffer.
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        let mut image = Self::new();
        image.create(width, height);
        image
    }

    pub fn filled(width: u32, height: u32, value: GenericPixel<T, N>) -> Self {
        let mut image = Self::new();
        image.create_filled(width, height, value);
        image
    }

    /// Wraps an existing row-major plant buffer. Panics if the length does
    /// not match `width * height * N`.
    pub fn from_vec(width: u32, height: u32, data: Vec<T>) -> Self {
        let expected = plant_count(width, height, N);
        assert_eq!(
            data.len(),
            expected,
            "buffer of {} plants cannot hold a {}x{} image with {} plants per pixel",
            data.len(),
            width,
            height,
            N
        );
        Self {
            width,
            height,
            data,
        }
    }

    /// Sizes the buffer for `width * height` pixels. The buffer is only
    /// reallocated when the size changes; its contents are unspecified
    /// afterwards either way.
    pub fn create(&mut self, width: u32, height: u32) {
        let len = plant_count(width, height, N);
        self.width = width;
        self.height = height;
        if len != self.data.len() {
            self.data = vec![T::default(); len];
        }
    }

    /// Same as [`create`](Self::create), then writes `value` into every pixel.
    pub fn create_filled(&mut self, width: u32, height: u32, value: GenericPixel<T, N>) {
        self.create(width, height);
        self.fill(value);
    }

    pub fn fill(&mut self, value: GenericPixel<T, N>) {
        for pixel in self.data.chunks_exact_mut(N) {
            pixel.copy_from_slice(&value.0);
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.data.len() / N
    }

    /// True when the image has no valid iteration range.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Buffer size in bytes, always `width * height * SIZE_OF_PIXEL`.
    pub fn byte_size(&self) -> usize {
        self.data.len() * size_of::<T>()
    }

    /// Whole buffer in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[inline]
    fn offset_of(&self, x: u32, y: u32) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) outside {}x{} image",
            x,
            y,
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * N
    }

    #[inline]
    pub fn get_plant(&self, x: u32, y: u32, plant: usize) -> T {
        debug_assert!(plant < N, "plant {plant} out of range for {N}-plant image");
        self.data[self.offset_of(x, y) + plant]
    }

    #[inline]
    pub fn plant_mut(&mut self, x: u32, y: u32, plant: usize) -> &mut T {
        debug_assert!(plant < N, "plant {plant} out of range for {N}-plant image");
        let offset = self.offset_of(x, y);
        &mut self.data[offset + plant]
    }

    #[inline]
    pub fn set_plant(&mut self, x: u32, y: u32, plant: usize, value: T) {
        *self.plant_mut(x, y, plant) = value;
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> GenericPixel<T, N> {
        GenericPixel::from_slice(self.pixel(x, y))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, value: GenericPixel<T, N>) {
        self.pixel_mut(x, y).copy_from_slice(&value.0);
    }

    /// Plants of the pixel at `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[T] {
        let offset = self.offset_of(x, y);
        &self.data[offset..offset + N]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [T] {
        let offset = self.offset_of(x, y);
        &mut self.data[offset..offset + N]
    }

    /// Plants of row `y`, `width * N` values.
    pub fn row(&self, y: u32) -> &[T] {
        assert!(y < self.height, "row {} outside image of height {}", y, self.height);
        let stride = self.width as usize * N;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [T] {
        assert!(y < self.height, "row {} outside image of height {}", y, self.height);
        let stride = self.width as usize * N;
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Per-pixel plant slices in row-major order.
    pub fn pixels(&self) -> ChunksExact<'_, T> {
        self.data.chunks_exact(N)
    }

    pub fn pixels_mut(&mut self) -> ChunksExactMut<'_, T> {
        self.data.chunks_exact_mut(N)
    }

    pub fn begin(&self) -> Cursor<T, N> {
        Cursor::at_index(0)
    }

    /// One past the last pixel; never dereferenced.
    pub fn end(&self) -> Cursor<T, N> {
        Cursor::at_index(self.len())
    }

    pub fn cursor_row(&self, row: u32) -> Cursor<T, N> {
        Cursor::at_index(row as usize * self.width as usize)
    }

    pub fn cursor_at(&self, col: u32, row: u32) -> Cursor<T, N> {
        Cursor::at_index(row as usize * self.width as usize + col as usize)
    }

    pub fn begin_mut(&mut self) -> CursorMut<T, N> {
        CursorMut::at_index(0)
    }

    pub fn end_mut(&mut self) -> CursorMut<T, N> {
        CursorMut::at_index(self.len())
    }

    pub fn cursor_row_mut(&mut self, row: u32) -> CursorMut<T, N> {
        CursorMut::at_index(row as usize * self.width as usize)
    }

    pub fn cursor_at_mut(&mut self, col: u32, row: u32) -> CursorMut<T, N> {
        CursorMut::at_index(row as usize * self.width as usize + col as usize)
    }

    /// Plant value under a cursor of either kind.
    #[inline]
    pub fn at(&self, cursor: impl Into<Cursor<T, N>>, plant: usize) -> T {
        debug_assert!(plant < N, "plant {plant} out of range for {N}-plant image");
        self[cursor.into()][plant]
    }

    #[inline]
    pub fn at_mut(&mut self, cursor: CursorMut<T, N>, plant: usize) -> &mut T {
        debug_assert!(plant < N, "plant {plant} out of range for {N}-plant image");
        &mut self[cursor][plant]
    }

    /// Resizes `self` to `src` and copies its buffer verbatim. Derived image
    /// types expose this as a `copy_from` restricted to their own type.
    pub fn copy_pixels_from(&mut self, src: &GenericImage<T, N>) {
        self.create(src.width, src.height);
        self.data.copy_from_slice(&src.data);
    }

    pub fn copy_pixels_to(&self, dst: &mut GenericImage<T, N>) {
        dst.copy_pixels_from(self);
    }
}

fn plant_count(width: u32, height: u32, plants: usize) -> usize {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(plants))
        .expect("image size overflow")
}

impl<T: Plant, const N: usize> Index<Cursor<T, N>> for GenericImage<T, N> {
    type Output = [T];

    #[inline]
    fn index(&self, cursor: Cursor<T, N>) -> &[T] {
        let start = cursor.index * N;
        &self.data[start..start + N]
    }
}

impl<T: Plant, const N: usize> Index<CursorMut<T, N>> for GenericImage<T, N> {
    type Output = [T];

    #[inline]
    fn index(&self, cursor: CursorMut<T, N>) -> &[T] {
        &self[Cursor::from(cursor)]
    }
}

impl<T: Plant, const N: usize> IndexMut<CursorMut<T, N>> for GenericImage<T, N> {
    #[inline]
    fn index_mut(&mut self, cursor: CursorMut<T, N>) -> &mut [T] {
        let start = cursor.index * N;
        &mut self.data[start..start + N]
    }
}

macro_rules! cursor_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<T, const N: usize> {
            index: usize,
            _pixel: PhantomData<fn() -> GenericPixel<T, N>>,
        }

        impl<T, const N: usize> $name<T, N> {
            #[inline]
            fn at_index(index: usize) -> Self {
                Self {
                    index,
                    _pixel: PhantomData,
                }
            }

            /// Pixel index from the start of the buffer.
            #[inline]
            pub fn index(&self) -> usize {
                self.index
            }

            #[inline]
            pub fn step(&mut self) {
                self.index += 1;
            }

            #[inline]
            pub fn step_back(&mut self) {
                debug_assert!(self.index > 0, "cursor moved before the first pixel");
                self.index -= 1;
            }

            #[inline]
            pub fn advance(&mut self, pixels: usize) {
                self.index += pixels;
            }

            #[inline]
            pub fn retreat(&mut self, pixels: usize) {
                debug_assert!(self.index >= pixels, "cursor moved before the first pixel");
                self.index -= pixels;
            }

            /// Cursor `delta` pixels away, in either direction.
            #[inline]
            pub fn offset(self, delta: isize) -> Self {
                let index = self
                    .index
                    .checked_add_signed(delta)
                    .expect("cursor moved before the first pixel");
                Self::at_index(index)
            }
        }

        impl<T, const N: usize> Clone for $name<T, N> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T, const N: usize> Copy for $name<T, N> {}

        impl<T, const N: usize> PartialEq for $name<T, N> {
            fn eq(&self, other: &Self) -> bool {
                self.index == other.index
            }
        }

        impl<T, const N: usize> Eq for $name<T, N> {}

        impl<T, const N: usize> PartialOrd for $name<T, N> {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl<T, const N: usize> Ord for $name<T, N> {
            fn cmp(&self, other: &Self) -> Ordering {
                self.index.cmp(&other.index)
            }
        }

        impl<T, const N: usize> Hash for $name<T, N> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.index.hash(state);
            }
        }

        impl<T, const N: usize> fmt::Debug for $name<T, N> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("index", &self.index)
                    .finish()
            }
        }

        impl<T, const N: usize> AddAssign<usize> for $name<T, N> {
            #[inline]
            fn add_assign(&mut self, pixels: usize) {
                self.advance(pixels);
            }
        }

        impl<T, const N: usize> SubAssign<usize> for $name<T, N> {
            #[inline]
            fn sub_assign(&mut self, pixels: usize) {
                self.retreat(pixels);
            }
        }

        impl<T, const N: usize> Add<usize> for $name<T, N> {
            type Output = Self;

            #[inline]
            fn add(mut self, pixels: usize) -> Self {
                self.advance(pixels);
                self
            }
        }

        impl<T, const N: usize> Sub<usize> for $name<T, N> {
            type Output = Self;

            #[inline]
            fn sub(mut self, pixels: usize) -> Self {
                self.retreat(pixels);
                self
            }
        }
    };
}

cursor_type!(
    /// Read-only cursor into a [`GenericImage`].
    Cursor
);

cursor_type!(
    /// Cursor that can also be used to write through [`GenericImage`].
    CursorMut
);

impl<T, const N: usize> From<CursorMut<T, N>> for Cursor<T, N> {
    fn from(cursor: CursorMut<T, N>) -> Self {
        Cursor::at_index(cursor.index)
    }
}

impl<T, const N: usize> PartialEq<CursorMut<T, N>> for Cursor<T, N> {
    fn eq(&self, other: &CursorMut<T, N>) -> bool {
        self.index == other.index
    }
}

impl<T, const N: usize> PartialEq<Cursor<T, N>> for CursorMut<T, N> {
    fn eq(&self, other: &Cursor<T, N>) -> bool {
        self.index == other.index
    }
}

/// Declares a newtype over [`GenericImage`] whose `copy_from`/`copy_to` only
/// accept the same newtype, so images sharing a layout but not a meaning
/// (gray levels versus 0/1 masks) cannot be copied into each other by accident.
macro_rules! derived_image {
    ($(#[$meta:meta])* $name:ident, $plant:ty, $plants:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name($crate::image::GenericImage<$plant, $plants>);

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn with_size(width: u32, height: u32) -> Self {
                Self($crate::image::GenericImage::with_size(width, height))
            }

            pub fn copy_from(&mut self, src: &$name) {
                self.0.copy_pixels_from(&src.0);
            }

            pub fn copy_to(&self, dst: &mut $name) {
                self.0.copy_pixels_to(&mut dst.0);
            }

            pub fn into_generic(self) -> $crate::image::GenericImage<$plant, $plants> {
                self.0
            }
        }

        impl From<$crate::image::GenericImage<$plant, $plants>> for $name {
            fn from(image: $crate::image::GenericImage<$plant, $plants>) -> Self {
                Self(image)
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::image::GenericImage<$plant, $plants>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };
}

pub(crate) use derived_image;
