//! Interleaved 8-bit colour images.
//!
//! Both types keep the container's layout untouched (row-major, 3 or 4 bytes
//! per pixel, no row padding), which is exactly what the PNG codec reads and
//! writes.

use crate::errors::{ImagingError, Result};
use crate::image::{derived_image, GenericImage};

derived_image!(
    /// 24-bit RGB image.
    Rgb24Image,
    u8,
    3
);

derived_image!(
    /// 32-bit RGBA image.
    Rgba32Image,
    u8,
    4
);

macro_rules! raw_layout {
    ($name:ident, $plants:expr) => {
        impl $name {
            /// Wraps a packed buffer of `width * height * PLANTS` bytes.
            /// Any other length means the producer used a row stride the
            /// container cannot represent.
            pub fn from_raw(width: u32, height: u32, raw: Vec<u8>) -> Result<Self> {
                let expected = width as usize * height as usize * $plants;
                if raw.len() != expected {
                    return Err(ImagingError::Layout {
                        expected,
                        actual: raw.len(),
                    });
                }
                Ok(Self(GenericImage::from_vec(width, height, raw)))
            }

            pub fn as_raw(&self) -> &[u8] {
                self.data()
            }
        }
    };
}

raw_layout!(Rgb24Image, 3);
raw_layout!(Rgba32Image, 4);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Rgb24;

    #[test]
    fn raw_buffer_must_match_dimensions() {
        let ok = Rgb24Image::from_raw(2, 2, vec![0; 12]).unwrap();
        assert_eq!(ok.dimensions(), (2, 2));
        match Rgb24Image::from_raw(2, 2, vec![0; 16]) {
            Err(ImagingError::Layout { expected, actual }) => {
                assert_eq!((expected, actual), (12, 16));
            }
            other => panic!("expected layout error, got {:?}", other),
        }
        assert!(Rgba32Image::from_raw(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn typed_copy_resizes_destination() {
        let mut src = Rgb24Image::with_size(3, 2);
        src.fill(Rgb24::rgb(9, 8, 7));
        let mut dst = Rgb24Image::new();
        dst.copy_from(&src);
        assert_eq!(dst.as_raw(), src.as_raw());
        assert_eq!(dst.get_pixel(2, 1).g(), 8);
    }
}
