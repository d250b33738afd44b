use crate::image::{derived_image, GenericImage};

derived_image!(
    /// 8-bit single-plant intensity image.
    GrayImage,
    u8,
    1
);

// Fixed-point luma weights, normalised by 1 << 15.
const LUMA_R: u32 = 6969;
const LUMA_G: u32 = 23434;
const LUMA_B: u32 = 2365;
const LUMA_SHIFT: u32 = 15;

impl GrayImage {
    /// Luma of an RGB or RGBA image. Plants past the third are ignored.
    pub fn convert<const N: usize>(&mut self, src: &GenericImage<u8, N>) {
        assert!(N >= 3, "luma conversion needs at least 3 plants, got {}", N);
        self.create(src.width(), src.height());
        for (dst, px) in self.data_mut().iter_mut().zip(src.pixels()) {
            let luma = LUMA_R * px[0] as u32 + LUMA_G * px[1] as u32 + LUMA_B * px[2] as u32;
            *dst = (luma >> LUMA_SHIFT) as u8;
        }
    }

    /// Copies one plant of `src`.
    pub fn convert_plant<const N: usize>(&mut self, src: &GenericImage<u8, N>, plant: usize) {
        assert!(plant < N, "plant {} out of range for {}-plant image", plant, N);
        self.create(src.width(), src.height());
        for (dst, px) in self.data_mut().iter_mut().zip(src.pixels()) {
            *dst = px[plant];
        }
    }

    /// Linear contrast stretch `v = k * v + b`, truncated and clamped to
    /// `0..=255`.
    pub fn adjust_color(&mut self, k: f64, b: f64) {
        for v in self.data_mut() {
            let adjusted = (k * *v as f64 + b).trunc();
            *v = adjusted.clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_image::{Rgb24Image, Rgba32Image};
    use crate::pixel::{Rgb24, Rgba32};

    #[test]
    fn luma_weights() {
        let mut rgb = Rgb24Image::with_size(3, 1);
        rgb.set_pixel(0, 0, Rgb24::rgb(255, 255, 255));
        rgb.set_pixel(1, 0, Rgb24::rgb(255, 0, 0));
        rgb.set_pixel(2, 0, Rgb24::rgb(10, 200, 30));
        let mut gray = GrayImage::new();
        gray.convert(&rgb);
        assert_eq!(gray.get_plant(0, 0, 0), 255);
        assert_eq!(gray.get_plant(1, 0, 0), (6969 * 255 / 32768) as u8);
        assert_eq!(
            gray.get_plant(2, 0, 0),
            ((6969 * 10 + 23434 * 200 + 2365 * 30) / 32768) as u8
        );
    }

    #[test]
    fn rgba_alpha_is_ignored() {
        let mut rgba = Rgba32Image::with_size(1, 1);
        rgba.set_pixel(0, 0, Rgba32::rgba(0, 255, 0, 0));
        let mut gray = GrayImage::new();
        gray.convert(&rgba);
        assert_eq!(gray.get_plant(0, 0, 0), (23434 * 255 / 32768) as u8);
    }

    #[test]
    fn single_plant_extraction() {
        let mut rgb = Rgb24Image::with_size(2, 2);
        rgb.fill(Rgb24::rgb(1, 2, 3));
        let mut gray = GrayImage::new();
        gray.convert_plant(&rgb, 2);
        assert!(gray.data().iter().all(|&v| v == 3));
    }

    #[test]
    fn adjust_color_clamps() {
        let mut gray = GrayImage::from(GenericImage::from_vec(4, 1, vec![0u8, 100, 170, 250]));
        gray.adjust_color(1.5, -250.0);
        assert_eq!(gray.data(), &[0, 0, 5, 125]);
    }
}
