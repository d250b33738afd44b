use std::path::{Path, PathBuf};
use std::fs;
use image::{ImageFormat, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use log::debug;

use crate::binary_image::BinaryImage;
use crate::color_image::Rgb24Image;
use crate::errors::{ImagingError, Result};
use crate::image::GenericImage;
use crate::pixel::Rgb24;

/// Represents an input image with its metadata
pub struct InputImage {
    pub image: Rgb24Image,
    pub path: PathBuf,
    pub filename: String,
}

/// Get all PNG files from a directory (recursively)
pub fn get_png_files_in_dir<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(ImagingError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(ImagingError::Config(format!(
            "{} is not a directory", dir_path.display()
        )));
    }

    let mut png_files = Vec::new();
    find_png_files_recursive(dir_path, &mut png_files)?;
    png_files.sort();

    Ok(png_files)
}

fn find_png_files_recursive(dir_path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_dir() {
            find_png_files_recursive(&path, result)?;
        } else if path.is_file() {
            let is_png = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("png"))
                .unwrap_or(false);
            if is_png {
                result.push(path);
            }
        }
    }

    Ok(())
}

/// Load a PNG image as packed 24-bit RGB
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();

    let filename = path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ImagingError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    let image = Rgb24Image::from_raw(width, height, rgb.into_raw())?;
    debug!("Loaded {} ({}x{})", path.display(), width, height);

    Ok(InputImage {
        image,
        path: path.to_path_buf(),
        filename,
    })
}

/// Codec buffer holding a copy of `image`
pub fn to_rgb_buffer(image: &Rgb24Image) -> Result<RgbImage> {
    let expected = image.byte_size();
    RgbImage::from_raw(image.width(), image.height(), image.as_raw().to_vec())
        .ok_or(ImagingError::Layout { expected, actual: image.as_raw().len() })
}

fn save_luma(width: u32, height: u32, raw: Vec<u8>, path: &Path) -> Result<()> {
    let actual = raw.len();
    let buffer = image::ImageBuffer::<Luma<u8>, _>::from_raw(width, height, raw).ok_or(
        ImagingError::Layout {
            expected: width as usize * height as usize,
            actual,
        },
    )?;
    buffer.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save an RGB image as PNG
pub fn save_rgb<P: AsRef<Path>>(image: &Rgb24Image, path: P) -> Result<()> {
    save_rgb_buffer(&to_rgb_buffer(image)?, path)
}

pub fn save_rgb_buffer<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a single-plant 8-bit image as gray PNG
pub fn save_gray<P: AsRef<Path>>(image: &GenericImage<u8, 1>, path: P) -> Result<()> {
    save_luma(image.width(), image.height(), image.data().to_vec(), path.as_ref())
}

/// Save a 0/1 mask as black/white PNG
pub fn save_binary<P: AsRef<Path>>(mask: &BinaryImage, path: P) -> Result<()> {
    let raw = mask.data().iter().map(|&v| if v > 0 { 255 } else { 0 }).collect();
    save_luma(mask.width(), mask.height(), raw, path.as_ref())
}

/// Draw a `+` of half-length `size` centred on `(x, y)`, clipped to the
/// canvas
pub fn draw_cross(canvas: &mut RgbImage, x: u32, y: u32, size: u32, color: Rgb24) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let x = x.min(width - 1);
    let y = y.min(height - 1);
    let left = x.saturating_sub(size) as f32;
    let right = x.saturating_add(size).min(width - 1) as f32;
    let top = y.saturating_sub(size) as f32;
    let bottom = y.saturating_add(size).min(height - 1) as f32;
    let color = Rgb([color.r(), color.g(), color.b()]);

    draw_line_segment_mut(canvas, (left, y as f32), (right, y as f32), color);
    draw_line_segment_mut(canvas, (x as f32, top), (x as f32, bottom), color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_is_clipped_to_canvas() {
        let mut canvas = RgbImage::new(10, 10);
        draw_cross(&mut canvas, 1, 8, 3, Rgb24::rgb(0, 255, 0));
        assert_eq!(canvas.get_pixel(0, 8), &Rgb([0, 255, 0]));
        assert_eq!(canvas.get_pixel(4, 8), &Rgb([0, 255, 0]));
        assert_eq!(canvas.get_pixel(5, 8), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(1, 9), &Rgb([0, 255, 0]));
        assert_eq!(canvas.get_pixel(1, 5), &Rgb([0, 255, 0]));
        assert_eq!(canvas.get_pixel(1, 4), &Rgb([0, 0, 0]));
    }

    #[test]
    fn buffer_copy_keeps_layout() {
        let mut image = Rgb24Image::with_size(3, 2);
        image.set_pixel(2, 1, Rgb24::rgb(1, 2, 3));
        let buffer = to_rgb_buffer(&image).unwrap();
        assert_eq!(buffer.get_pixel(2, 1), &Rgb([1, 2, 3]));
        assert_eq!(buffer.as_raw().as_slice(), image.as_raw());
    }

    #[test]
    fn missing_directory_is_invalid_path() {
        let result = get_png_files_in_dir("/definitely/not/here");
        assert!(matches!(result, Err(ImagingError::InvalidPath(_))));
    }
}
