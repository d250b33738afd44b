use std::fs;
use std::path::PathBuf;

use log::{debug, info};

use crate::affine::{AffineTransformation, AffineTransformationTable, Interpolation};
use crate::binary_image::BinaryImage;
use crate::blur::fast_gaussian_blur;
use crate::canny::Canny;
use crate::cluster::Cluster;
use crate::color_image::Rgb24Image;
use crate::config::{BinarizationMethod, Config};
use crate::errors::Result;
use crate::gray_image::GrayImage;
use crate::image::GenericImage;
use crate::image_io::{draw_cross, save_binary, save_gray, save_rgb, save_rgb_buffer, to_rgb_buffer, InputImage};
use crate::output::write_clusters_csv;
use crate::pixel::{GenericPixel, Rgb24};
use crate::search::max_value;
use crate::sobel::Sobel;

const CROSS_COLOR: Rgb24 = GenericPixel([255, 0, 0]);

/// What one run of [`process_image`] found
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSummary {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    /// Global threshold, for methods that select one
    pub threshold: Option<u8>,
    pub clusters: u16,
}

/// Run the full demo chain on one image.
///
/// Writes `annotated/<name>.png` (crosses on cluster centroids),
/// `binary/<name>.png` and `clusters/<name>.csv` under the output
/// directory. With `debug` set, intermediates go to `debug/`.
pub fn process_image(
    input_image: InputImage,
    config: &Config,
    debug: bool,
) -> Result<ProcessSummary> {
    let InputImage { image, path, filename } = input_image;
    let (width, height) = image.dimensions();
    info!("Processing {} ({}x{})", path.display(), width, height);

    let mut gray = GrayImage::new();
    gray.convert(&*image);

    // Step 1: smooth and stretch
    let mut blurred = image.clone();
    fast_gaussian_blur(&mut *blurred, config.blur_sigma, config.blur_passes);
    let mut gray_blurred = GrayImage::new();
    gray_blurred.convert(&*blurred);
    let mut adjusted = gray_blurred.clone();
    adjusted.adjust_color(config.adjust_gain, config.adjust_offset);

    // Step 2: binarize
    let mut mask = BinaryImage::new();
    let threshold = binarize(&mut mask, &adjusted, config);
    debug!(
        "{}: {:?} binarization set {} of {} pixels",
        filename,
        config.binarization,
        mask.count_set(),
        mask.len()
    );

    // Step 3: clusters
    let mut cluster = Cluster::with_connectivity(config.connectivity);
    let mut clusters = cluster.clusterize(&mask);
    if let Some(distance) = config.merge_distance {
        clusters = cluster.merge_nearby_clusters(distance);
    }
    info!("{}: {} clusters", filename, clusters);

    // Step 4: outputs
    let output_base = PathBuf::from(&config.output_base_dir);
    let annotated_dir = output_base.join("annotated");
    let binary_dir = output_base.join("binary");
    fs::create_dir_all(&annotated_dir)?;
    fs::create_dir_all(&binary_dir)?;

    let mut canvas = to_rgb_buffer(&image)?;
    for item in cluster.clusters() {
        draw_cross(&mut canvas, item.cx, item.cy, config.cross_size, CROSS_COLOR);
    }
    save_rgb_buffer(&canvas, annotated_dir.join(format!("{}.png", filename)))?;
    save_binary(&mask, binary_dir.join(format!("{}.png", filename)))?;
    write_clusters_csv(cluster.clusters(), &output_base, &filename)?;

    if debug {
        save_debug_images(&image, &gray, &gray_blurred, &adjusted, config, &filename)?;
    }

    Ok(ProcessSummary {
        filename,
        width,
        height,
        threshold,
        clusters,
    })
}

fn binarize(mask: &mut BinaryImage, src: &GrayImage, config: &Config) -> Option<u8> {
    match config.binarization {
        BinarizationMethod::Otsu => Some(mask.otsu(src)),
        BinarizationMethod::Niblack => {
            mask.niblack(&**src, config.window_size, config.window_k);
            None
        }
        BinarizationMethod::Sauvola => {
            mask.sauvola(&**src, config.window_size, config.window_k);
            None
        }
        BinarizationMethod::BoxMean => {
            mask.box_mean(&**src, config.window_size, config.window_k);
            None
        }
        BinarizationMethod::Threshold => {
            mask.threshold_up(&**src, config.fixed_threshold);
            Some(config.fixed_threshold)
        }
    }
}

fn save_debug_images(
    image: &Rgb24Image,
    gray: &GrayImage,
    gray_blurred: &GrayImage,
    adjusted: &GrayImage,
    config: &Config,
    filename: &str,
) -> Result<()> {
    let debug_dir = PathBuf::from(&config.output_base_dir).join("debug");
    fs::create_dir_all(&debug_dir)?;

    save_gray(gray, debug_dir.join(format!("{}_gray.png", filename)))?;
    save_gray(gray_blurred, debug_dir.join(format!("{}_blurred.png", filename)))?;
    save_gray(adjusted, debug_dir.join(format!("{}_adjusted.png", filename)))?;

    let mut sobel = Sobel::new();
    sobel.calculate(&**gray_blurred);
    save_gray(&scale_to_gray(sobel.magnitude()), debug_dir.join(format!("{}_sobel.png", filename)))?;

    let mut canny = Canny::new();
    canny.calculate(&**gray_blurred, config.canny_low, config.canny_high);
    save_binary(canny.edges(), debug_dir.join(format!("{}_canny.png", filename)))?;

    let mut rotation = AffineTransformation::identity();
    rotation.rotate_deg(config.rotation_degrees);
    let mut table = AffineTransformationTable::new();
    table.calculate(image.width(), image.height(), &rotation, config.autofit);
    let mut rotated = Rgb24Image::new();
    table.apply(&**image, &mut *rotated, Interpolation::NearestNeighbour);
    save_rgb(&rotated, debug_dir.join(format!("{}_rotated.png", filename)))?;

    debug!(
        "{}: debug images written to {} (rotated {}x{})",
        filename,
        debug_dir.display(),
        rotated.width(),
        rotated.height()
    );
    Ok(())
}

/// Rescales non-negative values so the maximum maps to 255.
fn scale_to_gray(src: &GenericImage<i32, 1>) -> GrayImage {
    let max = max_value(src).filter(|&m| m > 0).unwrap_or(1) as i64;
    let mut out = GrayImage::with_size(src.width(), src.height());
    for (dst, &v) in out.data_mut().iter_mut().zip(src.data()) {
        *dst = (v.max(0) as i64 * 255 / max) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_is_scaled_to_full_range() {
        let mut src = GenericImage::<i32, 1>::with_size(3, 1);
        src.data_mut().copy_from_slice(&[-5, 50, 100]);
        let gray = scale_to_gray(&src);
        assert_eq!(gray.data(), &[0, 127, 255]);
    }

    #[test]
    fn fixed_threshold_reports_its_value() {
        let mut src = GrayImage::with_size(2, 1);
        src.data_mut().copy_from_slice(&[10, 200]);
        let config = Config {
            binarization: BinarizationMethod::Threshold,
            fixed_threshold: 100,
            ..Config::default()
        };
        let mut mask = BinaryImage::new();
        assert_eq!(binarize(&mut mask, &src, &config), Some(100));
        assert_eq!(mask.data(), &[0, 1]);
    }
}
