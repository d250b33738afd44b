// src/lib.rs - Library interface for generic_imaging

// Container
pub mod pixel;
pub mod image;
pub mod geometry;
pub mod search;

// Derived images and algorithms
pub mod gray_image;
pub mod color_image;
pub mod binary_image;
pub mod integral_image;
pub mod cluster;
pub mod convolution;
pub mod sobel;
pub mod canny;
pub mod blur;
pub mod affine;
pub mod hough;

// Batch tooling
pub mod config;
pub mod errors;
pub mod image_io;
pub mod output;
pub mod pipeline;

// Re-export commonly used types and functions
pub use errors::{ImagingError, Result};
pub use config::{BinarizationMethod, Config};
pub use pipeline::{process_image, ProcessSummary};
pub use image_io::{get_png_files_in_dir, load_image, InputImage};

pub use pixel::{CoordsXY, GenericPixel, Mono16, Mono32, Mono64, Mono8, Plant, Rgb24, Rgba32};
pub use image::{Cursor, CursorMut, GenericImage};
pub use geometry::{Point, Rect};
pub use gray_image::GrayImage;
pub use color_image::{Rgb24Image, Rgba32Image};
pub use binary_image::BinaryImage;
pub use integral_image::IntegralImage;
pub use cluster::{Cluster, ClusterItem, Connectivity, MAX_CLUSTERS, MAX_IDX};
pub use convolution::Convolution2D;
pub use sobel::Sobel;
pub use canny::Canny;
pub use blur::fast_gaussian_blur;
pub use affine::{AffineTransformation, AffineTransformationTable, Interpolation, TransformationTable};
pub use hough::{HoughLine, HoughRange};
