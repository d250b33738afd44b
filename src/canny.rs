//! Canny edge detector.
//!
//! Sobel gradients are thinned by non-maximum suppression along the
//! quantised gradient direction, then split by a double threshold. Weak
//! pixels survive only when their 8-connected component contains at least
//! one strong pixel: components are labelled over the strong|weak mask with
//! the strong marker as mass, and zero-mass components are dropped.

use log::debug;

use crate::binary_image::BinaryImage;
use crate::cluster::{Cluster, Connectivity, MAX_IDX};
use crate::image::GenericImage;
use crate::pixel::{GenericPixel, Mono8, Plant};
use crate::sobel::Sobel;

#[derive(Debug, Clone)]
pub struct Canny {
    sobel: Sobel,
    suppressed: GenericImage<i32, 1>,
    strong: GenericImage<u8, 1>,
    candidates: BinaryImage,
    cluster: Cluster,
    edges: BinaryImage,
}

impl Default for Canny {
    fn default() -> Self {
        Self::new()
    }
}

impl Canny {
    pub fn new() -> Self {
        Self {
            sobel: Sobel::new(),
            suppressed: GenericImage::new(),
            strong: GenericImage::new(),
            candidates: BinaryImage::new(),
            cluster: Cluster::with_connectivity(Connectivity::Eight),
            edges: BinaryImage::new(),
        }
    }

    /// Runs the detector. Magnitudes `>= high` are strong, `>= low` weak.
    pub fn calculate<T: Plant>(&mut self, src: &GenericImage<T, 1>, low: i32, high: i32) {
        assert!(low <= high, "canny low threshold {} above high threshold {}", low, high);
        let (width, height) = src.dimensions();
        self.sobel.calculate(src);
        self.suppress_non_maxima();

        self.candidates.create(width, height);
        self.strong.create(width, height);
        let magnitudes = self.suppressed.data().iter();
        let marks = self.candidates.data_mut().iter_mut().zip(self.strong.data_mut());
        for (&m, (candidate, strong)) in magnitudes.zip(marks) {
            *candidate = (m >= low && m > 0) as u8;
            *strong = (m >= high && m > 0) as u8;
        }

        let clusters = self.cluster.clusterize_mask(&self.strong, &self.candidates);
        self.edges.create_filled(width, height, Mono8::from(0));
        let cluster = &self.cluster;
        for (edge, &label) in self.edges.data_mut().iter_mut().zip(cluster.data()) {
            if label != MAX_IDX && cluster.cluster(label).mass > 0 {
                *edge = 1;
            }
        }
        debug!(
            "Canny kept {} edge pixels from {} components",
            self.edges.count_set(),
            clusters
        );
    }

    fn suppress_non_maxima(&mut self) {
        let magnitude = self.sobel.magnitude();
        let (width, height) = magnitude.dimensions();
        self.suppressed.create_filled(width, height, GenericPixel::splat(0));
        let gx = self.sobel.gx();
        let gy = self.sobel.gy();

        for y in 1..height.saturating_sub(1) {
            for x in 1..width.saturating_sub(1) {
                let m = magnitude.get_plant(x, y, 0);
                if m == 0 {
                    continue;
                }
                let (dx, dy) = direction(gx.get_plant(x, y, 0), gy.get_plant(x, y, 0));
                let ahead = magnitude.get_plant((x as i32 + dx) as u32, (y as i32 + dy) as u32, 0);
                let behind = magnitude.get_plant((x as i32 - dx) as u32, (y as i32 - dy) as u32, 0);
                if m >= ahead && m >= behind {
                    self.suppressed.set_plant(x, y, 0, m);
                }
            }
        }
    }

    pub fn edges(&self) -> &BinaryImage {
        &self.edges
    }

    pub fn sobel(&self) -> &Sobel {
        &self.sobel
    }

    /// Edge components found by the last run, including the dropped ones
    /// with zero mass.
    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }
}

/// Pixel step along the gradient, quantised to 0, 45, 90 or 135 degrees.
fn direction(gx: i32, gy: i32) -> (i32, i32) {
    let mut angle = (gy as f64).atan2(gx as f64).to_degrees();
    if angle < 0.0 {
        angle += 180.0;
    }
    if !(22.5..157.5).contains(&angle) {
        (1, 0)
    } else if angle < 67.5 {
        (1, 1)
    } else if angle < 112.5 {
        (0, 1)
    } else {
        (-1, 1)
    }
}
