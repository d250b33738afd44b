//! Affine transforms and lookup-table resampling.
//!
//! A transform maps `(x, y)` to `(a x + b y + c, d x + e y + f)`; its six
//! coefficients are addressable by index in the order `a b c d e f`.
//! Resampling goes through a [`TransformationTable`] that stores, for every
//! destination pixel, the source pixel it samples.

use std::ops::{Deref, Index, IndexMut};

use log::debug;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::image::GenericImage;
use crate::pixel::{CoordsXY, GenericPixel, Plant};

/// Determinants smaller than this in magnitude make a transform singular.
const SINGULAR_EPSILON: f64 = 1.0e-8;

/// Table entry for destination pixels with no source pixel.
pub const UNMAPPED: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransformation {
    m: Matrix3<f64>,
}

impl Default for AffineTransformation {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransformation {
    pub fn identity() -> Self {
        Self {
            m: Matrix3::identity(),
        }
    }

    /// Transform from coefficients `[a, b, c, d, e, f]`.
    pub fn from_coefficients(coeffs: [f64; 6]) -> Self {
        let [a, b, c, d, e, f] = coeffs;
        Self {
            m: Matrix3::new(a, b, c, d, e, f, 0.0, 0.0, 1.0),
        }
    }

    pub fn coefficients(&self) -> [f64; 6] {
        [
            self.m[(0, 0)],
            self.m[(0, 1)],
            self.m[(0, 2)],
            self.m[(1, 0)],
            self.m[(1, 1)],
            self.m[(1, 2)],
        ]
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.m[(0, 0)] * x + self.m[(0, 1)] * y + self.m[(0, 2)],
            self.m[(1, 0)] * x + self.m[(1, 1)] * y + self.m[(1, 2)],
        )
    }

    /// Maps an integer point; the result is truncated towards zero.
    pub fn transform_point(&self, p: Point) -> Point {
        let (x, y) = self.apply(p.x as f64, p.y as f64);
        Point::new(x as i32, y as i32)
    }

    /// Applies `other` first, then `self`.
    pub fn compose(&mut self, other: &AffineTransformation) {
        self.m *= other.m;
    }

    pub fn rotate_rad(&mut self, angle: f64) {
        let (sin, cos) = angle.sin_cos();
        let rotation = Matrix3::new(cos, -sin, 0.0, sin, cos, 0.0, 0.0, 0.0, 1.0);
        self.m *= rotation;
    }

    pub fn rotate_deg(&mut self, angle: f64) {
        self.rotate_rad(angle.to_radians());
    }

    /// Adds a translation after the current transform.
    pub fn shift(&mut self, dx: f64, dy: f64) {
        self.m[(0, 2)] += dx;
        self.m[(1, 2)] += dy;
    }

    /// Scales the input axes before the current transform.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.m *= Matrix3::new(sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0);
    }

    /// Replaces the transform by its inverse, or by the identity when it
    /// is singular.
    pub fn inverse(&mut self) {
        let det = self.m[(0, 0)] * self.m[(1, 1)] - self.m[(0, 1)] * self.m[(1, 0)];
        if det.abs() < SINGULAR_EPSILON {
            debug!("Singular affine transform (det {}), using identity", det);
            self.m = Matrix3::identity();
            return;
        }
        self.m = self.m.try_inverse().unwrap_or_else(Matrix3::identity);
    }

    pub fn inverted(&self) -> Self {
        let mut inv = *self;
        inv.inverse();
        inv
    }
}

impl Index<usize> for AffineTransformation {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        assert!(i < 6, "affine coefficient {} out of range", i);
        &self.m[(i / 3, i % 3)]
    }
}

impl IndexMut<usize> for AffineTransformation {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        assert!(i < 6, "affine coefficient {} out of range", i);
        &mut self.m[(i / 3, i % 3)]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    NearestNeighbour,
}

/// Source coordinates per destination pixel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformationTable(GenericImage<u32, 2>);

impl TransformationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source pixel sampled by destination `(x, y)`, if any.
    pub fn source_of(&self, x: u32, y: u32) -> Option<(u32, u32)> {
        let coords = self.0.get_pixel(x, y);
        if coords.x() == UNMAPPED {
            None
        } else {
            Some((coords.x(), coords.y()))
        }
    }

    /// Resamples `src` into `dst`, which takes the table's size. Unmapped
    /// destination pixels are set to the default pixel.
    pub fn apply<T: Plant, const N: usize>(
        &self,
        src: &GenericImage<T, N>,
        dst: &mut GenericImage<T, N>,
        interpolation: Interpolation,
    ) {
        dst.create(self.0.width(), self.0.height());
        match interpolation {
            Interpolation::NearestNeighbour => {
                for (out, coords) in dst.pixels_mut().zip(self.0.pixels()) {
                    if coords[0] == UNMAPPED {
                        out.copy_from_slice(&GenericPixel::<T, N>::default().0);
                    } else {
                        out.copy_from_slice(src.pixel(coords[0], coords[1]));
                    }
                }
            }
        }
    }
}

impl Deref for TransformationTable {
    type Target = GenericImage<u32, 2>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Transformation table built from an affine transform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffineTransformationTable(TransformationTable);

impl AffineTransformationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table for a `width x height` source. With `autofit` the
    /// destination is sized to the bounding box of the transformed source
    /// corners and shifted to start at the origin; otherwise it keeps the
    /// source size.
    pub fn calculate(&mut self, width: u32, height: u32, affine: &AffineTransformation, autofit: bool) {
        let mut forward = *affine;
        let (mut dst_width, mut dst_height) = (width, height);
        if autofit {
            let corners = [(0, 0), (width as i32, 0), (0, height as i32), (width as i32, height as i32)]
                .map(|(x, y)| affine.transform_point(Point::new(x, y)));
            let min_x = corners.iter().map(|p| p.x).min().unwrap_or(0) as f64;
            let max_x = corners.iter().map(|p| p.x).max().unwrap_or(0) as f64;
            let min_y = corners.iter().map(|p| p.y).min().unwrap_or(0) as f64;
            let max_y = corners.iter().map(|p| p.y).max().unwrap_or(0) as f64;
            forward.shift(-min_x, -min_y);
            dst_width = ((max_x - min_x + 0.5) as i32).unsigned_abs();
            dst_height = ((max_y - min_y + 0.5) as i32).unsigned_abs();
        }

        let table = &mut (self.0).0;
        table.create_filled(dst_width, dst_height, CoordsXY::xy(UNMAPPED, UNMAPPED));
        let inverse = forward.inverted();
        let mut mapped = 0usize;
        for y in 0..dst_height {
            for x in 0..dst_width {
                let (sx, sy) = inverse.apply(x as f64, y as f64);
                let (sx, sy) = ((sx + 0.5).floor(), (sy + 0.5).floor());
                if sx >= 0.0 && sy >= 0.0 && sx < width as f64 && sy < height as f64 {
                    table.set_pixel(x, y, CoordsXY::xy(sx as u32, sy as u32));
                    mapped += 1;
                }
            }
        }
        debug!(
            "Affine table {}x{} -> {}x{}, {} pixels mapped",
            width, height, dst_width, dst_height, mapped
        );
    }
}

impl Deref for AffineTransformationTable {
    type Target = TransformationTable;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
