use std::ops::Deref;

use crate::binary_image::BinaryImage;
use crate::image::GenericImage;
use crate::pixel::Mono32;
use crate::search::max_value;

/// Accumulator for straight lines `rho = x cos(theta) + y sin(theta)`.
///
/// Columns are angle bins starting at `min_angle`, rows are distance bins
/// starting at `min_distance`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoughLine(GenericImage<u32, 1>);

/// Sampling of the line parameter space. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughRange {
    pub min_angle: f64,
    pub max_angle: f64,
    pub angle_step: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub distance_step: f64,
}

impl HoughLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Votes every set pixel of `src` into the accumulator. With
    /// `norm > 0` the votes are rescaled so the strongest bin equals `norm`.
    pub fn calculate(&mut self, src: &BinaryImage, range: &HoughRange, norm: u32) {
        assert!(range.max_angle > range.min_angle, "empty angle range");
        assert!(range.max_distance > range.min_distance, "empty distance range");
        assert!(range.angle_step > 0.0 && range.distance_step > 0.0, "steps must be positive");

        let angle_steps = (0.5 + (range.max_angle - range.min_angle) / range.angle_step) as u32;
        let distance_steps = (0.5 + (range.max_distance - range.min_distance) / range.distance_step) as u32;
        self.0.create_filled(angle_steps, distance_steps, Mono32::from(0));

        let trig: Vec<(f64, f64)> = (0..angle_steps)
            .map(|step| (range.min_angle + range.angle_step * step as f64).to_radians().sin_cos())
            .collect();

        let width = src.width();
        for (i, _) in src.data().iter().enumerate().filter(|&(_, &v)| v > 0) {
            let x = (i % width as usize) as f64;
            let y = (i / width as usize) as f64;
            for (step, &(sin, cos)) in trig.iter().enumerate() {
                let d = (0.5 + (x * cos + y * sin - range.min_distance) / range.distance_step).floor();
                if d >= 0.0 && d < distance_steps as f64 {
                    *self.0.plant_mut(step as u32, d as u32, 0) += 1;
                }
            }
        }

        if norm > 0 {
            if let Some(max) = max_value(&self.0).filter(|&m| m > 0) {
                for v in self.0.data_mut() {
                    *v = (norm as u64 * *v as u64 / max as u64) as u32;
                }
            }
        }
    }

    /// Votes for the bin at `(angle_step, distance_step)`.
    pub fn votes(&self, angle_step: u32, distance_step: u32) -> u32 {
        self.0.get_plant(angle_step, distance_step, 0)
    }
}

impl Deref for HoughLine {
    type Target = GenericImage<u32, 1>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Mono8;

    fn range() -> HoughRange {
        HoughRange {
            min_angle: 0.0,
            max_angle: 180.0,
            angle_step: 1.0,
            min_distance: -30.0,
            max_distance: 30.0,
            distance_step: 1.0,
        }
    }

    #[test]
    fn vertical_line_peaks_at_zero_degrees() {
        let mut mask = BinaryImage::with_size(20, 20);
        mask.fill(Mono8::from(0));
        for y in 0..20 {
            mask.set_plant(7, y, 0, 1);
        }
        let mut hough = HoughLine::new();
        hough.calculate(&mask, &range(), 0);
        assert_eq!(hough.dimensions(), (180, 60));
        // rho = 7 -> bin 7 - (-30) = 37
        assert_eq!(hough.votes(0, 37), 20);
        assert_eq!(max_value(&*hough), Some(20));
    }

    #[test]
    fn normalised_peak() {
        let mut mask = BinaryImage::with_size(10, 10);
        mask.fill(Mono8::from(0));
        for x in 0..10 {
            mask.set_plant(x, 4, 0, 1);
        }
        let mut hough = HoughLine::new();
        hough.calculate(&mask, &range(), 255);
        // Horizontal line y = 4: theta 90, rho 4.
        assert_eq!(hough.votes(90, 34), 255);
        assert_eq!(max_value(&*hough), Some(255));
    }
}
