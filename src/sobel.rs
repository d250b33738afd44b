use crate::convolution::Convolution2D;
use crate::image::GenericImage;
use crate::pixel::Plant;

/// Sobel gradients of a single-plant image.
///
/// `gx` grows towards decreasing x and `gy` towards decreasing y, which only
/// matters to callers that look at gradient signs.
#[derive(Debug, Clone, Default)]
pub struct Sobel {
    gx: Convolution2D,
    gy: Convolution2D,
    magnitude: GenericImage<i32, 1>,
}

impl Sobel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calculate<T: Plant>(&mut self, src: &GenericImage<T, 1>) {
        self.gx.convolve3_horizontal(src, 1, 0, -1);
        self.gx.convolve3_vertical_in_place(1, 2, 1);
        self.gy.convolve3_horizontal(src, 1, 2, 1);
        self.gy.convolve3_vertical_in_place(1, 0, -1);

        self.magnitude.create(src.width(), src.height());
        let gradients = self.gx.data().iter().zip(self.gy.data());
        for (m, (&gx, &gy)) in self.magnitude.data_mut().iter_mut().zip(gradients) {
            let (gx, gy) = (gx as f64, gy as f64);
            *m = (gx * gx + gy * gy).sqrt() as i32;
        }
    }

    pub fn gx(&self) -> &GenericImage<i32, 1> {
        self.gx.image()
    }

    pub fn gy(&self) -> &GenericImage<i32, 1> {
        self.gy.image()
    }

    pub fn magnitude(&self) -> &GenericImage<i32, 1> {
        &self.magnitude
    }
}
