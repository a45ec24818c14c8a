//! 2D FFT wrappers over rustfft.
//!
//! The forward transform is unnormalized; the inverse divides by the FFT
//! size, so a forward/inverse round trip reproduces the input. The 2D
//! transform is a row pass, a transpose, and a column pass.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::image::ImageF;

/// Complex-valued spectrum of a real image, row-major with the DC bin at
/// index (0, 0) and wrapped (signed) frequencies elsewhere.
#[derive(Debug, Clone)]
pub struct Spectrum {
    data: Vec<Complex<f32>>,
    width: usize,
    height: usize,
}

impl Spectrum {
    /// Gets a frequency bin.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Complex<f32> {
        self.data[y * self.width + x]
    }

    /// Returns a copy scaled bin-by-bin by real weights (row-major,
    /// `width * height` entries). Used to apply frequency-domain MTFs and
    /// bandpass windows.
    ///
    /// # Panics
    /// Panics if the weight slice length doesn't match the spectrum size.
    #[must_use]
    pub fn scaled_by(&self, weights: &[f32]) -> Self {
        assert_eq!(weights.len(), self.data.len());
        let mut out = self.clone();
        for (bin, &w) in out.data.iter_mut().zip(weights) {
            *bin *= w;
        }
        out
    }
}

/// Planned forward/inverse 2D FFT for one image size.
pub struct Fft2d {
    row_forward: Arc<dyn Fft<f32>>,
    col_forward: Arc<dyn Fft<f32>>,
    row_inverse: Arc<dyn Fft<f32>>,
    col_inverse: Arc<dyn Fft<f32>>,
    width: usize,
    height: usize,
}

impl Fft2d {
    /// Plans transforms for `width` x `height` images.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            row_forward: planner.plan_fft_forward(width),
            col_forward: planner.plan_fft_forward(height),
            row_inverse: planner.plan_fft_inverse(width),
            col_inverse: planner.plan_fft_inverse(height),
            width,
            height,
        }
    }

    fn transform(
        &self,
        mut data: Vec<Complex<f32>>,
        row_fft: &Arc<dyn Fft<f32>>,
        col_fft: &Arc<dyn Fft<f32>>,
    ) -> Vec<Complex<f32>> {
        let (width, height) = (self.width, self.height);

        for row in data.chunks_exact_mut(width) {
            row_fft.process(row);
        }

        let mut transposed = vec![Complex::new(0.0f32, 0.0); width * height];
        for y in 0..height {
            for x in 0..width {
                transposed[x * height + y] = data[y * width + x];
            }
        }

        for col in transposed.chunks_exact_mut(height) {
            col_fft.process(col);
        }

        for y in 0..height {
            for x in 0..width {
                data[y * width + x] = transposed[x * height + y];
            }
        }
        data
    }

    /// Forward 2D FFT of a real image (unnormalized: the DC bin holds the
    /// pixel sum).
    ///
    /// # Panics
    /// Panics if the image size doesn't match the planned size.
    #[must_use]
    pub fn forward(&self, image: &ImageF) -> Spectrum {
        assert_eq!(image.width(), self.width);
        assert_eq!(image.height(), self.height);

        let mut data = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            data.extend(image.row(y).iter().map(|&v| Complex::new(v, 0.0)));
        }

        let data = self.transform(data, &self.row_forward, &self.col_forward);
        Spectrum {
            data,
            width: self.width,
            height: self.height,
        }
    }

    /// Inverse 2D FFT, returning the real part normalized by the FFT size.
    ///
    /// # Panics
    /// Panics if the spectrum size doesn't match the planned size.
    #[must_use]
    pub fn inverse(&self, spectrum: &Spectrum) -> ImageF {
        assert_eq!(spectrum.width, self.width);
        assert_eq!(spectrum.height, self.height);

        let data = self.transform(spectrum.data.clone(), &self.row_inverse, &self.col_inverse);

        let norm = 1.0 / (self.width * self.height) as f32;
        let mut out = ImageF::new(self.width, self.height);
        for y in 0..self.height {
            let row = out.row_mut(y);
            for x in 0..self.width {
                row[x] = data[y * self.width + x].re * norm;
            }
        }
        out
    }
}

/// Per-bin radial frequency in cycles/image, using wrapped (signed)
/// frequency coordinates. The DC bin has radius 0.
#[must_use]
pub fn radial_frequency_map(width: usize, height: usize) -> Vec<f32> {
    let mut map = vec![0.0f32; width * height];
    for y in 0..height {
        let fy = y.min(height - y) as f32;
        for x in 0..width {
            let fx = x.min(width - x) as f32;
            map[y * width + x] = (fx * fx + fy * fy).sqrt();
        }
    }
    map
}
