//! Image buffer types for the low-vision filter.
//!
//! All processing happens on planar f32 buffers with row-stride support.
//! An [`XyyImage`] bundles the three xyY planes with the angular field of
//! view that maps pixel-domain frequencies onto cycles/degree.

use std::ops::{Index, IndexMut};

use imgref::{ImgRef, ImgVec};

use crate::FilterError;

/// Single-channel floating point image.
///
/// This is the primary image type used throughout the filter for
/// intermediate computations. It stores pixel values as f32 with
/// optional row padding for alignment.
#[derive(Debug, Clone)]
pub struct ImageF {
    data: Vec<f32>,
    width: usize,
    height: usize,
    stride: usize, // pixels per row (may be > width for alignment)
}

impl ImageF {
    /// Creates a new image filled with zeros.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        // Align stride to 16 floats (64 bytes)
        let stride = (width + 15) & !15;
        Self {
            data: vec![0.0; stride * height],
            width,
            height,
            stride,
        }
    }

    /// Creates an image from existing row-major data.
    ///
    /// # Panics
    /// Panics if data length doesn't match width * height.
    #[must_use]
    pub fn from_vec(data: Vec<f32>, width: usize, height: usize) -> Self {
        assert_eq!(data.len(), width * height);
        Self {
            data,
            width,
            height,
            stride: width,
        }
    }

    /// Creates an image filled with a constant value.
    #[must_use]
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        let stride = (width + 15) & !15;
        Self {
            data: vec![value; stride * height],
            width,
            height,
            stride,
        }
    }

    /// Copies pixel data from an [`ImgRef`] (the caller boundary format).
    #[must_use]
    pub fn from_imgref(img: ImgRef<'_, f32>) -> Self {
        let mut out = Self::new(img.width(), img.height());
        for (y, row) in img.rows().enumerate() {
            out.row_mut(y).copy_from_slice(row);
        }
        out
    }

    /// Converts into an [`ImgVec`] for callers, preserving the stride.
    #[must_use]
    pub fn into_imgvec(self) -> ImgVec<f32> {
        ImgVec::new_stride(self.data, self.width, self.height, self.stride)
    }

    /// Image width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns a reference to a row.
    #[inline]
    #[must_use]
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    /// Returns a mutable reference to a row.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    /// Gets a pixel value.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.stride + x]
    }

    /// Sets a pixel value.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.stride + x] = value;
    }

    /// Checks if two images have the same dimensions.
    #[must_use]
    pub fn same_size(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Adds another image into this one pixel by pixel.
    ///
    /// # Panics
    /// Panics if dimensions don't match.
    pub fn add_assign(&mut self, other: &Self) {
        assert!(self.same_size(other));
        for y in 0..self.height {
            let row_out = y * self.stride;
            for x in 0..self.width {
                self.data[row_out + x] += other.get(x, y);
            }
        }
    }

    /// Mean of all pixel values.
    #[must_use]
    pub fn mean(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 0.0;
        }
        let mut sum = 0.0f64;
        for y in 0..self.height {
            for &v in self.row(y) {
                sum += f64::from(v);
            }
        }
        (sum / (self.width * self.height) as f64) as f32
    }
}

impl Index<(usize, usize)> for ImageF {
    type Output = f32;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.data[y * self.stride + x]
    }
}

impl IndexMut<(usize, usize)> for ImageF {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.data[y * self.stride + x]
    }
}

/// Single-channel boolean mask.
///
/// Used transiently as the seed mask for the distance transform during
/// band feathering, and as the result of [`crate::distance::dilate`].
#[derive(Debug, Clone)]
pub struct ImageB {
    data: Vec<bool>,
    width: usize,
    height: usize,
}

impl ImageB {
    /// Creates a new mask with every pixel cleared.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![false; width * height],
            width,
            height,
        }
    }

    /// Mask width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Mask height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Gets a mask value.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x]
    }

    /// Sets a mask value.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        self.data[y * self.width + x] = value;
    }

    /// True if at least one pixel is marked.
    #[must_use]
    pub fn any(&self) -> bool {
        self.data.iter().any(|&v| v)
    }
}

/// Angular extent of an image, in degrees along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOfView {
    /// Horizontal extent in degrees.
    pub horiz_deg: f64,
    /// Vertical extent in degrees.
    pub vert_deg: f64,
}

impl FieldOfView {
    /// Creates a field of view, validating both extents.
    ///
    /// # Errors
    /// Returns [`FilterError::InvalidFieldOfView`] if either extent is
    /// non-finite or not strictly positive.
    pub fn new(horiz_deg: f64, vert_deg: f64) -> Result<Self, FilterError> {
        if !horiz_deg.is_finite() || !vert_deg.is_finite() || horiz_deg <= 0.0 || vert_deg <= 0.0 {
            return Err(FilterError::InvalidFieldOfView {
                horiz: horiz_deg,
                vert: vert_deg,
            });
        }
        Ok(Self {
            horiz_deg,
            vert_deg,
        })
    }

    /// The larger of the two extents, used for isotropic cycles/degree
    /// conversion of radial frequencies.
    #[must_use]
    pub fn max_deg(&self) -> f64 {
        self.horiz_deg.max(self.vert_deg)
    }
}

/// Calibrated xyY image: a luminance plane (cd/m²) plus CIE (x, y)
/// chromaticity planes, with a field of view.
///
/// Dimensions are fixed at construction. Operations that pair two images
/// require identical dimensions and fail with
/// [`FilterError::SizeMismatch`] otherwise.
#[derive(Debug, Clone)]
pub struct XyyImage {
    luminance: ImageF,
    chroma_x: ImageF,
    chroma_y: ImageF,
    fov: FieldOfView,
    description: Option<String>,
    exposure: f64,
}

impl XyyImage {
    /// Creates an image from three equally sized planes.
    ///
    /// # Errors
    /// Returns [`FilterError::SizeMismatch`] if the planes disagree in size
    /// and [`FilterError::ImageTooSmall`] for empty planes.
    pub fn from_planes(
        luminance: ImageF,
        chroma_x: ImageF,
        chroma_y: ImageF,
        fov: FieldOfView,
    ) -> Result<Self, FilterError> {
        if luminance.width() == 0 || luminance.height() == 0 {
            return Err(FilterError::ImageTooSmall {
                width: luminance.width(),
                height: luminance.height(),
            });
        }
        for plane in [&chroma_x, &chroma_y] {
            if !luminance.same_size(plane) {
                return Err(FilterError::SizeMismatch {
                    w1: luminance.width(),
                    h1: luminance.height(),
                    w2: plane.width(),
                    h2: plane.height(),
                });
            }
        }
        Ok(Self {
            luminance,
            chroma_x,
            chroma_y,
            fov,
            description: None,
            exposure: 1.0,
        })
    }

    /// Creates an achromatic image (chromaticity at the white point) from a
    /// luminance plane.
    ///
    /// # Errors
    /// Returns [`FilterError::ImageTooSmall`] for empty planes.
    pub fn gray(luminance: ImageF, fov: FieldOfView) -> Result<Self, FilterError> {
        let (w, h) = (luminance.width(), luminance.height());
        let wp_x = ImageF::filled(w, h, crate::consts::WHITE_POINT_X as f32);
        let wp_y = ImageF::filled(w, h, crate::consts::WHITE_POINT_Y as f32);
        Self::from_planes(luminance, wp_x, wp_y, fov)
    }

    /// Image width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.luminance.width()
    }

    /// Image height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.luminance.height()
    }

    /// Luminance plane in cd/m².
    #[must_use]
    pub fn luminance(&self) -> &ImageF {
        &self.luminance
    }

    /// CIE x chromaticity plane.
    #[must_use]
    pub fn chroma_x(&self) -> &ImageF {
        &self.chroma_x
    }

    /// CIE y chromaticity plane.
    #[must_use]
    pub fn chroma_y(&self) -> &ImageF {
        &self.chroma_y
    }

    /// Field of view.
    #[must_use]
    pub fn fov(&self) -> FieldOfView {
        self.fov
    }

    /// Optional free-text description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Sets the free-text description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Exposure scale applied upstream of this image.
    #[must_use]
    pub fn exposure(&self) -> f64 {
        self.exposure
    }

    /// Sets the exposure scale.
    pub fn set_exposure(&mut self, exposure: f64) {
        self.exposure = exposure;
    }

    pub(crate) fn with_same_metadata(
        &self,
        luminance: ImageF,
        chroma_x: ImageF,
        chroma_y: ImageF,
        fov: FieldOfView,
    ) -> Self {
        Self {
            luminance,
            chroma_x,
            chroma_y,
            fov,
            description: self.description.clone(),
            exposure: self.exposure,
        }
    }
}
