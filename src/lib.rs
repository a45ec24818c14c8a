//! # lowvis
//!
//! Simulates what a calibrated luminance/chromaticity image looks like to
//! an observer with reduced visual acuity and contrast sensitivity, for
//! accessibility and visibility-hazard research.
//!
//! The filter is built around:
//! - a parametric contrast sensitivity function (CSF) after Chung & Legge,
//! - an FFT-based log-frequency band decomposition (Peli pyramid) with
//!   CSF-adaptive contrast thresholding,
//! - distance-transform feathering of the threshold boundary to suppress
//!   banding artifacts,
//! - chromaticity low-pass filtering with gamut clipping.
//!
//! Input and output are in-memory xyY images carrying a field of view in
//! degrees; file I/O, presets, and acuity-notation conversions are the
//! caller's business.
//!
//! ## Example
//!
//! ```rust
//! use lowvis::{filter, FieldOfView, FilterParams, ImageF, XyyImage};
//!
//! // A 64x64 achromatic image at 100 cd/m² spanning 30 degrees.
//! let luminance = ImageF::filled(64, 64, 100.0);
//! let image = XyyImage::gray(luminance, FieldOfView::new(30.0, 30.0)?)?;
//!
//! // Simulate moderate acuity and contrast sensitivity loss.
//! let params = FilterParams::new().with_acuity(0.3).with_contrast(0.5);
//! let simulated = filter(&image, &params)?;
//!
//! assert_eq!(simulated.width(), 64);
//! assert_eq!(simulated.height(), 64);
//! # Ok::<(), lowvis::FilterError>(())
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::too_many_lines)]

pub(crate) mod bands;
pub(crate) mod chroma;
pub(crate) mod consts;
pub mod csf;
pub mod distance;
pub(crate) mod fft;
pub mod image;
pub mod margin;

pub use csf::CsfModel;
pub use distance::{dilate, distance_transform};
pub use image::{FieldOfView, ImageB, ImageF, XyyImage};
pub use margin::{add_margin, strip_margin, MarginBackground, MarginMethod};

// Re-export imgref types for the caller boundary.
pub use imgref::{Img, ImgRef, ImgVec};

/// Error type for filter operations.
///
/// Every anomaly except the "no above-threshold contrast" diagnostic (which
/// is a `log::warn!` and lets processing complete) is a typed error, so a
/// batch-processing caller can skip one image instead of aborting.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FilterError {
    /// A scalar parameter is outside its domain.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// Paired images have different dimensions.
    SizeMismatch {
        /// First image width.
        w1: usize,
        /// First image height.
        h1: usize,
        /// Second image width.
        w2: usize,
        /// Second image height.
        h2: usize,
    },
    /// Image too small to process (minimum 2x2).
    ImageTooSmall {
        /// Image width.
        width: usize,
        /// Image height.
        height: usize,
    },
    /// Field of view is non-positive or non-finite; frequency mapping is
    /// impossible without it.
    InvalidFieldOfView {
        /// Horizontal extent in degrees.
        horiz: f64,
        /// Vertical extent in degrees.
        vert: f64,
    },
    /// Parallel or coincident lines during gamut clipping. Unreachable for
    /// valid chromaticity; signals a logic defect rather than bad input.
    DegenerateGeometry,
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter { name, value } => {
                write!(f, "invalid parameter {name}: {value}")
            }
            Self::SizeMismatch { w1, h1, w2, h2 } => {
                write!(f, "image dimensions don't match: {w1}x{h1} vs {w2}x{h2}")
            }
            Self::ImageTooSmall { width, height } => {
                write!(f, "image too small: {width}x{height} (minimum 2x2)")
            }
            Self::InvalidFieldOfView { horiz, vert } => {
                write!(f, "invalid field of view: {horiz} x {vert} degrees")
            }
            Self::DegenerateGeometry => {
                write!(f, "degenerate line intersection during gamut clipping")
            }
        }
    }
}

impl std::error::Error for FilterError {}

/// Low-vision simulation parameters.
///
/// Use the builder pattern to construct:
/// ```rust
/// use lowvis::FilterParams;
///
/// let params = FilterParams::new()
///     .with_acuity(0.25)      // peak frequency at 25% of normal
///     .with_contrast(0.5)     // peak sensitivity at 50% of normal
///     .with_saturation(0.8)   // desaturate toward the white point
///     .with_smoothing(false); // hard thresholding, no feathering
/// ```
#[derive(Debug, Clone)]
pub struct FilterParams {
    acuity: f64,
    contrast: f64,
    smoothing: bool,
    saturation: f64,
    csf: CsfModel,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            acuity: 1.0,
            contrast: 1.0,
            smoothing: true,
            saturation: 1.0,
            csf: CsfModel::default(),
        }
    }
}

impl FilterParams {
    /// Creates a new `FilterParams` with normal-vision defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the acuity adjustment: the ratio of impaired to normal
    /// peak-sensitivity frequency, in (0, ∞). Clinical cutoff-referenced
    /// acuity converts through [`CsfModel::cutoff_acuity_adjust`].
    #[must_use]
    pub fn with_acuity(mut self, acuity: f64) -> Self {
        self.acuity = acuity;
        self
    }

    /// Sets the contrast adjustment: the ratio of impaired to normal peak
    /// sensitivity, in (0, 1].
    #[must_use]
    pub fn with_contrast(mut self, contrast: f64) -> Self {
        self.contrast = contrast;
        self
    }

    /// Enables or disables distance-transform feathering of the threshold
    /// boundary. Disabling it produces hard cuts that can band.
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Sets the saturation factor: ≤ 0 for achromatic output at the white
    /// point, values below 1 blend toward the white point, ≥ 1 keeps the
    /// filtered chromaticity.
    #[must_use]
    pub fn with_saturation(mut self, saturation: f64) -> Self {
        self.saturation = saturation;
        self
    }

    /// Replaces the normal-vision CSF parameterization.
    #[must_use]
    pub fn with_csf(mut self, csf: CsfModel) -> Self {
        self.csf = csf;
        self
    }

    /// Returns the acuity adjustment.
    #[must_use]
    pub fn acuity(&self) -> f64 {
        self.acuity
    }

    /// Returns the contrast adjustment.
    #[must_use]
    pub fn contrast(&self) -> f64 {
        self.contrast
    }

    /// Returns whether feathering is enabled.
    #[must_use]
    pub fn smoothing(&self) -> bool {
        self.smoothing
    }

    /// Returns the saturation factor.
    #[must_use]
    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    /// Returns the CSF parameterization.
    #[must_use]
    pub fn csf(&self) -> &CsfModel {
        &self.csf
    }
}

/// Filters an xyY image through the low-vision simulation.
///
/// The luminance plane goes through the CSF band pyramid; the chromaticity
/// planes are low-pass filtered, blended by the saturation factor, and
/// clipped to the gamut triangle. The output has identical dimensions,
/// field of view, description, and exposure.
///
/// Callers concerned about FFT wraparound artifacts should pad with
/// [`add_margin`] first and [`strip_margin`] the result.
///
/// # Errors
/// - [`FilterError::ImageTooSmall`] for images smaller than 2x2.
/// - [`FilterError::InvalidParameter`] for out-of-domain acuity, contrast,
///   or saturation.
/// - [`FilterError::DegenerateGeometry`] if gamut clipping hits a parallel
///   line intersection (indicates a logic defect, not bad input).
pub fn filter(image: &XyyImage, params: &FilterParams) -> Result<XyyImage, FilterError> {
    let width = image.width();
    let height = image.height();
    if width < 2 || height < 2 {
        return Err(FilterError::ImageTooSmall { width, height });
    }

    let fov_deg = image.fov().max_deg();

    let filtered_luminance = bands::filter_luminance(
        image.luminance(),
        fov_deg,
        params.acuity,
        params.contrast,
        params.smoothing,
        &params.csf,
    )?;

    let (raw_x, raw_y) = chroma::filter_chromaticity(
        image.chroma_x(),
        image.chroma_y(),
        fov_deg,
        params.acuity,
        params.contrast,
        params.saturation,
        &params.csf,
    )?;

    let mut chroma_x = ImageF::new(width, height);
    let mut chroma_y = ImageF::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let (cx, cy) = chroma::clip_to_gamut(
                f64::from(raw_x.get(x, y)),
                f64::from(raw_y.get(x, y)),
            )?;
            chroma_x.set(x, y, cx as f32);
            chroma_y.set(x, y, cy as f32);
        }
    }

    Ok(image.with_same_metadata(filtered_luminance, chroma_x, chroma_y, image.fov()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_defaults() {
        let params = FilterParams::default();
        assert!((params.acuity() - 1.0).abs() < 1e-12);
        assert!((params.contrast() - 1.0).abs() < 1e-12);
        assert!(params.smoothing());
        assert!((params.saturation() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_filter_preserves_shape_and_metadata() {
        let lum = ImageF::filled(16, 16, 100.0);
        let mut image = XyyImage::gray(lum, FieldOfView::new(10.0, 10.0).unwrap()).unwrap();
        image.set_description("test scene");
        image.set_exposure(2.0);

        let out = filter(&image, &FilterParams::default()).unwrap();
        assert_eq!(out.width(), 16);
        assert_eq!(out.height(), 16);
        assert_eq!(out.fov(), image.fov());
        assert_eq!(out.description(), Some("test scene"));
        assert!((out.exposure() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_filter_rejects_tiny_images() {
        let lum = ImageF::filled(1, 1, 100.0);
        let image = XyyImage::gray(lum, FieldOfView::new(10.0, 10.0).unwrap()).unwrap();
        assert!(matches!(
            filter(&image, &FilterParams::default()),
            Err(FilterError::ImageTooSmall { .. })
        ));
    }

    #[test]
    fn test_filter_rejects_bad_params() {
        let lum = ImageF::filled(8, 8, 100.0);
        let image = XyyImage::gray(lum, FieldOfView::new(10.0, 10.0).unwrap()).unwrap();

        let bad_acuity = FilterParams::new().with_acuity(0.0);
        assert!(matches!(
            filter(&image, &bad_acuity),
            Err(FilterError::InvalidParameter { name: "acuity_adjust", .. })
        ));

        let bad_contrast = FilterParams::new().with_contrast(2.0);
        assert!(matches!(
            filter(&image, &bad_contrast),
            Err(FilterError::InvalidParameter { name: "contrast_adjust", .. })
        ));
    }

    #[test]
    fn test_zero_saturation_gives_achromatic_output() {
        let mut lum = ImageF::filled(16, 16, 100.0);
        lum.set(8, 8, 150.0);
        let cx = ImageF::filled(16, 16, 0.45);
        let cy = ImageF::filled(16, 16, 0.40);
        let image = XyyImage::from_planes(lum, cx, cy, FieldOfView::new(10.0, 10.0).unwrap())
            .unwrap();

        let out = filter(&image, &FilterParams::new().with_saturation(0.0)).unwrap();
        for y in 0..16 {
            for x in 0..16 {
                assert!((out.chroma_x().get(x, y) - 1.0 / 3.0).abs() < 1e-5);
                assert!((out.chroma_y().get(x, y) - 1.0 / 3.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_error_display() {
        let err = FilterError::InvalidParameter {
            name: "acuity_adjust",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "invalid parameter acuity_adjust: -1");

        let err = FilterError::SizeMismatch {
            w1: 4,
            h1: 4,
            w2: 8,
            h2: 8,
        };
        assert_eq!(err.to_string(), "image dimensions don't match: 4x4 vs 8x8");
    }
}
