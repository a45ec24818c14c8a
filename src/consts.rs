//! Constants for the CSF model and the band filtering engine.
//!
//! The contrast sensitivity constants are from Chung & Legge,
//! "Comparing the shape of contrast sensitivity functions for normal
//! and low vision" (2016).

// ============================================================================
// Chung & Legge CSF Constants
// ============================================================================

/// Left (low-frequency) slope of the dual-slope log-parabola.
pub const K_LEFT: f64 = 0.68;

/// Right (high-frequency) slope of the dual-slope log-parabola.
pub const K_RIGHT: f64 = 1.28;

/// Peak contrast sensitivity for normal vision.
pub const NORMAL_PEAK_SENSITIVITY: f64 = 199.0;

/// Spatial frequency of peak sensitivity for normal vision, in cycles/degree.
pub const NORMAL_PEAK_FREQUENCY: f64 = 0.914;

// ============================================================================
// Band Engine Constants
// ============================================================================

/// Smoothing radius as a fraction of the band wavelength in pixels.
pub const SMOOTHING_RADIUS_FACTOR: f64 = 0.35;

/// Feather radius as a fraction of the smoothing radius.
pub const FEATHER_RADIUS_FACTOR: f64 = 0.5;

/// Floor for local luminance when normalizing band contrast.
pub const LUMINANCE_EPSILON: f32 = 1e-6;

// ============================================================================
// Chromaticity Constants
// ============================================================================

/// Equal-energy white point, CIE x coordinate.
pub const WHITE_POINT_X: f64 = 1.0 / 3.0;

/// Equal-energy white point, CIE y coordinate.
pub const WHITE_POINT_Y: f64 = 1.0 / 3.0;
