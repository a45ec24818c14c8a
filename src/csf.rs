//! Contrast sensitivity function model.
//!
//! Sensitivity (the reciprocal of the Michelson contrast threshold) is
//! modeled as a dual-slope log-parabola around the normal-vision peak,
//! following Chung & Legge (2016). Two parameters degrade the curve:
//!
//! - `acuity_adjust`: ratio of impaired to normal peak-sensitivity
//!   frequency, in (0, ∞) (practically ≤ ~4),
//! - `contrast_adjust`: ratio of impaired to normal peak sensitivity,
//!   in (0, 1].
//!
//! Clinical acuity values are reported relative to the high-frequency
//! cutoff rather than the peak; [`CsfModel::cutoff_acuity_adjust`]
//! converts between the two conventions.

use crate::consts::{K_LEFT, K_RIGHT, NORMAL_PEAK_FREQUENCY, NORMAL_PEAK_SENSITIVITY};
use crate::FilterError;

/// Normal-vision CSF parameterization.
///
/// Carried explicitly by the caller instead of process-wide state, so two
/// filter calls with different parameterizations cannot interfere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsfModel {
    /// Peak contrast sensitivity for normal vision.
    pub peak_sensitivity: f64,
    /// Frequency of peak sensitivity for normal vision, cycles/degree.
    pub peak_frequency: f64,
}

impl Default for CsfModel {
    fn default() -> Self {
        Self {
            peak_sensitivity: NORMAL_PEAK_SENSITIVITY,
            peak_frequency: NORMAL_PEAK_FREQUENCY,
        }
    }
}

fn check_acuity(acuity_adjust: f64) -> Result<(), FilterError> {
    if !acuity_adjust.is_finite() || acuity_adjust <= 0.0 {
        return Err(FilterError::InvalidParameter {
            name: "acuity_adjust",
            value: acuity_adjust,
        });
    }
    Ok(())
}

fn check_contrast(contrast_adjust: f64) -> Result<(), FilterError> {
    if !contrast_adjust.is_finite() || contrast_adjust <= 0.0 || contrast_adjust > 1.0 {
        return Err(FilterError::InvalidParameter {
            name: "contrast_adjust",
            value: contrast_adjust,
        });
    }
    Ok(())
}

impl CsfModel {
    /// Contrast sensitivity at a spatial frequency, for an observer whose
    /// peak frequency and peak sensitivity are scaled by `acuity_adjust`
    /// and `contrast_adjust`.
    ///
    /// The returned sensitivity is always strictly positive.
    ///
    /// # Errors
    /// [`FilterError::InvalidParameter`] if `freq` is not strictly positive
    /// and finite, `acuity_adjust` ≤ 0, or `contrast_adjust` outside (0, 1].
    pub fn sensitivity(
        &self,
        freq: f64,
        acuity_adjust: f64,
        contrast_adjust: f64,
    ) -> Result<f64, FilterError> {
        if !freq.is_finite() || freq <= 0.0 {
            return Err(FilterError::InvalidParameter {
                name: "freq",
                value: freq,
            });
        }
        check_acuity(acuity_adjust)?;
        check_contrast(contrast_adjust)?;

        let log_freq = freq.log10();
        let log_peak_freq = self.peak_frequency.log10() + acuity_adjust.log10();
        let log_peak_sens = self.peak_sensitivity.log10() + contrast_adjust.log10();

        let k = if log_freq < log_peak_freq {
            K_LEFT
        } else {
            K_RIGHT
        };
        let delta = log_freq - log_peak_freq;

        Ok(10.0f64.powf(log_peak_sens - k * k * delta * delta))
    }

    /// Peak sensitivity of the adjusted curve: `contrast_adjust · Sn`.
    ///
    /// # Errors
    /// [`FilterError::InvalidParameter`] for out-of-domain adjustments.
    pub fn peak_sensitivity(
        &self,
        acuity_adjust: f64,
        contrast_adjust: f64,
    ) -> Result<f64, FilterError> {
        check_acuity(acuity_adjust)?;
        check_contrast(contrast_adjust)?;
        Ok(contrast_adjust * self.peak_sensitivity)
    }

    /// Frequency of peak sensitivity of the adjusted curve:
    /// `acuity_adjust · Fn`, cycles/degree.
    ///
    /// # Errors
    /// [`FilterError::InvalidParameter`] for out-of-domain adjustments.
    pub fn peak_frequency(
        &self,
        acuity_adjust: f64,
        contrast_adjust: f64,
    ) -> Result<f64, FilterError> {
        check_acuity(acuity_adjust)?;
        check_contrast(contrast_adjust)?;
        Ok(acuity_adjust * self.peak_frequency)
    }

    /// High-frequency cutoff: the zero crossing of the right branch, where
    /// sensitivity falls to 1.0 (threshold contrast reaches 100%).
    ///
    /// # Errors
    /// [`FilterError::InvalidParameter`] for out-of-domain adjustments, or
    /// when the adjusted peak sensitivity is below 1.0 so the curve never
    /// reaches threshold (`log10(c · Sn) < 0`).
    pub fn cutoff_frequency(
        &self,
        acuity_adjust: f64,
        contrast_adjust: f64,
    ) -> Result<f64, FilterError> {
        check_acuity(acuity_adjust)?;
        check_contrast(contrast_adjust)?;

        let log_peak_sens = self.peak_sensitivity.log10() + contrast_adjust.log10();
        if log_peak_sens < 0.0 {
            return Err(FilterError::InvalidParameter {
                name: "contrast_adjust",
                value: contrast_adjust,
            });
        }

        let log_cutoff =
            self.peak_frequency.log10() + acuity_adjust.log10() + log_peak_sens.sqrt() / K_RIGHT;
        let cutoff = 10.0f64.powf(log_cutoff);
        if !cutoff.is_finite() || cutoff <= 0.0 {
            return Err(FilterError::InvalidParameter {
                name: "acuity_adjust",
                value: acuity_adjust,
            });
        }
        Ok(cutoff)
    }

    /// Inverse of [`Self::cutoff_frequency`]: the peak frequency whose
    /// right branch crosses threshold at `cutoff`, given `contrast_adjust`.
    ///
    /// # Errors
    /// [`FilterError::InvalidParameter`] if `cutoff` is not strictly
    /// positive and finite, `contrast_adjust` is out of domain, or
    /// `log10(c · Sn) < 0`.
    pub fn peak_from_cutoff(&self, cutoff: f64, contrast_adjust: f64) -> Result<f64, FilterError> {
        if !cutoff.is_finite() || cutoff <= 0.0 {
            return Err(FilterError::InvalidParameter {
                name: "cutoff",
                value: cutoff,
            });
        }
        check_contrast(contrast_adjust)?;

        let log_peak_sens = self.peak_sensitivity.log10() + contrast_adjust.log10();
        if log_peak_sens < 0.0 {
            return Err(FilterError::InvalidParameter {
                name: "contrast_adjust",
                value: contrast_adjust,
            });
        }

        Ok(10.0f64.powf(cutoff.log10() - log_peak_sens.sqrt() / K_RIGHT))
    }

    /// Converts a clinically reported acuity ratio (defined against the
    /// cutoff frequency) into the `acuity_adjust` expected by
    /// [`Self::sensitivity`] (defined against the peak frequency).
    ///
    /// The clinical ratio scales the normal-vision cutoff; the matching
    /// peak for the requested `contrast_adjust` is solved from that cutoff
    /// and normalized by the normal peak frequency.
    ///
    /// # Errors
    /// [`FilterError::InvalidParameter`] for out-of-domain inputs.
    pub fn cutoff_acuity_adjust(
        &self,
        cutoff_acuity: f64,
        contrast_adjust: f64,
    ) -> Result<f64, FilterError> {
        check_acuity(cutoff_acuity)?;
        let normal_cutoff = self.cutoff_frequency(1.0, 1.0)?;
        let peak = self.peak_from_cutoff(cutoff_acuity * normal_cutoff, contrast_adjust)?;
        Ok(peak / self.peak_frequency(1.0, contrast_adjust)?)
    }
}
