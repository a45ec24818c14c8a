//! Band decomposition and CSF-adaptive thresholding of the luminance plane.
//!
//! The luminance channel is split into log2-spaced radial-frequency cosine
//! bands (Peli 1990). Each band's local Michelson contrast is compared
//! against the observer's contrast threshold at the band's peak frequency;
//! contrast below threshold is removed. With smoothing enabled, the removal
//! boundary is feathered using the distance transform so the cut does not
//! produce banding artifacts.
//!
//! The DC value plus the sum of the processed bands reconstructs the
//! filtered luminance; the raw bands always accumulate into a local
//! luminance estimate that drives contrast normalization for the bands
//! above them.

use log::warn;

use crate::consts::{FEATHER_RADIUS_FACTOR, LUMINANCE_EPSILON, SMOOTHING_RADIUS_FACTOR};
use crate::csf::CsfModel;
use crate::distance::distance_transform;
use crate::fft::{radial_frequency_map, Fft2d, Spectrum};
use crate::image::{ImageB, ImageF};
use crate::FilterError;

/// log2(radius) for the DC bin, below any real band index so the DC bin
/// never falls inside a bandpass window.
const DC_LOG2_SENTINEL: f32 = -100.0;

/// Filters the luminance plane through the CSF band pyramid.
///
/// `fov_deg` is the angular extent used to convert cycles/image into
/// cycles/degree (the larger image axis extent).
///
/// # Errors
/// [`FilterError::InvalidParameter`] for out-of-domain acuity or contrast
/// adjustments, or a non-finite/non-positive `fov_deg`.
pub(crate) fn filter_luminance(
    luminance: &ImageF,
    fov_deg: f64,
    acuity_adjust: f64,
    contrast_adjust: f64,
    smoothing: bool,
    csf: &CsfModel,
) -> Result<ImageF, FilterError> {
    if !fov_deg.is_finite() || fov_deg <= 0.0 {
        return Err(FilterError::InvalidFieldOfView {
            horiz: fov_deg,
            vert: fov_deg,
        });
    }
    // Validate the observer parameters once, before the loop; the loop body
    // is then error-free arithmetic.
    let peak_freq_limit = csf.peak_frequency(acuity_adjust, contrast_adjust)?;

    let width = luminance.width();
    let height = luminance.height();
    let max_dim = width.max(height);

    let fft = Fft2d::new(width, height);
    let spectrum = fft.forward(luminance);

    let log2_radius: Vec<f32> = radial_frequency_map(width, height)
        .iter()
        .map(|&r| if r > 0.0 { r.log2() } else { DC_LOG2_SENTINEL })
        .collect();

    let dc = spectrum.get(0, 0).re / (width * height) as f32;
    let mut local_luminance = ImageF::filled(width, height, dc);
    let mut filtered = ImageF::filled(width, height, dc);

    let top_band = (max_dim as f64).log2().ceil() as u32;
    let mut kept_pixels = 0usize;

    for band in 0..=top_band {
        let peak_freq_image = f64::from(band).exp2();
        let peak_freq_angle = peak_freq_image / fov_deg;
        let peak_sensitivity = csf.sensitivity(peak_freq_angle, acuity_adjust, contrast_adjust)?;

        // Past the CSF peak with sensitivity below 1.0, every remaining
        // higher band is invisible as well.
        if peak_freq_angle > peak_freq_limit && peak_sensitivity < 1.0 {
            break;
        }

        let raw = extract_band(&fft, &spectrum, &log2_radius, band);

        if peak_sensitivity >= 1.0 {
            let processed = if smoothing {
                feather_band(
                    &raw,
                    &local_luminance,
                    peak_sensitivity,
                    peak_freq_image,
                    max_dim,
                    &mut kept_pixels,
                )
            } else {
                threshold_band(&raw, &local_luminance, peak_sensitivity, &mut kept_pixels)
            };
            filtered.add_assign(&processed);
        }
        // Below-threshold low bands skip the output but still adapt the
        // local luminance for the bands above them.
        local_luminance.add_assign(&raw);
    }

    if kept_pixels == 0 {
        warn!("no above-threshold contrast in any band; output is near-uniform");
    }

    Ok(filtered)
}

/// Extracts the spatial-domain contrast band centered at `2^band`
/// cycles/image with a raised-cosine window two octaves wide.
fn extract_band(fft: &Fft2d, spectrum: &Spectrum, log2_radius: &[f32], band: u32) -> ImageF {
    let center = band as f32;
    let weights: Vec<f32> = log2_radius
        .iter()
        .map(|&lr| {
            let d = lr - center;
            if d > -1.0 && d < 1.0 {
                0.5 * (1.0 + (std::f32::consts::PI * d).cos())
            } else {
                0.0
            }
        })
        .collect();
    fft.inverse(&spectrum.scaled_by(&weights))
}

/// Hard thresholding: zero every pixel whose normalized contrast is below
/// the observer's threshold for this band.
fn threshold_band(
    raw: &ImageF,
    local_luminance: &ImageF,
    peak_sensitivity: f64,
    kept_pixels: &mut usize,
) -> ImageF {
    let threshold = (1.0 / peak_sensitivity) as f32;
    let width = raw.width();
    let height = raw.height();
    let mut out = ImageF::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let lum = local_luminance.get(x, y).max(LUMINANCE_EPSILON);
            let normalized = raw.get(x, y) / lum;
            if normalized.abs() >= threshold {
                out.set(x, y, raw.get(x, y));
                *kept_pixels += 1;
            }
        }
    }
    out
}

/// Thresholding with distance feathering: below-threshold contrast near an
/// above-threshold region is restored with a weight of 1.0 within the
/// feather radius, decaying linearly to 0 at the smoothing radius. Positive
/// and negative contrast feather independently so opposite-phase regions
/// cannot bleed into each other.
fn feather_band(
    raw: &ImageF,
    local_luminance: &ImageF,
    peak_sensitivity: f64,
    peak_freq_image: f64,
    max_dim: usize,
    kept_pixels: &mut usize,
) -> ImageF {
    let threshold = (1.0 / peak_sensitivity) as f32;
    let width = raw.width();
    let height = raw.height();
    let mut out = ImageF::new(width, height);

    let smoothing_radius = (SMOOTHING_RADIUS_FACTOR * max_dim as f64 / peak_freq_image)
        .clamp(1.0, max_dim as f64) as f32;
    let feather_radius = (FEATHER_RADIUS_FACTOR as f32) * smoothing_radius;

    for sign in [1.0f32, -1.0] {
        let mut seeds = ImageB::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let lum = local_luminance.get(x, y).max(LUMINANCE_EPSILON);
                let normalized = sign * raw.get(x, y) / lum;
                if normalized >= threshold {
                    seeds.set(x, y, true);
                }
            }
        }
        if !seeds.any() {
            continue;
        }

        let squared_distance = distance_transform(&seeds);

        for y in 0..height {
            for x in 0..width {
                if seeds.get(x, y) {
                    out.set(x, y, raw.get(x, y));
                    *kept_pixels += 1;
                } else if sign * raw.get(x, y) > 0.0 {
                    let d = squared_distance.get(x, y).sqrt();
                    let weight = if d <= feather_radius {
                        1.0
                    } else if d < smoothing_radius {
                        (smoothing_radius - d) / (smoothing_radius - feather_radius)
                    } else {
                        0.0
                    };
                    out.set(x, y, weight * raw.get(x, y));
                }
            }
        }
    }
    out
}
