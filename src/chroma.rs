//! Chrominance filtering and gamut clipping.
//!
//! The two chromaticity planes are low-pass filtered in the frequency
//! domain, using the observer's CSF (normalized to a peak of 1.0) as an
//! MTF. The rolloff below the CSF peak is suppressed so large uniform color
//! fields are not dimmed. A saturation factor then blends the result toward
//! the display white point, and out-of-gamut chromaticities are projected
//! back onto the (0,0)-(1,0)-(0,1) triangle along the line from the white
//! point through the value.

use crate::consts::{WHITE_POINT_X, WHITE_POINT_Y};
use crate::csf::CsfModel;
use crate::fft::{radial_frequency_map, Fft2d};
use crate::image::ImageF;
use crate::FilterError;

/// Low-pass filters both chromaticity planes and applies the saturation
/// blend. Gamut clipping is left to [`clip_to_gamut`], applied per pixel by
/// the caller once the filtered luminance is known.
///
/// - `saturation <= 0.0`: chroma filtering is skipped entirely and both
///   planes are returned at the white point (pure achromatic output).
/// - `0 < saturation < 1`: `out = saturation * filtered + (1 - saturation) * white_point`.
/// - `saturation >= 1.0`: unmodified filtered chromaticity.
///
/// # Errors
/// [`FilterError::InvalidParameter`] for a non-finite saturation or
/// out-of-domain acuity/contrast adjustments.
pub(crate) fn filter_chromaticity(
    chroma_x: &ImageF,
    chroma_y: &ImageF,
    fov_deg: f64,
    acuity_adjust: f64,
    contrast_adjust: f64,
    saturation: f64,
    csf: &CsfModel,
) -> Result<(ImageF, ImageF), FilterError> {
    if !saturation.is_finite() {
        return Err(FilterError::InvalidParameter {
            name: "saturation",
            value: saturation,
        });
    }

    let width = chroma_x.width();
    let height = chroma_x.height();

    if saturation <= 0.0 {
        return Ok((
            ImageF::filled(width, height, WHITE_POINT_X as f32),
            ImageF::filled(width, height, WHITE_POINT_Y as f32),
        ));
    }

    let mtf = chroma_mtf(width, height, fov_deg, acuity_adjust, contrast_adjust, csf)?;
    let fft = Fft2d::new(width, height);

    let mut filtered_x = fft.inverse(&fft.forward(chroma_x).scaled_by(&mtf));
    let mut filtered_y = fft.inverse(&fft.forward(chroma_y).scaled_by(&mtf));

    if saturation < 1.0 {
        let s = saturation as f32;
        for (plane, white) in [
            (&mut filtered_x, WHITE_POINT_X as f32),
            (&mut filtered_y, WHITE_POINT_Y as f32),
        ] {
            for y in 0..height {
                for v in plane.row_mut(y) {
                    *v = s * *v + (1.0 - s) * white;
                }
            }
        }
    }

    Ok((filtered_x, filtered_y))
}

/// Frequency-domain MTF for chromaticity: the CSF normalized to a peak of
/// 1.0, with the low-frequency side held at 1.0 so low-frequency colors are
/// not dimmed. The DC bin always passes unchanged.
fn chroma_mtf(
    width: usize,
    height: usize,
    fov_deg: f64,
    acuity_adjust: f64,
    contrast_adjust: f64,
    csf: &CsfModel,
) -> Result<Vec<f32>, FilterError> {
    let peak_freq = csf.peak_frequency(acuity_adjust, contrast_adjust)?;
    let peak_sens = csf.peak_sensitivity(acuity_adjust, contrast_adjust)?;

    radial_frequency_map(width, height)
        .iter()
        .map(|&radius| {
            if radius <= 0.0 {
                return Ok(1.0);
            }
            let freq = f64::from(radius) / fov_deg;
            if freq <= peak_freq {
                Ok(1.0)
            } else {
                let s = csf.sensitivity(freq, acuity_adjust, contrast_adjust)?;
                Ok((s / peak_sens) as f32)
            }
        })
        .collect()
}

/// Projects an out-of-gamut chromaticity back onto the canonical gamut
/// triangle with vertices (0,0), (1,0), (0,1), along the line from the
/// white point through the value. In-gamut values pass through unchanged.
///
/// # Errors
/// [`FilterError::DegenerateGeometry`] if the projection line is parallel
/// or coincident with every candidate edge. Valid chromaticity can never
/// reach this; it signals a logic defect, not bad input.
pub fn clip_to_gamut(x: f64, y: f64) -> Result<(f64, f64), FilterError> {
    if x >= 0.0 && y >= 0.0 && x + y <= 1.0 {
        return Ok((x, y));
    }

    // Triangle edges as point pairs.
    const EDGES: [((f64, f64), (f64, f64)); 3] = [
        ((0.0, 0.0), (1.0, 0.0)),
        ((0.0, 0.0), (0.0, 1.0)),
        ((1.0, 0.0), (0.0, 1.0)),
    ];

    let wp = (WHITE_POINT_X, WHITE_POINT_Y);
    let mut best: Option<(f64, (f64, f64))> = None;

    for (e1, e2) in EDGES {
        let Some((px, py)) = line_intersection(wp, (x, y), e1, e2) else {
            continue;
        };
        // Keep intersections on the edge segment, on the outgoing ray.
        let on_edge = |p: f64, a: f64, b: f64| p >= a.min(b) - 1e-12 && p <= a.max(b) + 1e-12;
        if !(on_edge(px, e1.0, e2.0) && on_edge(py, e1.1, e2.1)) {
            continue;
        }
        let t = (px - wp.0) * (x - wp.0) + (py - wp.1) * (y - wp.1);
        if t <= 0.0 {
            continue;
        }
        let dist2 = (px - wp.0).powi(2) + (py - wp.1).powi(2);
        if best.map_or(true, |(d, _)| dist2 < d) {
            best = Some((dist2, (px, py)));
        }
    }

    match best {
        Some((_, (px, py))) => Ok((px.max(0.0), py.max(0.0))),
        None => Err(FilterError::DegenerateGeometry),
    }
}

/// Intersection of the infinite lines p1-p2 and p3-p4. `None` for parallel
/// or coincident lines.
fn line_intersection(
    p1: (f64, f64),
    p2: (f64, f64),
    p3: (f64, f64),
    p4: (f64, f64),
) -> Option<(f64, f64)> {
    let denom = (p1.0 - p2.0) * (p3.1 - p4.1) - (p1.1 - p2.1) * (p3.0 - p4.0);
    if denom.abs() < 1e-15 {
        return None;
    }
    let a = p1.0 * p2.1 - p1.1 * p2.0;
    let b = p3.0 * p4.1 - p3.1 * p4.0;
    Some((
        (a * (p3.0 - p4.0) - (p1.0 - p2.0) * b) / denom,
        (a * (p3.1 - p4.1) - (p1.1 - p2.1) * b) / denom,
    ))
}
