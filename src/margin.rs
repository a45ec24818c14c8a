//! Margin padding to suppress FFT circular-convolution artifacts.
//!
//! The FFT treats the image as periodic, so content on one edge leaks into
//! the opposite edge through every bandpass. Padding the image with margins
//! that fade toward a background level keeps the wraparound seam out of the
//! visible area. The field of view is rescaled so degrees-per-pixel is
//! preserved, and [`strip_margin`] restores the original image exactly.

use crate::image::{FieldOfView, ImageF, XyyImage};
use crate::FilterError;

/// How margin pixels are sourced before blending toward the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginMethod {
    /// Mirror interior content across the image edge.
    Reflect,
    /// Flood the value of the nearest edge pixel outward.
    Extend,
}

/// Which luminance level margin pixels fade toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginBackground {
    /// Mean of the one-pixel border of the plane.
    BorderMean,
    /// Mean of the whole plane.
    ImageMean,
}

/// Smoothstep used to blend margin content toward the background.
fn sigmoid(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Triangular-wave reflection of an out-of-bounds index into `0..n`.
fn reflect_index(i: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let mut m = i.rem_euclid(period);
    if m >= n {
        m = period - 1 - m;
    }
    m as usize
}

fn border_mean(plane: &ImageF) -> f32 {
    let width = plane.width();
    let height = plane.height();
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for y in 0..height {
        if y == 0 || y == height - 1 {
            for &v in plane.row(y) {
                sum += f64::from(v);
            }
            count += width;
        } else {
            sum += f64::from(plane.get(0, y)) + f64::from(plane.get(width - 1, y));
            count += 2;
        }
    }
    (sum / count as f64) as f32
}

fn pad_plane(
    plane: &ImageF,
    v_margin: usize,
    h_margin: usize,
    method: MarginMethod,
    background: MarginBackground,
) -> ImageF {
    let width = plane.width();
    let height = plane.height();
    let new_width = width + 2 * h_margin;
    let new_height = height + 2 * v_margin;

    let bg = match background {
        MarginBackground::BorderMean => border_mean(plane),
        MarginBackground::ImageMean => plane.mean(),
    };

    let mut out = ImageF::new(new_width, new_height);

    for ny in 0..new_height {
        let iy = ny as isize - v_margin as isize;
        for nx in 0..new_width {
            let ix = nx as isize - h_margin as isize;

            let inside_y = iy >= 0 && (iy as usize) < height;
            let inside_x = ix >= 0 && (ix as usize) < width;
            if inside_x && inside_y {
                out.set(nx, ny, plane.get(ix as usize, iy as usize));
                continue;
            }

            let source = match method {
                MarginMethod::Reflect => {
                    plane.get(reflect_index(ix, width), reflect_index(iy, height))
                }
                MarginMethod::Extend => plane.get(
                    ix.clamp(0, width as isize - 1) as usize,
                    iy.clamp(0, height as isize - 1) as usize,
                ),
            };

            // Normalized penetration into the margin on each axis; corners
            // blend by 2D Euclidean distance in this normalized space.
            let tx = if inside_x {
                0.0
            } else {
                let depth = if ix < 0 { -ix } else { ix - width as isize + 1 };
                depth as f32 / h_margin as f32
            };
            let ty = if inside_y {
                0.0
            } else {
                let depth = if iy < 0 { -iy } else { iy - height as isize + 1 };
                depth as f32 / v_margin as f32
            };
            let t = (tx * tx + ty * ty).sqrt().min(1.0);

            let s = sigmoid(t);
            out.set(nx, ny, (1.0 - s) * source + s * bg);
        }
    }
    out
}

/// Pads the image with `v_margin` rows above and below and `h_margin`
/// columns left and right, and rescales the field of view so
/// degrees-per-pixel is preserved.
///
/// # Errors
/// [`FilterError::InvalidParameter`] for margins smaller than one pixel and
/// [`FilterError::ImageTooSmall`] for sources smaller than 2x2.
pub fn add_margin(
    v_margin: usize,
    h_margin: usize,
    image: &XyyImage,
    method: MarginMethod,
    background: MarginBackground,
) -> Result<XyyImage, FilterError> {
    if v_margin < 1 {
        return Err(FilterError::InvalidParameter {
            name: "v_margin",
            value: v_margin as f64,
        });
    }
    if h_margin < 1 {
        return Err(FilterError::InvalidParameter {
            name: "h_margin",
            value: h_margin as f64,
        });
    }
    let width = image.width();
    let height = image.height();
    if width < 2 || height < 2 {
        return Err(FilterError::ImageTooSmall { width, height });
    }

    let fov = image.fov();
    let new_width = width + 2 * h_margin;
    let new_height = height + 2 * v_margin;
    let new_fov = FieldOfView::new(
        fov.horiz_deg * new_width as f64 / width as f64,
        fov.vert_deg * new_height as f64 / height as f64,
    )?;

    Ok(image.with_same_metadata(
        pad_plane(image.luminance(), v_margin, h_margin, method, background),
        pad_plane(image.chroma_x(), v_margin, h_margin, method, background),
        pad_plane(image.chroma_y(), v_margin, h_margin, method, background),
        new_fov,
    ))
}

/// Removes a margin added by [`add_margin`], restoring interior pixel data
/// and rescaling the field of view back.
///
/// # Errors
/// [`FilterError::InvalidParameter`] for margins smaller than one pixel and
/// [`FilterError::ImageTooSmall`] if the margins leave fewer than 2x2
/// interior pixels.
pub fn strip_margin(
    v_margin: usize,
    h_margin: usize,
    image: &XyyImage,
) -> Result<XyyImage, FilterError> {
    if v_margin < 1 {
        return Err(FilterError::InvalidParameter {
            name: "v_margin",
            value: v_margin as f64,
        });
    }
    if h_margin < 1 {
        return Err(FilterError::InvalidParameter {
            name: "h_margin",
            value: h_margin as f64,
        });
    }
    let width = image.width();
    let height = image.height();
    if width < 2 * h_margin + 2 || height < 2 * v_margin + 2 {
        return Err(FilterError::ImageTooSmall { width, height });
    }

    let new_width = width - 2 * h_margin;
    let new_height = height - 2 * v_margin;

    let crop = |plane: &ImageF| {
        let mut out = ImageF::new(new_width, new_height);
        for y in 0..new_height {
            out.row_mut(y)
                .copy_from_slice(&plane.row(y + v_margin)[h_margin..h_margin + new_width]);
        }
        out
    };

    let fov = image.fov();
    let new_fov = FieldOfView::new(
        fov.horiz_deg * new_width as f64 / width as f64,
        fov.vert_deg * new_height as f64 / height as f64,
    )?;

    Ok(image.with_same_metadata(
        crop(image.luminance()),
        crop(image.chroma_x()),
        crop(image.chroma_y()),
        new_fov,
    ))
}
