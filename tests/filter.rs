//! End-to-end tests for the low-vision simulation filter.
//!
//! These drive the public API the way a batch-processing caller would:
//! synthetic calibrated scenes in, filtered scenes out, with the margin
//! helpers wrapped around the filter where wraparound matters.

use approx::assert_relative_eq;
use lowvis::{
    add_margin, filter, strip_margin, FieldOfView, FilterParams, ImageF, MarginBackground,
    MarginMethod, XyyImage,
};

/// Uniform pedestal with a horizontal cosine grating at exactly
/// `cycles` cycles/image. The phase keeps every sample of the grating well
/// away from zero, so the whole band sits above the detection threshold.
fn grating_image(size: usize, cycles: usize, pedestal: f32, amplitude: f32) -> ImageF {
    let mut img = ImageF::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let phase = 2.0 * std::f32::consts::PI * cycles as f32 * x as f32 / size as f32
                + std::f32::consts::PI / 8.0;
            img.set(x, y, pedestal + amplitude * phase.cos());
        }
    }
    img
}

/// 100 cd/m² field with a sharp luminance step up the middle.
fn central_step_image(size: usize, base: f32, step: f32) -> ImageF {
    let mut img = ImageF::new(size, size);
    for y in 0..size {
        for x in 0..size {
            img.set(x, y, if x < size / 2 { base } else { base + step });
        }
    }
    img
}

#[test]
fn normal_vision_is_identity_on_visible_grating() {
    // 8 cycles over 8 degrees = 1 cycle/degree, near the CSF peak; 20%
    // Michelson contrast is two orders of magnitude above threshold. The
    // grating occupies a single frequency bin, so exactly one band carries
    // it and nothing is lost to windowing.
    let size = 64;
    let lum = grating_image(size, 8, 100.0, 20.0);
    let image = XyyImage::gray(lum.clone(), FieldOfView::new(8.0, 8.0).unwrap()).unwrap();

    let params = FilterParams::new().with_smoothing(false);
    let out = filter(&image, &params).unwrap();

    for y in 0..size {
        for x in 0..size {
            assert!(
                (out.luminance().get(x, y) - lum.get(x, y)).abs() < 0.1,
                "visible grating altered at ({x}, {y}): {} vs {}",
                out.luminance().get(x, y),
                lum.get(x, y)
            );
        }
    }
}

#[test]
fn uniform_image_is_idempotent() {
    let lum = ImageF::filled(32, 32, 100.0);
    let image = XyyImage::gray(lum, FieldOfView::new(30.0, 30.0).unwrap()).unwrap();

    let out = filter(&image, &FilterParams::default()).unwrap();
    for y in 0..32 {
        for x in 0..32 {
            assert!((out.luminance().get(x, y) - 100.0).abs() < 1e-3);
            assert!((out.chroma_x().get(x, y) - 1.0 / 3.0).abs() < 1e-4);
            assert!((out.chroma_y().get(x, y) - 1.0 / 3.0).abs() < 1e-4);
        }
    }
}

#[test]
fn central_step_scenario_at_normal_vision() {
    // 256x256, 30 x 30 degrees, 100 cd/m² plus a sharp central step,
    // normal vision, no feathering: output stays close to the input.
    // A sharp step rings in every band, and thresholding may remove up to
    // local_luminance / sensitivity per band from a sub-threshold pixel;
    // the top band here sits at 8.53 c/deg (sensitivity ~5.7), so the
    // per-pixel relative error is bounded by roughly a tenth near the
    // edge, not by FFT round-trip tolerance.
    let size = 256;
    let lum = central_step_image(size, 100.0, 50.0);
    let image = XyyImage::gray(lum.clone(), FieldOfView::new(30.0, 30.0).unwrap()).unwrap();

    let params = FilterParams::new().with_smoothing(false);
    let out = filter(&image, &params).unwrap();

    assert_eq!(out.width(), size);
    assert_eq!(out.height(), size);
    assert_eq!(out.fov(), image.fov());

    let mut total_err = 0.0f64;
    let mut max_rel = 0.0f32;
    for y in 0..size {
        for x in 0..size {
            let expected = lum.get(x, y);
            let err = (out.luminance().get(x, y) - expected).abs();
            total_err += f64::from(err);
            max_rel = max_rel.max(err / expected);
        }
    }
    let mean_err = total_err / (size * size) as f64;
    assert!(mean_err < 1.5, "mean error {mean_err} cd/m²");
    assert!(max_rel < 0.1, "max relative error {max_rel}");

    // The overall light level is preserved.
    assert!((out.luminance().mean() - lum.mean()).abs() < 1.0);

    // Chromaticity of a gray scene stays at the white point.
    for y in (0..size).step_by(17) {
        for x in (0..size).step_by(17) {
            assert!((out.chroma_x().get(x, y) - 1.0 / 3.0).abs() < 1e-4);
            assert!((out.chroma_y().get(x, y) - 1.0 / 3.0).abs() < 1e-4);
        }
    }
}

#[test]
fn severe_acuity_loss_blurs_the_step() {
    let size = 256;
    let lum = central_step_image(size, 100.0, 50.0);
    let image = XyyImage::gray(lum.clone(), FieldOfView::new(30.0, 30.0).unwrap()).unwrap();

    let params = FilterParams::new().with_acuity(0.05);
    let out = filter(&image, &params).unwrap();

    // Something visible was removed.
    let mut max_change = 0.0f32;
    for y in 0..size {
        for x in 0..size {
            max_change = max_change.max((out.luminance().get(x, y) - lum.get(x, y)).abs());
        }
    }
    assert!(max_change > 5.0, "filter changed almost nothing");

    // The sharp 50 cd/m² jump is gone: adjacent-pixel differences are
    // limited by the surviving low-frequency bands.
    let mid = size / 2;
    for y in (0..size).step_by(13) {
        let jump = (out.luminance().get(mid, y) - out.luminance().get(mid - 1, y)).abs();
        assert!(jump < 25.0, "edge still sharp at row {y}: {jump}");
    }
}

#[test]
fn feathering_stays_within_hard_threshold_envelope() {
    // With feathering on, restored contrast is a fraction of the raw band,
    // so the output can differ from the hard-thresholded output but the
    // total light level must match.
    let size = 128;
    let lum = central_step_image(size, 100.0, 30.0);
    let image = XyyImage::gray(lum, FieldOfView::new(15.0, 15.0).unwrap()).unwrap();

    let hard = filter(&image, &FilterParams::new().with_acuity(0.2).with_smoothing(false))
        .unwrap();
    let soft = filter(&image, &FilterParams::new().with_acuity(0.2).with_smoothing(true))
        .unwrap();

    assert!((hard.luminance().mean() - soft.luminance().mean()).abs() < 1.0);
}

#[test]
fn chromaticity_output_is_always_in_gamut() {
    let size = 64;
    let lum = central_step_image(size, 100.0, 40.0);
    // Highly saturated chromaticity with high-frequency structure, pushing
    // the low-pass output toward (and past) the gamut boundary.
    let mut cx = ImageF::new(size, size);
    let mut cy = ImageF::new(size, size);
    for y in 0..size {
        for x in 0..size {
            if (x + y) % 2 == 0 {
                cx.set(x, y, 0.95);
                cy.set(x, y, 0.03);
            } else {
                cx.set(x, y, 0.02);
                cy.set(x, y, 0.95);
            }
        }
    }
    let image =
        XyyImage::from_planes(lum, cx, cy, FieldOfView::new(4.0, 4.0).unwrap()).unwrap();

    let out = filter(&image, &FilterParams::new().with_saturation(1.5)).unwrap();
    for y in 0..size {
        for x in 0..size {
            let x_val = f64::from(out.chroma_x().get(x, y));
            let y_val = f64::from(out.chroma_y().get(x, y));
            assert!(x_val >= 0.0, "x < 0 at ({x}, {y})");
            assert!(y_val >= 0.0, "y < 0 at ({x}, {y})");
            assert!(x_val + y_val <= 1.0 + 1e-6, "x + y > 1 at ({x}, {y})");
        }
    }
}

#[test]
fn margin_wrapped_filtering_round_trips_dimensions() {
    let size = 64;
    let lum = central_step_image(size, 100.0, 50.0);
    let image = XyyImage::gray(lum, FieldOfView::new(10.0, 10.0).unwrap()).unwrap();

    let padded = add_margin(
        16,
        16,
        &image,
        MarginMethod::Reflect,
        MarginBackground::BorderMean,
    )
    .unwrap();
    assert_relative_eq!(
        padded.fov().horiz_deg / padded.width() as f64,
        image.fov().horiz_deg / image.width() as f64,
        max_relative = 1e-12
    );

    let filtered = filter(&padded, &FilterParams::new().with_acuity(0.3)).unwrap();
    let out = strip_margin(16, 16, &filtered).unwrap();

    assert_eq!(out.width(), image.width());
    assert_eq!(out.height(), image.height());
    assert_relative_eq!(out.fov().horiz_deg, image.fov().horiz_deg, max_relative = 1e-12);
    assert_relative_eq!(out.fov().vert_deg, image.fov().vert_deg, max_relative = 1e-12);
}
