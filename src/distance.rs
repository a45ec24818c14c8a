//! Squared Euclidean distance transform.
//!
//! Implements the Felzenszwalb–Huttenlocher lower-envelope-of-parabolas
//! algorithm: each 1D pass maintains a stack of active parabola apexes and
//! their domain boundaries in amortized O(n); the 2D transform is a column
//! pass followed by a row pass. The band feathering step uses the result to
//! decay restored contrast with distance from the nearest above-threshold
//! pixel.

use crate::image::{ImageB, ImageF};
use crate::FilterError;

/// Lower envelope of the parabolas rooted at `(i, f[i])`, sampled at every
/// integer position. `v` and `z` are caller-provided scratch.
fn envelope_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    debug_assert!(n > 0);

    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        // Intersection of the parabola at q with the rightmost active one.
        let mut s;
        loop {
            let p = v[k];
            s = ((f[q] + (q * q) as f64) - (f[p] + (p * p) as f64)) / (2 * (q - p)) as f64;
            if s > z[k] {
                break;
            }
            // The parabola at v[k] is dominated everywhere; pop it.
            k -= 1;
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for q in 0..n {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let p = v[k];
        let dq = q as f64 - p as f64;
        d[q] = dq * dq + f[p];
    }
}

/// Computes, for every pixel, the squared Euclidean distance to the nearest
/// marked pixel of `mask`.
///
/// Unmarked pixels start at a sentinel height of `(rows + cols + 1)²`,
/// larger than any in-bounds squared distance, so a mask with no marked
/// pixels yields that sentinel everywhere.
#[must_use]
pub fn distance_transform(mask: &ImageB) -> ImageF {
    let width = mask.width();
    let height = mask.height();
    let mut out = ImageF::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let infinity = {
        let s = (height + width + 1) as f64;
        s * s
    };

    let n = width.max(height);
    let mut f = vec![0.0f64; n];
    let mut d = vec![0.0f64; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];

    // Column pass: 1D distance along each column.
    for x in 0..width {
        for y in 0..height {
            f[y] = if mask.get(x, y) { 0.0 } else { infinity };
        }
        envelope_1d(&f[..height], &mut d[..height], &mut v, &mut z);
        for y in 0..height {
            out.set(x, y, d[y] as f32);
        }
    }

    // Row pass over the column distances.
    for y in 0..height {
        for x in 0..width {
            f[x] = f64::from(out.get(x, y));
        }
        envelope_1d(&f[..width], &mut d[..width], &mut v, &mut z);
        for x in 0..width {
            out.set(x, y, d[x] as f32);
        }
    }

    out
}

/// Marks every pixel within Euclidean `radius` of a marked pixel.
///
/// # Errors
/// [`FilterError::InvalidParameter`] if `radius` is negative or non-finite.
pub fn dilate(mask: &ImageB, radius: f64) -> Result<ImageB, FilterError> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(FilterError::InvalidParameter {
            name: "radius",
            value: radius,
        });
    }

    let squared = distance_transform(mask);
    let limit = (radius * radius) as f32;
    let mut out = ImageB::new(mask.width(), mask.height());
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            out.set(x, y, squared.get(x, y) <= limit);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_seed_exact() {
        // Exhaustive check against the closed form for one marked pixel.
        let (width, height) = (9, 7);
        let (sx, sy) = (3usize, 2usize);
        let mut mask = ImageB::new(width, height);
        mask.set(sx, sy, true);

        let dist = distance_transform(&mask);
        for y in 0..height {
            for x in 0..width {
                let dx = x as f32 - sx as f32;
                let dy = y as f32 - sy as f32;
                assert_eq!(
                    dist.get(x, y),
                    dx * dx + dy * dy,
                    "wrong distance at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn test_two_seeds_take_nearest() {
        let mut mask = ImageB::new(11, 1);
        mask.set(0, 0, true);
        mask.set(10, 0, true);

        let dist = distance_transform(&mask);
        for x in 0..11usize {
            let expected = x.min(10 - x).pow(2) as f32;
            assert_eq!(dist.get(x, 0), expected);
        }
    }

    #[test]
    fn test_empty_mask_is_sentinel() {
        let mask = ImageB::new(5, 4);
        let dist = distance_transform(&mask);
        let sentinel = ((4 + 5 + 1) * (4 + 5 + 1)) as f32;
        for y in 0..4 {
            for x in 0..5 {
                assert_eq!(dist.get(x, y), sentinel);
            }
        }
        // Larger than any real in-bounds squared distance.
        assert!(sentinel > (4.0f32 * 4.0 + 5.0 * 5.0));
    }

    #[test]
    fn test_dilate_radius() {
        let mut mask = ImageB::new(9, 9);
        mask.set(4, 4, true);

        let dilated = dilate(&mask, 2.0).unwrap();
        for y in 0..9usize {
            for x in 0..9usize {
                let dx = x as f64 - 4.0;
                let dy = y as f64 - 4.0;
                let inside = dx * dx + dy * dy <= 4.0;
                assert_eq!(dilated.get(x, y), inside, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_dilate_zero_radius() {
        let mut mask = ImageB::new(3, 3);
        mask.set(1, 1, true);
        let dilated = dilate(&mask, 0.0).unwrap();
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(dilated.get(x, y), x == 1 && y == 1);
            }
        }
    }

    #[test]
    fn test_dilate_invalid_radius() {
        let mask = ImageB::new(3, 3);
        assert!(matches!(
            dilate(&mask, -1.0),
            Err(FilterError::InvalidParameter { .. })
        ));
        assert!(dilate(&mask, f64::NAN).is_err());
    }
}
