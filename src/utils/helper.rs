use std::cmp::Ordering;

/// Sorts finite floats ascending.
pub fn sort_floats(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
}

/// Percentile of an ascending slice with linear interpolation between the two
/// nearest ranks, `q` in [0, 1]. Returns None for an empty slice.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = q.clamp(0.0, 1.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let weight = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * weight)
}

/// Unsorted convenience wrapper around [`percentile_sorted`].
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sort_floats(&mut sorted);
    percentile_sorted(&sorted, q)
}

/// Piecewise-linear interpolation of `x` over ascending knots `xp` with values
/// `fp`. Outside the knots the end values are returned. With repeated knots the
/// segment starting at the right-most knot `<= x` is used.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    debug_assert_eq!(xp.len(), fp.len());
    let n = xp.len();
    if n == 0 {
        return f64::NAN;
    }
    if x < xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }

    // xp[j] <= x < xp[j + 1], so the span is positive.
    let j = xp.partition_point(|&k| k <= x) - 1;
    let span = xp[j + 1] - xp[j];
    fp[j] + (x - xp[j]) * (fp[j + 1] - fp[j]) / span
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 1.0), Some(4.0));
        assert_eq!(percentile(&values, 0.5), Some(2.5));
        assert!((percentile(&values, 0.975).unwrap() - 3.925).abs() < 1e-12);
        assert_eq!(percentile(&[], 0.5), None);
        assert_eq!(percentile(&[7.0], 0.3), Some(7.0));
    }

    #[test]
    fn percentile_ignores_input_order() {
        assert_eq!(percentile(&[4.0, 1.0, 3.0, 2.0], 0.5), Some(2.5));
    }

    #[test]
    fn interp_clamps_outside_knots() {
        let xp = [0.0, 1.0, 2.0];
        let fp = [0.0, 10.0, 20.0];
        assert_eq!(interp(-1.0, &xp, &fp), 0.0);
        assert_eq!(interp(3.0, &xp, &fp), 20.0);
        assert_eq!(interp(1.5, &xp, &fp), 15.0);
        assert_eq!(interp(1.0, &xp, &fp), 10.0);
    }

    #[test]
    fn interp_uses_rightmost_repeated_knot() {
        let xp = [-5.0, 1.0, 1.0, 1.0, 9.0];
        let fp = [0.0, 0.25, 0.5, 0.75, 1.0];
        assert_eq!(interp(1.0, &xp, &fp), 0.75);
        assert_eq!(interp(5.0, &xp, &fp), 0.875);
    }
}
