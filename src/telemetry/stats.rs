//! Sample statistics over latency and uptime measurements.

/// Arithmetic mean. `None` for an empty sample.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Percentile of a finite sample using linear interpolation between closest ranks.
///
/// Values are sorted ascending and the result is read at fractional rank
/// `p / 100 * (n - 1)`, interpolating between the two neighbouring samples:
///
/// ```text
/// sorted = [100, 200], p = 95
/// rank   = 0.95 * (2 - 1) = 0.95
/// result = 100 + (200 - 100) * 0.95 = 195
/// ```
///
/// A single-element sample yields that element for every `p`. `p` is clamped
/// to `[0, 100]`. Returns `None` for an empty sample.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;

    if lo == hi {
        return Some(sorted[lo]);
    }

    Some(lerp(sorted[lo], sorted[hi], rank - lo as f64))
}

/// Linear interpolation from `a` to `b`, anchored at the nearer endpoint.
///
/// Fractions of one half or more are computed backwards from `b`, which
/// keeps results identical to numpy's `percentile(..., method="linear")`.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 {
        b - diff * (1.0 - t)
    } else {
        a + diff * t
    }
}

/// Number of values strictly greater than `threshold`.
pub fn count_above(values: &[f64], threshold: f64) -> u64 {
    values.iter().filter(|&&v| v > threshold).count() as u64
}
