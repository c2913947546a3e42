#![forbid(unsafe_code)]

/// Cubic ease-in-out.
///
/// `4t³` below the midpoint, `1 − (−2t + 2)³ / 2` from it on. `t` is clamped
/// to `[0, 1]` and NaN is treated as 0.
#[must_use]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = clamp_unit(t);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn clamp_unit(t: f64) -> f64 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}
