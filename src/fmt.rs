//! Float formatting for display strings.
//!
//! Rust's core float-to-decimal formatting has had wasm-facing panics in some
//! toolchain/browser combinations. These helpers never call `format!` on a
//! float: finite values are scaled and rounded into an `i64`, then formatted
//! as integers.

/// Confidence as it should be displayed: anything absent, non-finite or
/// outside `[0, 1]` counts as `0`.
pub fn display_confidence(confidence: Option<f64>) -> f64 {
    match confidence {
        Some(c) if c.is_finite() && (0.0..=1.0).contains(&c) => c,
        _ => 0.0,
    }
}

/// `0.931` → `"93.10%"`. Never renders `NaN%`.
pub fn fmt_percent(confidence: Option<f64>) -> String {
    let mut out = fmt_fixed(display_confidence(confidence) * 100.0, 2);
    out.push('%');
    out
}

pub fn fmt_fixed(v: f64, decimals: usize) -> String {
    if !v.is_finite() {
        return if v.is_nan() {
            "NaN".to_string()
        } else if v.is_sign_positive() {
            "Inf".to_string()
        } else {
            "-Inf".to_string()
        };
    }

    // Clamp decimals to something reasonable to avoid huge powers.
    let decimals = decimals.min(9);
    let scale_i64 = 10_i64.pow(decimals as u32);
    let scaled = (v * scale_i64 as f64).round();

    // Keep within i64 range (`i64::MIN` included). If it doesn't fit, degrade
    // gracefully.
    if !scaled.is_finite() || scaled >= (i64::MAX as f64) || scaled < (i64::MIN as f64) {
        return if v.is_sign_negative() {
            "-Inf".to_string()
        } else {
            "Inf".to_string()
        };
    }

    let scaled_i = scaled as i64;
    let scale_u = scale_i64 as u64;
    let abs_i = scaled_i.unsigned_abs();
    let int_part = abs_i / scale_u;
    let frac_part = abs_i % scale_u;

    let mut out = String::new();
    if scaled_i < 0 {
        out.push('-');
    }
    out.push_str(&int_part.to_string());

    if decimals > 0 {
        out.push('.');
        let frac_str = frac_part.to_string();
        for _ in 0..decimals.saturating_sub(frac_str.len()) {
            out.push('0');
        }
        out.push_str(&frac_str);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point_rounding() {
        assert_eq!(fmt_fixed(0.0, 2), "0.00");
        assert_eq!(fmt_fixed(93.1, 2), "93.10");
        assert_eq!(fmt_fixed(0.005, 1), "0.0");
        assert_eq!(fmt_fixed(-1.25, 1), "-1.3");
        assert_eq!(fmt_fixed(1.5, 0), "2");
        assert_eq!(fmt_fixed(0.07, 2), "0.07");
    }

    #[test]
    fn i64_range_edges_do_not_overflow() {
        assert_eq!(fmt_fixed(i64::MIN as f64, 0), "-9223372036854775808");
        assert_eq!(fmt_fixed(-(2f64.powi(63)), 0), "-9223372036854775808");

        let tenth = fmt_fixed(-(2f64.powi(63)) / 10.0, 1);
        assert!(tenth.starts_with("-92233720368547"), "{tenth}");

        // 2^63 itself does not fit.
        assert_eq!(fmt_fixed(2f64.powi(63), 0), "Inf");
        assert_eq!(fmt_fixed(-(2f64.powi(64)), 0), "-Inf");
    }

    #[test]
    fn percent_defaults_bad_confidence_to_zero() {
        assert_eq!(fmt_percent(Some(0.931)), "93.10%");
        assert_eq!(fmt_percent(Some(1.0)), "100.00%");
        assert_eq!(fmt_percent(None), "0.00%");
        assert_eq!(fmt_percent(Some(f64::NAN)), "0.00%");
        assert_eq!(fmt_percent(Some(f64::INFINITY)), "0.00%");
        assert_eq!(fmt_percent(Some(1.7)), "0.00%");
        assert_eq!(fmt_percent(Some(-0.2)), "0.00%");
    }

    #[test]
    fn non_finite_values_are_spelled_out() {
        assert_eq!(fmt_fixed(f64::NAN, 2), "NaN");
        assert_eq!(fmt_fixed(f64::NEG_INFINITY, 2), "-Inf");
    }
}
