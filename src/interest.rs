//! Interest-rate math (C3).
//!
//! Conversions among annual / modal / daily effective rates, implemented
//! with `expm1`/`log1p` to preserve precision for small rates, exactly as
//! `spec.md` §4.3 specifies.

use crate::error::LmiError;

/// Converts an annual effective rate `i` to `i^(n)/n`, the nominal rate
/// compounded `n` times per year that is equivalent to `i` annually.
///
/// `i_upper_n_over_n = expm1(log1p(i) / n)`
pub fn i_upper_n_over_n_from_i(i: f64, n: u32) -> Result<f64, LmiError> {
    validate_rate(i)?;
    if i == -1.0 {
        return Ok(-1.0);
    }
    Ok((i.ln_1p() / n as f64).exp_m1())
}

/// Inverse of [`i_upper_n_over_n_from_i`]: given the modal nominal rate
/// `i^(n)/n`, returns the equivalent annual effective rate `i`.
pub fn i_from_i_upper_n_over_n(i_upper_n_over_n: f64, n: u32) -> Result<f64, LmiError> {
    validate_rate(i_upper_n_over_n)?;
    if i_upper_n_over_n == -1.0 {
        return Ok(-1.0);
    }
    Ok((i_upper_n_over_n.ln_1p() * n as f64).exp_m1())
}

/// Converts an annual effective rate to the equivalent nominal discount
/// rate `d^(n)/n`.
pub fn d_upper_n_over_n_from_i(i: f64, n: u32) -> Result<f64, LmiError> {
    let i_n_over_n = i_upper_n_over_n_from_i(i, n)?;
    let one_period = i_n_over_n / n as f64;
    Ok(n as f64 * (one_period / (1.0 + one_period)))
}

/// Net-of-spread-and-fee annual effective rate:
/// `net = ((1+i)^(1/n) - (1+spread)^(1/n) - fee/n)^n - 1`
/// computed via expm1/log1p to preserve precision for small rates.
pub fn net_i_from_gross(gross_i: f64, spread: f64, fee: f64, n: u32) -> Result<f64, LmiError> {
    validate_rate(gross_i)?;
    validate_rate(spread)?;
    let n_f = n as f64;
    let gross_period = (gross_i.ln_1p() / n_f).exp();
    let spread_period = (spread.ln_1p() / n_f).exp();
    let net_period = gross_period - spread_period - fee / n_f;
    if net_period <= 0.0 {
        return Err(LmiError::DomainViolation(format!(
            "net-of-spread-and-fee period factor is non-positive: {net_period}"
        )));
    }
    Ok(net_period.powf(n_f) - 1.0)
}

/// Returns the sign of `x`: -1.0, 0.0, or 1.0.
pub fn signum(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Unsigned absolute value helper, named for parity with the `u_abs` used
/// throughout the source this module is grounded on.
pub fn u_abs(x: f64) -> f64 {
    x.abs()
}

fn validate_rate(i: f64) -> Result<(), LmiError> {
    if i.is_nan() {
        return Err(LmiError::DomainViolation("rate is NaN".to_string()));
    }
    if i < -1.0 {
        return Err(LmiError::DomainViolation(format!(
            "rate {i} is less than -100%, which has no valid interpretation"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn round_trip_small_rates() {
        for &i in &[0.0001, 0.001, 0.01, 0.05, 0.1] {
            for n in [1u32, 2, 4, 12, 365] {
                let i_n = i_upper_n_over_n_from_i(i, n).unwrap();
                let back = i_from_i_upper_n_over_n(i_n, n).unwrap();
                assert_abs_diff_eq!(back, i, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn negative_one_hundred_percent_is_sentinel() {
        assert_eq!(i_upper_n_over_n_from_i(-1.0, 12).unwrap(), -1.0);
        assert_eq!(i_from_i_upper_n_over_n(-1.0, 12).unwrap(), -1.0);
    }

    #[test]
    fn below_negative_one_hundred_percent_is_domain_error() {
        assert!(i_upper_n_over_n_from_i(-1.5, 12).is_err());
    }

    #[test]
    fn nan_is_domain_error() {
        assert!(i_upper_n_over_n_from_i(f64::NAN, 12).is_err());
    }

    #[test]
    fn zero_rate_converts_to_zero() {
        assert_abs_diff_eq!(i_upper_n_over_n_from_i(0.0, 12).unwrap(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn net_of_spread_reduces_gross() {
        let net = net_i_from_gross(0.06, 0.01, 0.0, 12).unwrap();
        assert!(net < 0.06);
        assert!(net > 0.0);
    }

    #[test]
    fn signum_and_u_abs() {
        assert_eq!(signum(3.0), 1.0);
        assert_eq!(signum(-3.0), -1.0);
        assert_eq!(signum(0.0), 0.0);
        assert_eq!(u_abs(-4.5), 4.5);
    }
}
