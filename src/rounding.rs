//! Decimal rounding functors (C2).
//!
//! A `Rounder` rounds a value to a fixed number of decimal places (possibly
//! negative, to round to tens/hundreds) under a selectable style. Currency
//! quantities that are legally significant (COI charges, policy fees,
//! interest credits) always round through one of these, never through bare
//! `f64::round`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingStyle {
    /// Truncate toward zero.
    ToZero,
    /// Round half away from zero (the common "round half up" for positive
    /// values).
    ToNearestHalfAwayFromZero,
    /// Round half to even (banker's rounding).
    ToNearestBankers,
    /// Always round toward positive infinity.
    Upward,
    /// Always round toward negative infinity.
    Downward,
    /// Identity: do not round at all.
    NotAtAll,
    /// Honor the ambient hardware rounding mode (round-to-nearest on every
    /// target this crate runs on; see `fpenv`).
    Current,
}

#[derive(Debug, Clone, Copy)]
pub struct Rounder {
    pub decimals: i32,
    pub style: RoundingStyle,
}

impl Rounder {
    pub fn new(decimals: i32, style: RoundingStyle) -> Self {
        Rounder { decimals, style }
    }

    /// Rounds `x` per this functor's decimals and style.
    pub fn round(&self, x: f64) -> f64 {
        if self.style == RoundingStyle::NotAtAll {
            return x;
        }
        let scale = 10f64.powi(self.decimals);
        let scaled = x * scale;
        let rounded = match self.style {
            RoundingStyle::ToZero => scaled.trunc(),
            RoundingStyle::ToNearestHalfAwayFromZero => round_half_away_from_zero(scaled),
            RoundingStyle::ToNearestBankers => round_half_to_even(scaled),
            RoundingStyle::Upward => scaled.ceil(),
            RoundingStyle::Downward => scaled.floor(),
            RoundingStyle::NotAtAll => scaled,
            RoundingStyle::Current => scaled.round(),
        };
        rounded / scale
    }
}

fn round_half_away_from_zero(x: f64) -> f64 {
    if x >= 0.0 {
        (x + 0.5).floor()
    } else {
        (x - 0.5).ceil()
    }
}

fn round_half_to_even(x: f64) -> f64 {
    let floor = x.floor();
    let diff = x - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_zero_truncates() {
        let r = Rounder::new(2, RoundingStyle::ToZero);
        assert_eq!(r.round(1.239), 1.23);
        assert_eq!(r.round(-1.239), -1.23);
    }

    #[test]
    fn bankers_rounds_half_to_even() {
        let r = Rounder::new(0, RoundingStyle::ToNearestBankers);
        assert_eq!(r.round(0.5), 0.0);
        assert_eq!(r.round(1.5), 2.0);
        assert_eq!(r.round(2.5), 2.0);
        assert_eq!(r.round(3.5), 4.0);
    }

    #[test]
    fn half_away_from_zero_rounds_up_in_magnitude() {
        let r = Rounder::new(0, RoundingStyle::ToNearestHalfAwayFromZero);
        assert_eq!(r.round(0.5), 1.0);
        assert_eq!(r.round(-0.5), -1.0);
        assert_eq!(r.round(2.5), 3.0);
    }

    #[test]
    fn negative_decimals_round_to_tens() {
        let r = Rounder::new(-1, RoundingStyle::ToNearestHalfAwayFromZero);
        assert_eq!(r.round(123.0), 120.0);
        assert_eq!(r.round(125.0), 130.0);
    }

    #[test]
    fn not_at_all_is_identity() {
        let r = Rounder::new(2, RoundingStyle::NotAtAll);
        assert_eq!(r.round(1.23456), 1.23456);
    }

    #[test]
    fn idempotent_for_every_style() {
        let styles = [
            RoundingStyle::ToZero,
            RoundingStyle::ToNearestHalfAwayFromZero,
            RoundingStyle::ToNearestBankers,
            RoundingStyle::Upward,
            RoundingStyle::Downward,
            RoundingStyle::NotAtAll,
        ];
        for style in styles {
            let r = Rounder::new(2, style);
            let once = r.round(17.678);
            let twice = r.round(once);
            assert_eq!(once, twice, "not idempotent for {:?}", style);
        }
    }

    #[test]
    fn upward_and_downward_are_directional() {
        let up = Rounder::new(0, RoundingStyle::Upward);
        let down = Rounder::new(0, RoundingStyle::Downward);
        assert_eq!(up.round(1.1), 2.0);
        assert_eq!(down.round(1.9), 1.0);
        assert_eq!(up.round(-1.9), -1.0);
        assert_eq!(down.round(-1.1), -2.0);
    }
}
