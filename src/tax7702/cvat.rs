//! Cash-value accumulation test (CVAT) path.
//!
//! On each death-benefit or premium event, the engine computes
//! `corridor_factor(attained_age)` from the product table and guarantees
//! `death_benefit >= av * corridor_factor` by forcing DB up when needed.

/// Minimum death benefit the corridor requires for a given account value.
pub fn corridor_minimum_death_benefit(av: f64, corridor_factor: f64) -> f64 {
    (av * corridor_factor).max(0.0)
}

/// Applies the corridor floor to a candidate death benefit (e.g. the
/// specified amount, or specamt + AV for option B).
pub fn enforce_corridor(candidate_death_benefit: f64, av: f64, corridor_factor: f64) -> f64 {
    candidate_death_benefit.max(corridor_minimum_death_benefit(av, corridor_factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn corridor_binds_when_av_times_factor_exceeds_specamt() {
        let db = enforce_corridor(100_000.0, 60_000.0, 2.0);
        assert_abs_diff_eq!(db, 120_000.0, epsilon = 1e-9);
    }

    #[test]
    fn specamt_binds_when_corridor_is_smaller() {
        let db = enforce_corridor(100_000.0, 10_000.0, 2.0);
        assert_abs_diff_eq!(db, 100_000.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_or_negative_av_never_increases_the_floor() {
        assert_abs_diff_eq!(corridor_minimum_death_benefit(-5.0, 2.0), 0.0, epsilon = 1e-12);
    }
}
