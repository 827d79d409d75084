//! Policy-level demographics and timing helpers.
//!
//! Generalized from the teacher's `policy::data::Policy` (a flat struct of
//! demographic/product fields with typed enums and timing accessors);
//! GLWB-specific fields (`benefit_base_bucket`, `rollup_type`,
//! `glwb_start_year`, ...) are not carried over since `spec.md` names no
//! GLWB rider — this module keeps exactly the demographic/timing surface
//! the engine (C11) and §7702 evaluators (C7) need.

pub mod death_benefit;
pub mod outlay;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    Unisex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoking {
    Smoker,
    Nonsmoker,
    Unismoke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnderwritingClass {
    Preferred,
    Standard,
    Rated,
    UltraPreferred,
}

/// Death-benefit option. `A` is level, `B` is increasing (DB = specamt +
/// AV), `Rop` is return-of-premium (DB = specamt + cum payments - cum
/// withdrawals, bounded below by the corridor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbOption {
    A,
    B,
    Rop,
}

/// Payment mode: also its own annual frequency, per the `e_mode` convention
/// (annual=1, semiannual=2, quarterly=4, monthly=12) this crate inherits
/// from the source it's grounded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Annual = 1,
    Semiannual = 2,
    Quarterly = 4,
    Monthly = 12,
}

impl Mode {
    pub fn frequency(&self) -> u32 {
        *self as u32
    }

    /// Number of policy months between successive modal payment dates.
    pub fn months_per_payment(&self) -> u32 {
        12 / self.frequency()
    }
}

/// Computes the 1-indexed policy year containing `projection_month`
/// (1-indexed from issue, or from the in-force start for an in-force
/// case).
pub fn policy_year(duration_months_inforce: u32, projection_month: u32) -> u32 {
    (duration_months_inforce + projection_month).saturating_sub(1) / 12 + 1
}

/// Computes the 1-indexed month within the current policy year (1..=12).
pub fn month_in_policy_year(duration_months_inforce: u32, projection_month: u32) -> u32 {
    (duration_months_inforce + projection_month - 1) % 12 + 1
}

/// Attained age at `projection_month`, given issue age.
pub fn attained_age(issue_age: u32, duration_months_inforce: u32, projection_month: u32) -> u32 {
    let years_elapsed = (duration_months_inforce + projection_month - 1) / 12;
    issue_age + years_elapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_year_and_month_at_issue() {
        assert_eq!(policy_year(0, 1), 1);
        assert_eq!(month_in_policy_year(0, 1), 1);
        assert_eq!(policy_year(0, 12), 1);
        assert_eq!(month_in_policy_year(0, 12), 12);
        assert_eq!(policy_year(0, 13), 2);
        assert_eq!(month_in_policy_year(0, 13), 1);
    }

    #[test]
    fn inforce_offset_shifts_timing() {
        // 14 months already in force; projection month 1 is calendar month 15.
        assert_eq!(policy_year(14, 1), 2);
        assert_eq!(month_in_policy_year(14, 1), 3);
    }

    #[test]
    fn attained_age_increments_yearly() {
        assert_eq!(attained_age(45, 0, 1), 45);
        assert_eq!(attained_age(45, 0, 12), 45);
        assert_eq!(attained_age(45, 0, 13), 46);
    }

    #[test]
    fn mode_frequencies_match_annual_payment_count() {
        assert_eq!(Mode::Annual.frequency(), 1);
        assert_eq!(Mode::Monthly.frequency(), 12);
        assert_eq!(Mode::Monthly.months_per_payment(), 1);
        assert_eq!(Mode::Quarterly.months_per_payment(), 3);
    }
}
