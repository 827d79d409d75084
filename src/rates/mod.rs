//! Rate provider (C5).
//!
//! External interface: for a given product, issue age, gender, smoking,
//! underwriting class, table rating, and state of jurisdiction, supplies
//! the actuarial vectors the engine needs, indexed by duration. The core
//! accepts these as inputs and does not parse the underlying tables; all
//! CSV-format knowledge lives in [`loader`], never in the engine.

pub mod loader;
pub mod table;

use crate::error::LmiError;
use crate::ledger::basis::Basis;

/// Monthly and annual policy fees, premium loads, and other charge-schedule
/// quantities that don't vary by duration within a single rate-provider
/// instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadSchedule {
    pub monthly_policy_fee: f64,
    pub annual_policy_fee: f64,
    pub premium_load_target: f64,
    pub premium_load_excess: f64,
    pub sales_load: f64,
    pub dac_tax_load: f64,
    pub premium_tax_rate: f64,
    pub target_premium_per_unit: f64,
}

/// External collaborator supplying actuarial vectors. Calls are pure: the
/// same arguments always return the same vectors, and no I/O happens after
/// construction (callers preload tables into memory before the engine
/// starts, per the crate's single-threaded, no-mid-calculation-I/O
/// concurrency model).
pub trait RateProvider {
    /// Monthly COI rates for the given basis, one entry per policy month
    /// of the projection.
    fn get_mortality(&self, basis: Basis, len: usize) -> Result<Vec<f64>, LmiError>;
    /// Monthly credited interest rates for the given basis.
    fn get_interest(&self, basis: Basis, len: usize) -> Result<Vec<f64>, LmiError>;
    /// CVAT corridor factors by policy year.
    fn get_corridor(&self, len: usize) -> Result<Vec<f64>, LmiError>;
    /// Seven-pay premium rate (per unit of specified amount) by policy year.
    fn get_7pp(&self, len: usize) -> Result<Vec<f64>, LmiError>;
    /// Guideline level premium rate (per unit of specified amount).
    fn get_glp(&self, len: usize) -> Result<Vec<f64>, LmiError>;
    /// Guideline single premium rate (per unit of specified amount).
    fn get_gsp(&self, len: usize) -> Result<Vec<f64>, LmiError>;
    fn get_loads(&self) -> LoadSchedule;
    /// Surrender-charge rate at a given policy duration (0-indexed).
    fn get_surrchg(&self, duration: usize) -> f64;
}

pub(crate) fn require_len(vector: &[f64], expected: usize, name: &'static str) -> Result<(), LmiError> {
    if vector.len() < expected {
        return Err(LmiError::RateProviderLengthMismatch {
            vector: name,
            expected,
            found: vector.len(),
        });
    }
    Ok(())
}
