//! Death-benefit holder (C8).
//!
//! Owns per-year specified-amount and DB-option vectors. The solver (C13)
//! writes into this via `set_specamt`, the engine reads from it once per
//! policy year during the per-year preamble.

use crate::error::LmiError;
use crate::policy::DbOption;

#[derive(Debug, Clone)]
pub struct DeathBenefitHolder {
    specamt: Vec<f64>,
    dbopt: Vec<DbOption>,
    minimum_specamt: f64,
}

impl DeathBenefitHolder {
    pub fn new(years_to_maturity: usize, initial_specamt: f64, initial_dbopt: DbOption, minimum_specamt: f64) -> Self {
        DeathBenefitHolder {
            specamt: vec![initial_specamt; years_to_maturity],
            dbopt: vec![initial_dbopt; years_to_maturity],
            minimum_specamt,
        }
    }

    pub fn len(&self) -> usize {
        self.specamt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specamt.is_empty()
    }

    /// Reads the specified amount for a policy year (0-indexed). Fails if
    /// the stored value is below the product-defined minimum — checked at
    /// read time since the minimum is basis/product dependent and not
    /// known to the holder at construction.
    pub fn specamt(&self, year: usize) -> Result<f64, LmiError> {
        let amount = *self
            .specamt
            .get(year)
            .ok_or_else(|| LmiError::DomainViolation(format!("specamt year index {year} out of range")))?;
        if amount < self.minimum_specamt {
            return Err(LmiError::DomainViolation(format!(
                "specified amount {amount} in year {year} is below the product minimum {}",
                self.minimum_specamt
            )));
        }
        Ok(amount)
    }

    pub fn dbopt(&self, year: usize) -> DbOption {
        self.dbopt.get(year).copied().unwrap_or(DbOption::A)
    }

    /// Partial overwrite of the specified-amount vector over
    /// `[begin_year, end_year)`, used by the solver's `SolveSetSpecAmt`
    /// path.
    pub fn set_specamt(&mut self, amount: f64, begin_year: usize, end_year: usize) {
        let end = end_year.min(self.specamt.len());
        for year in begin_year..end {
            self.specamt[year] = amount;
        }
    }

    pub fn set_dbopt(&mut self, option: DbOption, begin_year: usize, end_year: usize) {
        let end = end_year.min(self.dbopt.len());
        for year in begin_year..end {
            self.dbopt[year] = option;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_overwrite_only_touches_the_given_range() {
        let mut holder = DeathBenefitHolder::new(10, 100_000.0, DbOption::A, 10_000.0);
        holder.set_specamt(150_000.0, 3, 6);
        assert_eq!(holder.specamt(2).unwrap(), 100_000.0);
        assert_eq!(holder.specamt(3).unwrap(), 150_000.0);
        assert_eq!(holder.specamt(5).unwrap(), 150_000.0);
        assert_eq!(holder.specamt(6).unwrap(), 100_000.0);
    }

    #[test]
    fn below_minimum_is_a_domain_error_at_read_time() {
        let holder = DeathBenefitHolder::new(5, 5_000.0, DbOption::A, 10_000.0);
        assert!(holder.specamt(0).is_err());
    }

    #[test]
    fn dbopt_overwrite_is_independent_of_specamt() {
        let mut holder = DeathBenefitHolder::new(5, 100_000.0, DbOption::A, 10_000.0);
        holder.set_dbopt(DbOption::B, 2, 5);
        assert_eq!(holder.dbopt(1), DbOption::A);
        assert_eq!(holder.dbopt(2), DbOption::B);
    }
}
