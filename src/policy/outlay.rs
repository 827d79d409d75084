//! Outlay holder (C9).
//!
//! Owns per-year gross-premium, employee/employer-premium, new-loan, and
//! withdrawal vectors, plus the mode and strategy used to resolve amounts
//! the input doesn't specify explicitly. The engine (C11) resolves
//! strategies at the start of each policy year against then-current §7702
//! quantities; the solver (C13) writes a uniform amount across a year
//! range via the `solve_set_*` helpers, named after `accountvalue.hpp`'s
//! `SolveSetPmts`/`SolveSetLoans`/`SolveSetWDs`/`SolveSetLoanThenWD`.

use crate::policy::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlayStrategy {
    /// Use the explicit vector as given; no strategy resolution.
    Explicit,
    Target,
    Minimum,
    /// Maximum premium that will not cause the contract to become a MEC.
    Mep,
    Glp,
    Gsp,
    Corridor,
    Table,
    SalaryPercent,
}

#[derive(Debug, Clone)]
pub struct OutlayHolder {
    pub gross_premium: Vec<f64>,
    pub ee_premium: Vec<f64>,
    pub er_premium: Vec<f64>,
    pub new_loan: Vec<f64>,
    pub withdrawal: Vec<f64>,
    pub mode: Vec<Mode>,
    pub strategy: OutlayStrategy,
}

impl OutlayHolder {
    pub fn new(years_to_maturity: usize, mode: Mode, strategy: OutlayStrategy) -> Self {
        OutlayHolder {
            gross_premium: vec![0.0; years_to_maturity],
            ee_premium: vec![0.0; years_to_maturity],
            er_premium: vec![0.0; years_to_maturity],
            new_loan: vec![0.0; years_to_maturity],
            withdrawal: vec![0.0; years_to_maturity],
            mode: vec![mode; years_to_maturity],
            strategy,
        }
    }

    pub fn len(&self) -> usize {
        self.gross_premium.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gross_premium.is_empty()
    }

    /// Overwrites the frozen outlay (premium, loan, withdrawal) from a
    /// governing-basis run, for use as `overriding_payments` on a
    /// non-governing basis (C12). Overwrites the full vector since
    /// cross-basis consistency must hold at every duration, not just a
    /// solved range.
    pub fn apply_overriding_payments(&mut self, overriding: &OverridingPayments) {
        self.gross_premium = overriding.gross_premium.clone();
        self.new_loan = overriding.new_loan.clone();
        self.withdrawal = overriding.withdrawal.clone();
        self.strategy = OutlayStrategy::Explicit;
    }

    pub fn to_overriding_payments(&self) -> OverridingPayments {
        OverridingPayments {
            gross_premium: self.gross_premium.clone(),
            new_loan: self.new_loan.clone(),
            withdrawal: self.withdrawal.clone(),
        }
    }

    pub fn solve_set_pmts(&mut self, amount: f64, begin_year: usize, end_year: usize) {
        let end = end_year.min(self.gross_premium.len());
        for year in begin_year..end {
            self.gross_premium[year] = amount;
        }
    }

    pub fn solve_set_loans(&mut self, amount: f64, begin_year: usize, end_year: usize) {
        let end = end_year.min(self.new_loan.len());
        for year in begin_year..end {
            self.new_loan[year] = amount;
        }
    }

    pub fn solve_set_wds(&mut self, amount: f64, begin_year: usize, end_year: usize) {
        let end = end_year.min(self.withdrawal.len());
        for year in begin_year..end {
            self.withdrawal[year] = amount;
        }
    }

    /// Applies a loan in the first half of the range and a withdrawal in
    /// the second half, per `SolveSetLoanThenWD`'s combined strategy.
    pub fn solve_set_loan_then_wd(&mut self, amount: f64, begin_year: usize, end_year: usize) {
        if begin_year >= end_year {
            return;
        }
        let midpoint = begin_year + (end_year - begin_year) / 2;
        self.solve_set_loans(amount, begin_year, midpoint);
        self.solve_set_wds(amount, midpoint, end_year);
    }
}

/// Outlay frozen by the governing basis and reused, unmodified, by every
/// other basis — `accountvalue.hpp`'s `OverridingPmts`.
#[derive(Debug, Clone, Default)]
pub struct OverridingPayments {
    pub gross_premium: Vec<f64>,
    pub new_loan: Vec<f64>,
    pub withdrawal: Vec<f64>,
}
