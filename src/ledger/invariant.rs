//! The basis-independent half of a ledger (C10): values that are the same
//! across every basis a run produces, so they're stored once rather than
//! duplicated per [`super::variant::VariantPart`].

use crate::policy::outlay::OverridingPayments;
use crate::policy::DbOption;

#[derive(Debug, Clone)]
pub struct InvariantPart {
    pub product_name: String,
    pub issue_age: u32,
    pub retirement_age: u32,
    pub maturity_age: u32,
    /// Attained age at the end of each projection year, `age[0]` being the
    /// age at the end of the first policy year.
    pub age: Vec<u32>,
    pub initial_specamt: f64,
    pub initial_dbopt: DbOption,
    pub initial_premium: f64,
    /// Initial premium split into its load components: (net, premium load,
    /// sales load, dac tax load, premium tax).
    pub initial_premium_breakdown: InitialPremiumBreakdown,
    pub single_premium_factor: f64,
    /// Outlay frozen by the governing basis, written only once, by
    /// [`crate::runner::run`], then shared read-only by every other basis
    /// for cross-basis consistency (C12).
    pub overriding_payments: Option<OverridingPayments>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InitialPremiumBreakdown {
    pub net: f64,
    pub premium_load: f64,
    pub sales_load: f64,
    pub dac_tax_load: f64,
    pub premium_tax: f64,
}

impl InvariantPart {
    pub fn new(
        product_name: String,
        issue_age: u32,
        retirement_age: u32,
        maturity_age: u32,
        initial_specamt: f64,
        initial_dbopt: DbOption,
    ) -> Self {
        let years = (maturity_age.saturating_sub(issue_age)) as usize;
        InvariantPart {
            product_name,
            issue_age,
            retirement_age,
            maturity_age,
            age: (0..years).map(|k| issue_age + k as u32 + 1).collect(),
            initial_specamt,
            initial_dbopt,
            initial_premium: 0.0,
            initial_premium_breakdown: InitialPremiumBreakdown::default(),
            single_premium_factor: 0.0,
            overriding_payments: None,
        }
    }

    pub fn years_to_maturity(&self) -> usize {
        self.age.len()
    }
}
