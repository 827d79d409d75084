//! Ledger data model (C10): the output of a single illustration run. One
//! [`invariant::InvariantPart`] shared across bases, plus one
//! [`variant::VariantPart`] per [`basis::Basis`] actually run.

pub mod basis;
pub mod invariant;
pub mod variant;

use std::collections::HashMap;

use serde::Serialize;

pub use basis::{Basis, RunBasisSelector};
pub use invariant::InvariantPart;
pub use variant::VariantPart;

#[derive(Debug, Clone)]
pub struct Ledger {
    pub invariant: InvariantPart,
    pub variant: HashMap<Basis, VariantPart>,
    /// Set when this ledger is itself the weighted composite of several
    /// cells' ledgers (C14), rather than a single policy's output.
    pub is_composite: bool,
}

impl Ledger {
    pub fn new(invariant: InvariantPart) -> Self {
        Ledger {
            invariant,
            variant: HashMap::new(),
            is_composite: false,
        }
    }

    /// Weighted element-wise sum of two ledgers' variant parts, truncating
    /// past whichever lapsed first. Both ledgers must carry the same set of
    /// bases. Composite lapse year is the max across components (an Open
    /// Question resolved this way; see `composite_lapse_year_is_max`
    /// below).
    pub fn compose(&self, other: &Ledger, weight_self: f64, weight_other: f64) -> Ledger {
        let mut composite = Ledger::new(self.invariant.clone());
        composite.is_composite = true;

        for (basis, self_variant) in &self.variant {
            let Some(other_variant) = other.variant.get(basis) else {
                continue;
            };
            composite
                .variant
                .insert(*basis, compose_variant(self_variant, other_variant, weight_self, weight_other));
        }
        composite
    }

    /// Rescales every monetary column on every basis by a single power of
    /// ten so that the largest magnitude fits within `max_digit_width`
    /// digits, returning the power of ten applied (0 if no scaling was
    /// needed).
    pub fn autoscale(&mut self, max_digit_width: u32) -> i32 {
        let max_magnitude = self
            .variant
            .values()
            .flat_map(|v| v.eoy_av_general.iter().chain(v.eoy_death_benefit.iter()))
            .fold(0.0_f64, |acc, &x| acc.max(x.abs()));

        if max_magnitude < 1.0 {
            return 0;
        }

        let digits = max_magnitude.log10().floor() as i32 + 1;
        let excess = digits - max_digit_width as i32;
        if excess <= 0 {
            return 0;
        }
        let scale = 10f64.powi(excess);
        for variant in self.variant.values_mut() {
            scale_variant(variant, scale);
        }
        excess
    }
}

fn weighted_lapse_year(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) | (None, Some(x)) => Some(x),
        (Some(x), Some(y)) => Some(x.max(y)),
    }
}

fn compose_vec(a: &[f64], b: &[f64], wa: f64, wb: f64, truncate_at: Option<usize>) -> Vec<f64> {
    a.iter()
        .zip(b.iter())
        .enumerate()
        .map(|(year, (&x, &y))| match truncate_at {
            Some(limit) if year >= limit => 0.0,
            _ => x * wa + y * wb,
        })
        .collect()
}

fn compose_variant(a: &VariantPart, b: &VariantPart, wa: f64, wb: f64) -> VariantPart {
    let lapse_year = weighted_lapse_year(a.lapse_year, b.lapse_year);
    // Columns stay populated through the composite's lapse year even if one
    // component lapsed earlier; only the shorter-surviving component's own
    // post-lapse entries are zero already, so no truncation index is needed
    // beyond what each component already encodes.
    let truncate_at = None;

    VariantPart {
        eoy_av_general: compose_vec(&a.eoy_av_general, &b.eoy_av_general, wa, wb, truncate_at),
        eoy_av_separate: compose_vec(&a.eoy_av_separate, &b.eoy_av_separate, wa, wb, truncate_at),
        eoy_av_regular_loan: compose_vec(&a.eoy_av_regular_loan, &b.eoy_av_regular_loan, wa, wb, truncate_at),
        eoy_av_preferred_loan: compose_vec(&a.eoy_av_preferred_loan, &b.eoy_av_preferred_loan, wa, wb, truncate_at),
        eoy_csv_net: compose_vec(&a.eoy_csv_net, &b.eoy_csv_net, wa, wb, truncate_at),
        eoy_cv_7702: compose_vec(&a.eoy_cv_7702, &b.eoy_cv_7702, wa, wb, truncate_at),
        eoy_death_benefit: compose_vec(&a.eoy_death_benefit, &b.eoy_death_benefit, wa, wb, truncate_at),
        coi_charge: compose_vec(&a.coi_charge, &b.coi_charge, wa, wb, truncate_at),
        rider_charge: compose_vec(&a.rider_charge, &b.rider_charge, wa, wb, truncate_at),
        expense_charge: compose_vec(&a.expense_charge, &b.expense_charge, wa, wb, truncate_at),
        interest_credited_general: compose_vec(&a.interest_credited_general, &b.interest_credited_general, wa, wb, truncate_at),
        interest_credited_separate: compose_vec(&a.interest_credited_separate, &b.interest_credited_separate, wa, wb, truncate_at),
        loan_interest_credited: compose_vec(&a.loan_interest_credited, &b.loan_interest_credited, wa, wb, truncate_at),
        loan_interest_due: compose_vec(&a.loan_interest_due, &b.loan_interest_due, wa, wb, truncate_at),
        claims: compose_vec(&a.claims, &b.claims, wa, wb, truncate_at),
        gross_premium: compose_vec(&a.gross_premium, &b.gross_premium, wa, wb, truncate_at),
        net_premium: compose_vec(&a.net_premium, &b.net_premium, wa, wb, truncate_at),
        premium_load: compose_vec(&a.premium_load, &b.premium_load, wa, wb, truncate_at),
        premium_tax: compose_vec(&a.premium_tax, &b.premium_tax, wa, wb, truncate_at),
        dac_tax_load: compose_vec(&a.dac_tax_load, &b.dac_tax_load, wa, wb, truncate_at),
        new_loan: compose_vec(&a.new_loan, &b.new_loan, wa, wb, truncate_at),
        loan_repayment: compose_vec(&a.loan_repayment, &b.loan_repayment, wa, wb, truncate_at),
        withdrawal: compose_vec(&a.withdrawal, &b.withdrawal, wa, wb, truncate_at),
        forceout: compose_vec(&a.forceout, &b.forceout, wa, wb, truncate_at),
        // Tax-compliance columns are per-life quantities, not additive
        // dollar amounts; the composite carries the governing cell's
        // values (here, `a`'s) rather than a meaningless weighted blend.
        cum_glp: a.cum_glp.clone(),
        gsp: a.gsp.clone(),
        seven_pp: a.seven_pp.clone(),
        dcv: a.dcv.clone(),
        is_mec_by_year: a.is_mec_by_year.clone(),
        lapse_year,
    }
}

fn scale_variant(variant: &mut VariantPart, scale: f64) {
    for vec in [
        &mut variant.eoy_av_general,
        &mut variant.eoy_av_separate,
        &mut variant.eoy_av_regular_loan,
        &mut variant.eoy_av_preferred_loan,
        &mut variant.eoy_csv_net,
        &mut variant.eoy_cv_7702,
        &mut variant.eoy_death_benefit,
        &mut variant.coi_charge,
        &mut variant.rider_charge,
        &mut variant.expense_charge,
        &mut variant.interest_credited_general,
        &mut variant.interest_credited_separate,
        &mut variant.loan_interest_credited,
        &mut variant.loan_interest_due,
        &mut variant.claims,
        &mut variant.gross_premium,
        &mut variant.net_premium,
        &mut variant.premium_load,
        &mut variant.premium_tax,
        &mut variant.dac_tax_load,
        &mut variant.new_loan,
        &mut variant.loan_repayment,
        &mut variant.withdrawal,
        &mut variant.forceout,
    ] {
        for x in vec.iter_mut() {
            *x /= scale;
        }
    }
}

/// Minimal JSON-friendly view of a ledger, since `InvariantPart` and
/// `VariantPart` intentionally don't derive `Serialize` directly (several
/// fields are engine-internal bookkeeping not meant for external display).
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub product_name: String,
    pub issue_age: u32,
    pub bases: Vec<&'static str>,
}

impl From<&Ledger> for LedgerSummary {
    fn from(ledger: &Ledger) -> Self {
        LedgerSummary {
            product_name: ledger.invariant.product_name.clone(),
            issue_age: ledger.invariant.issue_age,
            bases: ledger.variant.keys().map(|b| b.label()).collect(),
        }
    }
}
