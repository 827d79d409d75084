//! The basis-dependent half of a ledger (C10): one instance per [`crate::
//! ledger::basis::Basis`] a run produces, carrying every per-year numeric
//! column named in `spec.md` §3/§4.10 — account value partitions, death
//! benefit, charges, interest credits, premium decomposition, and the
//! tax-compliance outputs (`cum_glp`, `gsp`, `seven_pp`, `dcv`, `is_mec`).
//!
//! `VariantBuilder` resolves the engine↔ledger friendship: the engine
//! (C11) holds one builder for the duration of a basis run and pushes a
//! year's worth of values into it at a time; nothing else can write to a
//! `VariantPart` once it's built.

#[derive(Debug, Clone)]
pub struct VariantPart {
    pub eoy_av_general: Vec<f64>,
    pub eoy_av_separate: Vec<f64>,
    pub eoy_av_regular_loan: Vec<f64>,
    pub eoy_av_preferred_loan: Vec<f64>,
    pub eoy_csv_net: Vec<f64>,
    pub eoy_cv_7702: Vec<f64>,
    pub eoy_death_benefit: Vec<f64>,
    pub coi_charge: Vec<f64>,
    pub rider_charge: Vec<f64>,
    pub expense_charge: Vec<f64>,
    pub interest_credited_general: Vec<f64>,
    pub interest_credited_separate: Vec<f64>,
    pub loan_interest_credited: Vec<f64>,
    pub loan_interest_due: Vec<f64>,
    pub claims: Vec<f64>,
    pub gross_premium: Vec<f64>,
    pub net_premium: Vec<f64>,
    pub premium_load: Vec<f64>,
    pub premium_tax: Vec<f64>,
    pub dac_tax_load: Vec<f64>,
    pub new_loan: Vec<f64>,
    pub loan_repayment: Vec<f64>,
    pub withdrawal: Vec<f64>,
    pub forceout: Vec<f64>,
    pub cum_glp: Vec<f64>,
    pub gsp: Vec<f64>,
    pub seven_pp: Vec<f64>,
    pub dcv: Vec<f64>,
    pub is_mec_by_year: Vec<bool>,
    /// Last policy year in which the contract was in force; `None` if the
    /// contract survived to maturity without lapsing.
    pub lapse_year: Option<u32>,
}

impl VariantPart {
    pub fn builder(years_to_maturity: usize) -> VariantBuilder {
        VariantBuilder::new(years_to_maturity)
    }

    pub fn years_to_maturity(&self) -> usize {
        self.eoy_av_general.len()
    }

    /// Total end-of-year account value. `eoy_av_regular_loan`/
    /// `eoy_av_preferred_loan` mirror the outstanding loan balance for
    /// reporting (§3's "loaned AV mirrors outstanding loan balance")
    /// rather than holding a separate pool of dollars carved out of
    /// `eoy_av_general`/`eoy_av_separate` — the engine (C11) never moves
    /// cash into a loan partition, it only accrues a debt against the
    /// unencumbered fund — so they are not added again here; doing so
    /// would double count the loan-collateralized value and break the
    /// `eoy_csv_net = total AV - loan balance` identity used when a
    /// basis's variant part is recorded.
    pub fn eoy_av_total(&self, year: usize) -> f64 {
        self.eoy_av_general[year] + self.eoy_av_separate[year]
    }
}

macro_rules! variant_fields {
    ($($name:ident: $ty:ty = $default:expr),+ $(,)?) => {
        pub struct VariantBuilder {
            years_to_maturity: usize,
            $(pub(crate) $name: $ty,)+
        }

        impl VariantBuilder {
            fn new(years_to_maturity: usize) -> Self {
                VariantBuilder {
                    years_to_maturity,
                    $($name: vec![$default; years_to_maturity],)+
                }
            }

            pub fn build(self) -> VariantPart {
                VariantPart {
                    $($name: self.$name,)+
                    lapse_year: None,
                }
            }
        }
    };
}

variant_fields! {
    eoy_av_general: Vec<f64> = 0.0,
    eoy_av_separate: Vec<f64> = 0.0,
    eoy_av_regular_loan: Vec<f64> = 0.0,
    eoy_av_preferred_loan: Vec<f64> = 0.0,
    eoy_csv_net: Vec<f64> = 0.0,
    eoy_cv_7702: Vec<f64> = 0.0,
    eoy_death_benefit: Vec<f64> = 0.0,
    coi_charge: Vec<f64> = 0.0,
    rider_charge: Vec<f64> = 0.0,
    expense_charge: Vec<f64> = 0.0,
    interest_credited_general: Vec<f64> = 0.0,
    interest_credited_separate: Vec<f64> = 0.0,
    loan_interest_credited: Vec<f64> = 0.0,
    loan_interest_due: Vec<f64> = 0.0,
    claims: Vec<f64> = 0.0,
    gross_premium: Vec<f64> = 0.0,
    net_premium: Vec<f64> = 0.0,
    premium_load: Vec<f64> = 0.0,
    premium_tax: Vec<f64> = 0.0,
    dac_tax_load: Vec<f64> = 0.0,
    new_loan: Vec<f64> = 0.0,
    loan_repayment: Vec<f64> = 0.0,
    withdrawal: Vec<f64> = 0.0,
    forceout: Vec<f64> = 0.0,
    cum_glp: Vec<f64> = 0.0,
    gsp: Vec<f64> = 0.0,
    seven_pp: Vec<f64> = 0.0,
    dcv: Vec<f64> = 0.0,
    is_mec_by_year: Vec<bool> = false,
}

impl VariantBuilder {
    pub fn years_to_maturity(&self) -> usize {
        self.years_to_maturity
    }

    pub fn set_lapse_year(self, lapse_year: Option<u32>) -> VariantPart {
        let mut built = self.build();
        built.lapse_year = lapse_year;
        built
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_zeroed_vectors_of_the_right_length() {
        let variant = VariantPart::builder(40).build();
        assert_eq!(variant.eoy_av_general.len(), 40);
        assert_eq!(variant.is_mec_by_year.len(), 40);
        assert!(variant.is_mec_by_year.iter().all(|&m| !m));
        assert_eq!(variant.lapse_year, None);
    }

    #[test]
    fn total_av_is_unaffected_by_the_loan_reporting_columns() {
        let mut builder = VariantPart::builder(5);
        builder.eoy_av_general[0] = 1_000.0;
        builder.eoy_av_separate[0] = 500.0;
        builder.eoy_av_regular_loan[0] = 200.0;
        let variant = builder.build();
        assert_eq!(variant.eoy_av_total(0), 1_500.0);
    }
}
