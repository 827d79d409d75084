//! The `Input` record: a fully-validated description of one policy cell,
//! accepted as-is by the core (input validation itself is out of scope —
//! see `spec.md` §1). Grouped into sub-structs by concern, generalized from
//! the teacher's flat `Policy` struct (`src/policy/data.rs`, trimmed in the
//! final pass) into the field groups `spec.md` §6 names: identity,
//! demographics, coverage, payments, assumptions, strategy selectors, solve
//! configuration, tax elections, in-force snapshot, census role, and a
//! supplemental-report column selector.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::LmiError;
use crate::policy::death_benefit::DeathBenefitHolder;
use crate::policy::outlay::{OutlayHolder, OutlayStrategy};
use crate::policy::{DbOption, Gender, Mode, Smoking, UnderwritingClass};
use crate::sequence::ParsedSequence;
use crate::solver::SolveRequest;
use crate::tax7702::{DefnLifeIns, DefnMaterialChange, MecAvoidMethod};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub product_name: String,
    pub issue_date: NaiveDate,
    pub effective_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demographics {
    pub issue_age: u32,
    pub gender: Gender,
    pub smoking: Smoking,
    pub underwriting_class: UnderwritingClass,
    pub table_rating: u32,
    pub state_of_jurisdiction: String,
    pub retirement_age: u32,
    pub maturity_age: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coverage {
    pub initial_specamt: f64,
    pub initial_dbopt: DbOption,
    pub has_adb_rider: bool,
    pub has_wp_rider: bool,
    pub has_child_rider: bool,
    pub has_spouse_rider: bool,
}

/// A value that may either be given explicitly as a fixed per-year vector
/// or as an input-sequence string (C4) to be parsed and realized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeVarying {
    Fixed(Vec<f64>),
    Sequence(String),
}

impl TimeVarying {
    pub fn realize(
        &self,
        years_to_maturity: u32,
        issue_age: u32,
        retirement_age: u32,
        inforce_duration: u32,
    ) -> Result<Vec<f64>, crate::error::LmiError> {
        match self {
            TimeVarying::Fixed(v) => Ok(v.clone()),
            TimeVarying::Sequence(s) => {
                let parsed: ParsedSequence = crate::sequence::parse(s);
                parsed.realize(years_to_maturity, issue_age, retirement_age, inforce_duration)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payments {
    pub modal_premium: f64,
    pub mode: Mode,
    pub dumpin: f64,
    pub exchange_1035_amount: f64,
    pub outlay_strategy: OutlayStrategy,
    pub premium_sequence: Option<TimeVarying>,
    pub withdrawal_sequence: Option<TimeVarying>,
    pub loan_sequence: Option<TimeVarying>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assumptions {
    pub general_account_credited_rate: f64,
    pub separate_account_assumed_rate: f64,
    pub loan_rate: f64,
    pub loan_is_variable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveConfig {
    pub request: Option<SolveRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxElections {
    pub defn_life_ins: DefnLifeIns,
    pub mec_avoid_method: MecAvoidMethod,
    pub defn_material_change: DefnMaterialChange,
}

/// In-force snapshot for a policy that did not begin its projection at
/// issue.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InforceSnapshot {
    pub inforce_duration_months: u32,
    pub av_general: f64,
    pub av_separate: f64,
    pub av_regular_loan: f64,
    pub av_preferred_loan: f64,
    pub reg_loan_balance: f64,
    pub prf_loan_balance: f64,
    pub cum_payments: f64,
    pub cum_glp: f64,
    pub cum_7pp: f64,
    pub is_mec: bool,
    pub dcv: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CensusRole {
    pub include_in_composite: bool,
    pub identical_lives: f64,
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SupplementalReport {
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Input {
    pub identity: Identity,
    pub demographics: Demographics,
    pub coverage: Coverage,
    pub payments: Payments,
    pub assumptions: Assumptions,
    pub solve: SolveConfig,
    pub tax: TaxElections,
    #[serde(default)]
    pub inforce: InforceSnapshot,
    #[serde(default)]
    pub census_role: CensusRole,
    #[serde(default)]
    pub supplemental_report: SupplementalReport,
}

impl Input {
    pub fn years_to_maturity(&self) -> u32 {
        self.demographics
            .maturity_age
            .saturating_sub(self.demographics.issue_age)
    }

    /// Builds the death-benefit holder (C8) an engine run starts from: a
    /// flat vector at the issue specified amount and option, with no
    /// product-defined minimum floor (out of scope of this record).
    pub fn build_death_benefit_holder(&self) -> DeathBenefitHolder {
        DeathBenefitHolder::new(
            self.years_to_maturity() as usize,
            self.coverage.initial_specamt,
            self.coverage.initial_dbopt,
            0.0,
        )
    }

    /// Builds the outlay holder (C9) an engine run starts from, realizing
    /// any input-sequence (C4) premium/withdrawal/loan schedules against
    /// this record's timing, or falling back to a level modal premium when
    /// no premium sequence is given.
    pub fn build_outlay_holder(&self) -> Result<OutlayHolder, LmiError> {
        let years = self.years_to_maturity();
        let mut holder = OutlayHolder::new(years as usize, self.payments.mode, self.payments.outlay_strategy);

        match &self.payments.premium_sequence {
            Some(seq) => holder.gross_premium = self.realize(seq)?,
            None => {
                let annual = self.payments.modal_premium * self.payments.mode.frequency() as f64;
                holder.solve_set_pmts(annual, 0, years as usize);
            }
        }
        if let Some(seq) = &self.payments.withdrawal_sequence {
            holder.withdrawal = self.realize(seq)?;
        }
        if let Some(seq) = &self.payments.loan_sequence {
            holder.new_loan = self.realize(seq)?;
        }
        Ok(holder)
    }

    fn realize(&self, sequence: &TimeVarying) -> Result<Vec<f64>, LmiError> {
        sequence.realize(
            self.years_to_maturity(),
            self.demographics.issue_age,
            self.demographics.retirement_age,
            self.inforce.inforce_duration_months,
        )
    }
}
