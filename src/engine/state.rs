//! Per-month mutable state carried between transactions (C11).
//!
//! Mirrors the teacher's `ProjectionState`/`advance_month` split: one struct
//! holding everything that persists across months, with a single method
//! that advances timing fields at the start of each month. Account-value
//! and tax-compliance fields are mutated in place by the ordered `tx_*`
//! methods in [`super::transactions`], not recomputed here.

use crate::policy::{attained_age, month_in_policy_year, policy_year, DbOption};
use crate::tax7702::gpt::GptState;
use crate::tax7702::mec::MecTestState;

#[derive(Debug, Clone)]
pub struct EngineState {
    pub projection_month: u32,
    pub policy_year: u32,
    pub month_in_policy_year: u32,
    pub attained_age: u32,

    pub av_general: f64,
    pub av_separate: f64,
    pub reg_loan_balance: f64,
    pub prf_loan_balance: f64,

    pub specamt: f64,
    pub dbopt: DbOption,
    pub death_benefit: f64,

    pub cum_payments: f64,
    pub cum_tgt_prem: f64,
    pub cum_min_prem: f64,
    pub cum_withdrawals: f64,

    pub mec: MecTestState,
    pub gpt: GptState,

    pub lapsed: bool,
    pub lapse_year: Option<u32>,
}

impl EngineState {
    pub fn new(
        issue_age: u32,
        initial_specamt: f64,
        initial_dbopt: DbOption,
        initial_av_general: f64,
        initial_av_separate: f64,
        seven_pay_premium_annual: f64,
        initial_glp_rate: f64,
        initial_gsp_rate: f64,
    ) -> Self {
        EngineState {
            projection_month: 0,
            policy_year: 1,
            month_in_policy_year: 0,
            attained_age: issue_age,
            av_general: initial_av_general,
            av_separate: initial_av_separate,
            reg_loan_balance: 0.0,
            prf_loan_balance: 0.0,
            specamt: initial_specamt,
            dbopt: initial_dbopt,
            death_benefit: initial_specamt,
            cum_payments: 0.0,
            cum_tgt_prem: 0.0,
            cum_min_prem: 0.0,
            cum_withdrawals: 0.0,
            mec: MecTestState::new(seven_pay_premium_annual, initial_specamt),
            gpt: GptState::new(initial_glp_rate, initial_gsp_rate, initial_specamt),
            lapsed: false,
            lapse_year: None,
        }
    }

    /// Advances timing fields for the next monthiversary, given the
    /// in-force offset (months already in force at projection start).
    pub fn advance_month(&mut self, inforce_duration_months: u32, issue_age: u32) {
        self.projection_month += 1;
        self.policy_year = policy_year(inforce_duration_months, self.projection_month);
        self.month_in_policy_year = month_in_policy_year(inforce_duration_months, self.projection_month);
        self.attained_age = attained_age(issue_age, inforce_duration_months, self.projection_month);
    }

    pub fn total_av(&self) -> f64 {
        self.av_general + self.av_separate
    }

    pub fn net_amount_at_risk(&self) -> f64 {
        (self.death_benefit - self.total_av()).max(0.0)
    }

    pub fn total_loan_balance(&self) -> f64 {
        self.reg_loan_balance + self.prf_loan_balance
    }
}
