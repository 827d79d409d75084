//! The sixteen ordered monthiversary transactions (C11).
//!
//! Method names and order are transliterated from `accountvalue.hpp`'s
//! private `Tx*` methods into `snake_case`: `tx_set_bom_av`, `tx_opt_chg`,
//! `tx_spec_amt_chg`, `tx_set_7702`, `tx_pmt`, `tx_loan_repay`,
//! `tx_set_death_bft`, `tx_set_coi`, `tx_set_rider_ded`, `tx_do_mly_ded`,
//! `tx_credit_int`, `tx_loan_int`, `tx_take_wd`, `tx_take_loan`,
//! `tx_test_lapse`, `tx_debug`. Each is an inherent method on
//! [`AccountValue`] taking `&mut EngineState` plus a per-month scratch
//! [`MonthWorkspace`] that the engine (`engine::mod`) drains into the
//! ledger at the end of the month. The order itself is load-bearing: a
//! premium received this month affects this month's COI via the updated
//! net amount at risk, but a loan taken this month does not affect this
//! month's interest credit.

use crate::error::LmiError;
use crate::rates::LoadSchedule;
use crate::rounding::Rounder;
use crate::tax7702::gpt::GptBreachResponse;
use crate::tax7702::{is_material_change_event, DefnLifeIns, DefnMaterialChange, MecAvoidMethod};

use super::state::EngineState;
use crate::policy::DbOption;

/// Per-month scratch space, zeroed at the start of every month and drained
/// into the ledger's variant columns once the transaction sequence
/// completes. Nothing here survives past the month it's computed in.
#[derive(Debug, Clone, Default)]
pub struct MonthWorkspace {
    pub bom_av_general: f64,
    pub bom_av_separate: f64,
    pub gross_premium: f64,
    pub net_premium: f64,
    pub premium_load: f64,
    pub premium_tax: f64,
    pub dac_tax_load: f64,
    pub unnecessary_premium: f64,
    pub loan_repayment: f64,
    pub coi_charge: f64,
    pub rider_charge: f64,
    pub expense_charge: f64,
    pub interest_credited_general: f64,
    pub interest_credited_separate: f64,
    pub loan_interest_due: f64,
    pub loan_interest_credited: f64,
    pub withdrawal: f64,
    pub new_loan: f64,
    pub forceout: f64,
    pub expected_claim: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccountValue;

impl AccountValue {
    /// Snapshots beginning-of-month account value before any transaction
    /// touches it, used by COI and lapse-test logic later in the sequence.
    pub fn tx_set_bom_av(&self, state: &EngineState, work: &mut MonthWorkspace) {
        work.bom_av_general = state.av_general;
        work.bom_av_separate = state.av_separate;
    }

    /// Handles a death-benefit option change, preserving the death benefit
    /// at the instant of the swap by adjusting specified amount (A -> B
    /// drops specamt by current AV, B -> A raises it back). Every dbopt
    /// change is a GPT adjustment event: GLP/GSP are recomputed via the
    /// "A+B-C" formula regardless of which tax regime governs this
    /// contract. A benefit increase additionally counts as a §7702A
    /// material change when the elected `defn_material_change` policy says
    /// so, resetting the seven-pay window.
    #[allow(clippy::too_many_arguments)]
    pub fn tx_opt_chg(
        &self,
        state: &mut EngineState,
        requested: DbOption,
        glp_rate: f64,
        gsp_rate: f64,
        defn_material_change: DefnMaterialChange,
        current_duration: u32,
        seven_pay_premium_annual: f64,
    ) {
        if requested == state.dbopt {
            return;
        }
        let old_specamt = state.specamt;
        let av = state.total_av();
        state.specamt = match (state.dbopt, requested) {
            (DbOption::A, DbOption::B) => (state.specamt - av).max(0.0),
            (DbOption::B, DbOption::A) => state.specamt + av,
            _ => state.specamt,
        };
        state.dbopt = requested;

        state
            .gpt
            .apply_adjustment_event(glp_rate, old_specamt, glp_rate, state.specamt, gsp_rate);

        let benefit_increased = state.specamt > old_specamt;
        if is_material_change_event(defn_material_change, benefit_increased, false) {
            state
                .mec
                .material_change(defn_material_change, current_duration, seven_pay_premium_annual, state.specamt);
        }
    }

    /// Handles a specified-amount change (from the solver or a scheduled
    /// input sequence). A decrease retests the MEC seven-pay window against
    /// the lower benefit, per `mec_state.hpp`'s `E*` event group. Like a
    /// dbopt change, this is always a GPT adjustment event; an increase
    /// additionally resets the seven-pay window when the elected
    /// `defn_material_change` policy treats benefit increases as material.
    #[allow(clippy::too_many_arguments)]
    pub fn tx_spec_amt_chg(
        &self,
        state: &mut EngineState,
        requested_specamt: f64,
        seven_pay_premium_annual: f64,
        glp_rate: f64,
        gsp_rate: f64,
        defn_material_change: DefnMaterialChange,
        current_duration: u32,
    ) {
        let old_specamt = state.specamt;
        if requested_specamt < state.specamt {
            state.mec.reduce_benefit(requested_specamt, seven_pay_premium_annual);
        }
        state.specamt = requested_specamt;

        state
            .gpt
            .apply_adjustment_event(glp_rate, old_specamt, glp_rate, state.specamt, gsp_rate);

        let benefit_increased = requested_specamt > old_specamt;
        if benefit_increased && is_material_change_event(defn_material_change, benefit_increased, false) {
            state
                .mec
                .material_change(defn_material_change, current_duration, seven_pay_premium_annual, state.specamt);
        }
    }

    /// Accrues this year's seven-pay allowance once, at the first month of
    /// each policy year.
    pub fn tx_set_7702(&self, state: &mut EngineState) {
        if state.month_in_policy_year == 1 {
            state.mec.accrue_annual_allowance(state.policy_year);
        }
    }

    /// Applies a premium payment: under GPT, first resolves any guideline-
    /// premium breach per the elected avoidance method (crediting less than
    /// requested and recording a forceout; forcing a specified-amount
    /// increase sufficient to clear the shortfall and folding the resulting
    /// GLP/GSP delta into the GPT state; or allowing the MEC flag to
    /// stand); the credited amount is then split into loads, the net amount
    /// is credited to the general account, and the payment is run through
    /// the §7702A necessary/unnecessary split.
    ///
    /// `target_premium` is the full annual target, not a monthly twelfth:
    /// the target/excess split is measured against `state.cum_tgt_prem`,
    /// this policy year's target premium consumed so far (reset to zero at
    /// the start of each year), so a quarterly or annual premium compares
    /// against its proportional share of the annual target rather than
    /// always a flat 1/12.
    #[allow(clippy::too_many_arguments)]
    pub fn tx_pmt(
        &self,
        state: &mut EngineState,
        work: &mut MonthWorkspace,
        premium: f64,
        target_premium: f64,
        loads: &LoadSchedule,
        defn_life_ins: DefnLifeIns,
        mec_avoid_method: MecAvoidMethod,
        glp_rate: f64,
        gsp_rate: f64,
        rounder: &Rounder,
    ) {
        if premium <= 0.0 {
            return;
        }
        let (credited, forced_out) = if defn_life_ins == DefnLifeIns::Gpt {
            match crate::tax7702::gpt::resolve_breach(&state.gpt, premium, mec_avoid_method) {
                GptBreachResponse::AllowAsMec { credited } => (credited, 0.0),
                GptBreachResponse::ReducedToAllowance { credited, forced_out } => (credited, forced_out),
                GptBreachResponse::RequiresSpecAmtIncrease { shortfall } => {
                    if shortfall > 0.0 && glp_rate > 0.0 {
                        let old_specamt = state.specamt;
                        state.specamt += shortfall / glp_rate;
                        state
                            .gpt
                            .apply_adjustment_event(glp_rate, old_specamt, glp_rate, state.specamt, gsp_rate);
                    }
                    (premium, 0.0)
                }
            }
        } else {
            (premium, 0.0)
        };

        let remaining_target = (target_premium - state.cum_tgt_prem).max(0.0);
        let target_portion = credited.min(remaining_target);
        let excess_portion = (credited - target_portion).max(0.0);
        let premium_load = rounder.round(target_portion * loads.premium_load_target)
            + rounder.round(excess_portion * loads.premium_load_excess);
        let premium_tax = rounder.round(credited * loads.premium_tax_rate);
        let dac_tax_load = rounder.round(credited * loads.dac_tax_load);
        let net = credited - premium_load - premium_tax - dac_tax_load;

        state.av_general += net;
        state.cum_payments += credited;
        state.cum_tgt_prem += target_portion;
        state.cum_min_prem += target_portion;
        state.gpt.cum_payments += credited;

        let split = state.mec.receive_premium(credited);

        work.gross_premium = premium;
        work.net_premium = net;
        work.premium_load = premium_load;
        work.premium_tax = premium_tax;
        work.dac_tax_load = dac_tax_load;
        work.unnecessary_premium = split.unnecessary;
        work.forceout = forced_out;
    }

    /// Applies a loan repayment, paying down regular balance first, then
    /// preferred, and moving the collateral released back into the general
    /// account.
    pub fn tx_loan_repay(&self, state: &mut EngineState, work: &mut MonthWorkspace, repayment: f64) {
        if repayment <= 0.0 {
            return;
        }
        let reg_portion = repayment.min(state.reg_loan_balance);
        state.reg_loan_balance -= reg_portion;
        let remainder = repayment - reg_portion;
        let prf_portion = remainder.min(state.prf_loan_balance);
        state.prf_loan_balance -= prf_portion;
        let applied = reg_portion + prf_portion;
        state.av_general += applied;
        work.loan_repayment = applied;
    }

    /// Recomputes the death benefit for the month from the current
    /// specified amount, option, and account value, enforcing the §7702
    /// corridor under CVAT (GPT relies on GLP/GSP premium limits instead of
    /// a per-month corridor test).
    pub fn tx_set_death_bft(&self, state: &mut EngineState, corridor_factor: f64, defn_life_ins: DefnLifeIns) {
        let candidate = match state.dbopt {
            DbOption::A => state.specamt,
            DbOption::B => state.specamt + state.total_av(),
            DbOption::Rop => (state.specamt + state.cum_payments - state.cum_withdrawals).max(state.specamt),
        };
        state.death_benefit = match defn_life_ins {
            DefnLifeIns::Gpt => candidate,
            DefnLifeIns::Cvat | DefnLifeIns::Noncompliant => {
                crate::tax7702::cvat::enforce_corridor(candidate, state.total_av(), corridor_factor)
            }
        };
    }

    /// Computes this month's cost-of-insurance charge from the net amount
    /// at risk and the monthly mortality rate. Fails if `monthly_q >= 1.0`,
    /// which would make the NAAR-discount division meaningless.
    pub fn tx_set_coi(
        &self,
        state: &mut EngineState,
        work: &mut MonthWorkspace,
        monthly_q: f64,
        rounder: &Rounder,
    ) -> Result<(), LmiError> {
        if !(0.0..1.0).contains(&monthly_q) {
            return Err(LmiError::DomainViolation(format!(
                "monthly mortality rate {monthly_q} out of [0, 1) at policy year {}, month {}",
                state.policy_year, state.month_in_policy_year
            )));
        }
        let naar = state.net_amount_at_risk();
        work.coi_charge = rounder.round(naar * monthly_q);
        work.expected_claim = state.death_benefit * monthly_q;
        Ok(())
    }

    /// Applies rider charges; riders are priced externally and supplied as
    /// a flat monthly amount (rider pricing itself is out of scope).
    pub fn tx_set_rider_ded(&self, work: &mut MonthWorkspace, monthly_rider_charge: f64) {
        work.rider_charge = monthly_rider_charge;
    }

    /// Deducts the month's total charges (COI, riders, policy fees) from
    /// the general account.
    pub fn tx_do_mly_ded(&self, state: &mut EngineState, work: &mut MonthWorkspace, loads: &LoadSchedule, rounder: &Rounder) {
        let expense = rounder.round(loads.monthly_policy_fee + loads.annual_policy_fee / 12.0);
        work.expense_charge = expense;
        state.av_general -= work.coi_charge + work.rider_charge + expense;
    }

    /// Credits interest separately to the general and separate accounts.
    pub fn tx_credit_int(
        &self,
        state: &mut EngineState,
        work: &mut MonthWorkspace,
        monthly_i_general: f64,
        monthly_i_separate: f64,
        rounder: &Rounder,
    ) {
        let credit_general = rounder.round(state.av_general.max(0.0) * monthly_i_general);
        let credit_separate = rounder.round(state.av_separate.max(0.0) * monthly_i_separate);
        state.av_general += credit_general;
        state.av_separate += credit_separate;
        work.interest_credited_general = credit_general;
        work.interest_credited_separate = credit_separate;
    }

    /// Accrues loan interest: the policyholder owes the due rate on the
    /// outstanding balance, and the loan collateral is credited at the
    /// (generally lower) credited rate.
    pub fn tx_loan_int(&self, state: &mut EngineState, work: &mut MonthWorkspace, due_rate_monthly: f64, credited_rate_monthly: f64) {
        let reg_due = state.reg_loan_balance * due_rate_monthly;
        let prf_due = state.prf_loan_balance * due_rate_monthly;
        state.reg_loan_balance += reg_due;
        state.prf_loan_balance += prf_due;
        work.loan_interest_due = reg_due + prf_due;

        let credited = state.total_loan_balance() * credited_rate_monthly;
        state.av_general += credited;
        work.loan_interest_credited = credited;
    }

    /// Takes a withdrawal, capped at the net surrenderable value, drawing
    /// from the general account before the separate account.
    pub fn tx_take_wd(&self, state: &mut EngineState, work: &mut MonthWorkspace, requested: f64) {
        if requested <= 0.0 {
            return;
        }
        let available = (state.total_av() - state.total_loan_balance()).max(0.0);
        let wd = requested.min(available);
        if wd <= state.av_general {
            state.av_general -= wd;
        } else {
            let remainder = wd - state.av_general;
            state.av_general = 0.0;
            state.av_separate = (state.av_separate - remainder).max(0.0);
        }
        state.cum_withdrawals += wd;
        work.withdrawal = wd;
    }

    /// Takes a new policy loan, capped at the available loan value (a 90%
    /// loan-to-surrender-value ceiling), transferring the borrowed
    /// collateral out of account value (general before separate) into the
    /// loaned partition so it stops earning the credited rate and instead
    /// earns only the loan-credited rate via `tx_loan_int`.
    pub fn tx_take_loan(&self, state: &mut EngineState, work: &mut MonthWorkspace, requested: f64) {
        if requested <= 0.0 {
            return;
        }
        let available = ((state.total_av() - state.total_loan_balance()) * 0.9).max(0.0);
        let loan = requested.min(available);
        if loan <= state.av_general {
            state.av_general -= loan;
        } else {
            let remainder = loan - state.av_general;
            state.av_general = 0.0;
            state.av_separate = (state.av_separate - remainder).max(0.0);
        }
        state.reg_loan_balance += loan;
        work.new_loan = loan;
    }

    /// Tests for lapse: the contract lapses once its net cash surrender
    /// value (account value, less surrender charge, less loan balance) is
    /// exhausted. Latches `lapse_year` to the first year this happens and
    /// zeroes account value on the spot, so this and every subsequent month
    /// carries forward a lapsed contract with nothing left to project.
    pub fn tx_test_lapse(&self, state: &mut EngineState, surrchg: f64) {
        if state.lapsed {
            return;
        }
        let net_csv = state.total_av() - surrchg - state.total_loan_balance();
        if net_csv <= 0.0 {
            state.lapsed = true;
            state.lapse_year.get_or_insert(state.policy_year);
            state.av_general = 0.0;
            state.av_separate = 0.0;
        }
    }

    /// Audit hook: logs the month's full transaction trace at `trace!`
    /// level. Never fails, never mutates state.
    pub fn tx_debug(&self, state: &EngineState, work: &MonthWorkspace) {
        log::trace!(
            "year {} month {}: av_general={:.2} av_separate={:.2} db={:.2} coi={:.2} lapsed={}",
            state.policy_year,
            state.month_in_policy_year,
            state.av_general,
            state.av_separate,
            state.death_benefit,
            work.coi_charge,
            state.lapsed,
        );
    }
}
