//! AccountValue engine (C11): month-by-month projection for a single
//! policy under a single basis. Orchestrates the sixteen ordered
//! transactions in [`transactions`] against the persistent [`state::
//! EngineState`], producing one basis's [`crate::ledger::VariantPart`].

pub mod state;
pub mod transactions;

use crate::error::LmiError;
use crate::input::Input;
use crate::ledger::variant::VariantBuilder;
use crate::ledger::{Basis, VariantPart};
use crate::policy::death_benefit::DeathBenefitHolder;
use crate::policy::outlay::{OutlayHolder, OutlayStrategy};
use crate::rates::RateProvider;
use crate::rounding::{Rounder, RoundingStyle};
use crate::tax7702::DefnLifeIns;

use state::EngineState;
use transactions::{AccountValue, MonthWorkspace};

/// Spread subtracted from the gross loan rate to get the rate credited to
/// loaned collateral, via [`crate::interest::net_i_from_gross`].
/// `Assumptions` carries no explicit loan-spread field, so this is a fixed
/// simplification rather than a product-specific input.
const LOAN_SPREAD: f64 = 0.01;

/// Runs one policy through one basis, end to end, producing a populated
/// [`VariantPart`]. Called once per basis by the runner (C12); the
/// governing basis is run first, and its resulting outlay is frozen into
/// `overriding_payments` for the remaining bases (handled by the caller,
/// not here — this function always resolves outlay from `outlay` as
/// given).
pub fn run_one_basis(
    input: &Input,
    basis: Basis,
    death_benefit: &DeathBenefitHolder,
    outlay: &OutlayHolder,
    rate_provider: &dyn RateProvider,
) -> Result<VariantPart, LmiError> {
    let years = input.years_to_maturity() as usize;
    let months = years * 12;

    let mortality = rate_provider.get_mortality(basis, months)?;
    let interest = rate_provider.get_interest(basis, months)?;
    let corridor = rate_provider.get_corridor(years)?;
    let seven_pp = rate_provider.get_7pp(years)?;
    let glp = rate_provider.get_glp(years)?;
    let gsp = rate_provider.get_gsp(years)?;
    let loads = rate_provider.get_loads();

    let issue_age = input.demographics.issue_age;
    let inforce_duration = input.inforce.inforce_duration_months;
    let initial_specamt = death_benefit.specamt(0)?;
    let initial_dbopt = death_benefit.dbopt(0);

    let mut state = EngineState::new(
        issue_age,
        initial_specamt,
        initial_dbopt,
        input.inforce.av_general,
        input.inforce.av_separate,
        seven_pp[0] * initial_specamt,
        glp[0],
        gsp[0],
    );
    state.reg_loan_balance = input.inforce.reg_loan_balance;
    state.prf_loan_balance = input.inforce.prf_loan_balance;
    state.cum_payments = input.inforce.cum_payments;

    let tx = AccountValue;
    let mut builder = VariantPart::builder(years);
    let money_round = Rounder::new(2, RoundingStyle::ToNearestHalfAwayFromZero);

    // A duration/annual credited rate can't be applied straight to a
    // monthly accrual; convert via i -> i^(12)/12 (C3) first.
    let loan_due_monthly = crate::interest::i_upper_n_over_n_from_i(input.assumptions.loan_rate, 12)? / 12.0;
    let loan_credited_annual = crate::interest::net_i_from_gross(input.assumptions.loan_rate, LOAN_SPREAD, 0.0, 12)?;
    let loan_credited_monthly = crate::interest::i_upper_n_over_n_from_i(loan_credited_annual, 12)? / 12.0;

    // The separate account runs off the assumed rate, not the rate
    // provider's general-account vector, scaled per the Zero/Half sep-acct
    // basis variants.
    let separate_account_annual_rate = match basis {
        Basis::CurrentSepAcctZero | Basis::GuaranteedSepAcctZero => 0.0,
        Basis::CurrentSepAcctHalf | Basis::GuaranteedSepAcctHalf => input.assumptions.separate_account_assumed_rate / 2.0,
        _ => input.assumptions.separate_account_assumed_rate,
    };
    let separate_monthly_i = crate::interest::i_upper_n_over_n_from_i(separate_account_annual_rate, 12)? / 12.0;

    log::info!("engine start: basis={} years_to_maturity={years}", basis.label());

    'years: for year in 0..years {
        let specamt_year = death_benefit.specamt(year)?;
        let dbopt_year = death_benefit.dbopt(year);
        if dbopt_year != state.dbopt {
            tx.tx_opt_chg(
                &mut state,
                dbopt_year,
                glp[year],
                gsp[year],
                input.tax.defn_material_change,
                year as u32,
                seven_pp[year] * specamt_year,
            );
        }
        if (specamt_year - state.specamt).abs() > 1e-9 {
            tx.tx_spec_amt_chg(
                &mut state,
                specamt_year,
                seven_pp[year] * specamt_year,
                glp[year],
                gsp[year],
                input.tax.defn_material_change,
                year as u32,
            );
        }

        let surrchg_year = rate_provider.get_surrchg(year);
        let corridor_factor = corridor[year];
        let target_premium = loads.target_premium_per_unit * specamt_year;
        state.cum_tgt_prem = 0.0;
        state.cum_min_prem = 0.0;
        let annual_premium = perform_pmt_strategy(
            outlay.strategy,
            outlay.gross_premium.get(year).copied().unwrap_or(0.0),
            target_premium,
            corridor_factor,
            specamt_year,
            surrchg_year,
            glp[year],
            gsp[year],
            &state,
        );
        let annual_loan = outlay.new_loan.get(year).copied().unwrap_or(0.0);
        let annual_wd = outlay.withdrawal.get(year).copied().unwrap_or(0.0);
        let months_per_payment = outlay.mode.get(year).map(|m| m.months_per_payment()).unwrap_or(1);

        log::debug!(
            "year {}: specamt={specamt_year:.2} dbopt={dbopt_year:?} premium={annual_premium:.2}",
            year + 1
        );

        for month_in_year in 0..12u32 {
            state.advance_month(inforce_duration, issue_age);
            let month_index = (state.projection_month - 1) as usize;
            let monthly_q = mortality.get(month_index).copied().unwrap_or(0.0).min(0.999_999);
            let monthly_i_general = interest.get(month_index).copied().unwrap_or(0.0);

            let mut work = MonthWorkspace::default();
            tx.tx_set_bom_av(&state, &mut work);
            tx.tx_set_7702(&mut state);

            let premium_due_this_month = if months_per_payment > 0 && month_in_year % months_per_payment == 0 {
                annual_premium / (12 / months_per_payment) as f64
            } else {
                0.0
            };
            tx.tx_pmt(
                &mut state,
                &mut work,
                premium_due_this_month,
                target_premium,
                &loads,
                input.tax.defn_life_ins,
                input.tax.mec_avoid_method,
                glp[year],
                gsp[year],
                &money_round,
            );
            tx.tx_loan_repay(&mut state, &mut work, 0.0);
            tx.tx_set_death_bft(&mut state, corridor_factor, input.tax.defn_life_ins);
            tx.tx_set_coi(&mut state, &mut work, monthly_q, &money_round)?;
            tx.tx_set_rider_ded(&mut work, 0.0);
            tx.tx_do_mly_ded(&mut state, &mut work, &loads, &money_round);
            tx.tx_credit_int(&mut state, &mut work, monthly_i_general, separate_monthly_i, &money_round);
            state.mec.step_dcv(
                work.net_premium,
                work.coi_charge + work.rider_charge + work.expense_charge,
                monthly_i_general,
            );
            tx.tx_loan_int(&mut state, &mut work, loan_due_monthly, loan_credited_monthly);
            tx.tx_take_wd(&mut state, &mut work, annual_wd / 12.0);
            tx.tx_take_loan(&mut state, &mut work, annual_loan / 12.0);
            tx.tx_test_lapse(&mut state, surrchg_year);
            tx.tx_debug(&state, &work);

            accumulate_month(&mut builder, year, &work);

            if state.lapsed {
                log::warn!("policy lapsed in year {}", state.policy_year);
                record_year_end(&mut builder, year, &state, input.tax.defn_life_ins, surrchg_year);
                break 'years;
            }
        }

        record_year_end(&mut builder, year, &state, input.tax.defn_life_ins, surrchg_year);
    }

    log::info!(
        "engine finish: basis={} lapse_year={:?} final_av={:.2}",
        basis.label(),
        state.lapse_year,
        state.total_av()
    );

    Ok(builder.set_lapse_year(state.lapse_year))
}

/// Resolves this year's premium outlay against then-current §7702
/// quantities, generalizing `accountvalue.hpp`'s per-year premium-strategy
/// resolution (`PerformPmtStrategy`). `Table` and `SalaryPercent` have no
/// product rate table or salary data in this record, so both fall back to
/// the explicit vector, same as `Explicit` itself.
#[allow(clippy::too_many_arguments)]
fn perform_pmt_strategy(
    strategy: OutlayStrategy,
    explicit: f64,
    target_premium: f64,
    corridor_factor: f64,
    specamt: f64,
    surrchg: f64,
    glp_rate: f64,
    gsp_rate: f64,
    state: &EngineState,
) -> f64 {
    match strategy {
        OutlayStrategy::Explicit | OutlayStrategy::Table | OutlayStrategy::SalaryPercent => explicit,
        OutlayStrategy::Target => target_premium,
        // Enough to bring net CSV (AV less surrender charge less loan) back
        // to zero, mirroring tx_test_lapse's own lapse formula.
        OutlayStrategy::Minimum => (surrchg + state.total_loan_balance() - state.total_av()).max(0.0),
        OutlayStrategy::Mep => (state.mec.cum_7pp - state.mec.cum_payments_in_window).max(0.0),
        OutlayStrategy::Glp => (glp_rate * specamt).min(state.gpt.remaining_allowance()),
        OutlayStrategy::Gsp => (gsp_rate * specamt).min(state.gpt.remaining_allowance()),
        // Enough to bring AV up to the corridor breakpoint (specamt /
        // corridor_factor), mirroring tx_set_death_bft's corridor formula.
        OutlayStrategy::Corridor => ((specamt / corridor_factor) - state.total_av()).max(0.0),
    }
}

/// Drains one month's [`MonthWorkspace`] into the running annual totals for
/// `year`. Flow columns (charges, credits, premium decomposition, loan
/// activity, claims) accumulate across the twelve months of a policy year;
/// point-in-time columns are handled by [`record_year_end`] instead.
fn accumulate_month(builder: &mut VariantBuilder, year: usize, work: &MonthWorkspace) {
    builder.coi_charge[year] += work.coi_charge;
    builder.rider_charge[year] += work.rider_charge;
    builder.expense_charge[year] += work.expense_charge;
    builder.interest_credited_general[year] += work.interest_credited_general;
    builder.interest_credited_separate[year] += work.interest_credited_separate;
    builder.loan_interest_credited[year] += work.loan_interest_credited;
    builder.loan_interest_due[year] += work.loan_interest_due;
    builder.claims[year] += work.expected_claim;
    builder.gross_premium[year] += work.gross_premium;
    builder.net_premium[year] += work.net_premium;
    builder.premium_load[year] += work.premium_load;
    builder.premium_tax[year] += work.premium_tax;
    builder.dac_tax_load[year] += work.dac_tax_load;
    builder.new_loan[year] += work.new_loan;
    builder.loan_repayment[year] += work.loan_repayment;
    builder.withdrawal[year] += work.withdrawal;
    builder.forceout[year] += work.forceout;
}

/// Snapshots end-of-year state (account value partitions, cash values,
/// death benefit, and the §7702/§7702A running quantities) into `builder`.
/// Called once at the natural end of a policy year, and also on the month a
/// lapse is detected, so a lapsing year's EOY row reflects the month of
/// lapse rather than a full year of continued accrual. Cash surrender value
/// nets out this year's surrender charge; a lapsed contract reports zero
/// AV, CSV, and death benefit for the lapse year and every year after.
fn record_year_end(builder: &mut VariantBuilder, year: usize, state: &EngineState, defn_life_ins: DefnLifeIns, surrchg: f64) {
    builder.eoy_av_general[year] = state.av_general;
    builder.eoy_av_separate[year] = state.av_separate;
    builder.eoy_av_regular_loan[year] = state.reg_loan_balance;
    builder.eoy_av_preferred_loan[year] = state.prf_loan_balance;
    builder.eoy_csv_net[year] = if state.lapsed {
        0.0
    } else {
        (state.total_av() - surrchg - state.total_loan_balance()).max(0.0)
    };
    builder.eoy_cv_7702[year] = builder.eoy_csv_net[year];
    builder.eoy_death_benefit[year] = if state.lapsed { 0.0 } else { state.death_benefit };
    builder.cum_glp[year] = state.gpt.cum_glp;
    builder.gsp[year] = state.gpt.gsp;
    builder.seven_pp[year] = state.mec.seven_pay_premium_annual;
    builder.dcv[year] = state.mec.dcv;
    builder.is_mec_by_year[year] = state.mec.is_mec;
    log::trace!(
        "year {} end: defn_life_ins={:?} av_total={:.2} is_mec={}",
        year + 1,
        defn_life_ins,
        state.total_av(),
        state.mec.is_mec
    );
}
