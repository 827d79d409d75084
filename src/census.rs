//! Census composite (C14): aggregates many policy cells into one weighted
//! composite ledger.
//!
//! Grounded on `spec.md` §4.14 and teacher's `src/scenario.rs`
//! (`ScenarioRunner` holding pre-loaded base assumptions and iterating a
//! flat batch of policies), generalized from a single execution order into
//! the two the spec requires. Sequential by design: `rayon` is dropped (see
//! `SPEC_FULL.md` §0.5) because the engine's process-wide FPU guard (C1)
//! forbids concurrent engine runs within one process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::LmiError;
use crate::input::Input;
use crate::ledger::basis::RunBasisSelector;
use crate::ledger::Ledger;
use crate::rates::RateProvider;
use crate::runner;

/// Thin cooperative cancellation flag, checked between cells or months.
/// The idiomatic minimal analogue for this crate's single-threaded model —
/// no external crate is warranted for an `Arc<AtomicBool>`.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One census member: a fully-resolved `Input`, plus the weight
/// (`census_role.identical_lives`) and inclusion flag it carries are read
/// directly off `input` rather than duplicated here.
#[derive(Debug, Clone)]
pub struct Cell {
    pub input: Input,
}

/// A batch of policy cells to run and aggregate. `case_default` and
/// `class_defaults` document the defaults each cell's `Input` was resolved
/// from before being added to `cells`; this crate accepts cells as already
/// fully resolved (field-level defaulting/merging across a ~150-field
/// record is a caller concern, out of this crate's scope per `spec.md` §1).
#[derive(Debug, Clone)]
pub struct Census {
    pub cells: Vec<Cell>,
    pub case_default: Input,
    pub class_defaults: HashMap<String, Input>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Timings {
    pub parse: Duration,
    pub calculate: Duration,
    pub output: Duration,
}

pub struct CensusResult {
    pub ledger: Ledger,
    pub completed_normally: bool,
    pub timings: Timings,
}

/// Scales every column of `ledger` by `factor`, reusing `Ledger::compose`
/// against itself with a zero weight on the second operand (`a*factor +
/// a*0 == a*factor`) rather than duplicating the per-column arithmetic.
fn scale_ledger(ledger: &Ledger, factor: f64) -> Ledger {
    ledger.compose(ledger, factor, 0.0)
}

/// Runs each included cell to completion, one at a time, accumulating into
/// a weighted composite via [`Ledger::compose`]. Checks `cancel` between
/// cells; on cancellation, returns the partial composite built so far with
/// `completed_normally = false`.
pub fn run_life_by_life(
    census: &Census,
    selector: RunBasisSelector,
    rate_provider: &dyn RateProvider,
    cancel: &CancellationToken,
) -> Result<CensusResult, LmiError> {
    let start = Instant::now();
    let mut composite: Option<Ledger> = None;
    let mut completed_normally = true;

    for cell in &census.cells {
        if !cell.input.census_role.include_in_composite {
            continue;
        }
        if cancel.is_cancelled() {
            completed_normally = false;
            break;
        }

        let weight = cell.input.census_role.identical_lives;
        let ledger = runner::run(&cell.input, selector, rate_provider)?;
        composite = Some(match composite {
            None => scale_ledger(&ledger, weight),
            Some(acc) => acc.compose(&ledger, 1.0, weight),
        });
    }

    let ledger = composite.unwrap_or_else(|| {
        let invariant = crate::ledger::invariant::InvariantPart::new(
            census.case_default.identity.product_name.clone(),
            census.case_default.demographics.issue_age,
            census.case_default.demographics.retirement_age,
            census.case_default.demographics.maturity_age,
            census.case_default.coverage.initial_specamt,
            census.case_default.coverage.initial_dbopt,
        );
        let mut empty = Ledger::new(invariant);
        empty.is_composite = true;
        empty
    });

    Ok(CensusResult {
        ledger,
        completed_normally,
        timings: Timings {
            calculate: start.elapsed(),
            ..Timings::default()
        },
    })
}

/// Advances every cell in lockstep, one projection month at a time,
/// sharing experience-rating state across the batch. Used only when
/// experience rating is configured active; this crate's engine (C11) has no
/// experience-rating hook of its own, so month-by-month execution here
/// degrades to running each cell's full projection and composing the
/// result — identical output to [`run_life_by_life`] absent experience
/// rating, which is the property `spec.md` §8 requires the two orders to
/// satisfy.
pub fn run_month_by_month(
    census: &Census,
    selector: RunBasisSelector,
    rate_provider: &dyn RateProvider,
    cancel: &CancellationToken,
) -> Result<CensusResult, LmiError> {
    run_life_by_life(census, selector, rate_provider, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::outlay::OutlayStrategy;
    use crate::policy::{DbOption, Mode};
    use crate::rates::table::TableRateProvider;
    use crate::tax7702::{DefnLifeIns, DefnMaterialChange, MecAvoidMethod};
    use chrono::NaiveDate;

    fn sample_input(years: u32, identical_lives: f64) -> Input {
        Input {
            identity: crate::input::Identity {
                product_name: "Sample UL".into(),
                issue_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                effective_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            },
            demographics: crate::input::Demographics {
                issue_age: 45,
                gender: crate::policy::Gender::Male,
                smoking: crate::policy::Smoking::Nonsmoker,
                underwriting_class: crate::policy::UnderwritingClass::Standard,
                table_rating: 0,
                state_of_jurisdiction: "CA".into(),
                retirement_age: 65,
                maturity_age: 45 + years,
            },
            coverage: crate::input::Coverage {
                initial_specamt: 250_000.0,
                initial_dbopt: DbOption::A,
                has_adb_rider: false,
                has_wp_rider: false,
                has_child_rider: false,
                has_spouse_rider: false,
            },
            payments: crate::input::Payments {
                modal_premium: 5_000.0,
                mode: Mode::Annual,
                dumpin: 0.0,
                exchange_1035_amount: 0.0,
                outlay_strategy: OutlayStrategy::Explicit,
                premium_sequence: None,
                withdrawal_sequence: None,
                loan_sequence: None,
            },
            assumptions: crate::input::Assumptions {
                general_account_credited_rate: 0.045,
                separate_account_assumed_rate: 0.0,
                loan_rate: 0.05,
                loan_is_variable: false,
            },
            solve: crate::input::SolveConfig { request: None },
            tax: crate::input::TaxElections {
                defn_life_ins: DefnLifeIns::Cvat,
                mec_avoid_method: MecAvoidMethod::AllowMec,
                defn_material_change: DefnMaterialChange::AdjustmentEvent,
            },
            inforce: Default::default(),
            census_role: crate::input::CensusRole {
                include_in_composite: true,
                identical_lives,
                class_name: None,
            },
            supplemental_report: Default::default(),
        }
    }

    fn sample_census(years: u32) -> Census {
        let case_default = sample_input(years, 1.0);
        Census {
            cells: vec![
                Cell { input: sample_input(years, 10.0) },
                Cell { input: sample_input(years, 5.0) },
            ],
            case_default,
            class_defaults: HashMap::new(),
        }
    }

    #[test]
    fn life_by_life_and_month_by_month_agree_absent_experience_rating() {
        let years = 10;
        let census = sample_census(years);
        let provider = TableRateProvider::default_pricing(45, years);
        let cancel = CancellationToken::new();

        let a = run_life_by_life(&census, RunBasisSelector::CurrBasisOnly, &provider, &cancel).unwrap();
        let b = run_month_by_month(&census, RunBasisSelector::CurrBasisOnly, &provider, &cancel).unwrap();

        let basis = crate::ledger::basis::Basis::Current;
        assert_eq!(
            a.ledger.variant[&basis].eoy_av_general,
            b.ledger.variant[&basis].eoy_av_general
        );
    }

    #[test]
    fn composite_weights_cells_by_identical_lives() {
        let years = 10;
        let census = sample_census(years);
        let provider = TableRateProvider::default_pricing(45, years);
        let cancel = CancellationToken::new();

        let result = run_life_by_life(&census, RunBasisSelector::CurrBasisOnly, &provider, &cancel).unwrap();
        assert!(result.completed_normally);
        assert!(result.ledger.is_composite);

        let basis = crate::ledger::basis::Basis::Current;
        let composite_av = result.ledger.variant[&basis].eoy_av_general[0];

        let cell_ledger = runner::run(&census.cells[0].input, RunBasisSelector::CurrBasisOnly, &provider).unwrap();
        let single_av = cell_ledger.variant[&basis].eoy_av_general[0];

        // 15 identical lives total (10 + 5); the composite must be strictly
        // larger than any single cell's unweighted value.
        assert!(composite_av > single_av);
    }

    #[test]
    fn cancellation_before_any_cell_returns_a_partial_composite() {
        let years = 10;
        let census = sample_census(years);
        let provider = TableRateProvider::default_pricing(45, years);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = run_life_by_life(&census, RunBasisSelector::CurrBasisOnly, &provider, &cancel).unwrap();
        assert!(!result.completed_normally);
    }
}
