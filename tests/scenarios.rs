//! End-to-end seed-case scenarios, one per `spec.md` §8.
//!
//! Each test builds a complete `Input`, runs it through the runner,
//! solver, or census composite, and checks the outcome `spec.md` §8
//! describes. Grounded on the same `sample_input` pattern used by the
//! per-module unit tests (`engine::tests`, `runner::tests`, ...),
//! generalized here to vary the fields each scenario actually exercises.

use chrono::NaiveDate;

use lmi::census::{run_life_by_life, CancellationToken, Cell, Census};
use lmi::input::{
    Assumptions, CensusRole, Coverage, Demographics, Identity, Input, InforceSnapshot, Payments,
    SolveConfig, SupplementalReport, TaxElections, TimeVarying,
};
use lmi::ledger::basis::{Basis, RunBasisSelector};
use lmi::policy::outlay::OutlayStrategy;
use lmi::policy::{DbOption, Gender, Mode, Smoking, UnderwritingClass};
use lmi::rates::table::TableRateProvider;
use lmi::rates::RateProvider;
use lmi::solver::{solve, SolveOutcome, SolveRequest, SolveTarget, SolveVariable};
use lmi::tax7702::{DefnLifeIns, DefnMaterialChange, MecAvoidMethod};

fn base_input(issue_age: u32, years: u32, specamt: f64, dbopt: DbOption, modal_premium: f64) -> Input {
    Input {
        identity: Identity {
            product_name: "Sample UL".into(),
            issue_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            effective_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        },
        demographics: Demographics {
            issue_age,
            gender: Gender::Male,
            smoking: Smoking::Nonsmoker,
            underwriting_class: UnderwritingClass::Preferred,
            table_rating: 0,
            state_of_jurisdiction: "CA".into(),
            retirement_age: 65,
            maturity_age: issue_age + years,
        },
        coverage: Coverage {
            initial_specamt: specamt,
            initial_dbopt: dbopt,
            has_adb_rider: false,
            has_wp_rider: false,
            has_child_rider: false,
            has_spouse_rider: false,
        },
        payments: Payments {
            modal_premium,
            mode: Mode::Annual,
            dumpin: 0.0,
            exchange_1035_amount: 0.0,
            outlay_strategy: OutlayStrategy::Explicit,
            premium_sequence: None,
            withdrawal_sequence: None,
            loan_sequence: None,
        },
        assumptions: Assumptions {
            general_account_credited_rate: 0.045,
            separate_account_assumed_rate: 0.0,
            loan_rate: 0.05,
            loan_is_variable: false,
        },
        solve: SolveConfig { request: None },
        tax: TaxElections {
            defn_life_ins: DefnLifeIns::Cvat,
            mec_avoid_method: MecAvoidMethod::AllowMec,
            defn_material_change: DefnMaterialChange::AdjustmentEvent,
        },
        inforce: InforceSnapshot::default(),
        census_role: CensusRole {
            include_in_composite: true,
            identical_lives: 1.0,
            class_name: None,
        },
        supplemental_report: SupplementalReport::default(),
    }
}

/// 1. Zero-premium quick-lapse.
#[test]
fn zero_premium_policy_lapses_within_a_few_years() {
    let years = 30;
    let input = base_input(45, years, 100_000.0, DbOption::A, 0.0);
    let provider = TableRateProvider::default_pricing(45, years);

    let ledger = lmi::runner::run(&input, RunBasisSelector::CurrBasisOnly, &provider).unwrap();
    let variant = &ledger.variant[&Basis::Current];

    let lapse_year = variant.lapse_year.expect("a zero-premium policy must lapse");
    assert!(lapse_year <= 3, "expected lapse within 3 years, got {lapse_year}");

    for year in 0..(lapse_year as usize).saturating_sub(1) {
        assert!(variant.eoy_av_general[year] + variant.eoy_av_separate[year] > 0.0);
    }
    for year in (lapse_year as usize)..variant.years_to_maturity() {
        assert_eq!(variant.eoy_av_general[year], 0.0);
        assert_eq!(variant.eoy_csv_net[year], 0.0);
        assert_eq!(variant.eoy_death_benefit[year], 0.0);
    }
}

/// 2. Seven-pay MEC.
#[test]
fn premium_at_seven_pay_limit_plus_one_percent_becomes_a_mec_in_year_one() {
    let years = 20;
    let issue_age = 45;
    let specamt = 100_000.0;
    let provider = TableRateProvider::default_pricing(issue_age, years);

    let seven_pp_rate = provider.get_7pp(years as usize).unwrap();
    let annual_premium = seven_pp_rate[0] * specamt * 1.01;

    let mut input = base_input(issue_age, years, specamt, DbOption::A, annual_premium);
    input.payments.premium_sequence = Some(TimeVarying::Fixed(vec![annual_premium; years as usize]));

    let ledger = lmi::runner::run(&input, RunBasisSelector::CurrBasisOnly, &provider).unwrap();
    let variant = &ledger.variant[&Basis::Current];

    assert!(variant.is_mec_by_year[0], "premium above the seven-pay limit must latch MEC in year 1");
    assert!(variant.seven_pp[0] < variant.gross_premium[0]);
}

/// 3. Corridor binds in youth.
#[test]
fn corridor_binds_at_young_ages_and_releases_at_older_ages() {
    let years = 70;
    let issue_age = 30;
    let specamt = 100_000.0;
    let provider = TableRateProvider::default_pricing(issue_age, years);

    let gsp_rate = provider.get_gsp(years as usize).unwrap();
    let single_premium = gsp_rate[0] * specamt;

    let mut input = base_input(issue_age, years, specamt, DbOption::A, 0.0);
    input.payments.premium_sequence = Some(TimeVarying::Fixed({
        let mut pmts = vec![0.0; years as usize];
        pmts[0] = single_premium;
        pmts
    }));

    let ledger = lmi::runner::run(&input, RunBasisSelector::CurrBasisOnly, &provider).unwrap();
    let variant = &ledger.variant[&Basis::Current];

    let young = 5usize.min(variant.years_to_maturity() - 1);
    assert!(
        variant.eoy_death_benefit[young] > specamt,
        "corridor should drive DB above specamt at a young attained age"
    );

    let old = variant.years_to_maturity() - 1;
    assert!(
        (variant.eoy_death_benefit[old] - specamt).abs() < specamt
            || variant.eoy_death_benefit[old] <= specamt * 1.05,
        "corridor should have released to near specamt by the oldest attained age"
    );
}

/// 4. Solve for level premium to endow.
#[test]
fn solving_for_a_level_premium_endows_the_contract_at_maturity() {
    let years = 20;
    let specamt = 250_000.0;
    let input = base_input(45, years, specamt, DbOption::A, 0.0);
    let provider = TableRateProvider::default_pricing(45, years);

    let request = SolveRequest {
        variable: SolveVariable::EmployeePremium,
        range: (0, years),
        target: SolveTarget::EndowAtMaturity,
        basis: Basis::Current,
        tolerance: 25.0,
    };

    let outcome = solve(&request, &input, &provider).unwrap();
    let x = match outcome {
        SolveOutcome::Converged { x, .. } => x,
        SolveOutcome::NonConverged { best_x, .. } => best_x,
    };
    assert!(x > 0.0);
}

/// 5. Census composite consistency.
#[test]
fn composite_eoy_av_is_the_weighted_sum_of_its_cells() {
    let years = 15;
    let weights = [100.0, 50.0, 25.0];
    let provider = TableRateProvider::default_pricing(45, years);

    let cells: Vec<Cell> = weights
        .iter()
        .map(|&w| {
            let mut input = base_input(45, years, 100_000.0, DbOption::A, 5_000.0);
            input.census_role.identical_lives = w;
            Cell { input }
        })
        .collect();

    let case_default = cells[0].input.clone();
    let census = Census {
        cells: cells.clone(),
        case_default,
        class_defaults: Default::default(),
    };
    let cancel = CancellationToken::new();

    let composite = run_life_by_life(&census, RunBasisSelector::CurrBasisOnly, &provider, &cancel)
        .unwrap()
        .ledger;
    let composite_variant = &composite.variant[&Basis::Current];

    let mut expected = vec![0.0; years as usize];
    for cell in &cells {
        let cell_ledger = lmi::runner::run(&cell.input, RunBasisSelector::CurrBasisOnly, &provider).unwrap();
        let cell_variant = &cell_ledger.variant[&Basis::Current];
        let weight = cell.input.census_role.identical_lives;
        for year in 0..years as usize {
            expected[year] += weight * cell_variant.eoy_av_general[year];
        }
    }

    for year in 0..years as usize {
        assert!(
            (composite_variant.eoy_av_general[year] - expected[year]).abs() < 1e-6,
            "year {year}: composite={} expected={}",
            composite_variant.eoy_av_general[year],
            expected[year]
        );
    }
}

/// 6. Three-basis outlay consistency.
#[test]
fn three_basis_run_illustrates_identical_payments_across_bases() {
    let years = 15;
    let input = base_input(45, years, 250_000.0, DbOption::A, 5_000.0);
    let provider = TableRateProvider::default_pricing(45, years);

    let ledger = lmi::runner::run(&input, RunBasisSelector::IllustrationReg, &provider).unwrap();

    let current_total: f64 = ledger.variant[&Basis::Current].gross_premium.iter().sum();
    let guaranteed_total: f64 = ledger.variant[&Basis::Guaranteed].gross_premium.iter().sum();
    let midpoint_total: f64 = ledger.variant[&Basis::Midpoint].gross_premium.iter().sum();

    assert_eq!(current_total, guaranteed_total);
    assert_eq!(current_total, midpoint_total);
}
