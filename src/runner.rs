//! Multi-basis runner (C12): runs the engine once per basis a ledger type
//! requires, freezing the governing basis's outlay so every other basis
//! illustrates against the same cash flows.
//!
//! Grounded on `accountvalue.hpp`'s `RunOneBasis`/`RunAllBases`/`ERunBasis`
//! and the `OverridingPmts` field comment: "Illustrated outlay must be the
//! same for current, guaranteed, and all other bases."

use crate::engine;
use crate::error::LmiError;
use crate::input::Input;
use crate::ledger::basis::RunBasisSelector;
use crate::ledger::invariant::InvariantPart;
use crate::ledger::Ledger;
use crate::rates::RateProvider;

/// Runs every basis `selector` requires, governing basis first, and returns
/// the populated ledger. The governing basis resolves its own outlay via
/// whatever strategy `input.payments.outlay_strategy` names; every other
/// basis is run with that resolved outlay supplied as a hard input,
/// bypassing strategy resolution entirely.
pub fn run(input: &Input, selector: RunBasisSelector, rate_provider: &dyn RateProvider) -> Result<Ledger, LmiError> {
    let _guard = crate::fpenv::FenvGuard::new();

    let bases = selector.bases();
    let governing = selector.governing_basis();

    let mut invariant = InvariantPart::new(
        input.identity.product_name.clone(),
        input.demographics.issue_age,
        input.demographics.retirement_age,
        input.demographics.maturity_age,
        input.coverage.initial_specamt,
        input.coverage.initial_dbopt,
    );

    let death_benefit = input.build_death_benefit_holder();
    let mut outlay = input.build_outlay_holder()?;

    log::info!(
        "runner start: product={} bases={} governing={}",
        input.identity.product_name,
        bases.len(),
        governing.label()
    );

    let governing_variant = engine::run_one_basis(input, governing, &death_benefit, &outlay, rate_provider)?;
    let overriding = outlay.to_overriding_payments();
    outlay.apply_overriding_payments(&overriding);
    invariant.overriding_payments = Some(overriding);

    let mut ledger = Ledger::new(invariant);
    ledger.variant.insert(governing, governing_variant);

    for basis in bases.into_iter().filter(|b| *b != governing) {
        let variant = engine::run_one_basis(input, basis, &death_benefit, &outlay, rate_provider)?;
        ledger.variant.insert(basis, variant);
    }

    log::info!("runner finish: product={} bases_run={}", input.identity.product_name, ledger.variant.len());
    Ok(ledger)
}
