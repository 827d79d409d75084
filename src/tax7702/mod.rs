//! §7702 / §7702A tax-compliance evaluators (C7).
//!
//! Two orthogonal tax regimes operate on the same cash flows: the CVAT
//! corridor test ([`cvat`]) and the GPT guideline-premium test ([`gpt`]),
//! selected once at issue via [`DefnLifeIns`] and never revisited mid-
//! contract (a contract chooses exactly one regime at issue; CVAT/GPT tie
//! never arises). §7702A MEC testing ([`mec`]) runs independently of which
//! regime governs corridor/guideline enforcement.
//!
//! Enum variants below are kept with the semantics of `enums7702.hpp`
//! (`enum_defn_life_ins`, `enum_mec_avoid_method`,
//! `enum_defn_material_change`), renamed to Rust casing.

pub mod cvat;
pub mod gpt;
pub mod mec;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefnLifeIns {
    Cvat,
    Gpt,
    Noncompliant,
}

/// Selectable response to a guideline-premium (GPT) breach. Exposed as a
/// per-product/per-case selector on `Input` — never hard-coded — per the
/// spec's Open Question about which evaluator policy is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MecAvoidMethod {
    AllowMec,
    ReducePremium,
    IncreaseSpecAmt,
}

/// Selectable definition of a §7702A "material change" event, which resets
/// the seven-pay window and recomputes the seven-pay premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefnMaterialChange {
    UnnecessaryPremium,
    BenefitIncrease,
    LaterOfIncreaseOrUnnecessaryPremium,
    EarlierOfIncreaseOrUnnecessaryPremium,
    AdjustmentEvent,
}

/// Decides, per the elected [`DefnMaterialChange`] policy, whether a benefit
/// increase and/or an unnecessary-premium payment counts as a material
/// change that resets the seven-pay window. `LaterOf`/`EarlierOf` differ in
/// which duration anchors the reset when both conditions occur in different
/// years; since this crate evaluates both conditions at the same instant
/// (the instant of the specamt/dbopt change), they collapse to the same
/// either-or test here.
pub fn is_material_change_event(
    policy: DefnMaterialChange,
    benefit_increased: bool,
    unnecessary_premium_paid: bool,
) -> bool {
    match policy {
        DefnMaterialChange::UnnecessaryPremium => unnecessary_premium_paid,
        DefnMaterialChange::BenefitIncrease => benefit_increased,
        DefnMaterialChange::LaterOfIncreaseOrUnnecessaryPremium
        | DefnMaterialChange::EarlierOfIncreaseOrUnnecessaryPremium => {
            benefit_increased || unnecessary_premium_paid
        }
        DefnMaterialChange::AdjustmentEvent => benefit_increased,
    }
}
