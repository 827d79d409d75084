//! The `Basis` axis (§3) and the basis-set selector used by the runner (C12).

use serde::{Deserialize, Serialize};

/// One of seven regulatory/scenario bases under which the engine can be
/// run. The engine runs once per basis required by the ledger type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    Current,
    Guaranteed,
    Midpoint,
    CurrentSepAcctZero,
    GuaranteedSepAcctZero,
    CurrentSepAcctHalf,
    GuaranteedSepAcctHalf,
}

impl Basis {
    pub fn label(&self) -> &'static str {
        match self {
            Basis::Current => "current",
            Basis::Guaranteed => "guaranteed",
            Basis::Midpoint => "midpoint",
            Basis::CurrentSepAcctZero => "current_sep_acct_zero",
            Basis::GuaranteedSepAcctZero => "guaranteed_sep_acct_zero",
            Basis::CurrentSepAcctHalf => "current_sep_acct_half",
            Basis::GuaranteedSepAcctHalf => "guaranteed_sep_acct_half",
        }
    }
}

/// Groups bases by the coarse run-type distinction `accountvalue.hpp`'s
/// `ERunBasis` makes (current-only / guaranteed-only / midpoint-only / all),
/// kept distinct from [`Basis`] itself: this selects a *set* of bases for a
/// ledger type, `Basis` tags a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunBasisSelector {
    CurrBasisOnly,
    GuarBasisOnly,
    MdptBasisOnly,
    /// Illustration-regulation-compliant ledger: requires Current,
    /// Guaranteed, and Midpoint, with Midpoint using charges/interest
    /// midway between Current and Guaranteed.
    IllustrationReg,
    /// NASD-style ledger: requires three separate-account return
    /// assumptions (zero, mid, high) rather than the reg triple.
    Nasd,
    AllBases,
}

impl RunBasisSelector {
    /// The governing basis, run first; its outlay is frozen and reused by
    /// every other basis in the set (C12).
    pub fn governing_basis(&self) -> Basis {
        match self {
            RunBasisSelector::GuarBasisOnly => Basis::Guaranteed,
            RunBasisSelector::MdptBasisOnly => Basis::Midpoint,
            _ => Basis::Current,
        }
    }

    /// Full set of bases this selector requires, governing basis first.
    pub fn bases(&self) -> Vec<Basis> {
        match self {
            RunBasisSelector::CurrBasisOnly => vec![Basis::Current],
            RunBasisSelector::GuarBasisOnly => vec![Basis::Guaranteed],
            RunBasisSelector::MdptBasisOnly => vec![Basis::Midpoint],
            RunBasisSelector::IllustrationReg => {
                vec![Basis::Current, Basis::Guaranteed, Basis::Midpoint]
            }
            RunBasisSelector::Nasd => vec![
                Basis::Current,
                Basis::CurrentSepAcctZero,
                Basis::CurrentSepAcctHalf,
            ],
            RunBasisSelector::AllBases => vec![
                Basis::Current,
                Basis::Guaranteed,
                Basis::Midpoint,
                Basis::CurrentSepAcctZero,
                Basis::GuaranteedSepAcctZero,
                Basis::CurrentSepAcctHalf,
                Basis::GuaranteedSepAcctHalf,
            ],
        }
    }
}
