//! Crate-wide error type.
//!
//! One enum per `spec.md`'s Error Handling Design table: each variant names
//! its origin and implies its own recovery policy at the call site.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmiError {
    /// Negative AV input, rate < -100%, NaN from a rate provider, or a
    /// monthly decrement probability >= 1. Fatal: the run aborts.
    #[error("domain violation: {0}")]
    DomainViolation(String),

    /// The floating-point environment guard detected a corrupted control
    /// word on exit.
    #[error("floating-point environment violation: {0}")]
    FpuState(String),

    /// An input-sequence string accumulated one or more diagnostics during
    /// parsing or realization.
    #[error("input sequence parse error: {0}")]
    SequenceParse(String),

    /// A rate-provider vector's length didn't match the projection length.
    #[error("rate provider vector '{vector}' length mismatch: expected {expected}, found {found}")]
    RateProviderLengthMismatch {
        vector: &'static str,
        expected: usize,
        found: usize,
    },

    /// The solver did not converge within its iteration cap. Soft error:
    /// callers may choose to keep `best_residual`'s corresponding value
    /// rather than propagating this.
    #[error("solver did not converge after {iterations} iterations, best residual {best_residual}")]
    SolverNonConvergence { iterations: u32, best_residual: f64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, LmiError>;
