//! §7702A MEC (modified endowment contract) testing.
//!
//! Maintains a seven-pay window starting at issue or at the latest material
//! change. On each premium receipt, cumulative payments in the window are
//! compared against the cumulative seven-pay-premium allowance; exceeding
//! it makes the contract a MEC, and the flag latches permanently. A
//! deemed cash value (DCV) tracks what the cash value would be under a
//! fixed-assumption §7702A projection, used to classify a premium as
//! necessary (within the seven-pay limit) or unnecessary (excess).
//!
//! The transient per-event fields below are grounded on `mec_state.hpp`'s
//! letter-prefixed groups (`B`-`H`, `Q`), reorganized into named,
//! doc-commented fields — the letter-prefix convention there is an
//! artifact of a reflection pattern this crate does not reproduce.

use crate::tax7702::DefnMaterialChange;

#[derive(Debug, Clone)]
pub struct MecTestState {
    // --- window bookkeeping ---
    /// Duration (in policy years from issue) at which the current
    /// seven-pay window began: 0 at issue, or the duration of the last
    /// material change.
    pub window_start_duration: u32,
    /// Seven-pay premium rate for the current window, applied against the
    /// lowest specified amount seen within the window.
    pub seven_pay_premium_annual: f64,
    /// Cumulative seven-pay allowance accrued so far within the window.
    pub cum_7pp: f64,
    /// Cumulative premiums paid within the current window.
    pub cum_payments_in_window: f64,
    /// Lowest death benefit observed within the current seven-pay window,
    /// used to retest a benefit reduction within seven years.
    pub lowest_db_in_window: f64,

    // --- deemed cash value ---
    pub dcv: f64,

    // --- running accumulators ---
    pub unnecessary_premium_accumulator: f64,

    // --- terminal state ---
    /// Latched MEC flag. Monotone non-decreasing: once `true`, never reset
    /// by a material change (only the window and 7pp reset).
    pub is_mec: bool,
}

impl MecTestState {
    pub fn new(seven_pay_premium_annual: f64, initial_db: f64) -> Self {
        MecTestState {
            window_start_duration: 0,
            seven_pay_premium_annual,
            cum_7pp: seven_pay_premium_annual,
            cum_payments_in_window: 0.0,
            lowest_db_in_window: initial_db,
            dcv: 0.0,
            unnecessary_premium_accumulator: 0.0,
            is_mec: false,
        }
    }

    /// Call once per policy year within the window (years 0..=6 relative
    /// to `window_start_duration`) to accrue that year's allowance.
    pub fn accrue_annual_allowance(&mut self, current_duration: u32) {
        let window_year = current_duration.saturating_sub(self.window_start_duration);
        if window_year > 0 && window_year < 7 {
            self.cum_7pp += self.seven_pay_premium_annual;
        }
    }

    /// Splits a premium into necessary (within the 7pp allowance) and
    /// unnecessary (excess) portions, updates cumulative payments, and
    /// latches `is_mec` if the allowance is breached.
    pub fn receive_premium(&mut self, premium: f64) -> NecessaryUnnecessarySplit {
        let remaining_allowance = (self.cum_7pp - self.cum_payments_in_window).max(0.0);
        let necessary = premium.min(remaining_allowance);
        let unnecessary = premium - necessary;

        self.cum_payments_in_window += premium;
        self.unnecessary_premium_accumulator += unnecessary;

        if self.cum_payments_in_window > self.cum_7pp + 1e-9 {
            self.is_mec = true;
        }

        NecessaryUnnecessarySplit { necessary, unnecessary }
    }

    /// A benefit reduction within the seven-pay window forces a retest
    /// against the reduced (now lowest-seen) death benefit: the seven-pay
    /// premium is recomputed at the new, lower DB, and if the
    /// already-accrued cumulative payments now exceed the reduced
    /// allowance, the contract becomes a MEC retroactively.
    pub fn reduce_benefit(&mut self, new_db: f64, new_seven_pay_premium_annual: f64) {
        if new_db < self.lowest_db_in_window {
            self.lowest_db_in_window = new_db;
        }
        self.seven_pay_premium_annual = new_seven_pay_premium_annual;
        let elapsed_years = 1; // at minimum, the year this reduction occurs.
        self.cum_7pp = self.seven_pay_premium_annual * elapsed_years as f64;
        if self.cum_payments_in_window > self.cum_7pp + 1e-9 {
            self.is_mec = true;
        }
    }

    /// A material change resets the seven-pay window per the selected
    /// [`DefnMaterialChange`] policy. The policy selection itself governs
    /// *whether* an event counts as a material change (decided by the
    /// caller before invoking this); this method performs the reset
    /// unconditionally given that a material change has occurred.
    pub fn material_change(
        &mut self,
        _policy: DefnMaterialChange,
        current_duration: u32,
        new_seven_pay_premium_annual: f64,
        current_db: f64,
    ) {
        self.window_start_duration = current_duration;
        self.seven_pay_premium_annual = new_seven_pay_premium_annual;
        self.cum_7pp = new_seven_pay_premium_annual;
        self.cum_payments_in_window = 0.0;
        self.lowest_db_in_window = current_db;
        // is_mec is deliberately not reset: the flag latches.
    }

    /// Advances deemed cash value one month under the fixed §7702A
    /// assumptions: growth at `assumed_monthly_rate`, net premium credited,
    /// assumed charges deducted.
    pub fn step_dcv(&mut self, net_premium: f64, assumed_charges: f64, assumed_monthly_rate: f64) {
        self.dcv = (self.dcv + net_premium - assumed_charges) * (1.0 + assumed_monthly_rate);
        if self.dcv < 0.0 {
            self.dcv = 0.0;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NecessaryUnnecessarySplit {
    pub necessary: f64,
    pub unnecessary: f64,
}
