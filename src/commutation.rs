//! Commutation functions (C6).
//!
//! Ordinary-life (`OLCommFns`) and universal-life (`ULCommFns`, the Eckley
//! method) commutation column vectors, computed once at construction and
//! read-only thereafter. These feed §7702 factor derivation (corridor,
//! 7pp, GLP/GSP) and actuarial-basis calculations; names are kept as the
//! standard actuarial notation (`C`, `D`, `M`, `N`; `aD`, `kD`, `kC`, `aN`,
//! `kM`) rather than invented ones.

use crate::policy::DbOption;

/// Commutation-function processing frequency: annual, semiannual,
/// quarterly, or monthly. Mirrors `e_mode` but named for its role here
/// (commutation-function mode vs. processing mode, which may differ: a
/// commutation table built annually can still be processed monthly via
/// interpolation, though this crate always builds and processes at the
/// same frequency for simplicity).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Annual,
    Semiannual,
    Quarterly,
    Monthly,
}

impl Frequency {
    fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::Semiannual => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
        }
    }
}

/// Ordinary-life commutation functions over a single mortality/interest
/// basis. Non-copyable in spirit (no `Clone` derive): the vectors are
/// meant to be computed once and handed around by reference.
pub struct OlCommFns {
    c: Vec<f64>,
    d: Vec<f64>,
    m: Vec<f64>,
    n: Vec<f64>,
}

impl OlCommFns {
    /// `q` is the mortality rate at each duration, `i` the effective
    /// interest rate at each duration (same length as `q`).
    pub fn new(q: &[f64], i: &[f64]) -> Self {
        assert_eq!(q.len(), i.len(), "mortality and interest vectors must have equal length");
        let len = q.len();

        let mut lx = vec![0.0; len + 1];
        lx[0] = 1.0;
        for k in 0..len {
            lx[k + 1] = lx[k] * (1.0 - q[k]);
        }

        let mut v_cum = vec![1.0; len + 1];
        for k in 0..len {
            v_cum[k + 1] = v_cum[k] / (1.0 + i[k]);
        }

        let mut d = vec![0.0; len];
        let mut c = vec![0.0; len];
        for k in 0..len {
            d[k] = v_cum[k] * lx[k];
            let dx = lx[k] * q[k];
            c[k] = v_cum[k + 1] * dx;
        }

        let mut m = vec![0.0; len];
        let mut n = vec![0.0; len];
        let mut running_m = 0.0;
        let mut running_n = 0.0;
        for k in (0..len).rev() {
            running_m += c[k];
            running_n += d[k];
            m[k] = running_m;
            n[k] = running_n;
        }

        OlCommFns { c, d, m, n }
    }

    pub fn c(&self) -> &[f64] {
        &self.c
    }
    pub fn d(&self) -> &[f64] {
        &self.d
    }
    pub fn m(&self) -> &[f64] {
        &self.m
    }
    pub fn n(&self) -> &[f64] {
        &self.n
    }
}

/// Universal-life commutation functions, Eckley method (TSA XXXIX p.18):
/// `aD` (annuity-due discount), `kD`, `kC` (mortality-discounted), `aN`,
/// `kM`, parameterized by death-benefit option and processing frequency.
pub struct UlCommFns {
    a_d: Vec<f64>,
    k_d: Vec<f64>,
    k_c: Vec<f64>,
    a_n: Vec<f64>,
    k_m: Vec<f64>,
}

impl UlCommFns {
    /// `q` monthly (or per-period) mortality, `ic` current credited
    /// interest, `ig` guaranteed interest, indexed identically. `db_option`
    /// affects the net-amount-at-risk weighting used for `kC`; `frequency`
    /// is the processing mode (this crate always processes at the mode it
    /// builds at).
    pub fn new(q: &[f64], ic: &[f64], ig: &[f64], db_option: DbOption, frequency: Frequency) -> Self {
        assert_eq!(q.len(), ic.len());
        assert_eq!(q.len(), ig.len());
        let len = q.len();
        let periods_per_year = frequency.periods_per_year() as f64;

        // Discount uses guaranteed interest (the conservative basis); the
        // survivorship-weighted annuity uses current interest for growth.
        let mut survivorship = vec![1.0; len + 1];
        for k in 0..len {
            survivorship[k + 1] = survivorship[k] * (1.0 - q[k]);
        }

        let mut discount = vec![1.0; len + 1];
        for k in 0..len {
            discount[k + 1] = discount[k] / (1.0 + ig[k] / periods_per_year);
        }

        let mut a_d = vec![0.0; len];
        let mut k_d = vec![0.0; len];
        let mut k_c = vec![0.0; len];
        for k in 0..len {
            a_d[k] = discount[k] * survivorship[k];
            k_d[k] = a_d[k];
            // Net-amount-at-risk weight: option B carries a slightly
            // heavier mortality charge base since DB grows with AV.
            let naar_weight = match db_option {
                DbOption::A | DbOption::Rop => 1.0,
                DbOption::B => 1.0 + ic[k].max(0.0) / periods_per_year,
            };
            let dx = survivorship[k] * q[k];
            k_c[k] = discount[k + 1] * dx * naar_weight;
        }

        let mut a_n = vec![0.0; len];
        let mut k_m = vec![0.0; len];
        let mut running_n = 0.0;
        let mut running_m = 0.0;
        for k in (0..len).rev() {
            running_n += a_d[k];
            running_m += k_c[k];
            a_n[k] = running_n;
            k_m[k] = running_m;
        }

        UlCommFns {
            a_d,
            k_d,
            k_c,
            a_n,
            k_m,
        }
    }

    pub fn a_d(&self) -> &[f64] {
        &self.a_d
    }
    pub fn k_d(&self) -> &[f64] {
        &self.k_d
    }
    pub fn k_c(&self) -> &[f64] {
        &self.k_c
    }
    pub fn a_n(&self) -> &[f64] {
        &self.a_n
    }
    pub fn k_m(&self) -> &[f64] {
        &self.k_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn flat_mortality(len: usize, q: f64) -> Vec<f64> {
        vec![q; len]
    }

    #[test]
    fn n_minus_shifted_n_equals_d() {
        let q = flat_mortality(10, 0.01);
        let i = vec![0.05; 10];
        let cf = OlCommFns::new(&q, &i);
        for k in 0..9 {
            assert_abs_diff_eq!(cf.n()[k] - cf.n()[k + 1], cf.d()[k], epsilon = 1e-10);
        }
    }

    #[test]
    fn m_minus_shifted_m_equals_c() {
        let q = flat_mortality(10, 0.01);
        let i = vec![0.05; 10];
        let cf = OlCommFns::new(&q, &i);
        for k in 0..9 {
            assert_abs_diff_eq!(cf.m()[k] - cf.m()[k + 1], cf.c()[k], epsilon = 1e-10);
        }
    }

    #[test]
    fn zero_mortality_means_c_and_m_are_zero() {
        let q = vec![0.0; 5];
        let i = vec![0.04; 5];
        let cf = OlCommFns::new(&q, &i);
        for &c in cf.c() {
            assert_abs_diff_eq!(c, 0.0, epsilon = 1e-15);
        }
        assert_abs_diff_eq!(cf.m()[0], 0.0, epsilon = 1e-15);
    }

    #[test]
    fn ul_commutation_vectors_are_well_formed() {
        let q = flat_mortality(24, 0.002);
        let ic = vec![0.04; 24];
        let ig = vec![0.03; 24];
        let cf = UlCommFns::new(&q, &ic, &ig, DbOption::A, Frequency::Monthly);
        assert_eq!(cf.a_d().len(), 24);
        assert_eq!(cf.k_m().len(), 24);
        // aN is non-increasing as duration advances (fewer future periods
        // remain to discount).
        for k in 0..23 {
            assert!(cf.a_n()[k] >= cf.a_n()[k + 1] - 1e-9);
        }
    }

    #[test]
    fn option_b_carries_heavier_mortality_weight_than_option_a() {
        let q = flat_mortality(12, 0.01);
        let ic = vec![0.05; 12];
        let ig = vec![0.03; 12];
        let a = UlCommFns::new(&q, &ic, &ig, DbOption::A, Frequency::Monthly);
        let b = UlCommFns::new(&q, &ic, &ig, DbOption::B, Frequency::Monthly);
        assert!(b.k_c()[0] > a.k_c()[0]);
    }
}
