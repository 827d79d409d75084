//! In-memory rate provider, constructed directly from vectors. Used by
//! tests and by programmatic callers that don't need CSV-backed data,
//! mirroring the teacher's `Assumptions::default_pricing()` convenience
//! constructor alongside its CSV-loading path.

use crate::commutation::OlCommFns;
use crate::error::LmiError;
use crate::ledger::basis::Basis;
use crate::rates::{require_len, LoadSchedule, RateProvider};

#[derive(Debug, Clone)]
pub struct TableRateProvider {
    pub mortality_current: Vec<f64>,
    pub mortality_guaranteed: Vec<f64>,
    pub interest_current: Vec<f64>,
    pub interest_guaranteed: Vec<f64>,
    pub corridor: Vec<f64>,
    pub seven_pp_rate: Vec<f64>,
    pub glp_rate: Vec<f64>,
    pub gsp_rate: Vec<f64>,
    pub surrender_charges: Vec<f64>,
    pub loads: LoadSchedule,
}

impl TableRateProvider {
    /// Builds a plausible pricing table for a single issue age using
    /// Gompertz-shaped annual mortality converted to monthly via the
    /// standard `1-(1-q)^(1/12)` identity, flat guaranteed/current interest
    /// floors, a typical §7702 corridor schedule, and 7pp/GLP/GSP rates
    /// derived from ordinary-life commutation functions (C6) at the
    /// guaranteed basis, which is the conservative basis §7702 factors are
    /// customarily built from.
    pub fn default_pricing(issue_age: u32, years_to_maturity: u32) -> Self {
        let len = years_to_maturity as usize;
        let annual_q: Vec<f64> = (0..len)
            .map(|k| gompertz_annual_mortality(issue_age + k as u32))
            .collect();
        let monthly_mortality_guaranteed: Vec<f64> = annual_q
            .iter()
            .flat_map(|&q| std::iter::repeat(annual_to_monthly_q(q)).take(12))
            .collect();
        let monthly_mortality_current: Vec<f64> = monthly_mortality_guaranteed
            .iter()
            .map(|&q| q * 0.85)
            .collect();

        let interest_guaranteed = vec![0.03 / 12.0; len * 12];
        let interest_current = vec![0.045 / 12.0; len * 12];

        let corridor: Vec<f64> = (0..len)
            .map(|k| corridor_factor_for_age(issue_age + k as u32))
            .collect();

        let guaranteed_annual_interest = vec![0.03; len];
        let commutation = OlCommFns::new(&annual_q, &guaranteed_annual_interest);
        let seven_pp_rate: Vec<f64> = (0..len)
            .map(|k| {
                if commutation.n()[k] > 0.0 {
                    (commutation.m()[k] + commutation.n()[k.min(6)].min(commutation.n()[k])) / commutation.n()[k] / 7.0
                } else {
                    0.0
                }
            })
            .collect();
        let glp_rate: Vec<f64> = (0..len)
            .map(|k| {
                if commutation.n()[k] > 0.0 {
                    commutation.m()[k] / commutation.n()[k]
                } else {
                    0.0
                }
            })
            .collect();
        let gsp_rate: Vec<f64> = (0..len)
            .map(|k| {
                if commutation.d()[k] > 0.0 {
                    commutation.m()[k] / commutation.d()[k]
                } else {
                    0.0
                }
            })
            .collect();

        let surrender_charges = vec![
            0.09, 0.09, 0.08, 0.07, 0.06, 0.05, 0.04, 0.03, 0.02, 0.01,
        ];

        TableRateProvider {
            mortality_current: monthly_mortality_current,
            mortality_guaranteed: monthly_mortality_guaranteed,
            interest_current,
            interest_guaranteed,
            corridor,
            seven_pp_rate,
            glp_rate,
            gsp_rate,
            surrender_charges,
            loads: LoadSchedule {
                monthly_policy_fee: 10.0,
                annual_policy_fee: 60.0,
                premium_load_target: 0.06,
                premium_load_excess: 0.03,
                sales_load: 0.02,
                dac_tax_load: 0.01,
                premium_tax_rate: 0.02,
                target_premium_per_unit: 0.01,
            },
        }
    }
}

fn gompertz_annual_mortality(age: u32) -> f64 {
    let age = age.min(120) as f64;
    (0.0001 * (0.09 * age).exp()).min(1.0)
}

fn annual_to_monthly_q(annual_q: f64) -> f64 {
    1.0 - (1.0 - annual_q).powf(1.0 / 12.0)
}

fn corridor_factor_for_age(age: u32) -> f64 {
    // Approximates the §7702(d) corridor percentage table: high multiples
    // at young ages tapering to 1.0 at age 95+.
    match age {
        0..=40 => 2.5,
        41..=45 => 2.15,
        46..=50 => 1.85,
        51..=55 => 1.5,
        56..=60 => 1.3,
        61..=65 => 1.15,
        66..=70 => 1.05,
        71..=90 => 1.02,
        91..=94 => 1.01,
        _ => 1.0,
    }
}

impl RateProvider for TableRateProvider {
    fn get_mortality(&self, basis: Basis, len: usize) -> Result<Vec<f64>, LmiError> {
        match basis {
            Basis::Current | Basis::CurrentSepAcctZero | Basis::CurrentSepAcctHalf => {
                require_len(&self.mortality_current, len, "mortality")?;
                Ok(self.mortality_current[..len].to_vec())
            }
            Basis::Midpoint => {
                require_len(&self.mortality_current, len, "mortality")?;
                require_len(&self.mortality_guaranteed, len, "mortality")?;
                Ok(self.mortality_current[..len]
                    .iter()
                    .zip(&self.mortality_guaranteed[..len])
                    .map(|(c, g)| (c + g) / 2.0)
                    .collect())
            }
            _ => {
                require_len(&self.mortality_guaranteed, len, "mortality")?;
                Ok(self.mortality_guaranteed[..len].to_vec())
            }
        }
    }

    fn get_interest(&self, basis: Basis, len: usize) -> Result<Vec<f64>, LmiError> {
        let source = match basis {
            Basis::Current | Basis::CurrentSepAcctZero | Basis::CurrentSepAcctHalf => &self.interest_current,
            Basis::Midpoint => {
                require_len(&self.interest_current, len, "interest")?;
                require_len(&self.interest_guaranteed, len, "interest")?;
                let mid: Vec<f64> = self.interest_current[..len]
                    .iter()
                    .zip(&self.interest_guaranteed[..len])
                    .map(|(c, g)| (c + g) / 2.0)
                    .collect();
                return Ok(mid);
            }
            _ => &self.interest_guaranteed,
        };
        require_len(source, len, "interest")?;
        Ok(source[..len].to_vec())
    }

    fn get_corridor(&self, len: usize) -> Result<Vec<f64>, LmiError> {
        require_len(&self.corridor, len, "corridor")?;
        Ok(self.corridor[..len].to_vec())
    }

    fn get_7pp(&self, len: usize) -> Result<Vec<f64>, LmiError> {
        require_len(&self.seven_pp_rate, len, "seven_pp_rate")?;
        Ok(self.seven_pp_rate[..len].to_vec())
    }

    fn get_glp(&self, len: usize) -> Result<Vec<f64>, LmiError> {
        require_len(&self.glp_rate, len, "glp_rate")?;
        Ok(self.glp_rate[..len].to_vec())
    }

    fn get_gsp(&self, len: usize) -> Result<Vec<f64>, LmiError> {
        require_len(&self.gsp_rate, len, "gsp_rate")?;
        Ok(self.gsp_rate[..len].to_vec())
    }

    fn get_loads(&self) -> LoadSchedule {
        self.loads
    }

    fn get_surrchg(&self, duration: usize) -> f64 {
        self.surrender_charges.get(duration).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pricing_produces_monotonically_available_vectors() {
        let provider = TableRateProvider::default_pricing(45, 40);
        let mortality = provider.get_mortality(Basis::Current, 100).unwrap();
        assert_eq!(mortality.len(), 100);
        assert!(mortality.iter().all(|&q| (0.0..1.0).contains(&q)));
    }

    #[test]
    fn guaranteed_mortality_is_never_less_than_current() {
        let provider = TableRateProvider::default_pricing(45, 30);
        let current = provider.get_mortality(Basis::Current, 60).unwrap();
        let guaranteed = provider.get_mortality(Basis::Guaranteed, 60).unwrap();
        for (c, g) in current.iter().zip(guaranteed.iter()) {
            assert!(g >= c);
        }
    }

    #[test]
    fn midpoint_interest_is_between_current_and_guaranteed() {
        let provider = TableRateProvider::default_pricing(45, 10);
        let current = provider.get_interest(Basis::Current, 12).unwrap();
        let guaranteed = provider.get_interest(Basis::Guaranteed, 12).unwrap();
        let mid = provider.get_interest(Basis::Midpoint, 12).unwrap();
        for i in 0..12 {
            assert!(mid[i] <= current[i] && mid[i] >= guaranteed[i]);
        }
    }

    #[test]
    fn corridor_decreases_with_age() {
        let provider = TableRateProvider::default_pricing(30, 70);
        let corridor = provider.get_corridor(70).unwrap();
        assert!(corridor[0] >= corridor[69]);
    }

    #[test]
    fn length_mismatch_is_reported() {
        let provider = TableRateProvider::default_pricing(45, 5);
        assert!(provider.get_mortality(Basis::Current, 1_000).is_err());
    }
}
