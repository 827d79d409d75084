//! CSV-based rate-table loading.
//!
//! Grounded on `assumptions::loader`'s per-file loader functions and
//! `LoadedAssumptions` aggregator: one function per CSV file, each
//! producing a plain vector or map, plus a struct that loads every file in
//! a directory. All CSV-format knowledge lives here; the engine never
//! parses a table directly.

use std::path::Path;

use crate::error::LmiError;
use crate::ledger::basis::Basis;
use crate::rates::{require_len, LoadSchedule, RateProvider};

pub const DEFAULT_RATES_PATH: &str = "data/rates";

fn load_duration_indexed_vector(path: &Path, file_name: &str, len_hint: usize) -> Result<Vec<f64>, LmiError> {
    let file = std::fs::File::open(path.join(file_name))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut values = vec![0.0; len_hint];
    for result in reader.records() {
        let record = result?;
        let duration: usize = record[0]
            .parse()
            .map_err(|_| LmiError::DomainViolation(format!("{file_name}: non-numeric duration column")))?;
        let rate: f64 = record[1]
            .parse()
            .map_err(|_| LmiError::DomainViolation(format!("{file_name}: non-numeric rate column")))?;
        if duration >= values.len() {
            values.resize(duration + 1, 0.0);
        }
        values[duration] = rate;
    }
    Ok(values)
}

/// CSV-backed rate provider: every vector is loaded once at construction
/// and held in memory, honoring the no-I/O-during-calculation rule.
#[derive(Debug, Clone)]
pub struct CsvRateProvider {
    mortality_current: Vec<f64>,
    mortality_guaranteed: Vec<f64>,
    interest_current: Vec<f64>,
    interest_guaranteed: Vec<f64>,
    corridor: Vec<f64>,
    seven_pp_rate: Vec<f64>,
    glp_rate: Vec<f64>,
    gsp_rate: Vec<f64>,
    surrender_charges: Vec<f64>,
    loads: LoadSchedule,
}

impl CsvRateProvider {
    pub fn load_default(projection_len: usize) -> Result<Self, LmiError> {
        Self::load_from(Path::new(DEFAULT_RATES_PATH), projection_len)
    }

    pub fn load_from(path: &Path, projection_len: usize) -> Result<Self, LmiError> {
        Ok(CsvRateProvider {
            mortality_current: load_duration_indexed_vector(path, "mortality_current.csv", projection_len)?,
            mortality_guaranteed: load_duration_indexed_vector(path, "mortality_guaranteed.csv", projection_len)?,
            interest_current: load_duration_indexed_vector(path, "interest_current.csv", projection_len)?,
            interest_guaranteed: load_duration_indexed_vector(path, "interest_guaranteed.csv", projection_len)?,
            corridor: load_duration_indexed_vector(path, "corridor.csv", projection_len)?,
            seven_pp_rate: load_duration_indexed_vector(path, "seven_pp_rate.csv", projection_len)?,
            glp_rate: load_duration_indexed_vector(path, "glp_rate.csv", projection_len)?,
            gsp_rate: load_duration_indexed_vector(path, "gsp_rate.csv", projection_len)?,
            surrender_charges: load_duration_indexed_vector(path, "surrender_charges.csv", 20)?,
            loads: load_loads(path)?,
        })
    }
}

fn load_loads(path: &Path) -> Result<LoadSchedule, LmiError> {
    let file = std::fs::File::open(path.join("loads.csv"))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut loads = LoadSchedule::default();
    for result in reader.records() {
        let record = result?;
        let name = &record[0];
        let value: f64 = record[1]
            .parse()
            .map_err(|_| LmiError::DomainViolation(format!("loads.csv: non-numeric value for {name}")))?;
        match name {
            "monthly_policy_fee" => loads.monthly_policy_fee = value,
            "annual_policy_fee" => loads.annual_policy_fee = value,
            "premium_load_target" => loads.premium_load_target = value,
            "premium_load_excess" => loads.premium_load_excess = value,
            "sales_load" => loads.sales_load = value,
            "dac_tax_load" => loads.dac_tax_load = value,
            "premium_tax_rate" => loads.premium_tax_rate = value,
            "target_premium_per_unit" => loads.target_premium_per_unit = value,
            other => {
                log::warn!("loads.csv: ignoring unrecognized load name '{other}'");
            }
        }
    }
    Ok(loads)
}

impl RateProvider for CsvRateProvider {
    fn get_mortality(&self, basis: Basis, len: usize) -> Result<Vec<f64>, LmiError> {
        match basis {
            Basis::Midpoint => {
                require_len(&self.mortality_current, len, "mortality")?;
                require_len(&self.mortality_guaranteed, len, "mortality")?;
                Ok(self.mortality_current[..len]
                    .iter()
                    .zip(&self.mortality_guaranteed[..len])
                    .map(|(c, g)| (c + g) / 2.0)
                    .collect())
            }
            Basis::Current | Basis::CurrentSepAcctZero | Basis::CurrentSepAcctHalf => {
                require_len(&self.mortality_current, len, "mortality")?;
                Ok(self.mortality_current[..len].to_vec())
            }
            _ => {
                require_len(&self.mortality_guaranteed, len, "mortality")?;
                Ok(self.mortality_guaranteed[..len].to_vec())
            }
        }
    }

    fn get_interest(&self, basis: Basis, len: usize) -> Result<Vec<f64>, LmiError> {
        match basis {
            Basis::Midpoint => {
                require_len(&self.interest_current, len, "interest")?;
                require_len(&self.interest_guaranteed, len, "interest")?;
                Ok(self.interest_current[..len]
                    .iter()
                    .zip(&self.interest_guaranteed[..len])
                    .map(|(c, g)| (c + g) / 2.0)
                    .collect())
            }
            Basis::Current | Basis::CurrentSepAcctZero | Basis::CurrentSepAcctHalf => {
                require_len(&self.interest_current, len, "interest")?;
                Ok(self.interest_current[..len].to_vec())
            }
            _ => {
                require_len(&self.interest_guaranteed, len, "interest")?;
                Ok(self.interest_guaranteed[..len].to_vec())
            }
        }
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
