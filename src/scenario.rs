//! Scenario loading: build a configured [`CountryLedger`] from a JSON file.
//!
//! A scenario is the startup description the presentation layer (or a batch
//! runner) feeds the core: the rng seed, the opening funds balance, the
//! shared fiscal rates, and one entry per city. Range validation happens
//! here, before anything reaches the core's transition logic.
//!
//! ```json
//! {
//!     "seed": 42,
//!     "funds": 100000.0,
//!     "rates": { "tax_per_capita": 1.5, "vaccination_cost": 8.0, "relief_cost": 3.0 },
//!     "cities": [
//!         { "population": 1000000, "transport_density": 1.2, "vaccination_quota": 5000 },
//!         { "population": 50000 }
//!     ]
//! }
//! ```

use crate::city::{CityEconomy, CITY_MAX_POPULATION, CITY_MIN_POPULATION};
use crate::country::{CountryLedger, FiscalRates};
use crate::error::EpicityError;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_transport_density() -> f64 {
    1.0
}

/// One configured city. Fields are signed so that out-of-range input is
/// reported as a domain error rather than a parse error.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CityPlan {
    pub population: i64,
    #[serde(default = "default_transport_density")]
    pub transport_density: f64,
    #[serde(default)]
    pub vaccination_quota: i64,
}

/// A complete startup description of a country.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub funds: f64,
    #[serde(default)]
    pub rates: FiscalRates,
    pub cities: Vec<CityPlan>,
}

impl Scenario {
    /// Parse a scenario from JSON text.
    ///
    /// # Errors
    /// `JsonError` on malformed input.
    pub fn from_json(text: &str) -> Result<Self, EpicityError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a scenario file.
    ///
    /// # Errors
    /// `IoError` if the file cannot be read, `JsonError` on malformed input.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EpicityError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Validate the plan and build a ready [`CountryLedger`].
    ///
    /// # Errors
    /// `InvalidPopulation` for a population outside
    /// `CITY_MIN_POPULATION..=CITY_MAX_POPULATION`, `InvalidQuota` for a
    /// negative vaccination quota.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn build(&self) -> Result<CountryLedger, EpicityError> {
        let mut country = CountryLedger::new(self.seed);
        country.set_funds(self.funds);
        country.set_tax_per_capita(self.rates.tax_per_capita);
        country.set_vaccination_cost(self.rates.vaccination_cost);
        country.set_relief_cost(self.rates.relief_cost);

        for plan in &self.cities {
            if plan.population < CITY_MIN_POPULATION as i64
                || plan.population > CITY_MAX_POPULATION as i64
            {
                return Err(EpicityError::InvalidPopulation(plan.population));
            }
            if plan.vaccination_quota < 0 {
                return Err(EpicityError::InvalidQuota(plan.vaccination_quota));
            }

            let mut city = CityEconomy::with_population(plan.population as u64)?;
            city.set_transport_density(plan.transport_density);
            city.set_vaccination_quota(plan.vaccination_quota as u64);
            country.add_city(&city);
        }
        info!(
            "built scenario: {} cities, funds={:.2}, seed={}",
            self.cities.len(),
            self.funds,
            self.seed
        );
        Ok(country)
    }
}
