//! The country-level ledger: an ordered collection of cities coupled through
//! a single funds pool.
//!
//! City order is load-bearing. Each weekly step walks the cities in insertion
//! order, recomputes the affordable vaccination budget from the *current*
//! funds balance before every city's turn, and applies that city's fiscal
//! delta immediately — so cities earlier in the list are served first and can
//! exhaust the shared budget for cities later in the same step. Reordering or
//! parallelizing city steps changes the result.

use crate::city::CityEconomy;
use crate::infection::{ForceOfInfection, InfectionModel};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// The shared fiscal rates applied to every city's step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FiscalRates {
    /// Weekly tax collected per healthy working resident.
    #[serde(default)]
    pub tax_per_capita: f64,
    /// Cost of one vaccine dose.
    #[serde(default)]
    pub vaccination_cost: f64,
    /// Weekly relief paid per eligible resident.
    #[serde(default)]
    pub relief_cost: f64,
}

/// The ordered cities of a country, their shared fiscal rates, the funds
/// balance (signed; deficits are allowed), and the seedable random source
/// every stochastic transition draws from.
#[derive(Debug)]
pub struct CountryLedger {
    cities: Vec<CityEconomy>,
    rates: FiscalRates,
    funds: f64,
    rng: StdRng,
}

impl CountryLedger {
    /// A country with no cities, zero rates, zero funds, and a random source
    /// seeded with `seed`. The same seed reproduces an identical sequence of
    /// state transitions.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            cities: Vec::new(),
            rates: FiscalRates::default(),
            funds: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Re-seed the random source, e.g. to replay a run.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Append an independent copy of `template` to the end of the city list.
    /// The stored city shares no state with the template.
    pub fn add_city(&mut self, template: &CityEconomy) {
        self.cities.push(template.clone());
        debug!(
            "added city #{} population={}",
            self.cities.len() - 1,
            template.population()
        );
    }

    /// Remove and return the city at `index`, shifting later cities up in
    /// fiscal precedence. Returns `None` if the index is out of range.
    pub fn remove_city(&mut self, index: usize) -> Option<CityEconomy> {
        if index < self.cities.len() {
            Some(self.cities.remove(index))
        } else {
            None
        }
    }

    #[must_use]
    pub fn cities(&self) -> &[CityEconomy] {
        &self.cities
    }

    #[must_use]
    pub fn city(&self, index: usize) -> Option<&CityEconomy> {
        self.cities.get(index)
    }

    pub fn city_mut(&mut self, index: usize) -> Option<&mut CityEconomy> {
        self.cities.get_mut(index)
    }

    #[must_use]
    pub fn funds(&self) -> f64 {
        self.funds
    }

    pub fn set_funds(&mut self, value: f64) {
        self.funds = value;
    }

    #[must_use]
    pub fn rates(&self) -> &FiscalRates {
        &self.rates
    }

    pub fn set_tax_per_capita(&mut self, value: f64) {
        self.rates.tax_per_capita = value;
    }

    pub fn set_vaccination_cost(&mut self, value: f64) {
        self.rates.vaccination_cost = value;
    }

    pub fn set_relief_cost(&mut self, value: f64) {
        self.rates.relief_cost = value;
    }

    /// Advance the whole country by one week with the standard
    /// force-of-infection model. Returns the aggregate fiscal delta; the
    /// funds balance has already been updated when this returns.
    pub fn step(&mut self, month: u32) -> f64 {
        self.step_with_model(month, &ForceOfInfection)
    }

    /// Advance the whole country by one week with a caller-supplied infection
    /// model (see [`InfectionModel`]).
    pub fn step_with_model(&mut self, month: u32, model: &dyn InfectionModel) -> f64 {
        let rates = self.rates;
        let mut aggregate_delta = 0.0;
        for (index, city) in self.cities.iter_mut().enumerate() {
            let budget = affordable_doses(self.funds, rates.vaccination_cost);
            let delta = city.step(month, budget, &rates, model, &mut self.rng);
            self.funds += delta;
            aggregate_delta += delta;
            debug!(
                "city #{index}: budget={budget} delta={delta:.2} funds={:.2}",
                self.funds
            );
        }
        info!(
            "country step month={month}: delta={aggregate_delta:.2} funds={:.2}",
            self.funds
        );
        aggregate_delta
    }
}

/// How many doses the current funds can pay for. A zero or negative dose cost
/// must not crash the division, and a deficit affords nothing.
fn affordable_doses(funds: f64, vaccination_cost: f64) -> u64 {
    if vaccination_cost <= 0.0 {
        return 0;
    }
    let doses = (funds / vaccination_cost).floor();
    if doses > 0.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            doses as u64
        }
    } else {
        0
    }
}
