//! A city's economy: one cohort plus the per-city policy knobs, stepped one
//! week at a time against rates and a vaccination budget supplied by the
//! owning [`CountryLedger`](crate::country::CountryLedger).

use crate::cohort::Cohort;
use crate::country::FiscalRates;
use crate::error::EpicityError;
use crate::infection::{CityProfile, InfectionModel};
use log::trace;
use rand::rngs::StdRng;

/// Smallest population a configured city may have.
pub const CITY_MIN_POPULATION: u64 = 100;
/// Largest population a configured city may have.
pub const CITY_MAX_POPULATION: u64 = 30_000_000;

/// Infected fraction at which a city is declared epidemic.
pub const EPIDEMIC_THRESHOLD: f64 = 0.45;

/// Ascending population thresholds; the size class is the count of thresholds
/// at or below the total, i.e. the decimal magnitude of the population.
const SIZE_CLASS_THRESHOLDS: [u64; 9] = [
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
];

/// One city: exclusive owner of its [`Cohort`], with transport density and
/// vaccination-quota policy values, and the derived size class and epidemic
/// flag. `Clone` is the template-instantiation mechanism: a stored city is an
/// independent copy with no state shared with the template it came from.
#[derive(Clone, Debug)]
pub struct CityEconomy {
    cohort: Cohort,
    transport_density: f64,
    vaccination_quota: u64,
    size_class: usize,
    epidemic: bool,
}

impl CityEconomy {
    /// An empty city template with neutral transport density.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cohort: Cohort::new(),
            transport_density: 1.0,
            vaccination_quota: 0,
            size_class: 0,
            epidemic: false,
        }
    }

    /// A city of `total` residents.
    pub fn with_population(total: u64) -> Result<Self, EpicityError> {
        let mut city = Self::new();
        city.set_population(total)?;
        Ok(city)
    }

    /// Reset the cohort wholesale, discarding prior disease and vaccination
    /// state, and recompute the derived size class and epidemic flag.
    ///
    /// # Errors
    /// `InvalidPopulation` if `total` exceeds [`CITY_MAX_POPULATION`].
    pub fn set_population(&mut self, total: u64) -> Result<(), EpicityError> {
        if total > CITY_MAX_POPULATION {
            #[allow(clippy::cast_possible_wrap)]
            return Err(EpicityError::InvalidPopulation(total as i64));
        }
        self.cohort.reset_population(total);
        self.refresh_derived();
        Ok(())
    }

    /// Plain value setter; range validation is owned by the caller.
    pub fn set_transport_density(&mut self, value: f64) {
        self.transport_density = value;
    }

    /// Plain value setter: the weekly cap on doses this city will request.
    pub fn set_vaccination_quota(&mut self, value: u64) {
        self.vaccination_quota = value;
    }

    #[must_use]
    pub fn population(&self) -> u64 {
        self.cohort.total()
    }

    #[must_use]
    pub fn infected(&self) -> u64 {
        self.cohort.infected()
    }

    #[must_use]
    pub fn vaccinated(&self) -> u64 {
        self.cohort.vaccinated()
    }

    #[must_use]
    pub fn immune(&self) -> u64 {
        self.cohort.immune()
    }

    #[must_use]
    pub fn taxable(&self) -> u64 {
        self.cohort.taxable()
    }

    #[must_use]
    pub fn relief(&self) -> u64 {
        self.cohort.relief()
    }

    #[must_use]
    pub fn is_epidemic(&self) -> bool {
        self.epidemic
    }

    #[must_use]
    pub fn size_class(&self) -> usize {
        self.size_class
    }

    #[must_use]
    pub fn transport_density(&self) -> f64 {
        self.transport_density
    }

    #[must_use]
    pub fn vaccination_quota(&self) -> u64 {
        self.vaccination_quota
    }

    #[must_use]
    pub fn cohort(&self) -> &Cohort {
        &self.cohort
    }

    /// Execute one weekly step: age the cohort, vaccinate up to the smaller
    /// of the supplied budget and the city's own quota, run the infection
    /// model, and report the fiscal delta
    /// `tax * taxable - vaccinationCost * vaccinated - reliefCost * relief`.
    ///
    /// The caller supplies the month (1..=12), the dose budget it can afford,
    /// the shared fiscal rates, and the infection model; there are no other
    /// side effects.
    pub fn step(
        &mut self,
        month: u32,
        vaccination_budget: u64,
        rates: &FiscalRates,
        model: &dyn InfectionModel,
        rng: &mut StdRng,
    ) -> f64 {
        self.cohort.age_one_week();

        let doses = vaccination_budget.min(self.vaccination_quota);
        let vaccinated = self.cohort.vaccinate(doses, rng);

        let profile = CityProfile {
            transport_density: self.transport_density,
            size_class: self.size_class,
        };
        let newly_infected = model.update(&mut self.cohort, &profile, month, rng);

        #[allow(clippy::cast_precision_loss)]
        let delta = rates.tax_per_capita * self.cohort.taxable() as f64
            - rates.vaccination_cost * vaccinated as f64
            - rates.relief_cost * self.cohort.relief() as f64;

        self.refresh_derived();
        trace!(
            "city step: month={month} vaccinated={vaccinated} newly_infected={newly_infected} \
             infected={} epidemic={} delta={delta:.2}",
            self.cohort.infected(),
            self.epidemic
        );
        delta
    }

    fn refresh_derived(&mut self) {
        self.size_class = size_class_of(self.cohort.total());
        let total = self.cohort.total();
        #[allow(clippy::cast_precision_loss)]
        {
            self.epidemic =
                total > 0 && self.cohort.infected() as f64 / total as f64 >= EPIDEMIC_THRESHOLD;
        }
    }
}

impl Default for CityEconomy {
    fn default() -> Self {
        Self::new()
    }
}

fn size_class_of(total: u64) -> usize {
    SIZE_CLASS_THRESHOLDS
        .iter()
        .filter(|&&threshold| total >= threshold)
        .count()
}
