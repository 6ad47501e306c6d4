//! The force-of-infection model: how many residents fall ill this week.
//!
//! The standard model is a pure formula over the cohort's current state, the
//! city's transport density and size class, and the calendar month, with a
//! small multiplicative noise term. It is wrapped in the [`InfectionModel`]
//! strategy trait so callers can substitute an alternate per-step behavior
//! (a fixed seeding schedule, a no-op for fiscal-only runs) without touching
//! the rest of the step.

use crate::city::CITY_MAX_POPULATION;
use crate::cohort::Cohort;
use rand::rngs::StdRng;
use rand::Rng;

/// Seasonal multiplier on transmission, indexed by month 1..=12. Index 0 is
/// unused. Respiratory transmission peaks in the winter months.
pub const MONTH_SEASONAL_COEFFICIENT: [f64; 13] = [
    0.0, // unused
    1.30, 1.25, 1.10, 0.95, 0.85, 0.75, 0.70, 0.75, 0.90, 1.05, 1.20, 1.30,
];

/// Transmission multiplier per city size class (decimal magnitude of the
/// population). Larger cities mix more.
pub const SIZE_INFECTION_COEFFICIENT: [f64; 10] = [
    0.55, 0.60, 0.65, 0.70, 0.75, 0.80, 0.85, 0.90, 0.95, 1.00,
];

/// Bounds of the uniform multiplicative noise applied to the weekly quota.
const NOISE_LOW: f64 = 0.875;
const NOISE_HIGH: f64 = 1.125;

/// Read-only per-city inputs to an infection model.
#[derive(Clone, Copy, Debug)]
pub struct CityProfile {
    pub transport_density: f64,
    pub size_class: usize,
}

/// Per-step infection behavior. Implementations receive the mutable cohort
/// and are expected to call [`Cohort::infect`] themselves; the return value
/// is the number actually infected.
pub trait InfectionModel {
    fn update(
        &self,
        cohort: &mut Cohort,
        profile: &CityProfile,
        month: u32,
        rng: &mut StdRng,
    ) -> u64;
}

/// The standard stochastic force-of-infection model.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForceOfInfection;

impl InfectionModel for ForceOfInfection {
    fn update(
        &self,
        cohort: &mut Cohort,
        profile: &CityProfile,
        month: u32,
        rng: &mut StdRng,
    ) -> u64 {
        let quota = infection_quota(
            cohort,
            profile.transport_density,
            profile.size_class,
            month,
            rng,
        );
        cohort.infect(quota, rng)
    }
}

/// The weekly new-infection quota:
///
/// ```text
/// infected * susceptibleFraction * transportDensity
///     * sizeCoefficient * (1 + (total / CITY_MAX_POPULATION)^2 / 10)
///     * seasonalCoefficient(month) * uniform(0.875, 1.125)
/// ```
///
/// truncated to an integer. An empty cohort yields 0.
///
/// # Panics
/// Panics if `month` is not in `1..=12` or `size_class` is out of range.
pub fn infection_quota<R: Rng + ?Sized>(
    cohort: &Cohort,
    transport_density: f64,
    size_class: usize,
    month: u32,
    rng: &mut R,
) -> u64 {
    assert!((1..=12).contains(&month), "month must be in 1..=12");
    let total = cohort.total();
    if total == 0 {
        return 0;
    }

    #[allow(clippy::cast_precision_loss)]
    let susceptible_fraction = (total - cohort.vaccinated()) as f64 / total as f64;
    #[allow(clippy::cast_precision_loss)]
    let crowding = 1.0 + (total as f64 / CITY_MAX_POPULATION as f64).powi(2) / 10.0;
    #[allow(clippy::cast_precision_loss)]
    let raw = cohort.infected() as f64
        * susceptible_fraction
        * transport_density
        * SIZE_INFECTION_COEFFICIENT[size_class]
        * crowding
        * MONTH_SEASONAL_COEFFICIENT[month as usize];

    let noise = rng.random_range(NOISE_LOW..NOISE_HIGH);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let quota = (raw * noise).floor() as u64;
    quota
}
