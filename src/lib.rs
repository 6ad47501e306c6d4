//! A simulation core for weekly epidemic progression and its fiscal
//! consequences across the cities of a country.
//!
//! The central objects are:
//! * [`Cohort`] — the 32-bucket population state vector of a single city,
//!   cross-classified by infection stage, vaccination recency, and
//!   employment, with invariant-preserving transition operations.
//! * [`CityEconomy`] — one cohort plus per-city policy knobs (transport
//!   density, size class, vaccination quota); executes one weekly step and
//!   reports a fiscal delta.
//! * [`CountryLedger`] — an ordered collection of cities sharing a single
//!   funds pool and fiscal rates; executes one weekly step across all
//!   cities with order-dependent budget rationing.
//!
//! The crate renders nothing and schedules nothing: the caller decides when
//! a time step occurs and reads state back through plain accessors. All
//! randomness flows through a seedable generator owned by the ledger, so a
//! given seed reproduces an identical sequence of state transitions.
//!
//! ```rust
//! use epicity::{CityEconomy, CountryLedger};
//!
//! let mut country = CountryLedger::new(42);
//! country.set_funds(1_000.0);
//! country.set_tax_per_capita(1.5);
//!
//! let mut template = CityEconomy::new();
//! template.set_population(10_000).unwrap();
//! country.add_city(&template);
//!
//! let delta = country.step(1);
//! assert_eq!(country.funds(), 1_000.0 + delta);
//! ```

pub mod city;
pub mod cohort;
pub mod country;
pub mod error;
pub mod infection;
pub mod partition;
pub mod scenario;

pub use city::CityEconomy;
pub use cohort::Cohort;
pub use country::{CountryLedger, FiscalRates};
pub use error::EpicityError;
pub use infection::{CityProfile, ForceOfInfection, InfectionModel};
pub use partition::random_partition;
pub use scenario::Scenario;

// Logging macros, so model code can `use epicity::{debug, info, trace};`.
pub use log::{debug, error, info, trace, warn};
