//! The 32-bucket population state vector of a single city.
//!
//! Every resident sits in exactly one bucket, indexed by
//! `infection * 8 + vaccination * 2 + employment`:
//! * infection stage 0 (healthy) or 1..=3 (weeks remaining infected, counted
//!   down by [`Cohort::age_one_week`]);
//! * vaccination stage 0 (unvaccinated), 1..=2 (vaccinated that many weeks
//!   ago) or 3 (vaccinated at least three weeks ago, permanently immune);
//! * employment 0 (working, taxable) or 1 (not working).
//!
//! The sum of all 32 buckets equals the cohort total after every operation;
//! a violation is a programming defect and fails loudly in debug builds.

use crate::partition::{random_partition, weighted_shares};
use rand::Rng;

/// Number of population buckets.
pub const N_GROUPS: usize = 32;

/// Fraction of a freshly initialized population placed in the working bucket.
pub const WORKING_FRACTION: f64 = 0.65;

/// Split of newly infected residents across infection stages 1..=3
/// (weeks remaining infected).
pub const INFECTION_DURATION_WEIGHTS: [f64; 3] = [0.25, 0.6, 0.15];

/// Bucket index for `(infection, vaccination, employment)`.
#[inline]
#[must_use]
pub fn group_index(infection: usize, vaccination: usize, employment: usize) -> usize {
    debug_assert!(infection < 4 && vaccination < 4 && employment < 2);
    infection * 8 + vaccination * 2 + employment
}

/// Inverse of [`group_index`].
#[inline]
#[must_use]
pub fn group_coordinates(index: usize) -> (usize, usize, usize) {
    debug_assert!(index < N_GROUPS);
    (index / 8, (index % 8) / 2, index % 2)
}

/// A city population cross-classified by infection stage, vaccination recency,
/// and employment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cohort {
    groups: [u64; N_GROUPS],
    total: u64,
}

impl Cohort {
    /// An empty cohort.
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: [0; N_GROUPS],
            total: 0,
        }
    }

    /// A fresh cohort of `total` residents, all healthy and unvaccinated,
    /// split into working and non-working buckets at [`WORKING_FRACTION`].
    #[must_use]
    pub fn with_population(total: u64) -> Self {
        let mut cohort = Self::new();
        cohort.reset_population(total);
        cohort
    }

    /// Wholesale reset: discards all prior disease and vaccination state.
    pub fn reset_population(&mut self, total: u64) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let working = (total as f64 * WORKING_FRACTION) as u64;
        self.groups = [0; N_GROUPS];
        self.groups[group_index(0, 0, 0)] = working;
        self.groups[group_index(0, 0, 1)] = total - working;
        self.total = total;
        self.assert_conserved();
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Sum of the buckets whose `(infection, vaccination, employment)`
    /// coordinates satisfy `predicate`.
    pub fn subgroup<P>(&self, predicate: P) -> u64
    where
        P: Fn(usize, usize, usize) -> bool,
    {
        (0..N_GROUPS)
            .filter(|&index| {
                let (infection, vaccination, employment) = group_coordinates(index);
                predicate(infection, vaccination, employment)
            })
            .map(|index| self.groups[index])
            .sum()
    }

    /// Healthy working residents: the tax base.
    #[must_use]
    pub fn taxable(&self) -> u64 {
        self.subgroup(|infection, _, employment| infection == 0 && employment == 0)
    }

    /// Residents entitled to relief payments. This is the historical bit
    /// pattern `(index odd) && (index > 8)`: infected, not working, with
    /// index 8 itself excluded (`> 8`, not `>= 8`).
    #[must_use]
    pub fn relief(&self) -> u64 {
        (0..N_GROUPS)
            .filter(|&index| index % 2 == 1 && index > 8)
            .map(|index| self.groups[index])
            .sum()
    }

    /// Residents currently infected (any stage above 0).
    #[must_use]
    pub fn infected(&self) -> u64 {
        self.subgroup(|infection, _, _| infection > 0)
    }

    /// Residents vaccinated at any point (stage 1 and up).
    #[must_use]
    pub fn vaccinated(&self) -> u64 {
        self.subgroup(|_, vaccination, _| vaccination >= 1)
    }

    /// Residents vaccinated at least three weeks ago, permanently immune.
    #[must_use]
    pub fn immune(&self) -> u64 {
        self.subgroup(|_, vaccination, _| vaccination == 3)
    }

    /// Advance the cohort by one week: count down infections, then age
    /// vaccinations. Both shifts conserve the total exactly.
    ///
    /// Infection recovery merges stage 1 into stage 0 and shifts stages 2 and
    /// 3 down by one; destinations are processed in increasing order. An
    /// entirely infected cohort returns fully to healthy after three calls
    /// with no new infections.
    ///
    /// Vaccination aging moves stage 2 into the permanent stage-3 accumulator
    /// and stage 1 into stage 2; destinations are processed in decreasing
    /// order (3 before 2) so nobody advances twice. Stage 0 is untouched.
    pub fn age_one_week(&mut self) {
        for stage in 0..3 {
            for offset in 0..8 {
                let source = (stage + 1) * 8 + offset;
                let destination = stage * 8 + offset;
                self.groups[destination] += self.groups[source];
                self.groups[source] = 0;
            }
        }

        for stage in [3, 2] {
            for infection in 0..4 {
                for employment in 0..2 {
                    let source = group_index(infection, stage - 1, employment);
                    let destination = group_index(infection, stage, employment);
                    self.groups[destination] += self.groups[source];
                    self.groups[source] = 0;
                }
            }
        }
        self.assert_conserved();
    }

    /// Infect up to `quota` susceptible residents, drawn at random across the
    /// six susceptible buckets (infection stage 0, vaccination stage 0..=2 —
    /// the immune stage-3 buckets are never infected). Each newly infected
    /// unit is assigned a remaining-duration stage by
    /// [`INFECTION_DURATION_WEIGHTS`].
    ///
    /// Returns the number actually infected, after clamping `quota` to the
    /// susceptible pool.
    pub fn infect<R: Rng + ?Sized>(&mut self, quota: u64, rng: &mut R) -> u64 {
        let mut sources = [0usize; 6];
        let mut capacities = [0u64; 6];
        let mut slot = 0;
        for vaccination in 0..3 {
            for employment in 0..2 {
                let index = group_index(0, vaccination, employment);
                sources[slot] = index;
                capacities[slot] = self.groups[index];
                slot += 1;
            }
        }

        let shares = random_partition(rng, quota, &capacities);
        let infected: u64 = shares.iter().sum();

        for (&share, &source) in shares.iter().zip(&sources) {
            if share == 0 {
                continue;
            }
            self.groups[source] -= share;
            let (_, vaccination, employment) = group_coordinates(source);
            let by_stage = weighted_shares(share, &INFECTION_DURATION_WEIGHTS);
            for (stage_offset, &count) in by_stage.iter().enumerate() {
                self.groups[group_index(stage_offset + 1, vaccination, employment)] += count;
            }
        }
        self.assert_conserved();
        infected
    }

    /// Vaccinate up to `quota` residents from the two healthy unvaccinated
    /// buckets (one per employment value), moving them into vaccination
    /// stage 1. Returns the number actually vaccinated, after clamping
    /// `quota` to the unvaccinated pool.
    pub fn vaccinate<R: Rng + ?Sized>(&mut self, quota: u64, rng: &mut R) -> u64 {
        let sources = [group_index(0, 0, 0), group_index(0, 0, 1)];
        let capacities = [self.groups[sources[0]], self.groups[sources[1]]];

        let shares = random_partition(rng, quota, &capacities);
        let vaccinated: u64 = shares.iter().sum();

        for (&share, &source) in shares.iter().zip(&sources) {
            self.groups[source] -= share;
            let (_, _, employment) = group_coordinates(source);
            self.groups[group_index(0, 1, employment)] += share;
        }
        self.assert_conserved();
        vaccinated
    }

    /// Conservation invariant: the buckets always sum to the total.
    #[inline]
    fn assert_conserved(&self) {
        debug_assert_eq!(
            self.groups.iter().sum::<u64>(),
            self.total,
            "cohort population not conserved"
        );
    }

    #[cfg(test)]
    pub(crate) fn from_groups(groups: [u64; N_GROUPS]) -> Self {
        let total = groups.iter().sum();
        Self { groups, total }
    }

    #[cfg(test)]
    pub(crate) fn group(&self, index: usize) -> u64 {
        self.groups[index]
    }
}

impl Default for Cohort {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn initialization_splits_at_working_fraction() {
        let cohort = Cohort::with_population(1_000);
        assert_eq!(cohort.total(), 1_000);
        assert_eq!(cohort.group(group_index(0, 0, 0)), 650);
        assert_eq!(cohort.group(group_index(0, 0, 1)), 350);
        assert_eq!(cohort.taxable(), 650);
        assert_eq!(cohort.infected(), 0);
        assert_eq!(cohort.vaccinated(), 0);
    }

    #[test]
    fn conservation_across_operation_sequences() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut cohort = Cohort::with_population(10_000);
        for week in 0..50u64 {
            cohort.age_one_week();
            cohort.vaccinate(week * 13 % 400, &mut rng);
            cohort.infect(week * 29 % 900, &mut rng);
            assert_eq!(cohort.total(), 10_000);
        }
    }

    #[test]
    fn full_recovery_after_three_weeks_of_aging() {
        let mut groups = [0u64; N_GROUPS];
        groups[group_index(3, 0, 0)] = 1_000;
        let mut cohort = Cohort::from_groups(groups);

        cohort.age_one_week();
        assert_eq!(cohort.group(group_index(2, 0, 0)), 1_000);
        cohort.age_one_week();
        assert_eq!(cohort.group(group_index(1, 0, 0)), 1_000);
        cohort.age_one_week();
        assert_eq!(cohort.group(group_index(0, 0, 0)), 1_000);
        assert_eq!(cohort.infected(), 0);
        for index in 1..N_GROUPS {
            assert_eq!(cohort.group(index), 0, "stray population in bucket {index}");
        }
    }

    #[test]
    fn aging_advances_vaccination_stages() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut cohort = Cohort::with_population(1_000);
        assert_eq!(cohort.vaccinate(200, &mut rng), 200);
        assert_eq!(cohort.immune(), 0);

        cohort.age_one_week();
        cohort.age_one_week();
        assert_eq!(cohort.immune(), 0);
        cohort.age_one_week();
        assert_eq!(cohort.immune(), 200);
        assert_eq!(cohort.vaccinated(), 200);
    }

    #[test]
    fn infection_clamps_to_susceptible_pool() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut cohort = Cohort::with_population(1_000);
        assert_eq!(cohort.infect(5_000, &mut rng), 1_000);
        assert_eq!(cohort.infected(), 1_000);
        assert_eq!(cohort.total(), 1_000);
        for vaccination in 0..3 {
            for employment in 0..2 {
                assert_eq!(cohort.group(group_index(0, vaccination, employment)), 0);
            }
        }
    }

    #[test]
    fn immune_residents_are_never_infected() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut cohort = Cohort::with_population(1_000);
        cohort.vaccinate(1_000, &mut rng);
        cohort.age_one_week();
        cohort.age_one_week();
        cohort.age_one_week();
        assert_eq!(cohort.immune(), 1_000);
        assert_eq!(cohort.infect(500, &mut rng), 0);
        assert_eq!(cohort.infected(), 0);
    }

    #[test]
    fn vaccination_clamps_to_unvaccinated_pool() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut cohort = Cohort::with_population(1_000);
        assert_eq!(cohort.vaccinate(5_000, &mut rng), 1_000);
        assert_eq!(cohort.vaccinated(), 1_000);
        assert_eq!(
            cohort.subgroup(|_, vaccination, _| vaccination == 1),
            1_000
        );
        assert_eq!(cohort.vaccinate(10, &mut rng), 0);
    }

    #[test]
    fn immunity_only_grows() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut cohort = Cohort::with_population(50_000);
        let mut previous_immune = 0;
        for _ in 0..20 {
            cohort.vaccinate(1_000, &mut rng);
            for _ in 0..3 {
                cohort.age_one_week();
                assert!(cohort.immune() >= previous_immune);
                previous_immune = cohort.immune();
            }
        }
        assert!(cohort.immune() > 0);
    }

    #[test]
    fn relief_excludes_bucket_eight_boundary() {
        let mut groups = [0u64; N_GROUPS];
        groups[8] = 40; // infection 1, vaccination 0, working: even index, no relief
        groups[9] = 7; // infection 1, vaccination 0, not working
        groups[31] = 3; // infection 3, vaccination 3, not working
        groups[1] = 99; // healthy, not working: below the boundary
        let cohort = Cohort::from_groups(groups);
        assert_eq!(cohort.relief(), 10);
    }

    #[test]
    fn taxable_counts_healthy_working_only() {
        let mut rng = StdRng::seed_from_u64(29);
        let mut cohort = Cohort::with_population(1_000);
        assert_eq!(cohort.taxable(), 650);
        cohort.infect(1_000, &mut rng);
        assert_eq!(cohort.taxable(), 0);
    }

    #[test]
    fn reset_discards_prior_state() {
        let mut rng = StdRng::seed_from_u64(41);
        let mut cohort = Cohort::with_population(1_000);
        cohort.infect(400, &mut rng);
        cohort.vaccinate(100, &mut rng);
        cohort.reset_population(2_000);
        assert_eq!(cohort.total(), 2_000);
        assert_eq!(cohort.infected(), 0);
        assert_eq!(cohort.vaccinated(), 0);
        assert_eq!(cohort.taxable(), 1_300);
    }
}
