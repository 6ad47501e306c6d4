//! Capacity-constrained stochastic integer partitioning. These functions split an
//! integer quota into per-bucket shares and are the randomness primitive behind both
//! infection and vaccination transfers; they are generic over the rng type.

use rand::Rng;

/// Split `quota` into `parts` integer shares using a stick-breaking partition:
/// sort uniform cuts together with the boundaries 0 and 1 and take consecutive
/// gaps as proportions. Each proportion is multiplied by `quota` and truncated;
/// the rounding remainder is credited entirely to the first share.
///
/// The returned shares always sum exactly to `quota`.
fn stick_breaking_shares<R: Rng + ?Sized>(rng: &mut R, parts: usize, quota: u64) -> Vec<u64> {
    debug_assert!(parts > 0);
    if parts == 1 {
        return vec![quota];
    }
    let mut cuts: Vec<f64> = (1..parts).map(|_| rng.random_range(0.0..1.0)).collect();
    cuts.sort_by(f64::total_cmp);
    cuts.push(1.0);

    let mut shares = Vec::with_capacity(parts);
    let mut previous = 0.0;
    let mut assigned = 0u64;
    for cut in cuts {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let share = ((cut - previous) * quota as f64) as u64;
        shares.push(share);
        assigned += share;
        previous = cut;
    }
    shares[0] += quota - assigned;
    shares
}

/// Distribute a non-negative `quota` across buckets with the given `capacities`.
///
/// Returns shares such that `shares[i] <= capacities[i]` for every bucket and the
/// shares sum exactly to `min(quota, total capacity)`. Shares are drawn with
/// [`stick_breaking_shares`]; any bucket pushed over its capacity is clamped,
/// removed from the active set, and its overflow redistributed among the
/// remaining active buckets by the same method. Each round either ends with no
/// overflow or strictly shrinks the active set, so the loop terminates.
pub fn random_partition<R: Rng + ?Sized>(
    rng: &mut R,
    quota: u64,
    capacities: &[u64],
) -> Vec<u64> {
    let mut shares = vec![0u64; capacities.len()];
    let total_capacity: u64 = capacities.iter().sum();
    let mut remaining = quota.min(total_capacity);
    let mut active: Vec<usize> = (0..capacities.len()).collect();

    while remaining > 0 && !active.is_empty() {
        let drawn = stick_breaking_shares(rng, active.len(), remaining);
        for (share, &bucket) in drawn.iter().zip(&active) {
            shares[bucket] += share;
        }

        let mut overflow = 0u64;
        active.retain(|&bucket| {
            if shares[bucket] > capacities[bucket] {
                overflow += shares[bucket] - capacities[bucket];
                shares[bucket] = capacities[bucket];
                false
            } else {
                true
            }
        });
        remaining = overflow;
    }
    shares
}

/// Split `quota` across fixed `weights` (summing to 1) with the same
/// truncate-and-remainder-to-first rule as the stochastic partition. Used for
/// the infection-duration split, where destinations are unbounded and no
/// capacity clamping is needed.
pub fn weighted_shares(quota: u64, weights: &[f64]) -> Vec<u64> {
    debug_assert!(!weights.is_empty());
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut shares: Vec<u64> = weights.iter().map(|w| (w * quota as f64) as u64).collect();
    let assigned: u64 = shares.iter().sum();
    shares[0] += quota - assigned;
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn check_partition_laws(quota: u64, capacities: &[u64], seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let shares = random_partition(&mut rng, quota, capacities);
        let total_capacity: u64 = capacities.iter().sum();
        assert_eq!(shares.iter().sum::<u64>(), quota.min(total_capacity));
        for (share, capacity) in shares.iter().zip(capacities) {
            assert!(share <= capacity);
        }
    }

    #[test]
    fn shares_sum_to_quota_and_respect_capacities() {
        let capacity_vectors: &[&[u64]] = &[
            &[10, 10, 10],
            &[0, 0, 100],
            &[1, 2, 3, 4, 5, 6],
            &[1_000_000, 1, 1, 1],
            &[7],
        ];
        for seed in 0..100 {
            for capacities in capacity_vectors {
                let total: u64 = capacities.iter().sum();
                for quota in [0, 1, total / 2, total, total + 13] {
                    check_partition_laws(quota, capacities, seed);
                }
            }
        }
    }

    #[test]
    fn quota_above_capacity_fills_every_bucket() {
        let mut rng = StdRng::seed_from_u64(7);
        let capacities = [4, 0, 9, 1];
        let shares = random_partition(&mut rng, 1_000, &capacities);
        assert_eq!(shares, capacities);
    }

    #[test]
    fn zero_capacity_everywhere_allocates_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        let shares = random_partition(&mut rng, 50, &[0, 0, 0]);
        assert_eq!(shares, vec![0, 0, 0]);
    }

    #[test]
    fn empty_capacity_vector_is_fine() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(random_partition(&mut rng, 50, &[]).is_empty());
    }

    #[test]
    fn single_bucket_takes_whole_quota() {
        let mut rng = StdRng::seed_from_u64(123);
        assert_eq!(random_partition(&mut rng, 5, &[42]), vec![5]);
    }

    #[test]
    fn stick_breaking_is_reproducible() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        assert_eq!(
            stick_breaking_shares(&mut a, 5, 1_000),
            stick_breaking_shares(&mut b, 5, 1_000)
        );
    }

    #[test]
    fn weighted_shares_sum_exactly() {
        let weights = [0.25, 0.6, 0.15];
        for quota in [0, 1, 2, 7, 999, 1_000_000] {
            let shares = weighted_shares(quota, &weights);
            assert_eq!(shares.len(), 3);
            assert_eq!(shares.iter().sum::<u64>(), quota);
        }
    }

    #[test]
    fn weighted_shares_remainder_goes_to_first() {
        // 0.25 * 3 = 0, 0.6 * 3 = 1, 0.15 * 3 = 0; remainder 2 lands on the first.
        assert_eq!(weighted_shares(3, &[0.25, 0.6, 0.15]), vec![2, 1, 0]);
    }
}
