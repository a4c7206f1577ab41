//! Bootstrap estimators on random subsamples.
//!
//! Each replicate has its own RNG seeded by `seed + replicate`, so the
//! result does not depend on how rayon schedules the replicates.
use crate::biased_sampling::{check_labels, BiasedSampling};
use crate::config::{BootstrapConfig, NetworkConfig};
use crate::error::TransportError;
use crate::wasserstein::Wasserstein;
use definitions::{ClassSizes, DataSet};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use rayon::prelude::*;

const INITIAL_SCORE: f64 = 0.0000000001;

fn replicate_rng(boot: &BootstrapConfig, replicate: usize) -> Xoshiro256StarStar {
    SeedableRng::seed_from_u64(boot.seed.wrapping_add(replicate as u64))
}

// Halves go to the even neighbor, as in numpy's `round`.
fn scaled(ratio: f64, x: u64) -> u64 {
    (ratio * x as f64).round_ties_even() as u64
}

/// Draw `ratio * n_c` data, rounded half to even, from each class without replacement.
/// Returns indices into `dataset`, class by class.
fn draw_per_class<R: rand::Rng>(dataset: &DataSet, ratio: f64, rng: &mut R) -> Vec<usize> {
    let mut members: Vec<Vec<usize>> = vec![vec![]; dataset.label_counts().len()];
    for (i, datum) in dataset.iter().enumerate() {
        members[datum.label].push(i);
    }
    members
        .iter()
        .flat_map(|members| {
            let m = (scaled(ratio, members.len() as u64) as usize).min(members.len());
            rand::seq::index::sample(&mut *rng, members.len(), m)
                .into_iter()
                .map(|j| members[j])
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Averaged resampling weights over the subsamples of `dataset`.
///
/// In each replicate, the class sizes are scaled by `boot.ratio` and the weights
/// of the drawn data are divided by the mass of the replicate. The scores start
/// from a tiny positive value and are normalized to sum up to one.
pub fn biased_sampling_bootstrap(
    dataset: &DataSet,
    class_sizes: &ClassSizes,
    config: &NetworkConfig,
    boot: &BootstrapConfig,
) -> Result<Vec<f64>, TransportError> {
    if dataset.is_empty() {
        return Err(TransportError::EmptyDataSet);
    }
    check_labels(dataset, class_sizes)?;
    let sub_sizes: Vec<u64> = class_sizes
        .sizes
        .iter()
        .map(|&size| scaled(boot.ratio, size))
        .collect();
    let sub_sizes = ClassSizes::new(sub_sizes);
    let replicates: Vec<Vec<(usize, f64)>> = (0..boot.num_sample)
        .into_par_iter()
        .map(|r| -> Result<Vec<(usize, f64)>, TransportError> {
            let mut rng = replicate_rng(boot, r);
            let drawn = draw_per_class(dataset, boot.ratio, &mut rng);
            let subsample = dataset.subset(&drawn);
            let config = config.with_seed(config.seed.wrapping_add(r as u64));
            let weights = subsample.biased_sampling(&sub_sizes, &config)?;
            trace!("Replicate\t{}\tCost\t{:.3}", r, weights.total_cost);
            let denom = (weights.mass * boot.num_sample) as f64;
            let scores = match weights.mass {
                0 => vec![],
                _ => drawn
                    .iter()
                    .zip(weights.weights.iter())
                    .map(|(&i, &w)| (i, w as f64 / denom))
                    .collect(),
            };
            Ok(scores)
        })
        .collect::<Result<_, TransportError>>()?;
    let mut scores = vec![INITIAL_SCORE; dataset.len()];
    for (i, score) in replicates.into_iter().flatten() {
        scores[i] += score;
    }
    let sum: f64 = scores.iter().sum();
    scores.iter_mut().for_each(|x| *x /= sum);
    debug!("Bootstrap\tReplicates:{}\tRatio:{}", boot.num_sample, boot.ratio);
    Ok(scores)
}

/// Mean transport distance between subsamples of `size` data drawn from each dataset.
/// `size` is clipped by the sizes of the datasets. No replicates gives zero.
pub fn wasserstein_bootstrap(
    dataset1: &DataSet,
    dataset2: &DataSet,
    size: usize,
    config: &NetworkConfig,
    boot: &BootstrapConfig,
) -> Result<f64, TransportError> {
    let size = size.min(dataset1.len()).min(dataset2.len());
    if size == 0 {
        return Err(TransportError::EmptyDataSet);
    }
    let distances: Vec<f64> = (0..boot.num_sample)
        .into_par_iter()
        .map(|r| -> Result<f64, TransportError> {
            let mut rng = replicate_rng(boot, r);
            let idx1 = rand::seq::index::sample(&mut rng, dataset1.len(), size).into_vec();
            let idx2 = rand::seq::index::sample(&mut rng, dataset2.len(), size).into_vec();
            let (sub1, sub2) = (dataset1.subset(&idx1), dataset2.subset(&idx2));
            let config = config.with_seed(config.seed.wrapping_add(r as u64));
            let result = sub1.wasserstein(&sub2, &config)?;
            trace!("Replicate\t{}\tDistance\t{:.3}", r, result.distance);
            Ok(result.distance)
        })
        .collect::<Result<_, TransportError>>()?;
    match distances.len() {
        0 => Ok(0f64),
        len => Ok(distances.iter().sum::<f64>() / len as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use definitions::{Datum, SparseVector};
    use rand::Rng;

    fn on_a_line(labels: &[usize], xs: &[f64]) -> DataSet {
        let data = labels
            .iter()
            .zip(xs.iter())
            .map(|(&label, &x)| Datum::new(label, SparseVector::from_sorted(vec![(0, x)])))
            .collect();
        DataSet::new(data)
    }

    fn random_dataset(n: usize, classes: usize, seed: u64) -> DataSet {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
        let data = (0..n)
            .map(|i| {
                let entries = vec![(1, rng.gen_range(-1f64..1f64)), (2, rng.gen_range(-1f64..1f64))];
                Datum::new(i % classes, SparseVector::from_sorted(entries))
            })
            .collect();
        DataSet::new(data)
    }

    #[test]
    fn draw() {
        let dataset = random_dataset(20, 2, 1);
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(2);
        let drawn = draw_per_class(&dataset, 0.3, &mut rng);
        assert_eq!(drawn.len(), 6);
        assert!(drawn[..3].iter().all(|&i| dataset[i].label == 0));
        assert!(drawn[3..].iter().all(|&i| dataset[i].label == 1));
        let mut dedup = drawn.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), 6);
        // Ratio above one draws everything.
        assert_eq!(draw_per_class(&dataset, 1.5, &mut rng).len(), 20);
    }

    #[test]
    fn rounding() {
        assert_eq!(scaled(0.3, 15), 4);
        assert_eq!(scaled(0.5, 5), 2);
        assert_eq!(scaled(0.5, 7), 4);
        assert_eq!(scaled(0.3, 10), 3);
        assert_eq!(scaled(0.3, 0), 0);
        // 15 data of one class give 4 in a subsample.
        let dataset = random_dataset(15, 1, 12);
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(13);
        assert_eq!(draw_per_class(&dataset, 0.3, &mut rng).len(), 4);
    }

    #[test]
    fn unknown_label() {
        let dataset = on_a_line(&[0, usize::MAX], &[0.0, 1.0]);
        let sizes = ClassSizes::new(vec![1, 1]);
        let boot = BootstrapConfig::new(1.0, 2, 0);
        match biased_sampling_bootstrap(&dataset, &sizes, &NetworkConfig::dense(), &boot) {
            Err(TransportError::MissingClassSize { label }) => assert_eq!(label, usize::MAX),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn full_ratio_is_exact() {
        let dataset = on_a_line(&[0, 0, 0, 1], &[0.0, 1.0, 10.0, 10.5]);
        let sizes = ClassSizes::new(vec![1, 1]);
        let boot = BootstrapConfig::new(1.0, 3, 4);
        let scores = biased_sampling_bootstrap(&dataset, &sizes, &NetworkConfig::dense(), &boot).unwrap();
        let expected = [0.25, 0.25, 0.0, 0.5];
        for (s, e) in scores.iter().zip(expected.iter()) {
            assert!((s - e).abs() < 0.000001, "{:?}", scores);
        }
    }

    #[test]
    fn scores_are_distribution() {
        let dataset = random_dataset(40, 2, 5);
        let sizes = ClassSizes::new(vec![4, 2]);
        let boot = BootstrapConfig::new(0.5, 4, 6);
        let scores = biased_sampling_bootstrap(&dataset, &sizes, &NetworkConfig::dense(), &boot).unwrap();
        assert_eq!(scores.len(), 40);
        assert!(scores.iter().all(|&x| 0.0 < x));
        assert!((scores.iter().sum::<f64>() - 1.0).abs() < 0.000001);
        let class0: f64 = scores.iter().step_by(2).sum();
        assert!((class0 - 2.0 / 3.0).abs() < 0.000001);
        let again = biased_sampling_bootstrap(&dataset, &sizes, &NetworkConfig::dense(), &boot).unwrap();
        assert_eq!(scores, again);
    }

    #[test]
    fn no_replicates() {
        let dataset = random_dataset(4, 1, 7);
        let sizes = ClassSizes::new(vec![1]);
        let boot = BootstrapConfig::new(0.5, 0, 0);
        let scores = biased_sampling_bootstrap(&dataset, &sizes, &NetworkConfig::dense(), &boot).unwrap();
        assert!(scores.iter().all(|&x| (x - 0.25).abs() < 0.000001));
        let d = wasserstein_bootstrap(&dataset, &dataset, 2, &NetworkConfig::dense(), &boot).unwrap();
        assert_eq!(d, 0.0);
    }

    #[test]
    fn wasserstein_full_size() {
        let dataset = random_dataset(6, 1, 8);
        let boot = BootstrapConfig::new(0.3, 3, 9);
        let d = wasserstein_bootstrap(&dataset, &dataset, 100, &NetworkConfig::dense(), &boot).unwrap();
        assert!(d.abs() < 0.000001);
    }

    #[test]
    fn wasserstein_subsample() {
        let dataset1 = random_dataset(10, 1, 10);
        let dataset2 = on_a_line(&[0; 3], &[4.0, 5.0, 6.0]);
        let boot = BootstrapConfig::new(0.3, 4, 11);
        let d = wasserstein_bootstrap(&dataset1, &dataset2, 2, &NetworkConfig::dense(), &boot).unwrap();
        assert!(d > 0.0);
        let again = wasserstein_bootstrap(&dataset1, &dataset2, 2, &NetworkConfig::dense(), &boot).unwrap();
        assert_eq!(d, again);
        let empty = wasserstein_bootstrap(&dataset1, &DataSet::default(), 2, &NetworkConfig::dense(), &boot);
        assert!(matches!(empty, Err(TransportError::EmptyDataSet)));
    }
}
