//! Squared Euclidean distance between sparse vectors.
use definitions::SparseVector;

/// Squared Euclidean distance between two index-sorted sparse vectors.
/// A missing index is regarded as zero.
#[inline]
pub fn distance(xs: &[(u64, f64)], ys: &[(u64, f64)]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut score = 0f64;
    while i < xs.len() && j < ys.len() {
        let ((xi, xv), (yj, yv)) = (xs[i], ys[j]);
        if xi < yj {
            score += xv * xv;
            i += 1;
        } else if yj < xi {
            score += yv * yv;
            j += 1;
        } else {
            score += (xv - yv) * (xv - yv);
            i += 1;
            j += 1;
        }
    }
    score += xs[i..].iter().map(|&(_, x)| x * x).sum::<f64>();
    score += ys[j..].iter().map(|&(_, y)| y * y).sum::<f64>();
    score
}

pub fn sparse_distance(x: &SparseVector, y: &SparseVector) -> f64 {
    distance(x.entries(), y.entries())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    use std::collections::BTreeMap;

    fn gen_sparse<R: Rng>(rng: &mut R, dim: u64, density: f64) -> Vec<(u64, f64)> {
        let mut entries = vec![];
        for idx in 0..dim {
            if rng.gen_bool(density) {
                entries.push((idx, rng.gen_range(-5f64..5f64)));
            }
        }
        entries
    }

    fn naive(xs: &[(u64, f64)], ys: &[(u64, f64)]) -> f64 {
        let mut dense: BTreeMap<u64, (f64, f64)> = BTreeMap::new();
        for &(idx, x) in xs {
            dense.entry(idx).or_default().0 = x;
        }
        for &(idx, y) in ys {
            dense.entry(idx).or_default().1 = y;
        }
        dense.values().map(|(x, y)| (x - y).powi(2)).sum()
    }

    #[test]
    fn simple() {
        let xs = vec![(0, 1.0), (2, 3.0)];
        let ys = vec![(1, 2.0), (2, 1.0)];
        // 1 + 4 + 4
        assert!((distance(&xs, &ys) - 9.0).abs() < 0.000001);
        assert_eq!(distance(&[], &[]), 0.0);
        assert!((distance(&xs, &[]) - 10.0).abs() < 0.000001);
    }

    #[test]
    fn identity() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(4280);
        for _ in 0..100 {
            let xs = gen_sparse(&mut rng, 30, 0.4);
            assert_eq!(distance(&xs, &xs), 0.0);
        }
    }

    #[test]
    fn symmetry() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(4281);
        for _ in 0..100 {
            let xs = gen_sparse(&mut rng, 30, 0.4);
            let ys = gen_sparse(&mut rng, 30, 0.4);
            assert_eq!(distance(&xs, &ys), distance(&ys, &xs));
        }
    }

    #[test]
    fn agree_with_dense() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(4282);
        for density in [0.05, 0.3, 0.7, 1.0] {
            for _ in 0..50 {
                let xs = gen_sparse(&mut rng, 40, density);
                let ys = gen_sparse(&mut rng, 40, density);
                let (merged, dense) = (distance(&xs, &ys), naive(&xs, &ys));
                assert!((merged - dense).abs() < 0.000001, "{}\t{}", merged, dense);
            }
        }
    }

    #[test]
    fn disjoint_support() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(4283);
        for _ in 0..50 {
            let xs: Vec<_> = gen_sparse(&mut rng, 40, 0.5)
                .into_iter()
                .map(|(i, x)| (2 * i, x))
                .collect();
            let ys: Vec<_> = gen_sparse(&mut rng, 40, 0.5)
                .into_iter()
                .map(|(i, y)| (2 * i + 1, y))
                .collect();
            let norms: f64 = xs.iter().chain(ys.iter()).map(|(_, x)| x * x).sum();
            assert!((distance(&xs, &ys) - norms).abs() < 0.000001);
            assert!((distance(&xs, &ys) - naive(&xs, &ys)).abs() < 0.000001);
        }
    }

    #[test]
    fn shared_support() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(4284);
        let xs = gen_sparse(&mut rng, 40, 0.5);
        let ys: Vec<_> = xs.iter().map(|&(i, x)| (i, x + 1.0)).collect();
        assert!((distance(&xs, &ys) - xs.len() as f64).abs() < 0.000001);
    }

    #[test]
    fn sparse_vector() {
        let x = SparseVector::new(vec![(5, 2.0), (1, 1.0)]).unwrap();
        let y = SparseVector::from_dense(&[0.0, 1.0, 0.0]);
        assert!((sparse_distance(&x, &y) - 4.0).abs() < 0.000001);
    }
}
