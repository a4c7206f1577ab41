//! Transport distance between two empirical distributions by min-cost flow.
//!
//! ```text
//! S --[N2]--> left(i) --[N1*N2], d(i,j)--> right(j) --[N1]--> T
//! ```
//! `N1*N2` units go from `S` to `T`. The distance is the total cost divided by `N1*N2`.
use crate::config::{ArcMode, NetworkConfig};
use crate::distance::sparse_distance;
use crate::error::TransportError;
use crate::network::{checked_mul, dedup_pairs, dense_pairs, feasible_plan, FlowNetwork, FlowResult};
use crate::nn_descent::NeighborGraph;
use definitions::DataSet;
use min_flow::{Cost, FlowRate};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct DistanceNetwork {
    pub network: FlowNetwork,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportDistance {
    /// `total_cost / mass`.
    pub distance: f64,
    pub total_cost: Cost,
    /// The amount of the flow, `N1 * N2`.
    pub mass: FlowRate,
}

// Neighbors are searched in the concatenation of the two datasets,
// and only the pairs across them are kept.
fn sparse_pairs(
    dataset1: &DataSet,
    dataset2: &DataSet,
    k: usize,
    seed: u64,
) -> Result<Vec<(usize, usize)>, TransportError> {
    let (n1, n2) = (dataset1.len(), dataset2.len());
    let feature = |i: usize| match i < n1 {
        true => &dataset1[i].feature,
        false => &dataset2[i - n1].feature,
    };
    let distance = |i: usize, j: usize| sparse_distance(feature(i), feature(j));
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
    let graph = NeighborGraph::build(n1 + n2, k, &distance, &mut rng)?;
    let mut pairs = vec![];
    for (i, cands) in graph.candidates().iter().enumerate() {
        for j in cands.indices() {
            match (i < n1, j < n1) {
                (true, false) => pairs.push((i, j - n1)),
                (false, true) => pairs.push((j, i - n1)),
                _ => {}
            }
        }
    }
    pairs.extend(feasible_plan(&vec![n2; n1], &vec![n1; n2]));
    Ok(dedup_pairs(pairs))
}

/// Build the network of the transport distance from `dataset1` to `dataset2`.
pub fn build_distance_network(
    dataset1: &DataSet,
    dataset2: &DataSet,
    config: &NetworkConfig,
) -> Result<DistanceNetwork, TransportError> {
    if dataset1.is_empty() || dataset2.is_empty() {
        return Err(TransportError::EmptyDataSet);
    }
    let (n1, n2) = (dataset1.len(), dataset2.len());
    let required = checked_mul(n1, n2)?;
    let mut network = FlowNetwork::new(required);
    let source = network.source();
    let sink = network.sink();
    let left: Vec<_> = (0..n1).map(|_| network.add_node()).collect();
    for &node in left.iter() {
        network.add_arc(source, node, n2, 0.);
    }
    let right: Vec<_> = (0..n2).map(|_| network.add_node()).collect();
    for &node in right.iter() {
        network.add_arc(node, sink, n1, 0.);
    }
    let pairs = match config.arcs {
        ArcMode::Dense => dense_pairs(n1, n2),
        ArcMode::Sparse { k } => sparse_pairs(dataset1, dataset2, k, config.seed)?,
    };
    let distance = |i: usize, j: usize| sparse_distance(&dataset1[i].feature, &dataset2[j].feature);
    network.add_transport_arcs(&left, &right, &pairs, required, distance);
    debug!(
        "Wasserstein\tN1:{}\tN2:{}\tArcs:{}",
        n1,
        n2,
        network.arc_count()
    );
    Ok(DistanceNetwork { network })
}

impl DistanceNetwork {
    pub fn extract(&self, result: &FlowResult) -> TransportDistance {
        let mass = self.network.required();
        TransportDistance {
            distance: result.total_cost / mass as f64,
            total_cost: result.total_cost,
            mass,
        }
    }
    pub fn solve(&self) -> Result<TransportDistance, TransportError> {
        let result = self.network.solve()?;
        Ok(self.extract(&result))
    }
}

pub trait Wasserstein {
    /// Transport distance between the uniform distributions on `self` and `other`,
    /// under the squared Euclidean ground cost.
    fn wasserstein(
        &self,
        other: &DataSet,
        config: &NetworkConfig,
    ) -> Result<TransportDistance, TransportError>;
}

impl Wasserstein for DataSet {
    fn wasserstein(
        &self,
        other: &DataSet,
        config: &NetworkConfig,
    ) -> Result<TransportDistance, TransportError> {
        build_distance_network(self, other, config)?.solve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use definitions::{Datum, SparseVector};
    use rand::Rng;

    fn on_a_line(xs: &[f64]) -> DataSet {
        let data = xs
            .iter()
            .map(|&x| Datum::new(0, SparseVector::from_sorted(vec![(0, x)])))
            .collect();
        DataSet::new(data)
    }

    fn random_dataset(n: usize, offset: f64, seed: u64) -> DataSet {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
        let data = (0..n)
            .map(|_| {
                let mut entries = vec![];
                for idx in 0..3u64 {
                    if rng.gen_bool(0.8) {
                        entries.push((idx, offset + rng.gen_range(0f64..2f64)));
                    }
                }
                Datum::new(0, SparseVector::from_sorted(entries))
            })
            .collect();
        DataSet::new(data)
    }

    #[test]
    fn identical() {
        let dataset = random_dataset(8, 0.0, 1);
        let result = dataset.wasserstein(&dataset, &NetworkConfig::dense()).unwrap();
        assert!(result.distance.abs() < 0.000001);
        assert_eq!(result.mass, 64);
        let result = dataset
            .wasserstein(&dataset, &NetworkConfig::sparse(3, 2))
            .unwrap();
        assert!(result.distance.abs() < 0.000001);
    }

    #[test]
    fn single_points() {
        let a = DataSet::new(vec![Datum::new(
            0,
            SparseVector::new(vec![(0, 1.0), (4, 2.0)]).unwrap(),
        )]);
        let b = DataSet::new(vec![Datum::new(
            0,
            SparseVector::new(vec![(4, -1.0), (7, 0.5)]).unwrap(),
        )]);
        let expected = sparse_distance(&a[0].feature, &b[0].feature);
        let result = a.wasserstein(&b, &NetworkConfig::dense()).unwrap();
        assert_eq!(result.distance, expected);
        assert_eq!(result.mass, 1);
    }

    #[test]
    fn shifted_line() {
        // Monotone matching on a line: every point moves by 1.
        let a = on_a_line(&[0.0, 1.0, 2.0]);
        let b = on_a_line(&[3.0, 2.0, 1.0]);
        let result = a.wasserstein(&b, &NetworkConfig::dense()).unwrap();
        assert!((result.distance - 1.0).abs() < 0.000001);
    }

    #[test]
    fn different_sizes() {
        // Half of the mass of each point of `a` goes to each point of `b`.
        let a = on_a_line(&[0.0]);
        let b = on_a_line(&[1.0, -1.0]);
        let network = build_distance_network(&a, &b, &NetworkConfig::dense()).unwrap();
        assert!(network.network.is_well_formed());
        assert_eq!(network.network.required(), 2);
        let result = network.solve().unwrap();
        assert!((result.distance - 1.0).abs() < 0.000001);
    }

    #[test]
    fn symmetric() {
        let a = random_dataset(6, 0.0, 3);
        let b = random_dataset(4, 1.0, 4);
        let ab = a.wasserstein(&b, &NetworkConfig::dense()).unwrap();
        let ba = b.wasserstein(&a, &NetworkConfig::dense()).unwrap();
        assert!((ab.distance - ba.distance).abs() < 0.000001);
        assert!(ab.distance > 0.0);
    }

    #[test]
    fn sparse_is_feasible_and_no_better() {
        let a = random_dataset(10, 0.0, 5);
        let b = random_dataset(7, 0.5, 6);
        let dense = a.wasserstein(&b, &NetworkConfig::dense()).unwrap();
        let network = build_distance_network(&a, &b, &NetworkConfig::sparse(3, 7)).unwrap();
        assert!(network.network.is_well_formed());
        assert!(network.network.arc_count() < 10 + 7 + 70);
        let sparse = network.solve().unwrap();
        assert!(sparse.distance >= dense.distance - 0.000001);
    }

    #[test]
    fn empty() {
        let a = on_a_line(&[0.0]);
        let result = a.wasserstein(&DataSet::default(), &NetworkConfig::dense());
        assert!(matches!(result, Err(TransportError::EmptyDataSet)));
    }

    #[test]
    fn degenerate_neighborhood() {
        let a = on_a_line(&[0.0]);
        let b = on_a_line(&[1.0]);
        let result = a.wasserstein(&b, &NetworkConfig::sparse(2, 0));
        assert!(matches!(
            result,
            Err(TransportError::DegenerateNeighborhood { n: 2, k: 2 })
        ));
    }
}
