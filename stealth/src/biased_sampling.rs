//! Class-balanced resampling weights by min-cost flow.
//!
//! ```text
//! S --[N*size(c)]--> class(c) --[N]--> left(i) --[N*K], d(i,j)--> right(j) --[K]--> T
//! ```
//! `N*K` units go from `S` to `T`, where `K` is the sum of the class sizes.
//! The flow entering `left(i)` is the weight of the i-th datum.
use crate::config::{ArcMode, NetworkConfig};
use crate::distance::sparse_distance;
use crate::error::TransportError;
use crate::network::{checked_mul, dedup_pairs, dense_pairs, feasible_plan, FlowNetwork, FlowResult};
use crate::nn_descent::NeighborGraph;
use definitions::{ClassSizes, DataSet};
use min_flow::{Cost, FlowRate};
use petgraph::graph::{EdgeIndex, NodeIndex};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

#[derive(Debug, Clone)]
pub struct WeightsNetwork {
    pub network: FlowNetwork,
    /// `incoming[i]` is the arc from the class node to the i-th datum.
    pub incoming: Vec<EdgeIndex>,
    /// The sum of the class sizes.
    pub total_size: usize,
}

/// Resampling weights in the dataset order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingWeights {
    pub weights: Vec<FlowRate>,
    pub total_cost: Cost,
    /// The amount of the flow, `N * K`.
    pub mass: FlowRate,
}

impl SamplingWeights {
    /// Weights divided by `N * K`. They sum up to one.
    pub fn normalized(&self) -> Vec<f64> {
        match self.mass {
            0 => vec![0f64; self.weights.len()],
            mass => self
                .weights
                .iter()
                .map(|&w| w as f64 / mass as f64)
                .collect(),
        }
    }
    pub fn total(&self) -> FlowRate {
        self.weights.iter().sum()
    }
}

fn class_size(class_sizes: &ClassSizes, label: usize) -> Result<usize, TransportError> {
    let size = class_sizes
        .get(label)
        .ok_or(TransportError::MissingClassSize { label })?;
    usize::try_from(size).map_err(|_| TransportError::CapacityOverflow)
}

/// Every label in `dataset` has a class size. Checked before anything is indexed by labels.
pub(crate) fn check_labels(dataset: &DataSet, class_sizes: &ClassSizes) -> Result<(), TransportError> {
    match dataset.iter().find(|d| class_sizes.get(d.label).is_none()) {
        Some(d) => Err(TransportError::MissingClassSize { label: d.label }),
        None => Ok(()),
    }
}

/// How much each datum can emit: the budget `N * size(c)` of a class
/// is handed out to its members in the dataset order, at most `N` each.
fn item_supplies(dataset: &DataSet, class_sizes: &ClassSizes) -> Result<Vec<FlowRate>, TransportError> {
    let n = dataset.len();
    let mut remaining = vec![0; dataset.label_counts().len()];
    for (label, rem) in remaining.iter_mut().enumerate() {
        *rem = checked_mul(n, class_size(class_sizes, label).unwrap_or(0))?;
    }
    let supplies = dataset
        .iter()
        .map(|d| {
            let supply = remaining[d.label].min(n);
            remaining[d.label] -= supply;
            supply
        })
        .collect();
    Ok(supplies)
}

fn sparse_pairs(
    dataset: &DataSet,
    class_sizes: &ClassSizes,
    total_size: usize,
    k: usize,
    seed: u64,
) -> Result<Vec<(usize, usize)>, TransportError> {
    let n = dataset.len();
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
    let distance =
        |i: usize, j: usize| sparse_distance(&dataset[i].feature, &dataset[j].feature);
    let graph = NeighborGraph::build(n, k, &distance, &mut rng)?;
    let mut pairs: Vec<_> = (0..n).map(|i| (i, i)).collect();
    for (i, cands) in graph.candidates().iter().enumerate() {
        pairs.extend(cands.indices().map(|j| (i, j)));
    }
    let supplies = item_supplies(dataset, class_sizes)?;
    pairs.extend(feasible_plan(&supplies, &vec![total_size; n]));
    Ok(dedup_pairs(pairs))
}

/// Build the network of the resampling weights.
pub fn build_weights_network(
    dataset: &DataSet,
    class_sizes: &ClassSizes,
    config: &NetworkConfig,
) -> Result<WeightsNetwork, TransportError> {
    if dataset.is_empty() {
        return Err(TransportError::EmptyDataSet);
    }
    check_labels(dataset, class_sizes)?;
    let n = dataset.len();
    let total_size = class_sizes
        .sizes
        .iter()
        .try_fold(0u64, |acc, &size| acc.checked_add(size))
        .and_then(|total| usize::try_from(total).ok())
        .ok_or(TransportError::CapacityOverflow)?;
    let required = checked_mul(n, total_size)?;
    let mut network = FlowNetwork::new(required);
    let source = network.source();
    let sink = network.sink();
    // Class nodes, only for the labels in the dataset.
    let counts = dataset.label_counts();
    let mut class_nodes: Vec<Option<NodeIndex>> = vec![None; counts.len()];
    for (label, _) in counts.iter().enumerate().filter(|&(_, &c)| 0 < c) {
        let capacity = checked_mul(n, class_size(class_sizes, label)?)?;
        let node = network.add_node();
        network.add_arc(source, node, capacity, 0.);
        class_nodes[label] = Some(node);
    }
    let left: Vec<_> = (0..n).map(|_| network.add_node()).collect();
    let mut incoming = Vec::with_capacity(n);
    for (datum, &node) in dataset.iter().zip(left.iter()) {
        let label = datum.label;
        let class_node = class_nodes[label].ok_or(TransportError::MissingClassSize { label })?;
        incoming.push(network.add_arc(class_node, node, n, 0.));
    }
    let right: Vec<_> = (0..n).map(|_| network.add_node()).collect();
    for &node in right.iter() {
        network.add_arc(node, sink, total_size, 0.);
    }
    let pairs = match config.arcs {
        ArcMode::Dense => dense_pairs(n, n),
        ArcMode::Sparse { k } => sparse_pairs(dataset, class_sizes, total_size, k, config.seed)?,
    };
    let distance = |i: usize, j: usize| sparse_distance(&dataset[i].feature, &dataset[j].feature);
    network.add_transport_arcs(&left, &right, &pairs, required, distance);
    debug!(
        "BiasedSampling\tN:{}\tK:{}\tClasses:{}\tArcs:{}",
        n,
        total_size,
        class_sizes.num_classes(),
        network.arc_count()
    );
    Ok(WeightsNetwork {
        network,
        incoming,
        total_size,
    })
}

impl WeightsNetwork {
    /// Read the weights off the solved flow.
    pub fn extract(&self, result: &FlowResult) -> SamplingWeights {
        let weights = self.incoming.iter().map(|&e| result.flow_on(e)).collect();
        SamplingWeights {
            weights,
            total_cost: result.total_cost,
            mass: self.network.required(),
        }
    }
    pub fn solve(&self) -> Result<SamplingWeights, TransportError> {
        let result = self.network.solve()?;
        Ok(self.extract(&result))
    }
}

pub trait BiasedSampling {
    /// Resampling weights which make the class distribution `class_sizes`
    /// with the least transport cost in the feature space.
    fn biased_sampling(
        &self,
        class_sizes: &ClassSizes,
        config: &NetworkConfig,
    ) -> Result<SamplingWeights, TransportError>;
}

impl BiasedSampling for DataSet {
    fn biased_sampling(
        &self,
        class_sizes: &ClassSizes,
        config: &NetworkConfig,
    ) -> Result<SamplingWeights, TransportError> {
        let network = build_weights_network(self, class_sizes, config)?;
        network.solve()
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
                let entries = vec![(0, rng.gen_range(0f64..5f64)), (3, rng.gen_range(0f64..5f64))];
                Datum::new(i % classes, SparseVector::from_sorted(entries))
            })
            .collect();
        DataSet::new(data)
    }

    #[test]
    fn three_points() {
        let dataset = on_a_line(&[0, 0, 1], &[0.0, 1.0, 2.0]);
        let sizes = ClassSizes::new(vec![2, 1]);
        let network = build_weights_network(&dataset, &sizes, &NetworkConfig::dense()).unwrap();
        assert!(network.network.is_well_formed());
        // S, T, 2 classes, 3 left, 3 right.
        assert_eq!(network.network.node_count(), 10);
        assert_eq!(network.network.arc_count(), 2 + 3 + 3 + 9);
        let weights = network.solve().unwrap();
        assert_eq!(weights.total(), 9);
        assert_eq!(weights.weights, vec![3, 3, 3]);
        assert_eq!(weights.mass, 9);
    }

    #[test]
    fn single_class() {
        let n = 6;
        let dataset = random_dataset(n, 1, 10);
        let sizes = ClassSizes::new(vec![n as u64]);
        let weights = dataset.biased_sampling(&sizes, &NetworkConfig::dense()).unwrap();
        assert!(weights.weights.iter().all(|&w| w == n));
        assert_eq!(weights.total(), n * n);
        assert!(weights.total_cost.abs() < 0.000001);
    }

    #[test]
    fn redundant_item() {
        // The only datum of class 1 also covers its neighbor at 10.0.
        let dataset = on_a_line(&[0, 0, 0, 1], &[0.0, 1.0, 10.0, 10.5]);
        let sizes = ClassSizes::new(vec![1, 1]);
        let weights = dataset.biased_sampling(&sizes, &NetworkConfig::dense()).unwrap();
        assert_eq!(weights.weights, vec![2, 2, 0, 4]);
        assert!((weights.total_cost - 0.5).abs() < 0.000001);
        let normalized = weights.normalized();
        assert!((normalized.iter().sum::<f64>() - 1.0).abs() < 0.000001);
        assert!((normalized[3] - 0.5).abs() < 0.000001);
    }

    #[test]
    fn sparse_agrees_on_easy_case() {
        let dataset = on_a_line(&[0, 0, 0, 1], &[0.0, 1.0, 10.0, 10.5]);
        let sizes = ClassSizes::new(vec![1, 1]);
        let config = NetworkConfig::sparse(1, 3);
        let network = build_weights_network(&dataset, &sizes, &config).unwrap();
        assert!(network.network.is_well_formed());
        assert!(network.network.arc_count() < 2 + 4 + 4 + 16);
        let weights = network.solve().unwrap();
        assert_eq!(weights.weights, vec![2, 2, 0, 4]);
    }

    #[test]
    fn sparse_is_feasible_and_no_better() {
        let n = 24;
        let dataset = random_dataset(n, 3, 20);
        let sizes = ClassSizes::new(vec![1, 3, 2]);
        let dense = dataset.biased_sampling(&sizes, &NetworkConfig::dense()).unwrap();
        let sparse = dataset
            .biased_sampling(&sizes, &NetworkConfig::sparse(4, 21))
            .unwrap();
        assert_eq!(dense.total(), n * 6);
        assert_eq!(sparse.total(), n * 6);
        assert!(sparse.total_cost >= dense.total_cost - 0.000001);
    }

    #[test]
    fn class_mass() {
        let n = 12;
        let dataset = random_dataset(n, 2, 30);
        let sizes = ClassSizes::new(vec![3, 1]);
        let weights = dataset.biased_sampling(&sizes, &NetworkConfig::dense()).unwrap();
        let class0: usize = (0..n).filter(|i| i % 2 == 0).map(|i| weights.weights[i]).sum();
        let class1: usize = (0..n).filter(|i| i % 2 == 1).map(|i| weights.weights[i]).sum();
        assert_eq!(class0, n * 3);
        assert_eq!(class1, n);
        assert!(weights.weights.iter().all(|&w| w <= n));
    }

    #[test]
    fn missing_class_size() {
        let dataset = on_a_line(&[0, 2], &[0.0, 1.0]);
        let sizes = ClassSizes::new(vec![1, 1]);
        match build_weights_network(&dataset, &sizes, &NetworkConfig::dense()) {
            Err(TransportError::MissingClassSize { label: 2 }) => {}
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn huge_label() {
        let dataset = on_a_line(&[0, usize::MAX], &[0.0, 1.0]);
        let sizes = ClassSizes::new(vec![1, 1]);
        match build_weights_network(&dataset, &sizes, &NetworkConfig::dense()) {
            Err(TransportError::MissingClassSize { label }) => assert_eq!(label, usize::MAX),
            other => panic!("{:?}", other),
        }
        let sizes = ClassSizes::new(vec![u64::MAX, 1]);
        let dataset = on_a_line(&[0, 1], &[0.0, 1.0]);
        match build_weights_network(&dataset, &sizes, &NetworkConfig::dense()) {
            Err(TransportError::CapacityOverflow) => {}
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn infeasible_class_sizes() {
        // Class 0 has only one datum, which can not carry 2 * 2 units.
        let dataset = on_a_line(&[0, 1], &[0.0, 1.0]);
        let sizes = ClassSizes::new(vec![2, 0]);
        match dataset.biased_sampling(&sizes, &NetworkConfig::dense()) {
            Err(TransportError::Infeasible { required: 4 }) => {}
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn empty() {
        let sizes = ClassSizes::new(vec![1]);
        let result = build_weights_network(&DataSet::default(), &sizes, &NetworkConfig::dense());
        assert!(matches!(result, Err(TransportError::EmptyDataSet)));
    }

    #[test]
    fn supplies() {
        let dataset = on_a_line(&[0, 1, 0, 0], &[0.0, 1.0, 2.0, 3.0]);
        let sizes = ClassSizes::new(vec![2, 1]);
        // class 0 has 4 * 2 = 8 units, class 1 has 4.
        assert_eq!(item_supplies(&dataset, &sizes).unwrap(), vec![4, 4, 4, 0]);
    }
}
