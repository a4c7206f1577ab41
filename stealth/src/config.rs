//! Parameters of the network construction and the bootstrap estimators.
use serde::{Deserialize, Serialize};

/// Which left-to-right arcs are put into a transport network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcMode {
    /// All the N x M pairs.
    Dense,
    /// Pairs in the approximate `k`-nearest-neighbor graph,
    /// together with the arcs of one feasible transport plan.
    Sparse { k: usize },
}

impl std::default::Default for ArcMode {
    fn default() -> Self {
        ArcMode::Dense
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub arcs: ArcMode,
    /// Seed of the neighbor graph initialization.
    pub seed: u64,
}

impl NetworkConfig {
    pub fn new(arcs: ArcMode, seed: u64) -> Self {
        Self { arcs, seed }
    }
    pub fn dense() -> Self {
        Self::new(ArcMode::Dense, 0)
    }
    pub fn sparse(k: usize, seed: u64) -> Self {
        Self::new(ArcMode::Sparse { k }, seed)
    }
    /// The same configuration with another seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self { seed, ..*self }
    }
}

impl std::default::Default for NetworkConfig {
    fn default() -> Self {
        Self::dense()
    }
}

const RATIO: f64 = 0.3;
const NUM_SAMPLE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Fraction of each class drawn in a replicate.
    pub ratio: f64,
    /// Number of replicates.
    pub num_sample: usize,
    pub seed: u64,
}

impl BootstrapConfig {
    pub fn new(ratio: f64, num_sample: usize, seed: u64) -> Self {
        Self {
            ratio,
            num_sample,
            seed,
        }
    }
}

impl std::default::Default for BootstrapConfig {
    fn default() -> Self {
        Self::new(RATIO, NUM_SAMPLE, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn defaults() {
        assert_eq!(NetworkConfig::default().arcs, ArcMode::Dense);
        let config = NetworkConfig::sparse(5, 10).with_seed(3);
        assert_eq!(config.arcs, ArcMode::Sparse { k: 5 });
        assert_eq!(config.seed, 3);
        assert_eq!(BootstrapConfig::default().num_sample, NUM_SAMPLE);
    }
}
