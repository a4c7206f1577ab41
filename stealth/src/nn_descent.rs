//! Approximate k-nearest-neighbor graph by NN-descent.
//!
//! Each item starts from `k` random neighbors. In every round, the neighbors
//! of a neighbor are offered as candidates, and the closest `k` candidates
//! are kept. A round costs O(N k^2) distance evaluations instead of O(N^2).
use crate::error::TransportError;
use rand::Rng;
use rayon::prelude::*;
use std::collections::HashSet;

/// Maximum number of refinement rounds.
pub const MAX_ROUNDS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

impl Neighbor {
    pub fn new(index: usize, distance: f64) -> Self {
        Self { index, distance }
    }
}

/// Current best neighbors of an item, sorted by distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    neighbors: Vec<Neighbor>,
}

impl CandidateSet {
    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.neighbors.iter().map(|n| n.index)
    }
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
    /// Distance to the farthest neighbor.
    pub fn max_distance(&self) -> Option<f64> {
        self.neighbors.last().map(|n| n.distance)
    }
}

// Candidates offered to one item in a round, in the order of insertion.
// `slot` points to the distance table of the round.
#[derive(Debug, Clone, Default)]
struct Pool {
    members: HashSet<usize>,
    entries: Vec<(usize, usize)>,
}

impl Pool {
    fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }
    fn push(&mut self, index: usize, slot: usize) {
        if self.members.insert(index) {
            self.entries.push((index, slot));
        }
    }
    // Pick the `k` closest candidates. Ties are broken by the insertion order.
    fn select(&self, k: usize, dists: &[f64]) -> CandidateSet {
        let mut scored: Vec<(f64, usize, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(order, &(index, slot))| (dists[slot], order, index))
            .collect();
        let cmp = |a: &(f64, usize, usize), b: &(f64, usize, usize)| {
            a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
        };
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, cmp);
            scored.truncate(k);
        }
        scored.sort_unstable_by(cmp);
        let neighbors = scored
            .into_iter()
            .map(|(distance, _, index)| Neighbor::new(index, distance))
            .collect();
        CandidateSet { neighbors }
    }
}

#[derive(Debug, Clone)]
pub struct NeighborGraph {
    candidates: Vec<CandidateSet>,
    k: usize,
    rounds: usize,
    converged: bool,
}

impl NeighborGraph {
    /// Build the approximate `k`-NN graph of `n` items.
    /// `distance(i, j)` should be symmetric.
    /// The refinement stops when a round changes nothing, or after [MAX_ROUNDS] rounds.
    pub fn build<R, F>(n: usize, k: usize, distance: &F, rng: &mut R) -> Result<Self, TransportError>
    where
        R: Rng,
        F: Fn(usize, usize) -> f64 + Sync,
    {
        let mut graph = Self::random(n, k, distance, rng)?;
        for _ in 0..MAX_ROUNDS {
            let is_updated = graph.refine(distance);
            graph.rounds += 1;
            trace!("NNDescent\tRound\t{}\t{}", graph.rounds, is_updated);
            if !is_updated {
                graph.converged = true;
                break;
            }
        }
        debug!(
            "NNDescent\t{}\t{}\tRounds:{}\tConverged:{}",
            n, k, graph.rounds, graph.converged
        );
        Ok(graph)
    }
    /// `k` distinct random neighbors for each item.
    pub fn random<R, F>(n: usize, k: usize, distance: &F, rng: &mut R) -> Result<Self, TransportError>
    where
        R: Rng,
        F: Fn(usize, usize) -> f64 + Sync,
    {
        if n <= k {
            return Err(TransportError::DegenerateNeighborhood { n, k });
        }
        let picked: Vec<Vec<usize>> = (0..n)
            .map(|i| {
                rand::seq::index::sample(&mut *rng, n - 1, k)
                    .into_iter()
                    .map(|j| if j < i { j } else { j + 1 })
                    .collect()
            })
            .collect();
        let candidates = picked
            .into_par_iter()
            .enumerate()
            .map(|(i, js)| {
                let mut neighbors: Vec<_> = js
                    .into_iter()
                    .map(|j| Neighbor::new(j, distance(i, j)))
                    .collect();
                neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
                CandidateSet { neighbors }
            })
            .collect();
        Ok(Self {
            candidates,
            k,
            rounds: 0,
            converged: false,
        })
    }
    /// One round of the refinement. Return true if some candidate set changed.
    pub fn refine<F>(&mut self, distance: &F) -> bool
    where
        F: Fn(usize, usize) -> f64 + Sync,
    {
        let (n, k) = (self.candidates.len(), self.k);
        if k == 0 {
            return false;
        }
        let mut pools = vec![Pool::default(); n];
        // Distances of the round. NaN means not computed yet.
        let mut pairs: Vec<(usize, usize)> = vec![];
        let mut dists: Vec<f64> = vec![];
        for (i, cands) in self.candidates.iter().enumerate() {
            let neighbors = cands.neighbors();
            for (a, nb) in neighbors.iter().enumerate() {
                let j = nb.index;
                if !pools[i].contains(j) {
                    pairs.push((i, j));
                    dists.push(nb.distance);
                    pools[i].push(j, dists.len() - 1);
                    pools[j].push(i, dists.len() - 1);
                }
                for l in neighbors[..a].iter().map(|nb| nb.index) {
                    if !pools[j].contains(l) {
                        pairs.push((j, l));
                        dists.push(f64::NAN);
                        pools[j].push(l, dists.len() - 1);
                        pools[l].push(j, dists.len() - 1);
                    }
                }
            }
        }
        dists
            .par_iter_mut()
            .zip(pairs.par_iter())
            .filter(|(d, _)| d.is_nan())
            .for_each(|(d, &(j, l))| *d = distance(j, l));
        let refined: Vec<_> = pools.par_iter().map(|pool| pool.select(k, &dists)).collect();
        let is_updated = self
            .candidates
            .iter()
            .zip(refined.iter())
            .any(|(old, new)| {
                old.neighbors.len() != new.neighbors.len()
                    || old
                        .neighbors()
                        .iter()
                        .zip(new.neighbors())
                        .any(|(o, n)| o.distance != n.distance)
            });
        self.candidates = refined;
        is_updated
    }
    pub fn candidates(&self) -> &[CandidateSet] {
        &self.candidates
    }
    pub fn neighbors(&self, i: usize) -> &CandidateSet {
        &self.candidates[i]
    }
    pub fn len(&self) -> usize {
        self.candidates.len()
    }
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
    pub fn k(&self) -> usize {
        self.k
    }
    /// Number of refinement rounds performed.
    pub fn rounds(&self) -> usize {
        self.rounds
    }
    /// True if the last round changed nothing.
    pub fn converged(&self) -> bool {
        self.converged
    }
}
