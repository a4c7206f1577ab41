//! Definitions -- A tiny interface for dataset-level transport problems.
//! Every crate in this workspace passes labeled sparse feature vectors around as one structure named [DataSet](DataSet).
//! The class-size targets used by the resampling mode live in [ClassSizes](ClassSizes).

use serde::{Deserialize, Serialize};

/// Label of a datum. It must be a non-negative integer.
pub type Label = usize;

/// A sparse feature vector. Only the non-zero entries are kept,
/// and they are sorted by their index without duplication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SparseVector {
    entries: Vec<(u64, f64)>,
}

impl SparseVector {
    /// Create a sparse vector from (index, value) pairs.
    /// The entries are sorted by their index.
    /// Return `None` if the same index appears twice.
    pub fn new(mut entries: Vec<(u64, f64)>) -> Option<Self> {
        entries.sort_by_key(|&(idx, _)| idx);
        match entries.windows(2).any(|w| w[0].0 == w[1].0) {
            true => None,
            false => Some(Self { entries }),
        }
    }
    /// Create a sparse vector from a slice that is already sorted by index
    /// and contains no duplicated index. The caller must guarantee it.
    pub fn from_sorted(entries: Vec<(u64, f64)>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        Self { entries }
    }
    /// Dense-like constructor: the i-th value is stored at index i.
    pub fn from_dense(values: &[f64]) -> Self {
        let entries = values
            .iter()
            .enumerate()
            .map(|(i, &x)| (i as u64, x))
            .collect();
        Self { entries }
    }
    pub fn entries(&self) -> &[(u64, f64)] {
        &self.entries
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Display for SparseVector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let entries: Vec<_> = self
            .entries
            .iter()
            .map(|(idx, x)| format!("{}:{}", idx, x))
            .collect();
        write!(f, "{}", entries.join(" "))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Datum {
    pub label: Label,
    pub feature: SparseVector,
}

impl Datum {
    pub fn new(label: Label, feature: SparseVector) -> Self {
        Self { label, feature }
    }
}

impl std::fmt::Display for Datum {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {}", self.label, self.feature)
    }
}

/// An ordered collection of data. The position of a datum is its identity
/// in every graph built from this dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DataSet {
    pub data: Vec<Datum>,
}

impl DataSet {
    pub fn new(data: Vec<Datum>) -> Self {
        Self { data }
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Datum> {
        self.data.iter()
    }
    /// Return the sub-dataset consisting of `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> Self {
        let data = indices.iter().map(|&i| self.data[i].clone()).collect();
        Self { data }
    }
    /// The number of data having each label. The returned vector
    /// is long enough to be indexed by the largest label.
    pub fn label_counts(&self) -> Vec<usize> {
        let len = self.data.iter().map(|d| d.label + 1).max().unwrap_or(0);
        let mut counts = vec![0; len];
        for d in self.data.iter() {
            counts[d.label] += 1;
        }
        counts
    }
}

impl std::ops::Index<usize> for DataSet {
    type Output = Datum;
    fn index(&self, idx: usize) -> &Self::Output {
        &self.data[idx]
    }
}

/// Target relative size of each class. `sizes[c]` is the size of label `c`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ClassSizes {
    pub sizes: Vec<u64>,
}

impl ClassSizes {
    pub fn new(sizes: Vec<u64>) -> Self {
        Self { sizes }
    }
    pub fn get(&self, label: Label) -> Option<u64> {
        self.sizes.get(label).copied()
    }
    /// The sum of all the class sizes. It is the `K` of the resampling network.
    pub fn total(&self) -> u64 {
        self.sizes.iter().sum()
    }
    pub fn num_classes(&self) -> usize {
        self.sizes.len()
    }
}
