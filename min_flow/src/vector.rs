//!
//! `EdgeVec` -- a fixed size table indexed by `EdgeIndex`.
//!
pub use petgraph::graph::EdgeIndex;
use std::ops::{Index, IndexMut};

/// Fixed size vector whose index is an edge of a graph.
///
/// The i-th element is the value assigned to `EdgeIndex::new(i)`.
#[derive(PartialEq, Debug, Clone)]
pub struct EdgeVec<T>(Vec<T>);

impl<T: Copy> EdgeVec<T> {
    /// Create a vector of `size` filled with `default_value`.
    pub fn new(size: usize, default_value: T) -> EdgeVec<T> {
        EdgeVec(vec![default_value; size])
    }
    /// Create a vector of `size` filled with `default_value`,
    /// then set the values of `elements`.
    pub fn from_vec(size: usize, default_value: T, elements: &[(EdgeIndex, T)]) -> EdgeVec<T> {
        let mut v = EdgeVec::new(size, default_value);
        for &(e, x) in elements {
            v[e] = x;
        }
        v
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Iterate over (EdgeIndex, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeIndex, T)> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(i, &x)| (EdgeIndex::new(i), x))
    }
    /// Drop the elements after the first `size` edges.
    pub fn truncate(&mut self, size: usize) {
        self.0.truncate(size);
    }
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<T> Index<EdgeIndex> for EdgeVec<T> {
    type Output = T;
    #[inline]
    fn index(&self, e: EdgeIndex) -> &Self::Output {
        &self.0[e.index()]
    }
}

impl<T> IndexMut<EdgeIndex> for EdgeVec<T> {
    #[inline]
    fn index_mut(&mut self, e: EdgeIndex) -> &mut Self::Output {
        &mut self.0[e.index()]
    }
}
