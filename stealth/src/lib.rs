//! Dataset-level optimal transport as min-cost flow.
//!
//! Two problems are formulated on bipartite flow networks:
//! - [biased_sampling]: class-balanced resampling weights of a labeled dataset.
//! - [wasserstein]: transport distance between two empirical distributions.
//!
//! The left-to-right arcs are either complete or restricted to an approximate
//! k-nearest-neighbor graph built by [nn_descent].
pub mod biased_sampling;
pub mod bootstrap;
pub mod config;
pub mod distance;
pub mod entry;
pub mod error;
pub mod network;
pub mod nn_descent;
pub mod wasserstein;
#[macro_use]
extern crate log;
pub use config::{ArcMode, BootstrapConfig, NetworkConfig};
pub use error::TransportError;
