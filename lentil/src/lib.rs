//! Regulator activity inference from a sample x feature measurement
//! matrix and a weighted regulator -> feature network.
//!
//! Two estimators share the same preprocessing (filter the network by
//! the number of targets, pivot it into a feature x regulator matrix,
//! align the rows to the measured features):
//!
//! * [`wsum`]: weighted sum with a feature-permutation null
//! * [`mdt`]: impurity importances of a regression forest, per sample
//!

pub mod align;
pub mod common;
pub mod error;
pub mod forest;
pub mod input;
pub mod mdt;
pub mod net_matrix;
pub mod network;
pub mod pipeline;
pub mod simulate;
pub mod sink;
pub mod wsum;
