//! Zurich income tax estimation and deduction allocation search.
//!
//! [`models`] holds the plain records passed between the layers;
//! [`calculations`] holds the pure computations over them.

pub mod calculations;
pub mod models;

#[cfg(test)]
mod fixtures;

pub use models::*;
