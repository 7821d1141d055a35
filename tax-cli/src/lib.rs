//! Command-line front end for the Zurich tax estimator.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod profile;
pub mod report;
