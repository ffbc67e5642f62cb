pub mod errors;
pub mod runner;
pub mod stats;
pub mod worker;

#[cfg(test)]
mod stats_test;

pub use errors::RunnerError;
pub use runner::{RunnerOptions, run_benchmark};
pub use stats::{Stat, StatGroup, StatMessage, StatProcessor};
pub use worker::StatLabels;
