pub mod command;
pub mod engine;
pub mod logging;
pub mod runner;
pub mod shared;

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
pub mod test_helpers;
