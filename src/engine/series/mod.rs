pub mod series;

#[cfg(test)]
mod series_test;

pub use series::{BUCKET_DURATION_HOURS, BUCKET_TIME_LAYOUT, Series};
