pub mod executor;


pub use executor::{AggregationStrategy, DoOptions, HlQueryExecutor, QueryOutcome, render_results};
