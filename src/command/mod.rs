pub mod executor;
pub mod query;

pub use executor::{AggregationStrategy, DoOptions, HlQueryExecutor, QueryOutcome};
pub use query::HlQuery;
