pub mod client_aggregation;
pub mod cql;
pub mod for_every;
pub mod no_aggregation;
pub mod query_plan;
pub mod scan;
pub mod server_aggregation;

#[cfg(test)]
mod query_plan_test;

pub use client_aggregation::QueryPlanWithoutServerAggregation;
pub use cql::{CqlQuery, CqlResult};
pub use for_every::{QueryPlanForEvery, TagValueExtractor};
pub use no_aggregation::{QueryPlanNoAggregation, WherePredicate};
pub use query_plan::{PlanKind, QueryPlan};
pub use scan::{ScanControl, run_query};
pub use server_aggregation::QueryPlanWithServerAggregation;
