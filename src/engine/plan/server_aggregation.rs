use std::collections::BTreeMap;
use tracing::info;

use super::cql::{CqlQuery, CqlResult};
use super::scan::{ScanControl, run_query};
use crate::engine::aggregate::AggregatorImpl;
use crate::engine::errors::QueryPlanError;
use crate::engine::session::Session;
use crate::shared::datetime::TimeInterval;

/// Fulfills a query by aggregating on both server and client: each wire
/// query asks the server for one pre-aggregated scalar over one series and
/// bucket, and the client merges those scalars per bucket. More round trips,
/// but the server does the heavy lifting over large ranges.
#[derive(Debug, Clone)]
pub struct QueryPlanWithServerAggregation {
    aggregator_label: String,
    bucketed_queries: BTreeMap<TimeInterval, Vec<CqlQuery>>,
}

impl QueryPlanWithServerAggregation {
    pub fn new(
        aggregator_label: &str,
        bucketed_queries: BTreeMap<TimeInterval, Vec<CqlQuery>>,
    ) -> Result<Self, QueryPlanError> {
        AggregatorImpl::from_label(aggregator_label)?;
        Ok(Self {
            aggregator_label: aggregator_label.to_string(),
            bucketed_queries,
        })
    }

    pub fn bucketed_queries(&self) -> &BTreeMap<TimeInterval, Vec<CqlQuery>> {
        &self.bucketed_queries
    }

    pub fn query_count(&self) -> usize {
        self.bucketed_queries.values().map(Vec::len).sum()
    }

    /// Buckets run in ascending order, queries within a bucket in
    /// construction order, one at a time.
    pub async fn execute(self, session: &dyn Session) -> Result<Vec<CqlResult>, QueryPlanError> {
        let mut results = Vec::with_capacity(self.bucketed_queries.len());

        for (bucket, queries) in &self.bucketed_queries {
            let mut agg = AggregatorImpl::from_label(&self.aggregator_label)?;

            for query in queries {
                run_query(session, query, |row| {
                    agg.put(row.scan_value()?);
                    Ok(ScanControl::Continue)
                })
                .await?;
            }

            results.push(CqlResult {
                time_interval: *bucket,
                values: vec![agg.get()],
            });
        }

        Ok(results)
    }

    pub fn debug_queries(&self, level: u8) {
        if level >= 1 {
            info!(
                target: "cqlbench::plan",
                "[qpsa] query with server aggregation plan has {} CQLQuery objects",
                self.query_count()
            );
        }
        if level >= 2 {
            for (bucket, queries) in &self.bucketed_queries {
                for (i, q) in queries.iter().enumerate() {
                    info!(target: "cqlbench::plan", "[qpsa] CQL: {}, {}, {}", bucket, i, q);
                }
            }
        }
    }
}
