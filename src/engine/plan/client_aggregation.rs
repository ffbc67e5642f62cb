use chrono::Duration;
use std::collections::HashMap;

use super::cql::{CqlQuery, CqlResult, debug_query_list};
use super::scan::{ScanControl, run_query};
use crate::engine::aggregate::AggregatorImpl;
use crate::engine::errors::QueryPlanError;
use crate::engine::session::Session;
use crate::shared::datetime::{TimeInterval, truncate_nanos};

/// Fulfills a query with raw table scans on the server and all aggregation on
/// the client: more bandwidth, fewer round trips.
///
/// Aggregators are pre-allocated per (bucket, field). When a `limit` is set
/// only the first `limit` buckets get aggregators, and rows landing in any
/// other bucket are dropped.
#[derive(Debug, Clone)]
pub struct QueryPlanWithoutServerAggregation {
    aggregators: HashMap<TimeInterval, HashMap<String, AggregatorImpl>>,
    group_by_duration: Duration,
    fields: Vec<String>,
    time_buckets: Vec<TimeInterval>,
    queries: Vec<CqlQuery>,
}

impl QueryPlanWithoutServerAggregation {
    pub fn new(
        aggregator_label: &str,
        group_by_duration: Duration,
        fields: Vec<String>,
        time_buckets: Vec<TimeInterval>,
        limit: usize,
        queries: Vec<CqlQuery>,
    ) -> Result<Self, QueryPlanError> {
        let mut aggregators = HashMap::with_capacity(time_buckets.len());
        for bucket in &time_buckets {
            if limit > 0 && aggregators.len() == limit {
                break;
            }
            let mut per_field = HashMap::with_capacity(fields.len());
            for field in &fields {
                per_field.insert(field.clone(), AggregatorImpl::from_label(aggregator_label)?);
            }
            aggregators.insert(*bucket, per_field);
        }

        Ok(Self {
            aggregators,
            group_by_duration,
            fields,
            time_buckets,
            queries,
        })
    }

    pub fn queries(&self) -> &[CqlQuery] {
        &self.queries
    }

    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    pub async fn execute(mut self, session: &dyn Session) -> Result<Vec<CqlResult>, QueryPlanError> {
        let window = self.group_by_duration;

        for query in &self.queries {
            let aggregators = &mut self.aggregators;
            run_query(session, query, |row| {
                let (timestamp_ns, value) = row.scan_timestamped()?;
                let bucket = TimeInterval::from_unix_nanos(truncate_nanos(timestamp_ns, window), window);

                // Bucket was cut by the limit.
                let Some(per_field) = aggregators.get_mut(&bucket) else {
                    return Ok(ScanControl::Continue);
                };
                per_field
                    .get_mut(&query.field)
                    .ok_or_else(|| QueryPlanError::UnknownField(query.field.clone()))?
                    .put(value);
                Ok(ScanControl::Continue)
            })
            .await?;
        }

        let mut results = Vec::with_capacity(self.aggregators.len());
        for bucket in &self.time_buckets {
            let Some(per_field) = self.aggregators.get(bucket) else {
                continue;
            };
            let values = self
                .fields
                .iter()
                .map(|f| per_field.get(f).map(AggregatorImpl::get).unwrap_or(f64::NAN))
                .collect();
            results.push(CqlResult {
                time_interval: *bucket,
                values,
            });
        }

        Ok(results)
    }

    pub fn debug_queries(&self, level: u8) {
        debug_query_list(&self.queries, "qpca", level);
    }
}
