use std::collections::{BTreeMap, HashMap};
use tracing::warn;

use super::cql::{CqlQuery, CqlResult, debug_query_list};
use super::scan::{ScanControl, run_query};
use crate::engine::errors::QueryPlanError;
use crate::engine::session::Session;
use crate::shared::datetime::TimeInterval;

/// Comparison of one field against a constant, e.g. `usage_user,>,90`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WherePredicate {
    Gt(f64),
    Lt(f64),
    Ge(f64),
    Le(f64),
}

impl WherePredicate {
    /// Panics on an unparsable threshold or unsupported operator: the query
    /// generator never emits either.
    pub fn parse(op: &str, threshold: &str) -> Self {
        let Ok(p) = threshold.trim().parse::<f64>() else {
            panic!("unknown predicate in where clause: {}", threshold);
        };
        match op.trim() {
            ">" => WherePredicate::Gt(p),
            "<" => WherePredicate::Lt(p),
            ">=" => WherePredicate::Ge(p),
            "<=" => WherePredicate::Le(p),
            other => panic!("unsupported operator in where clause: {}", other),
        }
    }

    pub fn matches(&self, x: f64) -> bool {
        match *self {
            WherePredicate::Gt(p) => x > p,
            WherePredicate::Lt(p) => x < p,
            WherePredicate::Ge(p) => x >= p,
            WherePredicate::Le(p) => x <= p,
        }
    }
}

/// Rows keyed by timestamp, then by series key (the series id with its field
/// removed, shared by every field of one row).
type RowMap = BTreeMap<i64, BTreeMap<String, Vec<f64>>>;

/// Fulfills a query with no aggregation by scanning each field on the server
/// and stitching columns into rows on the client.
#[derive(Debug, Clone)]
pub struct QueryPlanNoAggregation {
    fields: Vec<String>,
    where_clause: String,
    queries: Vec<CqlQuery>,
}

impl QueryPlanNoAggregation {
    pub fn new(fields: Vec<String>, where_clause: &str, queries: Vec<CqlQuery>) -> Self {
        Self {
            fields,
            where_clause: where_clause.to_string(),
            queries,
        }
    }

    pub fn queries(&self) -> &[CqlQuery] {
        &self.queries
    }

    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    /// With a `field,op,threshold` where clause, runs the where-field queries
    /// first to pick the accepted (timestamp, series) rows, then fills the
    /// other fields into those rows only. Any other where clause shape is not
    /// understood and rows pass through unfiltered.
    pub async fn execute(self, session: &dyn Session) -> Result<Vec<CqlResult>, QueryPlanError> {
        let field_pos: HashMap<&str, usize> = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.as_str(), i))
            .collect();
        let width = self.fields.len();
        let mut rows = RowMap::new();

        let parts: Vec<&str> = self.where_clause.split(',').collect();
        if let [where_field, op, threshold] = parts.as_slice() {
            let predicate = WherePredicate::parse(op, threshold);

            for query in self.queries.iter().filter(|q| q.field == *where_field) {
                let pos = position(&field_pos, &query.field)?;
                let key = series_key(query)?;
                run_query(session, query, |row| {
                    let (timestamp_ns, value) = row.scan_timestamped()?;
                    if predicate.matches(value) {
                        rows.entry(timestamp_ns)
                            .or_default()
                            .entry(key.clone())
                            .or_insert_with(|| vec![0.0; width])[pos] = value;
                    }
                    Ok(ScanControl::Continue)
                })
                .await?;
            }

            for query in self.queries.iter().filter(|q| q.field != *where_field) {
                let pos = position(&field_pos, &query.field)?;
                let key = series_key(query)?;
                run_query(session, query, |row| {
                    let (timestamp_ns, value) = row.scan_timestamped()?;
                    if let Some(slot) = rows.get_mut(&timestamp_ns).and_then(|m| m.get_mut(&key)) {
                        slot[pos] = value;
                    }
                    Ok(ScanControl::Continue)
                })
                .await?;
            }
        } else {
            if !self.where_clause.is_empty() {
                warn!(
                    target: "cqlbench::plan",
                    where_clause = %self.where_clause,
                    "Where clause not understood, rows are not filtered"
                );
            }
            for query in &self.queries {
                let pos = position(&field_pos, &query.field)?;
                let key = series_key(query)?;
                run_query(session, query, |row| {
                    let (timestamp_ns, value) = row.scan_timestamped()?;
                    rows.entry(timestamp_ns)
                        .or_default()
                        .entry(key.clone())
                        .or_insert_with(|| vec![0.0; width])[pos] = value;
                    Ok(ScanControl::Continue)
                })
                .await?;
            }
        }

        let mut results = Vec::new();
        for (timestamp_ns, by_series) in rows {
            for (_, values) in by_series {
                results.push(CqlResult {
                    time_interval: TimeInterval::instant(timestamp_ns),
                    values,
                });
            }
        }
        Ok(results)
    }

    pub fn debug_queries(&self, level: u8) {
        debug_query_list(&self.queries, "qpna", level);
    }
}

fn position(field_pos: &HashMap<&str, usize>, field: &str) -> Result<usize, QueryPlanError> {
    field_pos
        .get(field)
        .copied()
        .ok_or_else(|| QueryPlanError::UnknownField(field.to_string()))
}

/// Series id with the `#field#` section blanked, so the queries for every
/// field of one wide-row family share a key.
fn series_key(query: &CqlQuery) -> Result<String, QueryPlanError> {
    let id = query.series_id().ok_or(QueryPlanError::MissingSeriesKey)?;
    Ok(id.replacen(&format!("#{}#", query.field), "##", 1))
}
