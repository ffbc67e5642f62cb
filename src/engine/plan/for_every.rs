use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashMap;
use tracing::trace;

use super::cql::{CqlQuery, CqlResult, debug_query_list};
use super::scan::{ScanControl, run_query};
use crate::engine::errors::QueryPlanError;
use crate::engine::session::Session;
use crate::shared::datetime::TimeInterval;

/// Recovers the grouping tag's value from a wire query. The value is read
/// from the series id bound as the first argument, matching `tag=(.+?),`.
#[derive(Debug, Clone)]
pub struct TagValueExtractor {
    tag: String,
    pattern: Regex,
}

impl TagValueExtractor {
    pub fn new(tag: &str) -> Result<Self, QueryPlanError> {
        let pattern = Regex::new(&format!("{}=(.+?),", regex::escape(tag)))?;
        Ok(Self {
            tag: tag.to_string(),
            pattern,
        })
    }

    pub fn extract(&self, query: &CqlQuery) -> Result<String, QueryPlanError> {
        let arg = query.series_id().ok_or(QueryPlanError::MissingSeriesKey)?;
        self.pattern
            .captures(arg)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| QueryPlanError::MissingTagValue {
                tag: self.tag.clone(),
                arg: arg.to_string(),
            })
    }
}

/// Fulfills "last row for every value of a tag" (e.g. the latest reading
/// per host) by scanning fields in descending time order and stitching the
/// newest row per tag value on the client.
///
/// Queries for one tag value must arrive newest first. The first row seen
/// for a tag value pins its timestamp; once every field has a value at that
/// timestamp, further queries for the tag value are skipped without being
/// issued. Only the last single row per tag value is collected.
#[derive(Debug, Clone)]
pub struct QueryPlanForEvery {
    fields: Vec<String>,
    for_every_tag: String,
    for_every_num: usize,
    queries: Vec<CqlQuery>,
}

impl QueryPlanForEvery {
    pub fn new(fields: Vec<String>, for_every_tag: &str, for_every_num: usize, queries: Vec<CqlQuery>) -> Self {
        Self {
            fields,
            for_every_tag: for_every_tag.to_string(),
            for_every_num,
            queries,
        }
    }

    pub fn queries(&self) -> &[CqlQuery] {
        &self.queries
    }

    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    pub fn for_every_num(&self) -> usize {
        self.for_every_num
    }

    pub async fn execute(self, session: &dyn Session) -> Result<Vec<CqlResult>, QueryPlanError> {
        let extractor = TagValueExtractor::new(&self.for_every_tag)?;
        let field_pos: HashMap<&str, usize> = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.as_str(), i))
            .collect();
        let width = self.fields.len();

        let mut rows: IndexMap<String, LastRow> = IndexMap::new();

        for query in &self.queries {
            let key = extractor.extract(query)?;
            let last = rows.entry(key.clone()).or_insert_with(|| LastRow::new(width));
            if last.is_complete() {
                trace!(target: "cqlbench::plan", tag_value = %key, "Row complete, skipping query");
                continue;
            }

            let pos = *field_pos
                .get(query.field.as_str())
                .ok_or_else(|| QueryPlanError::UnknownField(query.field.clone()))?;

            run_query(session, query, |row| {
                let (timestamp_ns, value) = row.scan_timestamped()?;
                let pinned = *last.timestamp_ns.get_or_insert(timestamp_ns);

                // Rows are newest first, so anything not at the pinned
                // timestamp is older and cannot belong to the last row.
                if timestamp_ns != pinned {
                    return Ok(ScanControl::Stop);
                }
                last.put(pos, value);

                if last.is_complete() {
                    Ok(ScanControl::Stop)
                } else {
                    Ok(ScanControl::Continue)
                }
            })
            .await?;
        }

        let results = rows
            .into_values()
            .filter_map(|last| {
                last.timestamp_ns.map(|timestamp_ns| CqlResult {
                    time_interval: TimeInterval::instant(timestamp_ns),
                    values: last.values,
                })
            })
            .collect();
        Ok(results)
    }

    pub fn debug_queries(&self, level: u8) {
        debug_query_list(&self.queries, "qpfe", level);
    }
}

/// The newest row of one tag value. Several series may carry the same tag
/// value, so a field counts once no matter how many series fill it.
#[derive(Debug)]
struct LastRow {
    timestamp_ns: Option<i64>,
    values: Vec<f64>,
    filled: Vec<bool>,
}

impl LastRow {
    fn new(width: usize) -> Self {
        Self {
            timestamp_ns: None,
            values: vec![0.0; width],
            filled: vec![false; width],
        }
    }

    fn put(&mut self, pos: usize, value: f64) {
        self.values[pos] = value;
        self.filled[pos] = true;
    }

    fn is_complete(&self) -> bool {
        self.filled.iter().all(|f| *f)
    }
}
