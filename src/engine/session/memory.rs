use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;
use tracing::{debug, info};

use super::traits::{RowIter, Session, VecRowIter};
use super::value::{CqlValue, Row};
use crate::engine::errors::SessionError;

static DISTINCT_SERIES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^SELECT DISTINCT series_id FROM (\w+)$").unwrap());

static SERVER_AGGREGATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^SELECT (\w+)\(value\) FROM (\w+) WHERE series_id = \? AND timestamp_ns >= \? AND timestamp_ns < \?$",
    )
    .unwrap()
});

static RAW_SCAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^SELECT timestamp_ns, value FROM (\w+) WHERE series_id = \? AND timestamp_ns >= \? AND timestamp_ns < \?( ORDER BY timestamp_ns DESC)?(?: LIMIT (\d+))?$",
    )
    .unwrap()
});

/// One stored point, as read from a JSON-lines dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct PointRecord {
    pub table: String,
    pub series_id: String,
    pub timestamp_ns: i64,
    pub value: f64,
}

type Points = BTreeMap<i64, f64>;

/// In-process wide-row store answering the statement shapes the plan
/// builders emit. Each (table, series id) pair is one wide row keyed by
/// timestamp.
#[derive(Default)]
pub struct MemorySession {
    tables: RwLock<HashMap<String, BTreeMap<String, Points>>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, table: &str, series_id: &str, timestamp_ns: i64, value: f64) {
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .entry(series_id.to_string())
            .or_default()
            .insert(timestamp_ns, value);
    }

    pub fn load_json_lines<R: BufRead>(reader: R) -> Result<Self, SessionError> {
        let session = Self::new();
        let mut loaded = 0usize;
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let point: PointRecord = serde_json::from_str(&line)
                .map_err(|e| SessionError::Io(format!("dataset line {}: {}", line_no + 1, e)))?;
            session.insert(&point.table, &point.series_id, point.timestamp_ns, point.value);
            loaded += 1;
        }
        info!(target: "cqlbench::session", points = loaded, "Loaded in-memory dataset");
        Ok(session)
    }

    fn run(&self, statement: &str, args: &[CqlValue]) -> Result<Vec<Row>, SessionError> {
        if let Some(caps) = DISTINCT_SERIES.captures(statement) {
            let tables = self.tables.read();
            let rows = tables
                .get(&caps[1])
                .map(|rows| {
                    rows.keys()
                        .map(|id| Row::new(vec![CqlValue::Text(id.clone())]))
                        .collect()
                })
                .unwrap_or_default();
            return Ok(rows);
        }

        if let Some(caps) = SERVER_AGGREGATE.captures(statement) {
            let (series_id, start, end) = range_args(args)?;
            let values = self.range(&caps[2], series_id, start, end, false, None);
            return Ok(aggregate(&caps[1], &values)?
                .map(|v| vec![Row::new(vec![CqlValue::Double(v)])])
                .unwrap_or_default());
        }

        if let Some(caps) = RAW_SCAN.captures(statement) {
            let (series_id, start, end) = range_args(args)?;
            let descending = caps.get(2).is_some();
            let limit = caps.get(3).and_then(|m| m.as_str().parse::<usize>().ok());
            let points = self.range(&caps[1], series_id, start, end, descending, limit);
            return Ok(points
                .into_iter()
                .map(|(ts, v)| Row::new(vec![CqlValue::BigInt(ts), CqlValue::Double(v)]))
                .collect());
        }

        Err(SessionError::UnsupportedStatement(statement.to_string()))
    }

    fn range(
        &self,
        table: &str,
        series_id: &str,
        start: i64,
        end: i64,
        descending: bool,
        limit: Option<usize>,
    ) -> Vec<(i64, f64)> {
        let tables = self.tables.read();
        let Some(points) = tables.get(table).and_then(|t| t.get(series_id)) else {
            return Vec::new();
        };
        if end <= start {
            return Vec::new();
        }
        let in_range = points.range(start..end).map(|(ts, v)| (*ts, *v));
        let limit = limit.unwrap_or(usize::MAX);
        if descending {
            in_range.rev().take(limit).collect()
        } else {
            in_range.take(limit).collect()
        }
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn query(&self, statement: &str, args: &[CqlValue]) -> Box<dyn RowIter> {
        debug!(target: "cqlbench::session", statement, args = ?args, "Running statement");
        match self.run(statement, args) {
            Ok(rows) => Box::new(VecRowIter::new(rows)),
            Err(e) => Box::new(VecRowIter::failed(e)),
        }
    }
}

fn range_args(args: &[CqlValue]) -> Result<(&str, i64, i64), SessionError> {
    let bad = |position: usize, reason: &str| SessionError::BadArgument {
        position,
        reason: reason.to_string(),
    };
    let series_id = args
        .first()
        .and_then(CqlValue::as_text)
        .ok_or_else(|| bad(0, "expected text series id"))?;
    let start = args
        .get(1)
        .and_then(CqlValue::as_bigint)
        .ok_or_else(|| bad(1, "expected bigint start"))?;
    let end = args
        .get(2)
        .and_then(CqlValue::as_bigint)
        .ok_or_else(|| bad(2, "expected bigint end"))?;
    Ok((series_id, start, end))
}

/// Server-side aggregate over one range. `sum` and `count` always produce a
/// row; the others produce none over an empty range.
fn aggregate(function: &str, points: &[(i64, f64)]) -> Result<Option<f64>, SessionError> {
    let values = points.iter().map(|(_, v)| *v);
    let out = match function {
        "sum" => Some(values.sum::<f64>()),
        "count" => Some(points.len() as f64),
        "max" | "min" | "avg" if points.is_empty() => None,
        "max" => values.reduce(f64::max),
        "min" => values.reduce(f64::min),
        "avg" => Some(values.sum::<f64>() / points.len() as f64),
        other => {
            return Err(SessionError::UnsupportedStatement(format!(
                "unknown aggregate function {}",
                other
            )));
        }
    };
    Ok(out)
}
