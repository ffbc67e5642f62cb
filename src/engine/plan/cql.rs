use std::fmt;

use crate::engine::series::Series;
use crate::engine::session::CqlValue;
use crate::shared::datetime::TimeInterval;

/// One parameterized wire query plus the logical field it reads, which
/// plans use to route returned rows to the right aggregator or column.
#[derive(Debug, Clone, PartialEq)]
pub struct CqlQuery {
    pub preparable_query_string: String,
    pub args: Vec<CqlValue>,
    pub field: String,
}

impl CqlQuery {
    pub fn new(preparable_query_string: impl Into<String>, args: Vec<CqlValue>, field: impl Into<String>) -> Self {
        Self {
            preparable_query_string: preparable_query_string.into(),
            args,
            field: field.into(),
        }
    }

    /// Server-side aggregate of one series over `[start_ns, end_ns)`; yields
    /// at most one `(value)` row.
    pub fn aggregate(aggregation: &str, series: &Series, start_ns: i64, end_ns: i64) -> Self {
        let stmt = format!(
            "SELECT {}(value) FROM {} WHERE series_id = ? AND timestamp_ns >= ? AND timestamp_ns < ?",
            aggregation, series.table
        );
        Self::new(stmt, range_args(series, start_ns, end_ns), series.field.clone())
    }

    /// Raw `(timestamp_ns, value)` scan of one series over `[start_ns, end_ns)`.
    pub fn raw(series: &Series, start_ns: i64, end_ns: i64, descending: bool, limit: Option<usize>) -> Self {
        let mut stmt = format!(
            "SELECT timestamp_ns, value FROM {} WHERE series_id = ? AND timestamp_ns >= ? AND timestamp_ns < ?",
            series.table
        );
        if descending {
            stmt.push_str(" ORDER BY timestamp_ns DESC");
        }
        if let Some(limit) = limit.filter(|l| *l > 0) {
            stmt.push_str(&format!(" LIMIT {}", limit));
        }
        Self::new(stmt, range_args(series, start_ns, end_ns), series.field.clone())
    }

    /// The series id bound as the first argument.
    pub fn series_id(&self) -> Option<&str> {
        self.args.first().and_then(CqlValue::as_text)
    }
}

fn range_args(series: &Series, start_ns: i64, end_ns: i64) -> Vec<CqlValue> {
    vec![
        CqlValue::Text(series.id.clone()),
        CqlValue::BigInt(start_ns),
        CqlValue::BigInt(end_ns),
    ]
}

impl fmt::Display for CqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.preparable_query_string)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, "] field={}", self.field)
    }
}

/// One output row: a time bucket (or a zero-width instant for raw rows) and
/// its values.
#[derive(Debug, Clone, PartialEq)]
pub struct CqlResult {
    pub time_interval: TimeInterval,
    pub values: Vec<f64>,
}

/// Logs a flat query list: its size at level 1, every query at level 2.
/// Logged at info; callers only invoke it when a dump was requested.
pub fn debug_query_list(queries: &[CqlQuery], label: &str, level: u8) {
    if level >= 1 {
        tracing::info!(
            target: "cqlbench::plan",
            "[{}] query plan has {} CQLQuery objects",
            label,
            queries.len()
        );
    }
    if level >= 2 {
        for (i, q) in queries.iter().enumerate() {
            tracing::info!(target: "cqlbench::plan", "[{}] CQL: {}, {}", label, i, q);
        }
    }
}
