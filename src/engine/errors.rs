use crate::shared::datetime::TimeIntervalError;
use thiserror::Error;
use tracing::{debug, error};

/// Series ids that do not match the expected wide-row schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesParseError {
    #[error("invalid series id {id:?}: expected 3 '#'-delimited sections, found {found}")]
    SectionCount { id: String, found: usize },

    #[error("invalid series id {id:?}: duplicate tag {tag:?}")]
    DuplicateTag { id: String, tag: String },

    #[error("bad time bucket {bucket:?} in series id {id:?}")]
    TimeBucket { id: String, bucket: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("no series to build the client-side index from")]
    Empty,
}

/// Errors surfaced by the wire session while running or streaming a query.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("unsupported statement: {0}")]
    UnsupportedStatement(String),

    #[error("bad argument at position {position}: {reason}")]
    BadArgument { position: usize, reason: String },

    #[error("row scan failed: {0}")]
    Scan(String),

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        SessionError::Io(e.to_string())
    }
}

/// Errors that can occur while executing a query plan.
#[derive(Debug, Error)]
pub enum QueryPlanError {
    #[error("wire query failed: {0}")]
    Session(#[from] SessionError),

    #[error("invalid aggregation specifier: {0:?}")]
    UnknownAggregator(String),

    #[error("no aggregator for field {0:?}")]
    UnknownField(String),

    #[error("wire query has no text series id argument")]
    MissingSeriesKey,

    #[error("could not find value of tag {tag:?} in {arg:?}")]
    MissingTagValue { tag: String, arg: String },

    #[error("invalid tag pattern: {0}")]
    TagPattern(#[from] regex::Error),

    #[error("bad time interval: {0}")]
    TimeInterval(#[from] TimeIntervalError),
}

impl QueryPlanError {
    pub fn log_error(&self) {
        match self {
            QueryPlanError::Session(e) => {
                error!(target: "cqlbench::plan", "Wire query failed: {}", e);
                debug!(target: "cqlbench::plan", "Wire query error details: {:?}", e);
            }
            QueryPlanError::UnknownAggregator(label) => {
                error!(target: "cqlbench::plan", "Unknown aggregator: {}", label);
            }
            QueryPlanError::UnknownField(field) => {
                error!(target: "cqlbench::plan", "No aggregator for field: {}", field);
            }
            QueryPlanError::MissingSeriesKey => {
                error!(target: "cqlbench::plan", "Wire query is missing its series id argument");
            }
            QueryPlanError::MissingTagValue { tag, arg } => {
                error!(target: "cqlbench::plan", "Tag {} not found in {}", tag, arg);
            }
            QueryPlanError::TagPattern(e) => {
                error!(target: "cqlbench::plan", "Invalid tag pattern: {}", e);
                debug!(target: "cqlbench::plan", "Tag pattern error details: {:?}", e);
            }
            QueryPlanError::TimeInterval(e) => {
                error!(target: "cqlbench::plan", "Bad time interval: {}", e);
            }
        }
    }
}

/// Errors raised while lowering a high-level query into a plan.
#[derive(Debug, Error)]
pub enum PlanBuildError {
    #[error("no series match measurement {measurement:?}, fields {fields:?}")]
    NoMatchingSeries {
        measurement: String,
        fields: Vec<String>,
    },

    #[error("invalid for-every clause {0:?}, expected \"tag,N\"")]
    ForEvery(String),

    #[error("group-by duration must be positive")]
    GroupByDuration,

    #[error("bad time range: {0}")]
    TimeRange(#[from] TimeIntervalError),

    #[error(transparent)]
    Plan(#[from] QueryPlanError),
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("query planning failed: {0}")]
    Plan(#[from] PlanBuildError),

    #[error("query execution failed: {0}")]
    Execute(#[from] QueryPlanError),

    #[error("failed to write responses: {0}")]
    Render(#[from] std::io::Error),
}

impl ExecutorError {
    pub fn log_error(&self) {
        match self {
            ExecutorError::Plan(e) => {
                error!(target: "cqlbench::executor", "Query planning failed: {}", e);
                debug!(target: "cqlbench::executor", "Planning error details: {:?}", e);
            }
            ExecutorError::Execute(e) => e.log_error(),
            ExecutorError::Render(e) => {
                error!(target: "cqlbench::executor", "Failed to write responses: {}", e);
            }
        }
    }
}

/// Startup failures; any of these means the stored data does not match the
/// benchmark schema and the process must not continue.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("series scan of table {table} failed: {source}")]
    Scan {
        table: String,
        #[source]
        source: SessionError,
    },

    #[error(transparent)]
    Series(#[from] SeriesParseError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("client-side index build timed out after {0}ms")]
    Timeout(u64),
}
