use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::errors::PlanBuildError;

/// Order-by value that flips bucket output to newest first.
pub const ORDER_BY_TIMESTAMP_DESC: &str = "timestamp_ns DESC";

/// A database-agnostic analytic request, as produced by the query generator
/// and read from the benchmark input one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HlQuery {
    #[serde(default)]
    pub human_label: String,
    #[serde(default)]
    pub human_description: String,
    #[serde(default)]
    pub id: u64,

    pub measurement_name: String,
    /// One field, or several joined with commas.
    pub field_name: String,
    /// Empty when the query does not aggregate.
    #[serde(default)]
    pub aggregation_type: String,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    /// Bucket width in nanoseconds.
    #[serde(default)]
    pub group_by_duration: i64,
    /// `"tag,N"`, e.g. `"hostname,1"`.
    #[serde(default)]
    pub for_every_n: String,
    /// `"field,op,threshold"`, e.g. `"usage_user,>,90.0"`.
    #[serde(default)]
    pub where_clause: String,
    #[serde(default)]
    pub order_by: String,
    #[serde(default)]
    pub limit: usize,
    /// Each inner set is OR'ed; the sets are AND'ed together.
    #[serde(default)]
    pub tag_sets: Vec<Vec<String>>,
}

impl HlQuery {
    pub fn fields(&self) -> Vec<String> {
        self.field_name
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn group_by(&self) -> Duration {
        Duration::nanoseconds(self.group_by_duration)
    }

    pub fn has_aggregation(&self) -> bool {
        !self.aggregation_type.is_empty()
    }

    pub fn has_for_every(&self) -> bool {
        !self.for_every_n.is_empty()
    }

    pub fn descending(&self) -> bool {
        self.order_by == ORDER_BY_TIMESTAMP_DESC
    }

    /// Splits the for-every clause into its grouping tag and row count.
    pub fn for_every(&self) -> Result<(String, usize), PlanBuildError> {
        let bad = || PlanBuildError::ForEvery(self.for_every_n.clone());
        let (tag, n) = self.for_every_n.split_once(',').ok_or_else(bad)?;
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(bad());
        }
        let n = n.trim().parse::<usize>().map_err(|_| bad())?;
        Ok((tag.to_string(), n))
    }
}

impl fmt::Display for HlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HumanLabel: {}, HumanDescription: {}, MeasurementName: {}, AggregationType: {}, TimeStart: {}, TimeEnd: {}, GroupByDuration: {}ns, TagSets: {:?}",
            self.human_label,
            self.human_description,
            self.measurement_name,
            self.aggregation_type,
            self.time_start.to_rfc3339(),
            self.time_end.to_rfc3339(),
            self.group_by_duration,
            self.tag_sets
        )
    }
}
