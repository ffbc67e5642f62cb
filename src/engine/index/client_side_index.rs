use crate::engine::errors::IndexError;
use crate::engine::series::Series;
use crate::shared::datetime::TimeInterval;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

/// Runtime index used to translate a high-level query into wire queries.
/// Immutable after construction, so any number of workers may share it.
///
/// Every map stores positions into `series`, which gives each series a
/// stable identity regardless of how many series share an interval or tag.
#[derive(Debug)]
pub struct ClientSideIndex {
    series: Vec<Series>,
    series_ids: Vec<String>,
    by_time_interval: BTreeMap<TimeInterval, BTreeSet<usize>>,
    by_tag: HashMap<String, BTreeSet<usize>>,
    by_name: HashMap<String, HashMap<String, Vec<usize>>>,
}

impl ClientSideIndex {
    pub fn new(series: Vec<Series>) -> Result<Self, IndexError> {
        if series.is_empty() {
            return Err(IndexError::Empty);
        }

        let mut by_time_interval: BTreeMap<TimeInterval, BTreeSet<usize>> = BTreeMap::new();
        let mut by_tag: HashMap<String, BTreeSet<usize>> = HashMap::new();
        let mut by_name: HashMap<String, HashMap<String, Vec<usize>>> = HashMap::new();

        for (pos, s) in series.iter().enumerate() {
            by_time_interval
                .entry(s.time_interval)
                .or_default()
                .insert(pos);

            for tag in &s.tags {
                by_tag.entry(tag.clone()).or_default().insert(pos);
            }

            by_name
                .entry(s.measurement.clone())
                .or_default()
                .entry(s.field.clone())
                .or_default()
                .push(pos);
        }

        let series_ids = series.iter().map(|s| s.id.clone()).collect();

        info!(
            target: "cqlbench::index",
            series = series.len(),
            intervals = by_time_interval.len(),
            tags = by_tag.len(),
            names = by_name.values().map(HashMap::len).sum::<usize>(),
            "Built client-side index"
        );

        Ok(Self {
            series,
            series_ids,
            by_time_interval,
            by_tag,
            by_name,
        })
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Copy of the full collection; callers may reorder or drop entries freely.
    pub fn copy_of_series_collection(&self) -> Vec<Series> {
        self.series.clone()
    }

    pub fn series_ids(&self) -> &[String] {
        &self.series_ids
    }

    /// Hot path for plan builders: every series with this measurement and
    /// field, in collection order.
    pub fn series_for_measurement_and_field(&self, measurement: &str, field: &str) -> Vec<&Series> {
        self.by_name
            .get(measurement)
            .and_then(|fields| fields.get(field))
            .map(|positions| positions.iter().map(|&p| &self.series[p]).collect())
            .unwrap_or_default()
    }

    /// Series whose day bucket overlaps `ti`, in collection order.
    pub fn series_for_time_interval(&self, ti: &TimeInterval) -> Vec<&Series> {
        let positions: BTreeSet<usize> = self
            .by_time_interval
            .iter()
            .filter(|(interval, _)| interval.overlap(ti))
            .flat_map(|(_, positions)| positions.iter().copied())
            .collect();
        debug!(
            target: "cqlbench::index",
            interval = %ti,
            matched = positions.len(),
            "Time interval lookup"
        );
        positions.into_iter().map(|p| &self.series[p]).collect()
    }

    /// Series carrying the raw `k=v` tag, in collection order.
    pub fn series_for_tag(&self, tag: &str) -> Vec<&Series> {
        self.by_tag
            .get(tag)
            .map(|positions| positions.iter().map(|&p| &self.series[p]).collect())
            .unwrap_or_default()
    }
}
