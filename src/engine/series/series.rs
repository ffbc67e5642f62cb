use crate::engine::errors::SeriesParseError;
use crate::shared::datetime::TimeInterval;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::collections::BTreeSet;

/// Width of the day bucket one wide row covers.
pub const BUCKET_DURATION_HOURS: i64 = 24;

/// Layout of the day bucket suffix of a series id.
pub const BUCKET_TIME_LAYOUT: &str = "%Y-%m-%d";

/// Metadata of one wide row: a (measurement, tag combination, field, day)
/// series as stored in one of the blessed tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    /// Source table, e.g. `series_double`.
    pub table: String,
    /// Raw id, e.g. `cpu,hostname=host_0,region=eu-central-1#usage_idle#2016-01-01`.
    pub id: String,

    pub measurement: String,
    /// Raw `k=v` tag strings.
    pub tags: BTreeSet<String>,
    pub field: String,
    pub time_interval: TimeInterval,
}

impl Series {
    /// Parses a raw `(table, id)` pair scanned from the store.
    pub fn parse(table: &str, id: &str) -> Result<Self, SeriesParseError> {
        let sections: Vec<&str> = id.split('#').collect();
        if sections.len() != 3 {
            return Err(SeriesParseError::SectionCount {
                id: id.to_string(),
                found: sections.len(),
            });
        }

        let mut measurement_and_tags = sections[0].split(',');
        let measurement = measurement_and_tags.next().unwrap_or_default().to_string();

        let mut tags = BTreeSet::new();
        for tag in measurement_and_tags {
            if !tags.insert(tag.to_string()) {
                return Err(SeriesParseError::DuplicateTag {
                    id: id.to_string(),
                    tag: tag.to_string(),
                });
            }
        }

        let field = sections[1].to_string();
        let time_interval = parse_day_bucket(sections[2]).ok_or_else(|| {
            SeriesParseError::TimeBucket {
                id: id.to_string(),
                bucket: sections[2].to_string(),
            }
        })?;

        Ok(Self {
            table: table.to_string(),
            id: id.to_string(),
            measurement,
            tags,
            field,
            time_interval,
        })
    }

    pub fn matches_time_interval(&self, ti: &TimeInterval) -> bool {
        self.time_interval.overlap(ti)
    }

    /// Tag sets are AND'ed together; the tags inside one set are OR'ed.
    pub fn matches_tag_sets(&self, tag_sets: &[Vec<String>]) -> bool {
        tag_sets
            .iter()
            .all(|set| set.iter().any(|tag| self.tags.contains(tag)))
    }
}

fn parse_day_bucket(bucket: &str) -> Option<TimeInterval> {
    let date = NaiveDate::parse_from_str(bucket, BUCKET_TIME_LAYOUT).ok()?;
    let start = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?);
    let end = start + Duration::hours(BUCKET_DURATION_HOURS);
    TimeInterval::new(start, end).ok()
}
