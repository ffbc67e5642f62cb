use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::debug;

use super::hl_query::HlQuery;
use crate::engine::aggregate::AggregatorImpl;
use crate::engine::errors::PlanBuildError;
use crate::engine::index::ClientSideIndex;
use crate::engine::plan::{
    CqlQuery, QueryPlan, QueryPlanForEvery, QueryPlanNoAggregation, QueryPlanWithServerAggregation,
    QueryPlanWithoutServerAggregation,
};
use crate::engine::series::Series;
use crate::shared::datetime::{TimeInterval, bucket_time_intervals};

impl HlQuery {
    /// One server-side aggregate per (bucket, matching series), each clipped
    /// to the query's own range so partial edge buckets match rounded
    /// boundaries. Every bucket is present even when no series overlaps it.
    pub fn to_query_plan_with_server_aggregation(
        &self,
        index: &ClientSideIndex,
    ) -> Result<QueryPlan, PlanBuildError> {
        AggregatorImpl::from_label(&self.aggregation_type)?;
        let window = self.positive_group_by()?;
        let range = self.time_range()?;
        let candidates = self.matching_series(index, &range)?;

        let (start_ns, end_ns) = (range.start_unix_nanos(), range.end_unix_nanos());
        let mut bucketed = BTreeMap::new();
        for bucket in bucket_time_intervals(self.time_start, self.time_end, window) {
            let queries = candidates
                .iter()
                .filter(|s| s.matches_time_interval(&bucket))
                .map(|s| {
                    CqlQuery::aggregate(
                        &self.aggregation_type,
                        s,
                        bucket.start_unix_nanos().max(start_ns),
                        bucket.end_unix_nanos().min(end_ns),
                    )
                })
                .collect();
            bucketed.insert(bucket, queries);
        }

        debug!(
            target: "cqlbench::plan",
            buckets = bucketed.len(),
            series = candidates.len(),
            "Built server aggregation plan"
        );
        Ok(QueryPlanWithServerAggregation::new(&self.aggregation_type, bucketed)?.into())
    }

    /// One raw scan per (field, matching series) over the whole range; the
    /// client buckets and aggregates.
    pub fn to_query_plan_without_server_aggregation(
        &self,
        index: &ClientSideIndex,
    ) -> Result<QueryPlan, PlanBuildError> {
        let window = self.positive_group_by()?;
        let range = self.time_range()?;
        let candidates = self.matching_series(index, &range)?;

        let mut buckets = bucket_time_intervals(self.time_start, self.time_end, window);
        if self.descending() {
            buckets.reverse();
        }

        let queries = raw_queries(&candidates, &range, false, None);
        debug!(
            target: "cqlbench::plan",
            buckets = buckets.len(),
            queries = queries.len(),
            limit = self.limit,
            "Built client aggregation plan"
        );
        let plan = QueryPlanWithoutServerAggregation::new(
            &self.aggregation_type,
            window,
            self.fields(),
            buckets,
            self.limit,
            queries,
        )?;
        Ok(plan.into())
    }

    pub fn to_query_plan_no_aggregation(
        &self,
        index: &ClientSideIndex,
    ) -> Result<QueryPlan, PlanBuildError> {
        let range = self.time_range()?;
        let candidates = self.matching_series(index, &range)?;
        let queries = raw_queries(&candidates, &range, false, None);

        debug!(target: "cqlbench::plan", queries = queries.len(), "Built no-aggregation plan");
        Ok(QueryPlanNoAggregation::new(self.fields(), &self.where_clause, queries).into())
    }

    /// Newest-first scans limited to the for-every row count. Series are
    /// ordered newest day first so each tag value completes on its most
    /// recent row.
    pub fn to_query_plan_for_every(&self, index: &ClientSideIndex) -> Result<QueryPlan, PlanBuildError> {
        let (tag, num) = self.for_every()?;
        let range = self.time_range()?;
        let mut candidates = self.matching_series(index, &range)?;
        candidates.sort_by(|a, b| {
            (Reverse(a.time_interval), &a.field, &a.id).cmp(&(Reverse(b.time_interval), &b.field, &b.id))
        });

        let queries = raw_queries(&candidates, &range, true, Some(num));
        debug!(
            target: "cqlbench::plan",
            tag = %tag,
            num,
            queries = queries.len(),
            "Built for-every plan"
        );
        Ok(QueryPlanForEvery::new(self.fields(), &tag, num, queries).into())
    }

    fn positive_group_by(&self) -> Result<chrono::Duration, PlanBuildError> {
        let window = self.group_by();
        if window <= chrono::Duration::zero() {
            return Err(PlanBuildError::GroupByDuration);
        }
        Ok(window)
    }

    fn time_range(&self) -> Result<TimeInterval, PlanBuildError> {
        Ok(TimeInterval::new(self.time_start, self.time_end)?)
    }

    /// Series of any requested field that pass the tag filter and overlap
    /// `range`, in field order then index order.
    fn matching_series<'a>(
        &self,
        index: &'a ClientSideIndex,
        range: &TimeInterval,
    ) -> Result<Vec<&'a Series>, PlanBuildError> {
        let fields = self.fields();
        let matched: Vec<&Series> = fields
            .iter()
            .flat_map(|f| index.series_for_measurement_and_field(&self.measurement_name, f))
            .filter(|s| s.matches_tag_sets(&self.tag_sets) && s.matches_time_interval(range))
            .collect();

        if matched.is_empty() {
            return Err(PlanBuildError::NoMatchingSeries {
                measurement: self.measurement_name.clone(),
                fields,
            });
        }
        Ok(matched)
    }
}

fn raw_queries(
    series: &[&Series],
    range: &TimeInterval,
    descending: bool,
    limit: Option<usize>,
) -> Vec<CqlQuery> {
    series
        .iter()
        .map(|s| {
            CqlQuery::raw(
                s,
                range.start_unix_nanos(),
                range.end_unix_nanos(),
                descending,
                limit,
            )
        })
        .collect()
}
