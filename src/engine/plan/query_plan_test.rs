use crate::engine::plan::{
    CqlQuery, PlanKind, QueryPlan, QueryPlanForEvery, QueryPlanNoAggregation,
    QueryPlanWithServerAggregation, QueryPlanWithoutServerAggregation,
};
use crate::shared::datetime::TimeInterval;
use crate::test_helpers::factories::{ScriptedSession, SeriesFactory};
use crate::test_helpers::logs::capture_logs;
use chrono::Duration;
use std::collections::BTreeMap;
use tracing::level_filters::LevelFilter;

#[test]
fn kind_labels() {
    assert_eq!(PlanKind::ServerAggregation.label(), "qpsa");
    assert_eq!(PlanKind::ClientAggregation.label(), "qpca");
    assert_eq!(PlanKind::NoAggregation.to_string(), "qpna");
    assert_eq!(PlanKind::ForEvery.to_string(), "qpfe");
}

#[test]
fn variants_report_kind_and_query_count() {
    let series = SeriesFactory::new().create();
    let raw = vec![CqlQuery::raw(&series, 0, 1, false, None)];

    let mut bucketed = BTreeMap::new();
    bucketed.insert(
        TimeInterval::from_unix_nanos(0, Duration::hours(1)),
        vec![CqlQuery::aggregate("avg", &series, 0, 1), CqlQuery::aggregate("avg", &series, 0, 1)],
    );

    let plans: Vec<QueryPlan> = vec![
        QueryPlanWithServerAggregation::new("avg", bucketed).unwrap().into(),
        QueryPlanWithoutServerAggregation::new("avg", Duration::hours(1), vec![series.field.clone()], vec![], 0, raw.clone())
            .unwrap()
            .into(),
        QueryPlanNoAggregation::new(vec![series.field.clone()], "", raw.clone()).into(),
        QueryPlanForEvery::new(vec![series.field.clone()], "hostname", 1, raw).into(),
    ];

    let kinds: Vec<PlanKind> = plans.iter().map(QueryPlan::kind).collect();
    assert_eq!(
        kinds,
        vec![
            PlanKind::ServerAggregation,
            PlanKind::ClientAggregation,
            PlanKind::NoAggregation,
            PlanKind::ForEvery
        ]
    );
    let counts: Vec<usize> = plans.iter().map(QueryPlan::query_count).collect();
    assert_eq!(counts, vec![2, 1, 1, 1]);

    for plan in &plans {
        plan.debug_queries(2);
    }
}

#[tokio::test]
async fn execute_dispatches_to_the_variant() {
    let series = SeriesFactory::new().create();
    let session = ScriptedSession::new().respond_points(&series.id, &[(3, 42.0)]);
    let plan: QueryPlan =
        QueryPlanNoAggregation::new(vec![series.field.clone()], "", vec![CqlQuery::raw(&series, 0, 10, false, None)]).into();

    let results = plan.execute(&session).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].values, vec![42.0]);
}

#[test]
fn query_dumps_reach_an_info_console() {
    let series = SeriesFactory::new().create();
    let mut bucketed = BTreeMap::new();
    bucketed.insert(
        TimeInterval::from_unix_nanos(0, Duration::hours(1)),
        vec![CqlQuery::aggregate("max", &series, 0, 1)],
    );
    let server: QueryPlan = QueryPlanWithServerAggregation::new("max", bucketed).unwrap().into();
    let raw: QueryPlan =
        QueryPlanNoAggregation::new(vec![series.field.clone()], "", vec![CqlQuery::raw(&series, 0, 1, false, None)])
            .into();

    let summary = capture_logs(LevelFilter::INFO, || server.debug_queries(1));
    assert!(summary.contains("[qpsa] query with server aggregation plan has 1 CQLQuery objects"));
    assert!(!summary.contains("[qpsa] CQL:"));

    let full = capture_logs(LevelFilter::INFO, || raw.debug_queries(2));
    assert!(full.contains("[qpna] query plan has 1 CQLQuery objects"));
    assert!(full.contains("[qpna] CQL: 0,"));
}
