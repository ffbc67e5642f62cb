use crate::runner::stats::{
    LABEL_ALL_QUERIES, LABEL_COLD_QUERIES, LABEL_WARM_QUERIES, Stat, StatGroup, StatProcessor,
};

#[test]
fn group_tracks_min_mean_max_sum_and_count() {
    let mut g = StatGroup::new();
    for v in [4.0, 1.0, 7.0] {
        g.push(v);
    }
    assert_eq!(g.min, 1.0);
    assert_eq!(g.max, 7.0);
    assert_eq!(g.mean, 4.0);
    assert_eq!(g.sum, 12.0);
    assert_eq!(g.count, 3);
    assert_eq!(g.median(), 4.0);
    assert!((g.std_dev() - 3.0).abs() < 1e-9);
}

#[test]
fn empty_group_reports_zeroes() {
    let g = StatGroup::new();
    assert_eq!(g.count, 0);
    assert_eq!(g.median(), 0.0);
    assert_eq!(g.std_dev(), 0.0);
}

#[test]
fn median_of_even_count_averages_the_middle() {
    let mut g = StatGroup::new();
    for v in [3.0, 1.0, 4.0, 2.0] {
        g.push(v);
    }
    assert_eq!(g.median(), 2.5);
}

#[test]
fn warm_stats_get_a_suffixed_label() {
    assert_eq!(Stat::total("q", 1.0, true).label, "q (warm)");
    assert_eq!(Stat::partial("q-qp", 1.0, false).label, "q-qp");
    assert!(Stat::partial("q-qp", 1.0, false).is_partial);
}

#[test]
fn partial_stats_stay_out_of_all_queries() {
    let mut p = StatProcessor::new(false, 0, 0);
    p.record(Stat::total("q", 5.0, false));
    p.record(Stat::partial("q-qp", 1.0, false));
    p.record(Stat::partial("q-req", 4.0, false));

    assert_eq!(p.completed(), 1);
    assert_eq!(p.group(LABEL_ALL_QUERIES).unwrap().count, 1);
    assert_eq!(p.group("q-qp").unwrap().sum, 1.0);
    assert!(p.group(LABEL_COLD_QUERIES).is_none());
}

#[test]
fn prewarmed_queries_count_once_and_split_cold_from_warm() {
    let mut p = StatProcessor::new(true, 0, 0);
    p.record(Stat::total("q", 9.0, false));
    p.record(Stat::total("q", 2.0, true));

    assert_eq!(p.completed(), 1);
    assert_eq!(p.group(LABEL_ALL_QUERIES).unwrap().count, 2);
    assert_eq!(p.group(LABEL_COLD_QUERIES).unwrap().sum, 9.0);
    assert_eq!(p.group(LABEL_WARM_QUERIES).unwrap().sum, 2.0);
    assert_eq!(p.group("q (warm)").unwrap().count, 1);
}

#[test]
fn interval_report_is_due_every_n_queries_before_the_limit() {
    let mut p = StatProcessor::new(false, 2, 4);
    let due: Vec<bool> = (0..4).map(|_| p.record(Stat::total("q", 1.0, false))).collect();
    assert_eq!(due, vec![false, true, false, false]);
}

#[test]
fn report_lists_groups_then_failures() {
    let mut p = StatProcessor::new(false, 0, 0);
    p.record(Stat::total("cpu-max", 2.0, false));
    p.record_failure("cpu-max");
    p.record_failure("cpu-max");

    let mut out = Vec::new();
    p.write_report(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("all queries:\n"));
    assert!(text.contains("cpu-max    :\n"));
    assert!(text.contains("count: 1"));
    assert!(text.ends_with("failed cpu-max: 2\n"));
    assert_eq!(p.failed(), 2);
}
