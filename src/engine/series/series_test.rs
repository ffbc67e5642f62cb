use crate::engine::errors::SeriesParseError;
use crate::engine::series::Series;
use crate::test_helpers::factories::SeriesFactory;
use chrono::{TimeZone, Utc};

#[test]
fn parses_well_formed_id() {
    let s = Series::parse("series_double", "measurement,tag1=v1,tag2=v2#field#2016-01-01").unwrap();

    assert_eq!(s.table, "series_double");
    assert_eq!(s.measurement, "measurement");
    assert_eq!(
        s.tags.iter().cloned().collect::<Vec<_>>(),
        vec!["tag1=v1".to_string(), "tag2=v2".to_string()]
    );
    assert_eq!(s.field, "field");
    assert_eq!(
        s.time_interval.start(),
        Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(
        s.time_interval.end(),
        Utc.with_ymd_and_hms(2016, 1, 2, 0, 0, 0).unwrap()
    );
}

#[test]
fn parses_measurement_without_tags() {
    let s = Series::parse("t", "cpu#usage_user#2016-03-04").unwrap();
    assert_eq!(s.measurement, "cpu");
    assert!(s.tags.is_empty());
}

#[test]
fn rejects_id_without_hashes() {
    let err = Series::parse("t", "bad_id_without_hashes").unwrap_err();
    assert_eq!(
        err,
        SeriesParseError::SectionCount {
            id: "bad_id_without_hashes".into(),
            found: 1
        }
    );
}

#[test]
fn rejects_too_many_sections() {
    assert!(matches!(
        Series::parse("t", "cpu#a#b#2016-01-01"),
        Err(SeriesParseError::SectionCount { found: 4, .. })
    ));
}

#[test]
fn rejects_duplicate_tag() {
    assert!(matches!(
        Series::parse("t", "cpu,host=a,host=a#usage#2016-01-01"),
        Err(SeriesParseError::DuplicateTag { tag, .. }) if tag == "host=a"
    ));
}

#[test]
fn rejects_bad_time_bucket() {
    assert!(matches!(
        Series::parse("t", "cpu,host=a#usage#2016-13-45"),
        Err(SeriesParseError::TimeBucket { bucket, .. }) if bucket == "2016-13-45"
    ));
}

#[test]
fn tag_set_matching_ands_sets_and_ors_members() {
    let s = SeriesFactory::new()
        .with_tags(&["hostname=host_1", "region=eu-west-1"])
        .create();

    assert!(s.matches_tag_sets(&[]));
    assert!(s.matches_tag_sets(&[vec!["hostname=host_0".into(), "hostname=host_1".into()]]));
    assert!(s.matches_tag_sets(&[
        vec!["hostname=host_1".into()],
        vec!["region=eu-west-1".into()],
    ]));
    assert!(!s.matches_tag_sets(&[
        vec!["hostname=host_1".into()],
        vec!["region=us-east-1".into()],
    ]));
}
