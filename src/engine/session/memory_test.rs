use crate::engine::errors::SessionError;
use crate::engine::session::{CqlValue, MemorySession, Row, Session};
use indoc::indoc;

const SERIES: &str = "cpu,hostname=host_0#usage_user#2016-01-01";

fn seeded() -> MemorySession {
    let session = MemorySession::new();
    for (ts, v) in [(10, 1.0), (20, 5.0), (30, 3.0), (40, 7.0)] {
        session.insert("series_double", SERIES, ts, v);
    }
    session.insert("series_bigint", "mem,hostname=host_0#used#2016-01-01", 10, 2.0);
    session
}

async fn collect(session: &MemorySession, stmt: &str, args: &[CqlValue]) -> (Vec<Row>, Result<(), SessionError>) {
    let mut iter = session.query(stmt, args).await;
    let mut rows = Vec::new();
    while let Some(row) = iter.scan().await {
        rows.push(row);
    }
    (rows, iter.close().await)
}

fn range_args(start: i64, end: i64) -> Vec<CqlValue> {
    vec![SERIES.into(), start.into(), end.into()]
}

#[tokio::test]
async fn distinct_series_ids_per_table() {
    let session = seeded();
    let (rows, closed) = collect(&session, "SELECT DISTINCT series_id FROM series_double", &[]).await;
    closed.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].scan_text().unwrap(), SERIES);

    let (rows, _) = collect(&session, "SELECT DISTINCT series_id FROM series_blob", &[]).await;
    assert!(rows.is_empty());
}

#[tokio::test]
async fn server_aggregates_over_half_open_range() {
    let session = seeded();
    let cases = vec![("max", 5.0), ("min", 1.0), ("sum", 9.0), ("avg", 3.0), ("count", 3.0)];
    for (function, expected) in cases {
        let stmt = format!(
            "SELECT {}(value) FROM series_double WHERE series_id = ? AND timestamp_ns >= ? AND timestamp_ns < ?",
            function
        );
        let (rows, closed) = collect(&session, &stmt, &range_args(10, 40)).await;
        closed.unwrap();
        assert_eq!(rows.len(), 1, "{}", function);
        assert_eq!(rows[0].scan_value().unwrap(), expected, "{}", function);
    }
}

#[tokio::test]
async fn server_max_over_empty_range_returns_no_row() {
    let session = seeded();
    let stmt = "SELECT max(value) FROM series_double WHERE series_id = ? AND timestamp_ns >= ? AND timestamp_ns < ?";
    let (rows, closed) = collect(&session, stmt, &range_args(100, 200)).await;
    closed.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn raw_scan_descending_with_limit() {
    let session = seeded();
    let stmt = "SELECT timestamp_ns, value FROM series_double WHERE series_id = ? AND timestamp_ns >= ? AND timestamp_ns < ? ORDER BY timestamp_ns DESC LIMIT 2";
    let (rows, closed) = collect(&session, stmt, &range_args(0, 100)).await;
    closed.unwrap();
    let scanned: Vec<(i64, f64)> = rows.iter().map(|r| r.scan_timestamped().unwrap()).collect();
    assert_eq!(scanned, vec![(40, 7.0), (30, 3.0)]);
}

#[tokio::test]
async fn raw_scan_ascending() {
    let session = seeded();
    let stmt = "SELECT timestamp_ns, value FROM series_double WHERE series_id = ? AND timestamp_ns >= ? AND timestamp_ns < ?";
    let (rows, _) = collect(&session, stmt, &range_args(20, 40)).await;
    let scanned: Vec<(i64, f64)> = rows.iter().map(|r| r.scan_timestamped().unwrap()).collect();
    assert_eq!(scanned, vec![(20, 5.0), (30, 3.0)]);
}

#[tokio::test]
async fn unsupported_statement_surfaces_on_close() {
    let session = seeded();
    let (rows, closed) = collect(&session, "DROP TABLE series_double", &[]).await;
    assert!(rows.is_empty());
    assert!(matches!(closed, Err(SessionError::UnsupportedStatement(_))));
}

#[tokio::test]
async fn bad_arguments_surface_on_close() {
    let session = seeded();
    let stmt = "SELECT timestamp_ns, value FROM series_double WHERE series_id = ? AND timestamp_ns >= ? AND timestamp_ns < ?";
    let (_, closed) = collect(&session, stmt, &[CqlValue::BigInt(1)]).await;
    assert!(matches!(closed, Err(SessionError::BadArgument { position: 0, .. })));
}

#[test]
fn loads_json_lines_dataset() {
    let data = indoc! {r#"
        {"table": "series_double", "series_id": "cpu,hostname=host_0#usage_user#2016-01-01", "timestamp_ns": 1, "value": 0.5}

        {"table": "series_double", "series_id": "cpu,hostname=host_0#usage_user#2016-01-01", "timestamp_ns": 2, "value": 1.5}
    "#};
    let session = MemorySession::load_json_lines(data.as_bytes()).unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (rows, _) = rt.block_on(collect(
        &session,
        "SELECT timestamp_ns, value FROM series_double WHERE series_id = ? AND timestamp_ns >= ? AND timestamp_ns < ?",
        &range_args(0, 10),
    ));
    assert_eq!(rows.len(), 2);
}

#[test]
fn rejects_malformed_dataset_line() {
    let err = MemorySession::load_json_lines("not json\n".as_bytes())
        .err()
        .expect("malformed line should fail");
    assert!(matches!(err, SessionError::Io(msg) if msg.starts_with("dataset line 1")));
}
