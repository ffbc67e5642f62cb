use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::errors::SessionError;
use crate::engine::session::{CqlValue, Row, RowIter, Session, VecRowIter};

enum Reply {
    Rows(Vec<Vec<CqlValue>>),
    Fail(SessionError),
}

/// Session stub answering by substring match on the statement or on any
/// text argument, and recording every query issued.
pub struct ScriptedSession {
    rules: Vec<(String, Reply)>,
    calls: Arc<Mutex<Vec<(String, Vec<CqlValue>)>>>,
    row_delay: Option<Duration>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            row_delay: None,
        }
    }

    pub fn respond_matching(mut self, pattern: &str, rows: Vec<Vec<CqlValue>>) -> Self {
        self.rules.push((pattern.to_string(), Reply::Rows(rows)));
        self
    }

    /// Shorthand for `(timestamp_ns, value)` rows.
    pub fn respond_points(self, pattern: &str, points: &[(i64, f64)]) -> Self {
        let rows = points
            .iter()
            .map(|(ts, v)| vec![CqlValue::BigInt(*ts), CqlValue::Double(*v)])
            .collect();
        self.respond_matching(pattern, rows)
    }

    /// Shorthand for single-value rows.
    pub fn respond_values(self, pattern: &str, values: &[f64]) -> Self {
        let rows = values.iter().map(|v| vec![CqlValue::Double(*v)]).collect();
        self.respond_matching(pattern, rows)
    }

    pub fn fail_matching(mut self, pattern: &str, error: SessionError) -> Self {
        self.rules.push((pattern.to_string(), Reply::Fail(error)));
        self
    }

    pub fn with_row_delay(mut self, delay: Duration) -> Self {
        self.row_delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(stmt, args)| matches(pattern, stmt, args))
            .count()
    }

    pub fn statements(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(s, _)| s.clone()).collect()
    }
}

fn matches(pattern: &str, statement: &str, args: &[CqlValue]) -> bool {
    statement.contains(pattern)
        || args
            .iter()
            .filter_map(CqlValue::as_text)
            .any(|a| a.contains(pattern))
}

#[async_trait]
impl Session for ScriptedSession {
    async fn query(&self, statement: &str, args: &[CqlValue]) -> Box<dyn RowIter> {
        self.calls
            .lock()
            .push((statement.to_string(), args.to_vec()));

        let reply = self
            .rules
            .iter()
            .find(|(pattern, _)| matches(pattern, statement, args))
            .map(|(_, reply)| reply);

        let inner = match reply {
            Some(Reply::Rows(rows)) => {
                VecRowIter::new(rows.iter().cloned().map(Row::new).collect())
            }
            Some(Reply::Fail(e)) => VecRowIter::failed(e.clone()),
            None => VecRowIter::new(Vec::new()),
        };

        Box::new(DelayedRowIter {
            inner,
            delay: self.row_delay,
        })
    }
}

struct DelayedRowIter {
    inner: VecRowIter,
    delay: Option<Duration>,
}

#[async_trait]
impl RowIter for DelayedRowIter {
    async fn scan(&mut self) -> Option<Row> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.scan().await
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.inner.close().await
    }
}
