use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use super::traits::{RowIter, Session, SharedSession};
use super::value::{CqlValue, Row};
use crate::engine::errors::SessionError;

/// Applies one read timeout to every row fetch of every query issued
/// through the wrapped session.
pub struct TimeoutSession {
    inner: SharedSession,
    timeout: Duration,
}

impl TimeoutSession {
    pub fn new(inner: SharedSession, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl Session for TimeoutSession {
    async fn query(&self, statement: &str, args: &[CqlValue]) -> Box<dyn RowIter> {
        let inner = self.inner.query(statement, args).await;
        Box::new(TimeoutRowIter {
            inner,
            timeout: self.timeout,
            timed_out: false,
        })
    }
}

struct TimeoutRowIter {
    inner: Box<dyn RowIter>,
    timeout: Duration,
    timed_out: bool,
}

#[async_trait]
impl RowIter for TimeoutRowIter {
    async fn scan(&mut self) -> Option<Row> {
        if self.timed_out {
            return None;
        }
        match tokio::time::timeout(self.timeout, self.inner.scan()).await {
            Ok(row) => row,
            Err(_) => {
                warn!(
                    target: "cqlbench::session",
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Row fetch timed out"
                );
                self.timed_out = true;
                None
            }
        }
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        let closed = self.inner.close().await;
        if self.timed_out {
            return Err(SessionError::Timeout(self.timeout.as_millis() as u64));
        }
        closed
    }
}
