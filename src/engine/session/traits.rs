use async_trait::async_trait;
use std::sync::Arc;

use super::value::{CqlValue, Row};
use crate::engine::errors::SessionError;

/// Streaming cursor over the rows of one wire query. Streaming failures end
/// the scan and are reported by `close`.
#[async_trait]
pub trait RowIter: Send {
    async fn scan(&mut self) -> Option<Row>;

    async fn close(&mut self) -> Result<(), SessionError>;
}

/// Pooled client for the wide-row store. Implementations own their own
/// synchronization and are shared by every executor in the process.
#[async_trait]
pub trait Session: Send + Sync {
    async fn query(&self, statement: &str, args: &[CqlValue]) -> Box<dyn RowIter>;
}

pub type SharedSession = Arc<dyn Session>;

/// Cursor over rows already materialized in memory.
pub struct VecRowIter {
    rows: std::vec::IntoIter<Row>,
    error: Option<SessionError>,
}

impl VecRowIter {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
            error: None,
        }
    }

    /// Cursor that yields no rows and fails on close.
    pub fn failed(error: SessionError) -> Self {
        Self {
            rows: Vec::new().into_iter(),
            error: Some(error),
        }
    }
}

#[async_trait]
impl RowIter for VecRowIter {
    async fn scan(&mut self) -> Option<Row> {
        if self.error.is_some() {
            return None;
        }
        self.rows.next()
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
