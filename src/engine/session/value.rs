use crate::engine::errors::SessionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bound argument or a cell of a returned row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CqlValue {
    BigInt(i64),
    Double(f64),
    Text(String),
}

impl CqlValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<i64> {
        match self {
            CqlValue::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; bigints widen to f64 the way the driver scans a
    /// `bigint` column into a float destination.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            CqlValue::Double(v) => Some(*v),
            CqlValue::BigInt(v) => Some(*v as f64),
            CqlValue::Text(_) => None,
        }
    }
}

impl fmt::Display for CqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CqlValue::BigInt(v) => write!(f, "{}", v),
            CqlValue::Double(v) => write!(f, "{}", v),
            CqlValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for CqlValue {
    fn from(v: i64) -> Self {
        CqlValue::BigInt(v)
    }
}

impl From<f64> for CqlValue {
    fn from(v: f64) -> Self {
        CqlValue::Double(v)
    }
}

impl From<&str> for CqlValue {
    fn from(v: &str) -> Self {
        CqlValue::Text(v.to_string())
    }
}

impl From<String> for CqlValue {
    fn from(v: String) -> Self {
        CqlValue::Text(v)
    }
}

/// One row returned by the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Row(pub Vec<CqlValue>);

impl Row {
    pub fn new(cells: Vec<CqlValue>) -> Self {
        Self(cells)
    }

    /// Scans a single pre-aggregated `(value)` row.
    pub fn scan_value(&self) -> Result<f64, SessionError> {
        match self.0.as_slice() {
            [cell] => cell
                .as_double()
                .ok_or_else(|| SessionError::Scan(format!("expected number, got {}", cell))),
            cells => Err(SessionError::Scan(format!(
                "expected 1 column, got {}",
                cells.len()
            ))),
        }
    }

    /// Scans a raw `(timestamp_ns, value)` row.
    pub fn scan_timestamped(&self) -> Result<(i64, f64), SessionError> {
        match self.0.as_slice() {
            [ts, value] => {
                let ts = ts
                    .as_bigint()
                    .ok_or_else(|| SessionError::Scan(format!("expected bigint, got {}", ts)))?;
                let value = value
                    .as_double()
                    .ok_or_else(|| SessionError::Scan(format!("expected number, got {}", value)))?;
                Ok((ts, value))
            }
            cells => Err(SessionError::Scan(format!(
                "expected 2 columns, got {}",
                cells.len()
            ))),
        }
    }

    /// Scans a single `(text)` row, e.g. a series id.
    pub fn scan_text(&self) -> Result<String, SessionError> {
        match self.0.as_slice() {
            [CqlValue::Text(s)] => Ok(s.clone()),
            cells => Err(SessionError::Scan(format!(
                "expected 1 text column, got {:?}",
                cells
            ))),
        }
    }
}
