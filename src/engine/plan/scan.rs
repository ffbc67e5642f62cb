use crate::engine::errors::QueryPlanError;
use crate::engine::plan::cql::CqlQuery;
use crate::engine::session::{Row, Session};

/// Whether to keep reading rows of the current wire query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    Continue,
    Stop,
}

/// Runs one wire query, feeding each row to `on_row` until it stops or the
/// rows run out. The cursor is always closed; a close failure fails the
/// query.
pub async fn run_query<F>(
    session: &dyn Session,
    query: &CqlQuery,
    mut on_row: F,
) -> Result<(), QueryPlanError>
where
    F: FnMut(&Row) -> Result<ScanControl, QueryPlanError> + Send,
{
    let mut iter = session
        .query(&query.preparable_query_string, &query.args)
        .await;

    let mut outcome = Ok(());
    while let Some(row) = iter.scan().await {
        match on_row(&row) {
            Ok(ScanControl::Continue) => {}
            Ok(ScanControl::Stop) => break,
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }

    let closed = iter.close().await;
    outcome?;
    closed.map_err(QueryPlanError::from)
}
