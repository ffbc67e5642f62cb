use std::collections::HashMap;
use tokio::sync::mpsc::{Receiver, Sender};
use tracing::{debug, info, warn};

use super::stats::{Stat, StatMessage};
use crate::command::executor::{DoOptions, HlQueryExecutor};
use crate::command::query::HlQuery;

/// Stat labels for one query label: total, planning, requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLabels {
    pub total: String,
    pub plan: String,
    pub request: String,
}

impl StatLabels {
    pub fn for_label(label: &str) -> Self {
        Self {
            total: label.to_string(),
            plan: format!("{}-qp", label),
            request: format!("{}-req", label),
        }
    }
}

/// Runs queries from `rx` one at a time until the channel closes. With
/// `prewarm_queries` each query runs twice and the second run reports as
/// warm.
pub async fn run_worker_loop(
    id: usize,
    executor: HlQueryExecutor,
    do_options: DoOptions,
    prewarm_queries: bool,
    mut rx: Receiver<HlQuery>,
    stats: Sender<StatMessage>,
) {
    info!(target: "cqlbench::runner", worker = id, "Worker started");
    let mut labels: HashMap<String, StatLabels> = HashMap::new();
    let mut processed = 0u64;

    while let Some(query) = rx.recv().await {
        let labels = labels
            .entry(query.human_label.clone())
            .or_insert_with(|| StatLabels::for_label(&query.human_label));

        if !run_once(&executor, &query, &do_options, labels, false, &stats).await {
            break;
        }
        if prewarm_queries && !run_once(&executor, &query, &do_options, labels, true, &stats).await {
            break;
        }
        processed += 1;
    }

    info!(target: "cqlbench::runner", worker = id, processed, "Worker stopped");
}

/// Returns false once the stats processor has gone away.
async fn run_once(
    executor: &HlQueryExecutor,
    query: &HlQuery,
    opts: &DoOptions,
    labels: &StatLabels,
    warm: bool,
    stats: &Sender<StatMessage>,
) -> bool {
    let messages = match executor.do_query(query, opts).await {
        Ok(outcome) => {
            debug!(
                target: "cqlbench::runner",
                id = query.id,
                total_ms = outcome.total_ms(),
                warm,
                "Query done"
            );
            vec![
                StatMessage::Stat(Stat::total(&labels.total, outcome.total_ms(), warm)),
                StatMessage::Stat(Stat::partial(&labels.plan, outcome.plan_lag_ms, warm)),
                StatMessage::Stat(Stat::partial(&labels.request, outcome.request_lag_ms, warm)),
            ]
        }
        Err(e) => {
            e.log_error();
            vec![StatMessage::Failure(labels.total.clone())]
        }
    };

    for msg in messages {
        if stats.send(msg).await.is_err() {
            warn!(target: "cqlbench::runner", "Stats channel closed, stopping worker");
            return false;
        }
    }
    true
}
