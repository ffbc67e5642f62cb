use futures::future::join_all;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::errors::RunnerError;
use super::stats::{StatProcessor, process_stats};
use super::worker::run_worker_loop;
use crate::command::executor::{DoOptions, HlQueryExecutor};
use crate::command::query::HlQuery;

const QUERY_CHANNEL_CAPACITY: usize = 64;
const STATS_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub workers: usize,
    /// Stop after this many queries; 0 runs the whole input.
    pub limit: u64,
    pub prewarm_queries: bool,
    /// Report intermediate stats every N queries; 0 disables.
    pub print_interval: u64,
    pub do_options: DoOptions,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            limit: 0,
            prewarm_queries: false,
            print_interval: 100,
            do_options: DoOptions::default(),
        }
    }
}

/// Reads JSON-lines queries from `input` and spreads them round-robin over
/// `workers` executors, each running its queries one at a time. Query
/// failures are counted, not fatal; malformed input stops the run.
pub async fn run_benchmark<R>(
    input: R,
    executor: HlQueryExecutor,
    opts: &RunnerOptions,
) -> Result<StatProcessor, RunnerError>
where
    R: AsyncBufRead + Unpin,
{
    let workers = opts.workers.max(1);
    info!(
        target: "cqlbench::runner",
        workers,
        limit = opts.limit,
        prewarm = opts.prewarm_queries,
        aggregation_plan = %opts.do_options.aggregation_plan,
        "Starting benchmark run"
    );

    let (stats_tx, stats_rx) = mpsc::channel(STATS_CHANNEL_CAPACITY);
    let processor = StatProcessor::new(opts.prewarm_queries, opts.print_interval, opts.limit);
    let stats_handle = tokio::spawn(process_stats(stats_rx, processor, workers));

    let mut senders = Vec::with_capacity(workers);
    let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(workers);
    for id in 0..workers {
        let (tx, rx) = mpsc::channel::<HlQuery>(QUERY_CHANNEL_CAPACITY);
        handles.push(tokio::spawn(run_worker_loop(
            id,
            executor.clone(),
            opts.do_options,
            opts.prewarm_queries,
            rx,
            stats_tx.clone(),
        )));
        senders.push(tx);
    }
    drop(stats_tx);

    let dispatched = dispatch(input, &senders, opts.limit).await;
    drop(senders);

    for (id, joined) in join_all(handles).await.into_iter().enumerate() {
        if let Err(e) = joined {
            error!(target: "cqlbench::runner", worker = id, error = %e, "Worker crashed");
        }
    }
    let processor = stats_handle.await?;
    let sent = dispatched?;

    info!(
        target: "cqlbench::runner",
        sent,
        completed = processor.completed(),
        failed = processor.failed(),
        "Benchmark run complete"
    );
    Ok(processor)
}

async fn dispatch<R>(input: R, senders: &[mpsc::Sender<HlQuery>], limit: u64) -> Result<u64, RunnerError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut line_no = 0u64;
    let mut sent = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        if limit > 0 && sent >= limit {
            break;
        }

        let mut query: HlQuery = serde_json::from_str(&line).map_err(|source| RunnerError::Decode {
            line: line_no,
            source,
        })?;
        if query.id == 0 {
            query.id = sent + 1;
        }

        let target = &senders[(sent as usize) % senders.len()];
        if target.send(query).await.is_err() {
            warn!(target: "cqlbench::runner", "Worker channel closed, stopping dispatch");
            break;
        }
        sent += 1;
    }
    Ok(sent)
}
