use anyhow::Context;
use cassandra_query_bench::command::executor::{AggregationStrategy, DoOptions, HlQueryExecutor};
use cassandra_query_bench::engine::session::{
    MemorySession, SharedSession, TimeoutSession, build_client_side_index,
};
use cassandra_query_bench::logging;
use cassandra_query_bench::runner::{RunnerOptions, run_benchmark};
use cassandra_query_bench::shared::config::CONFIG;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::info;

/// Replays high-level queries against a wide-row series store, planning
/// each one against a client-side index of the stored series.
#[derive(Parser)]
#[command(name = "cassandra_query_bench")]
struct Args {
    /// Where aggregating queries aggregate (choices: server, client)
    #[arg(long)]
    aggregation_plan: Option<AggregationStrategy>,

    /// Number of concurrent workers
    #[arg(long)]
    workers: Option<usize>,

    /// Debug level: 1 logs planning, 2 dumps every wire query
    #[arg(long)]
    debug: Option<u8>,

    /// Print every response to stderr
    #[arg(long)]
    print_responses: bool,

    /// Run each query twice and report the second run as warm
    #[arg(long)]
    prewarm_queries: bool,

    /// Stop after this many queries (0 = all)
    #[arg(long)]
    limit: Option<u64>,

    /// JSON-lines query file; stdin when omitted
    #[arg(long)]
    queries: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = &*CONFIG;
    logging::init(&cfg.logging)?;

    let aggregation_plan = match args.aggregation_plan {
        Some(plan) => plan,
        None => cfg
            .query
            .aggregation_plan
            .parse::<AggregationStrategy>()
            .map_err(anyhow::Error::msg)?,
    };

    info!(
        target: "cqlbench::bootstrap",
        url = %cfg.session.url,
        keyspace = %cfg.session.keyspace,
        dataset = %cfg.session.dataset_path,
        "Opening session"
    );
    let dataset = std::fs::File::open(&cfg.session.dataset_path)
        .with_context(|| format!("opening dataset {}", cfg.session.dataset_path))?;
    let store: SharedSession = Arc::new(MemorySession::load_json_lines(std::io::BufReader::new(dataset))?);

    let index = build_client_side_index(
        store.as_ref(),
        Duration::from_millis(cfg.session.startup_timeout_ms),
    )
    .await?;
    info!(target: "cqlbench::bootstrap", series = index.len(), "Client-side index ready");

    let session: SharedSession = Arc::new(TimeoutSession::new(
        store,
        Duration::from_millis(cfg.session.request_timeout_ms),
    ));
    let executor = HlQueryExecutor::new(session, Arc::new(index));

    let opts = RunnerOptions {
        workers: args.workers.unwrap_or(cfg.query.workers),
        limit: args.limit.unwrap_or(cfg.query.limit),
        prewarm_queries: args.prewarm_queries || cfg.query.prewarm_queries,
        print_interval: cfg.query.print_interval,
        do_options: DoOptions {
            aggregation_plan,
            debug: args.debug.unwrap_or(cfg.query.debug),
            pretty_print_responses: args.print_responses || cfg.query.print_responses,
        },
    };

    let queries = args
        .queries
        .or_else(|| cfg.query.queries_path.as_ref().map(PathBuf::from));
    let run = match queries {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("opening queries {}", path.display()))?;
            run_benchmark(BufReader::new(file), executor, &opts).await
        }
        None => run_benchmark(BufReader::new(tokio::io::stdin()), executor, &opts).await,
    };
    let stats = run.inspect_err(|e| e.log_error())?;

    println!(
        "run complete after {} queries with {} workers:",
        stats.completed(),
        opts.workers.max(1)
    );
    stats.write_report(&mut std::io::stdout().lock())?;
    Ok(())
}
