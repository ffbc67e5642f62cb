use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::command::query::HlQuery;
use crate::engine::errors::ExecutorError;
use crate::engine::index::ClientSideIndex;
use crate::engine::plan::{CqlResult, QueryPlan};
use crate::engine::session::SharedSession;

/// Where aggregating queries do their aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationStrategy {
    #[default]
    Server,
    Client,
}

impl FromStr for AggregationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "server" => Ok(AggregationStrategy::Server),
            "client" => Ok(AggregationStrategy::Client),
            other => Err(format!(
                "invalid aggregation plan {:?} (choices: server, client)",
                other
            )),
        }
    }
}

impl fmt::Display for AggregationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationStrategy::Server => f.write_str("server"),
            AggregationStrategy::Client => f.write_str("client"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DoOptions {
    pub aggregation_plan: AggregationStrategy,
    /// 0 is quiet; 1 logs planning; 2 also dumps every wire query.
    pub debug: u8,
    pub pretty_print_responses: bool,
}

/// Results of one query plus where its time went.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub results: Vec<CqlResult>,
    pub plan_lag_ms: f64,
    pub request_lag_ms: f64,
}

impl QueryOutcome {
    pub fn total_ms(&self) -> f64 {
        self.plan_lag_ms + self.request_lag_ms
    }
}

/// Lowers high-level queries into plans against one index and runs them on
/// one session. Cheap to clone; both collaborators are shared.
#[derive(Clone)]
pub struct HlQueryExecutor {
    session: SharedSession,
    index: Arc<ClientSideIndex>,
}

impl HlQueryExecutor {
    pub fn new(session: SharedSession, index: Arc<ClientSideIndex>) -> Self {
        Self { session, index }
    }

    pub fn index(&self) -> &ClientSideIndex {
        &self.index
    }

    /// Picks the plan from the query's shape:
    /// no aggregation and no for-every clause runs unaggregated,
    /// a for-every clause without aggregation runs for-every,
    /// anything aggregating uses the strategy from `opts`.
    pub fn plan(&self, query: &HlQuery, opts: &DoOptions) -> Result<QueryPlan, ExecutorError> {
        let plan = match (query.has_aggregation(), query.has_for_every()) {
            (false, false) => query.to_query_plan_no_aggregation(&self.index)?,
            (false, true) => query.to_query_plan_for_every(&self.index)?,
            (true, _) => match opts.aggregation_plan {
                AggregationStrategy::Server => query.to_query_plan_with_server_aggregation(&self.index)?,
                AggregationStrategy::Client => query.to_query_plan_without_server_aggregation(&self.index)?,
            },
        };
        Ok(plan)
    }

    pub async fn do_query(&self, query: &HlQuery, opts: &DoOptions) -> Result<QueryOutcome, ExecutorError> {
        if opts.debug >= 1 {
            info!(target: "cqlbench::executor", "[hlqe] Do: {}", query);
        }

        let plan_start = Instant::now();
        let planned = self.plan(query, opts);
        let plan_lag_ms = elapsed_ms(plan_start);

        if opts.debug >= 1 {
            info!(target: "cqlbench::executor", "[hlqe] query planning took {:.3}ms", plan_lag_ms);
        }
        let plan = planned?;
        if opts.debug >= 1 {
            plan.debug_queries(opts.debug);
        }

        let kind = plan.kind();
        let exec_start = Instant::now();
        let results = plan.execute(self.session.as_ref()).await?;
        let request_lag_ms = elapsed_ms(exec_start);

        debug!(
            target: "cqlbench::executor",
            id = query.id,
            plan = %kind,
            rows = results.len(),
            plan_lag_ms,
            request_lag_ms,
            "Query finished"
        );

        if opts.pretty_print_responses {
            let stderr = std::io::stderr();
            render_results(query.id, &results, &mut stderr.lock())?;
        }

        Ok(QueryOutcome {
            results,
            plan_lag_ms,
            request_lag_ms,
        })
    }
}

/// Writes one `ID {id}: [{start}, {end}] -> {values}` line per result.
pub fn render_results<W: Write>(id: u64, results: &[CqlResult], out: &mut W) -> std::io::Result<()> {
    for r in results {
        writeln!(
            out,
            "ID {}: [{}, {}] -> {:?}",
            id,
            r.time_interval.start(),
            r.time_interval.end(),
            r.values
        )?;
    }
    Ok(())
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_nanos() as f64 / 1e6
}

impl fmt::Debug for HlQueryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HlQueryExecutor")
            .field("series", &self.index.len())
            .finish()
    }
}

