use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to read queries: {0}")]
    Input(#[from] std::io::Error),

    #[error("malformed query on input line {line}: {source}")]
    Decode {
        line: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("stats processor stopped unexpectedly: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl RunnerError {
    pub fn log_error(&self) {
        error!(target: "cqlbench::runner", "Benchmark run failed: {}", self);
    }
}
