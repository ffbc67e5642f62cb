use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub session: SessionConfig,
    #[serde(default)]
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    pub url: String,
    pub keyspace: String,
    /// Deadline for building the client-side index at startup.
    pub startup_timeout_ms: u64,
    /// Per-request read deadline once the benchmark is running.
    pub request_timeout_ms: u64,
    /// JSON-lines points loaded into the in-process store.
    pub dataset_path: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryConfig {
    /// "server" or "client"
    #[serde(default = "default_aggregation_plan")]
    pub aggregation_plan: String,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub debug: u8,
    #[serde(default)]
    pub print_responses: bool,
    #[serde(default)]
    pub prewarm_queries: bool,
    #[serde(default = "default_print_interval")]
    pub print_interval: u64,
    /// 0 runs every query in the input
    #[serde(default)]
    pub limit: u64,
    /// Read from stdin when unset
    pub queries_path: Option<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            aggregation_plan: default_aggregation_plan(),
            workers: default_workers(),
            debug: 0,
            print_responses: false,
            prewarm_queries: false,
            print_interval: default_print_interval(),
            limit: 0,
            queries_path: None,
        }
    }
}

fn default_aggregation_plan() -> String {
    "server".to_string()
}

fn default_workers() -> usize {
    1
}

fn default_print_interval() -> u64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("CQLBENCH_CONFIG").unwrap_or_else(|_| "config".to_string());
    load_settings_from(&config_path)
}

pub fn load_settings_from(config_path: &str) -> Result<Settings, config::ConfigError> {
    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(config_path))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
