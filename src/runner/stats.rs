use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use tokio::sync::mpsc::Receiver;
use tracing::debug;

pub const LABEL_ALL_QUERIES: &str = "all queries";
pub const LABEL_COLD_QUERIES: &str = "cold queries";
pub const LABEL_WARM_QUERIES: &str = "warm queries";
pub const WARM_SUFFIX: &str = " (warm)";

/// One latency measurement in milliseconds. Partial stats time a phase of a
/// query (planning, requests) rather than the whole query.
#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    pub label: String,
    pub value: f64,
    pub is_warm: bool,
    pub is_partial: bool,
}

impl Stat {
    pub fn total(label: &str, value: f64, is_warm: bool) -> Self {
        Self::labeled(label, value, is_warm, false)
    }

    pub fn partial(label: &str, value: f64, is_warm: bool) -> Self {
        Self::labeled(label, value, is_warm, true)
    }

    fn labeled(label: &str, value: f64, is_warm: bool, is_partial: bool) -> Self {
        let label = if is_warm {
            format!("{}{}", label, WARM_SUFFIX)
        } else {
            label.to_string()
        };
        Self {
            label,
            value,
            is_warm,
            is_partial,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatMessage {
    Stat(Stat),
    Failure(String),
}

/// Streaming summary of one label's measurements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatGroup {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub sum: f64,
    pub count: u64,
    values: Vec<f64>,
    // Welford running state for the standard deviation.
    m: f64,
    s: f64,
}

impl StatGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, n: f64) {
        if self.count == 0 {
            self.min = n;
            self.max = n;
            self.mean = n;
            self.sum = n;
            self.count = 1;
            self.values.push(n);
            self.m = n;
            self.s = 0.0;
            return;
        }

        self.min = self.min.min(n);
        self.max = self.max.max(n);
        self.sum += n;
        self.mean = (self.mean * self.count as f64 + n) / (self.count + 1) as f64;
        self.values.push(n);
        self.count += 1;

        let old_m = self.m;
        self.m += (n - old_m) / self.count as f64;
        self.s += (n - old_m) * (n - self.m);
    }

    pub fn median(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }

    pub fn std_dev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.s / (self.count - 1) as f64).sqrt()
    }
}

impl fmt::Display for StatGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min: {:8.2}ms, med: {:8.2}ms, mean: {:8.2}ms, max: {:7.2}ms, stddev: {:8.2}ms, sum: {:5.1}sec, count: {}",
            self.min,
            self.median(),
            self.mean,
            self.max,
            self.std_dev(),
            self.sum / 1e3,
            self.count
        )
    }
}

/// Folds stats from every worker into per-label groups.
#[derive(Debug, Clone)]
pub struct StatProcessor {
    prewarm_queries: bool,
    print_interval: u64,
    limit: u64,
    groups: BTreeMap<String, StatGroup>,
    failures: BTreeMap<String, u64>,
    completed: u64,
}

impl StatProcessor {
    pub fn new(prewarm_queries: bool, print_interval: u64, limit: u64) -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(LABEL_ALL_QUERIES.to_string(), StatGroup::new());
        if prewarm_queries {
            groups.insert(LABEL_COLD_QUERIES.to_string(), StatGroup::new());
            groups.insert(LABEL_WARM_QUERIES.to_string(), StatGroup::new());
        }
        Self {
            prewarm_queries,
            print_interval,
            limit,
            groups,
            failures: BTreeMap::new(),
            completed: 0,
        }
    }

    /// Records a stat. Returns true when an interval report is due.
    pub fn record(&mut self, stat: Stat) -> bool {
        self.groups
            .entry(stat.label.clone())
            .or_default()
            .push(stat.value);

        if stat.is_partial {
            return false;
        }

        self.push_to(LABEL_ALL_QUERIES, stat.value);
        if self.prewarm_queries {
            let bucket = if stat.is_warm {
                LABEL_WARM_QUERIES
            } else {
                LABEL_COLD_QUERIES
            };
            self.push_to(bucket, stat.value);
        }

        // A prewarmed query counts once, on its cold run.
        if !self.prewarm_queries || !stat.is_warm {
            self.completed += 1;
        }

        self.print_interval > 0
            && self.completed % self.print_interval == 0
            && (self.limit == 0 || self.completed < self.limit)
    }

    pub fn record_failure(&mut self, label: &str) {
        *self.failures.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn failed(&self) -> u64 {
        self.failures.values().sum()
    }

    pub fn group(&self, label: &str) -> Option<&StatGroup> {
        self.groups.get(label)
    }

    pub fn failures(&self) -> &BTreeMap<String, u64> {
        &self.failures
    }

    /// Writes every group sorted by label, then the failure counts.
    pub fn write_report<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let width = self.groups.keys().map(String::len).max().unwrap_or(0);
        for (label, group) in &self.groups {
            writeln!(w, "{:<width$}:", label, width = width)?;
            writeln!(w, "{}", group)?;
        }
        for (label, count) in &self.failures {
            writeln!(w, "failed {}: {}", label, count)?;
        }
        Ok(())
    }

    fn push_to(&mut self, label: &str, value: f64) {
        if let Some(group) = self.groups.get_mut(label) {
            group.push(value);
        }
    }
}

/// Drains stats until every sender is gone, printing interval reports to
/// stderr along the way.
pub async fn process_stats(
    mut rx: Receiver<StatMessage>,
    mut processor: StatProcessor,
    workers: usize,
) -> StatProcessor {
    while let Some(msg) = rx.recv().await {
        match msg {
            StatMessage::Stat(stat) => {
                if processor.record(stat) {
                    let stderr = io::stderr();
                    let mut out = stderr.lock();
                    let _ = writeln!(
                        out,
                        "after {} queries with {} workers:",
                        processor.completed(),
                        workers
                    );
                    let _ = processor.write_report(&mut out);
                    let _ = writeln!(out);
                }
            }
            StatMessage::Failure(label) => {
                debug!(target: "cqlbench::runner", label = %label, "Recording failed query");
                processor.record_failure(&label);
            }
        }
    }
    processor
}
