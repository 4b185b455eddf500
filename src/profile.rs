//! Phase timings for `--cpuprofile`.
//!
//! Each phase of a search records its wall-clock duration; the result is
//! written as a JSON document once the search finishes, matches or not.

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct Phase {
    pub name: &'static str,
    pub millis: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Counters {
    /// Files returned by the posting query
    pub candidates: usize,
    /// Files left after name filtering
    pub filtered: usize,
    /// Files with at least one matching line
    pub files_matched: usize,
    /// Matching lines across all files
    pub matches: u64,
    /// Files skipped because they could not be read
    pub read_errors: usize,
}

/// Timings and counters of one search
#[derive(Debug, Serialize)]
pub struct Profile {
    pub pattern: String,
    pub query: Option<String>,
    pub phases: Vec<Phase>,
    pub counters: Counters,
    pub total_millis: f64,
    #[serde(skip)]
    started: Instant,
}

impl Profile {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            query: None,
            phases: Vec::new(),
            counters: Counters::default(),
            total_millis: 0.0,
            started: Instant::now(),
        }
    }

    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        self.phases.push(Phase {
            name,
            millis: elapsed.as_secs_f64() * 1000.0,
        });
    }

    /// Time `f` as phase `name`
    pub fn time<T>(&mut self, name: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let value = f();
        self.record(name, start.elapsed());
        value
    }

    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.phases.iter().find(|p| p.name == name)
    }

    /// Stamp the total and write the profile as JSON
    pub fn write(&mut self, path: &Path) -> io::Result<()> {
        self.total_millis = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut out, self)?;
        out.write_all(b"\n")?;
        out.flush()
    }
}
