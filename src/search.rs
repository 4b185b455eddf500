//! One search from pattern to printed lines.

use crate::error::{GrepError, Result, SearchError};
use crate::grep::{Grep, GrepOptions, build_matcher};
use crate::index::PostingSource;
use crate::index::paths::path_from_bytes;
use crate::opener::FilterRegistry;
use crate::profile::{Counters, Profile};
use crate::query::{CandidateFilter, Query, QueryExecutor, compile};
use std::io::Write;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything the command line decides about a search
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub pattern: String,
    pub case_insensitive: bool,
    /// -f: regex over the full indexed path
    pub file_regex: Option<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Skip the trigram query and scan every indexed file
    pub brute: bool,
    pub grep: GrepOptions,
}

/// Result of a search; output has already been written
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub counters: Counters,
}

impl SearchOutcome {
    /// At least one line matched
    pub fn matched(&self) -> bool {
        self.counters.files_matched > 0
    }
}

/// Run a search over `source`, writing grep output to `out`
pub fn run<S, W>(
    source: &S,
    opts: &SearchOptions,
    opener: &FilterRegistry,
    out: W,
    profile: &mut Profile,
) -> Result<SearchOutcome>
where
    S: PostingSource + ?Sized,
    W: Write,
{
    let start = Instant::now();
    let regex = build_matcher(&opts.pattern, opts.case_insensitive)?;
    let filter = CandidateFilter::new(opts.file_regex.as_deref(), &opts.include, &opts.exclude)?;
    let query = if opts.brute {
        Query::All
    } else {
        compile(&opts.pattern, opts.case_insensitive)?
    };
    profile.record("compile", start.elapsed());
    info!(query = %query, "compiled");
    if query.is_none() {
        debug!("pattern cannot match any line");
    } else if query.is_all() && !opts.brute {
        debug!("no trigrams required, scanning every file");
    }
    profile.query = Some(query.to_string());

    let ids = profile.time("query", || QueryExecutor::new(source).execute(&query))?;
    info!(candidates = ids.len(), "posting query");

    let mut counters = Counters {
        candidates: ids.len(),
        ..Counters::default()
    };

    let ids = profile.time("filter", || filter.apply(source, ids))?;
    info!(candidates = ids.len(), "after file name filter");
    counters.filtered = ids.len();

    let start = Instant::now();
    let mut grep = Grep::new(regex, opts.grep.clone(), out);
    for id in ids {
        let name = source.name(id)?;
        let stream = match opener.open(&path_from_bytes(source.name_bytes(id)?)) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(path = %name, error = %e, "cannot open file");
                counters.read_errors += 1;
                continue;
            }
        };

        match grep.search(stream, &name) {
            Ok(summary) => {
                if summary.matches > 0 {
                    debug!(path = %name, matches = summary.matches, "matched");
                    counters.files_matched += 1;
                    counters.matches += summary.matches;
                }
            }
            Err(GrepError::Read { path, source: e }) => {
                warn!(path = %path, error = %e, "read failed");
                counters.read_errors += 1;
            }
            Err(GrepError::Write(e)) => return Err(SearchError::Output(e)),
        }
    }
    grep.flush().map_err(|e| match e {
        GrepError::Write(e) | GrepError::Read { source: e, .. } => SearchError::Output(e),
    })?;
    profile.record("scan", start.elapsed());

    profile.counters = counters.clone();
    Ok(SearchOutcome { counters })
}
