use anyhow::{Result, anyhow};
use clap::{ArgAction, Parser};
use csearch::grep::GrepOptions;
use csearch::index::{IndexReader, PostingSource, paths};
use csearch::opener::FilterRegistry;
use csearch::profile::Profile;
use csearch::query::validate_glob;
use csearch::search::{self, SearchOptions};
use std::io::{self, BufWriter, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Search indexed files for lines matching a regular expression.
///
/// The index is read from $CSEARCHINDEX, or ~/.csearchindex when unset.
#[derive(Parser)]
#[command(name = "csearch")]
#[command(version)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Regular expression to search for
    pattern: String,

    /// Search only files whose path matches this regular expression
    #[arg(short = 'f', value_name = "REGEXP")]
    file_regex: Option<String>,

    /// Case-insensitive search
    #[arg(short = 'i')]
    ignore_case: bool,

    /// Print only a count of matching lines per file
    #[arg(short = 'c')]
    count: bool,

    /// Omit file names from the output
    #[arg(short = 'h')]
    no_filename: bool,

    /// Print only the names of matching files
    #[arg(short = 'l')]
    files_only: bool,

    /// Print line numbers
    #[arg(short = 'n')]
    line_numbers: bool,

    /// Print NUM lines of trailing context
    #[arg(short = 'A', value_name = "NUM")]
    after_context: Option<usize>,

    /// Print NUM lines of leading context
    #[arg(short = 'B', value_name = "NUM")]
    before_context: Option<usize>,

    /// Print NUM lines of context on both sides
    #[arg(short = 'C', value_name = "NUM")]
    context: Option<usize>,

    /// Search only files whose base name matches this glob (repeatable)
    #[arg(long, value_name = "GLOB", value_parser = parse_glob)]
    include: Vec<String>,

    /// Skip files whose base name matches this glob (repeatable)
    #[arg(long, value_name = "GLOB", value_parser = parse_glob)]
    exclude: Vec<String>,

    /// Log the trigram query, index roots and candidate counts
    #[arg(long)]
    verbose: bool,

    /// Scan every indexed file instead of querying the index
    #[arg(long)]
    brute: bool,

    /// Write phase timings as JSON to this file
    #[arg(long, value_name = "FILE")]
    cpuprofile: Option<PathBuf>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

fn parse_glob(s: &str) -> std::result::Result<String, String> {
    validate_glob(s).map(|_| s.to_string()).map_err(|e| e.to_string())
}

impl Cli {
    fn search_options(&self) -> SearchOptions {
        SearchOptions {
            pattern: self.pattern.clone(),
            case_insensitive: self.ignore_case,
            file_regex: self.file_regex.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            brute: self.brute,
            grep: GrepOptions {
                count: self.count,
                files_only: self.files_only,
                no_filename: self.no_filename,
                line_numbers: self.line_numbers,
                before_context: self.before_context.or(self.context).unwrap_or(0),
                after_context: self.after_context.or(self.context).unwrap_or(0),
            },
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Log to stderr only (stdout carries results)
    let default_filter = if cli.verbose { "csearch=info" } else { "csearch=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("csearch: {e}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether anything matched
fn run(cli: &Cli) -> Result<bool> {
    let opts = cli.search_options();
    let mut profile = Profile::new(&opts.pattern);

    let index_path = paths::index_file()?;
    let start = Instant::now();
    let reader = IndexReader::open(&index_path)?;
    profile.record("open", start.elapsed());
    info!(
        path = %index_path.display(),
        files = reader.file_count(),
        trigrams = reader.trigram_count(),
        "opened index"
    );
    for root in reader.roots()? {
        info!(root = %root, "indexed root");
    }

    let opener = FilterRegistry::standard()?;
    let out = BufWriter::new(io::stdout().lock());
    let result = search::run(&reader, &opts, &opener, out, &mut profile);

    if let Some(path) = &cli.cpuprofile {
        profile
            .write(path)
            .map_err(|e| anyhow!("cannot write profile {}: {e}", path.display()))?;
    }

    Ok(result?.matched())
}
