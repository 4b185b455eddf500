//! Streaming line matcher.
//!
//! Input is read into a buffer that starts at 64 KiB and doubles whenever a
//! single line does not fit. Complete lines are scanned as they arrive; a
//! final line without a trailing newline is still a line.

use crate::error::{GrepError, PatternError};
use crate::output::Printer;
use memchr::{memchr, memchr_iter, memrchr};
use regex::bytes::{Regex, RegexBuilder};
use regex_syntax::ParserBuilder;
use regex_syntax::hir::Look;
use std::collections::VecDeque;
use std::io::{self, Read, Write};

/// Initial read buffer size
pub const INITIAL_BUFFER: usize = 64 * 1024;

/// grep-style output switches
#[derive(Debug, Clone, Default)]
pub struct GrepOptions {
    /// -c: print per-file match counts
    pub count: bool,
    /// -l: print names of matching files
    pub files_only: bool,
    /// -h: omit file names
    pub no_filename: bool,
    /// -n: print line numbers
    pub line_numbers: bool,
    /// -B: lines of leading context
    pub before_context: usize,
    /// -A: lines of trailing context
    pub after_context: usize,
}

impl GrepOptions {
    fn prints_lines(&self) -> bool {
        !self.count && !self.files_only
    }
}

/// What scanning one file produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileSummary {
    /// Matching lines seen (at most 1 with -l, which stops early)
    pub matches: u64,
}

/// Build the line matcher for `pattern`
pub fn build_matcher(pattern: &str, case_insensitive: bool) -> Result<Regex, PatternError> {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| PatternError::Regex {
            pattern: pattern.to_string(),
            source,
        })
}

/// Whether searching a run of lines finds the same lines as matching each
/// line alone. Text-start and text-end assertions hold only at the edges of
/// the run, so patterns using them are matched a line at a time.
fn run_search_is_exact(regex: &Regex) -> bool {
    let parsed = ParserBuilder::new()
        .multi_line(true)
        .utf8(false)
        .build()
        .parse(regex.as_str());
    match parsed {
        Ok(hir) => {
            let looks = hir.properties().look_set();
            !looks.contains(Look::Start) && !looks.contains(Look::End)
        }
        Err(_) => false,
    }
}

/// Grep engine: a matcher, its options and an output sink
pub struct Grep<W: Write> {
    regex: Regex,
    opts: GrepOptions,
    printer: Printer<W>,
    buf: Vec<u8>,
    /// Skip ahead with one search over many lines
    skip_ahead: bool,
}

impl<W: Write> Grep<W> {
    pub fn new(regex: Regex, opts: GrepOptions, out: W) -> Self {
        let printer = Printer::new(out, !opts.no_filename, opts.line_numbers);
        let skip_ahead = run_search_is_exact(&regex);
        Self {
            regex,
            opts,
            printer,
            buf: Vec::new(),
            skip_ahead,
        }
    }

    /// Scan `input`, printing results under the name `path`.
    ///
    /// Read failures affect only this file and come back as
    /// [`GrepError::Read`]; output failures are [`GrepError::Write`].
    pub fn search<R: Read>(&mut self, mut input: R, path: &str) -> Result<FileSummary, GrepError> {
        if self.buf.len() < INITIAL_BUFFER {
            self.buf.resize(INITIAL_BUFFER, 0);
        }

        let mut scan = FileScan::new(path, &self.opts, self.skip_ahead);
        let (mut start, mut end) = (0, 0);

        while !scan.done {
            if end == self.buf.len() {
                if start > 0 {
                    self.buf.copy_within(start..end, 0);
                    end -= start;
                    start = 0;
                } else {
                    // A single line fills the buffer
                    let len = self.buf.len() * 2;
                    self.buf.resize(len, 0);
                }
            }

            let n = match input.read(&mut self.buf[end..]) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(GrepError::Read {
                        path: path.to_string(),
                        source,
                    });
                }
            };

            if n == 0 {
                if start < end {
                    scan.scan(&self.regex, &self.opts, &mut self.printer, &self.buf[start..end])?;
                }
                break;
            }
            end += n;

            if let Some(last) = memrchr(b'\n', &self.buf[start..end]) {
                let chunk_end = start + last + 1;
                scan.scan(&self.regex, &self.opts, &mut self.printer, &self.buf[start..chunk_end])?;
                start = chunk_end;
                if start == end {
                    start = 0;
                    end = 0;
                }
            }
        }

        if self.opts.count && !self.opts.files_only && scan.matches > 0 {
            self.printer
                .print_count(path, scan.matches)
                .map_err(GrepError::Write)?;
        }

        Ok(FileSummary {
            matches: scan.matches,
        })
    }

    pub fn flush(&mut self) -> Result<(), GrepError> {
        self.printer.flush().map_err(GrepError::Write)
    }

    pub fn get_ref(&self) -> &W {
        self.printer.get_ref()
    }

    pub fn into_inner(self) -> W {
        self.printer.into_inner()
    }
}

/// Per-file scanning state
struct FileScan<'a> {
    path: &'a str,
    /// Number of the last line consumed
    line: u64,
    matches: u64,
    /// -l found its match; stop reading
    done: bool,
    skip_ahead: bool,
    before_cap: usize,
    after_cap: usize,
    before: VecDeque<(u64, Vec<u8>)>,
    after_remaining: usize,
    last_printed: Option<u64>,
}

impl<'a> FileScan<'a> {
    fn new(path: &'a str, opts: &GrepOptions, skip_ahead: bool) -> Self {
        let lines = opts.prints_lines();
        Self {
            path,
            line: 0,
            matches: 0,
            done: false,
            skip_ahead,
            before_cap: if lines { opts.before_context } else { 0 },
            after_cap: if lines { opts.after_context } else { 0 },
            before: VecDeque::new(),
            after_remaining: 0,
            last_printed: None,
        }
    }

    /// Nothing pending that needs every line to be looked at
    fn can_skip(&self) -> bool {
        self.skip_ahead && self.before_cap == 0 && self.after_remaining == 0
    }

    /// Process a run of whole lines. Every line ends in `\n` except possibly
    /// the last one at end of input.
    fn scan<W: Write>(
        &mut self,
        regex: &Regex,
        opts: &GrepOptions,
        printer: &mut Printer<W>,
        chunk: &[u8],
    ) -> Result<(), GrepError> {
        let mut pos = 0;
        while pos < chunk.len() && !self.done {
            if self.can_skip() {
                // Jump to the line holding the next match, if any
                match regex.find_at(chunk, pos) {
                    None => {
                        self.line += memchr_iter(b'\n', &chunk[pos..]).count() as u64;
                        return Ok(());
                    }
                    Some(m) => {
                        let line_start = memrchr(b'\n', &chunk[pos..m.start()]).map_or(pos, |i| pos + i + 1);
                        self.line += memchr_iter(b'\n', &chunk[pos..line_start]).count() as u64;
                        pos = line_start;
                        if pos >= chunk.len() {
                            return Ok(());
                        }
                    }
                }
            }

            let line_end = memchr(b'\n', &chunk[pos..]).map_or(chunk.len(), |i| pos + i);
            self.handle_line(regex, opts, printer, &chunk[pos..line_end])?;
            pos = line_end + 1;
        }
        Ok(())
    }

    fn handle_line<W: Write>(
        &mut self,
        regex: &Regex,
        opts: &GrepOptions,
        printer: &mut Printer<W>,
        text: &[u8],
    ) -> Result<(), GrepError> {
        self.line += 1;
        let n = self.line;

        if regex.is_match(text) {
            self.matches += 1;
            if opts.files_only {
                self.done = true;
                return printer.print_file_name(self.path).map_err(GrepError::Write);
            }
            if opts.count {
                return Ok(());
            }

            while let Some((ln, before)) = self.before.pop_front() {
                self.emit(printer, ln, &before, false)?;
            }
            self.emit(printer, n, text, true)?;
            self.after_remaining = self.after_cap;
        } else if self.after_remaining > 0 {
            self.after_remaining -= 1;
            self.emit(printer, n, text, false)?;
        } else if self.before_cap > 0 {
            if self.before.len() == self.before_cap {
                self.before.pop_front();
            }
            self.before.push_back((n, text.to_vec()));
        }
        Ok(())
    }

    fn emit<W: Write>(
        &mut self,
        printer: &mut Printer<W>,
        n: u64,
        text: &[u8],
        is_match: bool,
    ) -> Result<(), GrepError> {
        let with_context = self.before_cap > 0 || self.after_cap > 0;
        let adjacent = self.last_printed.is_some_and(|last| last + 1 == n);
        if with_context && !adjacent {
            printer.start_group().map_err(GrepError::Write)?;
        }
        self.last_printed = Some(n);

        let result = if is_match {
            printer.print_match_line(self.path, n, text)
        } else {
            printer.print_context_line(self.path, n, text)
        };
        result.map_err(GrepError::Write)
    }
}
