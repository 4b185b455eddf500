//! Output formatting for grep-style search results.
//!
//! Lines are written as raw bytes: whatever the file contains is passed
//! through untouched, followed by a single `\n`.

use std::io::{self, Write};

/// Writes match, context, count and file-name records
pub struct Printer<W: Write> {
    out: W,
    with_filename: bool,
    line_numbers: bool,
    /// Whether a context group has been printed (so the next one needs `--`)
    printed_group: bool,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, with_filename: bool, line_numbers: bool) -> Self {
        Self {
            out,
            with_filename,
            line_numbers,
            printed_group: false,
        }
    }

    /// Print a matching line: `path:` `lineno:` line
    pub fn print_match_line(&mut self, path: &str, line_num: u64, content: &[u8]) -> io::Result<()> {
        self.print_line(path, line_num, content, b':')
    }

    /// Print a context line (non-matching): `path-` `lineno-` line
    pub fn print_context_line(&mut self, path: &str, line_num: u64, content: &[u8]) -> io::Result<()> {
        self.print_line(path, line_num, content, b'-')
    }

    fn print_line(&mut self, path: &str, line_num: u64, content: &[u8], sep: u8) -> io::Result<()> {
        if self.with_filename {
            self.out.write_all(path.as_bytes())?;
            self.out.write_all(&[sep])?;
        }
        if self.line_numbers {
            write!(self.out, "{}", line_num)?;
            self.out.write_all(&[sep])?;
        }
        self.out.write_all(content)?;
        self.out.write_all(b"\n")
    }

    /// Mark the start of a context group, printing `--` if one came before
    pub fn start_group(&mut self) -> io::Result<()> {
        if self.printed_group {
            self.out.write_all(b"--\n")?;
        }
        self.printed_group = true;
        Ok(())
    }

    /// Print only filenames (for -l flag)
    pub fn print_file_name(&mut self, path: &str) -> io::Result<()> {
        self.out.write_all(path.as_bytes())?;
        self.out.write_all(b"\n")
    }

    /// Print match count for a file (for -c flag)
    pub fn print_count(&mut self, path: &str, count: u64) -> io::Result<()> {
        if self.with_filename {
            self.out.write_all(path.as_bytes())?;
            self.out.write_all(b":")?;
        }
        writeln!(self.out, "{}", count)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(with_filename: bool, line_numbers: bool, f: impl FnOnce(&mut Printer<Vec<u8>>)) -> String {
        let mut printer = Printer::new(Vec::new(), with_filename, line_numbers);
        f(&mut printer);
        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[test]
    fn test_match_line_formats() {
        let s = render(true, true, |p| p.print_match_line("a.txt", 3, b"hello").unwrap());
        assert_eq!(s, "a.txt:3:hello\n");
        let s = render(true, false, |p| p.print_match_line("a.txt", 3, b"hello").unwrap());
        assert_eq!(s, "a.txt:hello\n");
        let s = render(false, true, |p| p.print_match_line("a.txt", 3, b"hello").unwrap());
        assert_eq!(s, "3:hello\n");
        let s = render(false, false, |p| p.print_match_line("a.txt", 3, b"hello").unwrap());
        assert_eq!(s, "hello\n");
    }

    #[test]
    fn test_context_line_uses_dashes() {
        let s = render(true, true, |p| p.print_context_line("a.txt", 4, b"ctx").unwrap());
        assert_eq!(s, "a.txt-4-ctx\n");
    }

    #[test]
    fn test_counts_and_names() {
        let s = render(true, false, |p| {
            p.print_count("a.txt", 2).unwrap();
            p.print_file_name("b.txt").unwrap();
        });
        assert_eq!(s, "a.txt:2\nb.txt\n");
        let s = render(false, false, |p| p.print_count("a.txt", 2).unwrap());
        assert_eq!(s, "2\n");
    }

    #[test]
    fn test_group_separator() {
        let s = render(false, false, |p| {
            p.start_group().unwrap();
            p.print_match_line("x", 1, b"one").unwrap();
            p.start_group().unwrap();
            p.print_match_line("x", 9, b"two").unwrap();
        });
        assert_eq!(s, "one\n--\ntwo\n");
    }

    #[test]
    fn test_bytes_are_verbatim() {
        let mut printer = Printer::new(Vec::new(), false, false);
        printer.print_match_line("x", 1, b"\xff\xfe\r").unwrap();
        assert_eq!(printer.into_inner(), b"\xff\xfe\r\n");
    }
}
