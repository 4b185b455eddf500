//! Shared test corpus: files on disk plus an index over them.

#![allow(dead_code)]

use csearch::index::IndexWriter;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A directory of files and an index whose names are relative to it
pub struct Corpus {
    dir: TempDir,
    index: PathBuf,
}

impl Corpus {
    /// Write `files` under a fresh directory and index them in order
    pub fn new(files: &[(&str, Vec<u8>)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = IndexWriter::new();
        writer.add_root(dir.path().to_str().unwrap());

        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
            // Index the uncompressed text, as the indexer would
            let text = if name.ends_with(".gz") { gunzip(content) } else { content.clone() };
            writer.add_file(*name, &text);
        }

        let index = dir.path().join(".csearchindex");
        writer.write(&index).unwrap();
        Self { dir, index }
    }

    /// The four-file corpus used by the end-to-end scenarios
    pub fn standard() -> Self {
        Self::new(&[
            ("f1.txt", b"hello world\n".to_vec()),
            ("f2.txt", b"goodbye world\n".to_vec()),
            ("f3.txt.gz", gzip(b"the world\n")),
            ("f4.bin", b"nomatch\n".to_vec()),
        ])
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn index(&self) -> &Path {
        &self.index
    }

    /// Run the csearch binary inside the corpus directory
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_csearch"))
            .args(args)
            .current_dir(self.dir.path())
            .env("CSEARCHINDEX", &self.index)
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run csearch")
    }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

pub fn gunzip(data: &[u8]) -> Vec<u8> {
    use std::io::Read;
    let mut out = Vec::new();
    flate2::read::MultiGzDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
