//! Performance benchmarks for csearch
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use csearch::grep::{Grep, GrepOptions, build_matcher};
use csearch::index::{IndexReader, IndexWriter};
use csearch::query::{QueryExecutor, compile};

/// An in-memory index over generated source files
fn create_benchmark_index() -> (IndexReader, Vec<String>) {
    let mut writer = IndexWriter::new();
    let mut contents = Vec::new();
    for i in 0..500 {
        let content = format!(
            r#"// File {i}
fn function_{i}() {{
    println!("Hello from function {i}");
    let x = {i} * 2;
    let y = x + 1;
}}

struct Struct{i} {{
    field: i32,
    name: String,
}}
"#
        );
        writer.add_file(format!("src/file_{i}.rs"), content.as_bytes());
        contents.push(content);
    }
    let reader = IndexReader::from_bytes(writer.to_bytes()).expect("Failed to read index");
    (reader, contents)
}

const PATTERNS: &[&str] = &[
    "function",
    "Hello from",
    "Struct4[0-9]+",
    "(field|name): ",
    "fn [a-z_]+42\\(",
    "[A-Z][a-z]+",
];

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    for pattern in PATTERNS {
        group.bench_with_input(BenchmarkId::from_parameter(pattern), pattern, |b, &p| {
            b.iter(|| compile(black_box(p), false))
        });
    }
    group.bench_function("case_insensitive", |b| {
        b.iter(|| compile(black_box("HelloFromFunction"), true))
    });
    group.finish();
}

fn bench_execute(c: &mut Criterion) {
    let (reader, _) = create_benchmark_index();
    let mut group = c.benchmark_group("execute");
    for pattern in PATTERNS {
        let query = compile(pattern, false).expect("Failed to compile");
        group.bench_with_input(BenchmarkId::from_parameter(pattern), &query, |b, q| {
            b.iter(|| QueryExecutor::new(&reader).execute(black_box(q)))
        });
    }
    group.finish();
}

fn bench_grep(c: &mut Criterion) {
    let (_, contents) = create_benchmark_index();
    let corpus = contents.concat();

    let mut group = c.benchmark_group("grep");
    for pattern in ["function_49", "let [xy]"] {
        group.bench_function(pattern, |b| {
            let regex = build_matcher(pattern, false).expect("Failed to build matcher");
            let mut grep = Grep::new(regex, GrepOptions::default(), std::io::sink());
            b.iter(|| grep.search(black_box(corpus.as_bytes()), "corpus"))
        });
    }
    group.finish();
}

fn bench_index_open(c: &mut Criterion) {
    let mut writer = IndexWriter::new();
    for i in 0..500 {
        writer.add_file(format!("f{i}"), format!("line {i} of text").as_bytes());
    }
    let bytes = writer.to_bytes();

    c.bench_function("index_from_bytes", |b| {
        b.iter(|| IndexReader::from_bytes(black_box(bytes.clone())))
    });
}

criterion_group!(benches, bench_compile, bench_execute, bench_grep, bench_index_open);

criterion_main!(benches);
