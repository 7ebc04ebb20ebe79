//! Criterion benchmarks for the front-end pipeline.
//!
//! Run with: `cargo bench --package rotor_core`

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use rotor_core::parser::parser::parse;
use rotor_core::parser::resolver::resolve;
use rotor_core::parser::scanner::Scanner;
use rotor_core::printer::Printer;

const FIXTURE: &str = r#"
function fib(n) {
    if (n < 2) return n;
    return fib(n - 1) + fib(n - 2);
}
var memo = {};
function fibMemo(n) {
    if (memo[n] !== (void 0)) return memo[n];
    var result = n < 2 ? n : fibMemo(n - 1) + fibMemo(n - 2);
    memo[n] = result;
    return result;
}
for (var i = 0; i < 30; i++) {
    fibMemo(i);
}
with (memo) {
    total = 0;
}
"#;

// ---------------------------------------------------------------------------
// Scanner throughput
// ---------------------------------------------------------------------------

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_fixture", |b| {
        b.iter(|| {
            let tokens = Scanner::tokenize_all(black_box(FIXTURE)).unwrap();
            black_box(tokens.len());
        });
    });
}

// ---------------------------------------------------------------------------
// Parser / resolver / printer
// ---------------------------------------------------------------------------

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_fixture", |b| {
        b.iter(|| {
            let program = parse(black_box(FIXTURE)).unwrap();
            black_box(program.body.len());
        });
    });
}

fn bench_resolve(c: &mut Criterion) {
    let program = parse(FIXTURE).unwrap();
    c.bench_function("resolve_fixture", |b| {
        b.iter(|| {
            let resolution = resolve(black_box(&program));
            black_box(resolution.vars.len());
        });
    });
}

fn bench_print_annotated(c: &mut Criterion) {
    let program = parse(FIXTURE).unwrap();
    let resolution = resolve(&program);
    c.bench_function("print_annotated_fixture", |b| {
        b.iter(|| {
            let out = Printer::with_resolution(black_box(&resolution)).print(&program);
            black_box(out.len());
        });
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_parse,
    bench_resolve,
    bench_print_annotated
);
criterion_main!(benches);
