//! Merge engine and full-run benchmarks.
//!
//! Measures:
//! 1. Merging into files of growing size, with and without new declarations
//! 2. A complete generation run against an in-memory project
//!
//! Run with: `cargo bench --package svckit-codegen --bench merge`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::fmt::Write as _;
use std::hint::black_box;
use svckit_codegen::{Declaration, GenerateOptions, ServiceFactory, merge};
use svckit_files::MemoryStore;

fn existing_file(items: usize) -> String {
    let mut out = String::new();
    for i in 0..items {
        let _ = writeln!(out, "pub struct Item{i} {{\n    pub value: u64,\n}}\n");
        let _ = writeln!(out, "impl Item{i} {{\n    pub fn value(&self) -> u64 {{\n        self.value\n    }}\n}}\n");
    }
    out
}

fn offers(items: usize, fresh: usize) -> Vec<Declaration> {
    (0..items + fresh)
        .map(|i| {
            let item = syn::parse_str(&format!("pub struct Item{i} {{ pub value: u64 }}")).unwrap_or_else(|e| panic!("{e}"));
            Declaration::new(item).unwrap_or_else(|e| panic!("{e}"))
        })
        .collect()
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for items in [10, 100, 1000] {
        let existing = existing_file(items);
        group.throughput(Throughput::Bytes(existing.len() as u64));

        group.bench_with_input(BenchmarkId::new("all_present", items), &items, |b, &items| {
            b.iter(|| {
                let outcome = merge("src/bench.rs", Some(&existing), offers(items, 0));
                black_box(outcome)
            });
        });

        group.bench_with_input(BenchmarkId::new("ten_missing", items), &items, |b, &items| {
            b.iter(|| {
                let outcome = merge("src/bench.rs", Some(&existing), offers(items, 10));
                black_box(outcome)
            });
        });
    }

    group.finish();
}

fn project(methods: usize) -> MemoryStore {
    let mut pb = String::from("use crate::autogen::Context;\npub struct Status;\npub trait BenchService {\n");
    let mut messages = String::new();
    for i in 0..methods {
        let _ = writeln!(
            pb,
            "    fn method_{i}(&self, ctx: &Context, request: Request{i}) -> Result<Response{i}, Status>;"
        );
        let _ = writeln!(messages, "pub struct Request{i};\npub struct Response{i};");
    }
    pb.push_str("}\n");
    pb.push_str(&messages);

    let mut store = MemoryStore::new();
    store.add_file("src/pb/bench.rs", pb).unwrap_or_else(|e| panic!("{e}"));
    store
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");
    group.sample_size(20);

    for methods in [1, 10, 50] {
        group.bench_with_input(BenchmarkId::new("fresh", methods), &methods, |b, &methods| {
            b.iter(|| {
                let mut store = project(methods);
                let report = ServiceFactory::new("/bench", &GenerateOptions::default(), &mut store)
                    .and_then(|mut factory| factory.create());
                black_box(report)
            });
        });

        group.bench_with_input(BenchmarkId::new("rerun", methods), &methods, |b, &methods| {
            let mut store = project(methods);
            ServiceFactory::new("/bench", &GenerateOptions::default(), &mut store)
                .and_then(|mut factory| factory.create())
                .unwrap_or_else(|e| panic!("{e}"));
            b.iter(|| {
                let report = ServiceFactory::new("/bench", &GenerateOptions::default(), &mut store)
                    .and_then(|mut factory| factory.create());
                black_box(report)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_merge, bench_full_run);
criterion_main!(benches);
