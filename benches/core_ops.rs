use criterion::{criterion_group, criterion_main, Criterion};
use leapdna::bracketed::expand_bracketed;
use leapdna::io::{dump_table, parse_study_table, ReadTableOptions, CSV_TABLE};
use leapdna::test_utilities::random_study;

const NLOCI: usize = 20;
const NALLELES: usize = 24;

fn bench_study_ops(c: &mut Criterion) {
    // create the benchmark group
    let mut group = c.benchmark_group("study");

    // create the test data
    let study = random_study(NLOCI, NALLELES);
    let table = dump_table(&study, &CSV_TABLE).unwrap();

    group.bench_function("to_matrix", |b| {
        b.iter(|| study.to_matrix().len());
    });

    group.bench_function("parse_table", |b| {
        b.iter(|| {
            let parsed = parse_study_table(&table, &ReadTableOptions::default()).unwrap();
            parsed.len()
        });
    });

    // regenerate per iteration: heterozygosity is cached after one read
    group.bench_function("h_exp", |b| {
        b.iter(|| {
            let study = random_study(NLOCI, NALLELES);
            let total: f64 = study.loci().values().map(|locus| locus.h_exp()).sum();
            total
        });
    });
}

fn bench_bracketed(c: &mut Criterion) {
    let mut group = c.benchmark_group("bracketed");

    let pattern = "[ATGC]12 TA [TG]5 [ATAT]3";

    group.bench_function("expand", |b| {
        b.iter(|| expand_bracketed(pattern).len());
    });
}

criterion_group!(benches, bench_study_ops, bench_bracketed);
criterion_main!(benches);
