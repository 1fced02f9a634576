//! Filtered read and pagination benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reldb_bench::{generate_notes, populated_store};
use reldb_core::{Config, Filter};

/// Benchmark paging through every note of one user.
fn bench_paged_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("paged_match");

    for count in [1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let store = populated_store(Config::default(), &generate_notes(count, 8, 32));
            let filters = [Filter::matching("users", "user-3")];

            b.iter(|| {
                let mut last_id = None;
                loop {
                    let page = store
                        .get_filtered(last_id.as_deref(), &filters, 50, false)
                        .unwrap();
                    if page.entries.is_empty() {
                        break;
                    }
                    last_id = page.last_id;
                }
                black_box(last_id);
            });
        });
    }
    group.finish();
}

/// Benchmark combined match and inverse-match filters.
fn bench_combined_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("combined_filters");
    let store = populated_store(Config::default(), &generate_notes(5_000, 8, 32));

    group.bench_function("match_and_inverse", |b| {
        let filters = [
            Filter::matching("users", "user-1"),
            Filter::inverse_matching("tags", "red"),
        ];
        b.iter(|| {
            let page = store.get_filtered(None, &filters, 0, false).unwrap();
            black_box(page.entries.len());
        });
    });

    group.bench_function("all_inverse", |b| {
        let filters = [
            Filter::inverse_matching("tags", "red"),
            Filter::inverse_matching("tags", "blue"),
        ];
        b.iter(|| {
            let page = store.get_filtered(None, &filters, 100, true).unwrap();
            black_box(page.entries.len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_paged_match, bench_combined_filters);

criterion_main!(benches);
