use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use entdiff_benches::available_corpora;
use entdiff_core::RenderConfig;

fn bench_changes(c: &mut Criterion) {
    let mut group = c.benchmark_group("changes");
    for corpus in available_corpora() {
        let dataset = corpus.load().expect("failed to load dataset");
        group.throughput(Throughput::Elements(corpus.item_count() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(corpus.name()),
            &dataset,
            |b, dataset| {
                b.iter(|| {
                    let changes = dataset.changes().expect("comparable dataset");
                    black_box(changes);
                });
            },
        );
    }
    group.finish();
}

fn bench_self_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("self-comparison");
    for corpus in available_corpora() {
        let dataset = corpus.load().expect("failed to load dataset");
        let copy = dataset.initial().clone();
        group.throughput(Throughput::Elements(corpus.item_count() as u64));
        group.bench_function(corpus.name(), |b| {
            b.iter(|| {
                let same = dataset.compare(dataset.initial(), &copy).expect("comparable");
                black_box(same);
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let config = RenderConfig::default();
    let mut group = c.benchmark_group("render");
    for corpus in available_corpora() {
        let dataset = corpus.load().expect("failed to load dataset");
        let changes = dataset.changes().expect("comparable").expect("dataset changed");
        group.throughput(Throughput::Elements(changes.summary().total() as u64));
        group.bench_function(corpus.name(), |b| {
            b.iter(|| {
                let rendered = changes.render(&config);
                black_box(rendered);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_changes, bench_self_comparison, bench_render);
criterion_main!(benches);
