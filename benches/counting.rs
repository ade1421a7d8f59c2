use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};
use ngramlm::{CounterConfig, Estimator, ModelConfig, NGramCounter, Vocabulary};

const WORDS: [&str; 12] = [
    "the", "a", "cat", "dog", "sat", "ran", "on", "under", "mat", "table", "quickly", "slowly",
];

fn build_corpus(sentences: usize) -> Vec<String> {
    (0..sentences)
        .map(|idx| {
            let len = 4 + idx % 9;
            (0..len)
                .map(|pos| WORDS[(idx * 7 + pos * 5 + pos * pos) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn bench_counting(c: &mut Criterion) {
    let corpus = build_corpus(20_000);
    let total_bytes: usize = corpus.iter().map(|line| line.len() + 1).sum();

    let mut group = c.benchmark_group("count_corpus");
    group.throughput(Throughput::Bytes(total_bytes as u64));
    group.sampling_mode(SamplingMode::Flat);
    for order in [1usize, 3, 5] {
        let cfg = CounterConfig::builder()
            .max_order(order)
            .show_progress(false)
            .build()
            .expect("configuration");
        group.bench_with_input(BenchmarkId::new("order", order), &cfg, |b, cfg| {
            b.iter(|| {
                let counter = NGramCounter::new(cfg.clone());
                let artifacts = counter.count_sentences(&corpus).expect("counting");
                let _ = black_box(artifacts);
            });
        });
    }
    group.finish();
}

fn bench_estimation(c: &mut Criterion) {
    let corpus = build_corpus(5_000);
    let counter_cfg = CounterConfig::builder()
        .max_order(3)
        .show_progress(false)
        .build()
        .expect("configuration");
    let mut tables = NGramCounter::new(counter_cfg)
        .count_sentences(&corpus)
        .expect("counting")
        .tables;
    let vocab: Vocabulary = WORDS.iter().copied().chain(["unseen"]).collect();
    vocab.close(&mut tables);

    let model_cfg = ModelConfig::builder()
        .delta(0.01)
        .show_progress(false)
        .build()
        .expect("configuration");
    c.bench_function("estimate_closed_trigrams", |b| {
        b.iter(|| {
            let model = Estimator::new(model_cfg.clone())
                .estimate(&tables)
                .expect("estimation");
            let _ = black_box(model.to_text().expect("rendering"));
        });
    });
}

criterion_group!(benches, bench_counting, bench_estimation);
criterion_main!(benches);
