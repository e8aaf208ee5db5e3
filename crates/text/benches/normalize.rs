//! Normalizer throughput benchmark.
//!
//! The normalizer runs on every feedback text in every classification cycle
//! and inside every aggregation pass, so regressions here multiply quickly.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use pulsefit_text::{most_common_words, normalize};

const SAMPLES: &[&str] = &[
    "A academia tá ÓTIMA!!! kkkk adorei os aparelhos novos",
    "vc n vai acreditar, a esteira 3 quebrou de novo... aff",
    "Muito boa a aula de spinning às 6h, professor nota 10",
    "pq o vestiário tbm não é limpo com mais frequência???",
    "Ambiente agradável, equipamentos bem conservados, recomendo.",
];

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_short_feedback", |b| {
        b.iter(|| {
            for sample in SAMPLES {
                black_box(normalize(black_box(sample)));
            }
        })
    });
}

fn bench_most_common_words(c: &mut Criterion) {
    let texts: Vec<String> = SAMPLES
        .iter()
        .cycle()
        .take(200)
        .map(|s| s.to_string())
        .collect();

    c.bench_function("most_common_words_200_texts", |b| {
        b.iter(|| black_box(most_common_words(black_box(&texts), 10)))
    });
}

criterion_group!(benches, bench_normalize, bench_most_common_words);
criterion_main!(benches);
