//! Benchmarks for prompt construction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use translation_agent::prompts::{
    build_improvement, build_initial_translation, build_reflection, delimiter_collisions,
};

const SOURCE: &str = "The quick brown fox jumps over the lazy dog. \
                      It was the best of times, it was the worst of times.";
const DRAFT: &str = "敏捷的棕色狐狸跳過了懶狗。那是最好的時代，也是最壞的時代。";
const CRITIQUE: &str = "1. Use 「」 quotation marks.\n2. Prefer 時光 over 時代 in this register.";

fn prompt_benchmark(c: &mut Criterion) {
    c.bench_function("build_initial_translation", |b| {
        b.iter(|| build_initial_translation(black_box("English"), black_box("Chinese"), black_box(SOURCE)))
    });

    c.bench_function("build_reflection_with_locale", |b| {
        b.iter(|| {
            build_reflection(
                black_box("English"),
                black_box("Chinese"),
                black_box(SOURCE),
                black_box(DRAFT),
                black_box(Some("Taiwan")),
            )
        })
    });

    c.bench_function("build_improvement", |b| {
        b.iter(|| {
            build_improvement(
                black_box("English"),
                black_box("Chinese"),
                black_box(SOURCE),
                black_box(DRAFT),
                black_box(CRITIQUE),
            )
        })
    });

    let long_source = SOURCE.repeat(50);
    c.bench_function("delimiter_collisions_long_text", |b| {
        b.iter(|| delimiter_collisions(black_box(&long_source)))
    });
}

criterion_group!(benches, prompt_benchmark);
criterion_main!(benches);
