use criterion::{black_box, criterion_group, criterion_main, Criterion};
use subtitle_extractor_rust::{
    is_meaningful, sanitize_label, similarity_ratio, Deduplicator, SrtGenerator, SubtitleEntry,
};

fn bench_similarity(c: &mut Criterion) {
    c.bench_function("similarity_short_strings", |b| {
        b.iter(|| black_box(similarity_ratio("cat", "cats")))
    });

    let a = "The quick brown fox jumps over the lazy dog near the river bank";
    let b_str = "The quick brown fox jumped over a lazy dog near the riverbank";
    c.bench_function("similarity_sentence_pair", |b| {
        b.iter(|| black_box(similarity_ratio(a, b_str)))
    });
}

fn bench_quality_filter(c: &mut Criterion) {
    let samples = [
        "Hello, world!",
        "...",
        "----",
        "你好世界",
        "  ",
        "Chapter 12: The Return",
    ];

    c.bench_function("quality_filter_mixed_samples", |b| {
        b.iter(|| {
            for sample in &samples {
                black_box(is_meaningful(sample));
            }
        })
    });
}

fn bench_sanitizer(c: &mut Criterion) {
    c.bench_function("sanitize_messy_label", |b| {
        b.iter(|| black_box(sanitize_label("What? No:   way / really...", 64)))
    });
}

fn bench_deduplication(c: &mut Criterion) {
    let entries: Vec<SubtitleEntry> = (1..=100)
        .map(|i| SubtitleEntry {
            frame_index: i,
            // Every other entry repeats the previous text with a typo
            text: if i % 2 == 0 {
                format!("Subtitle line number {}x", i - 1)
            } else {
                format!("Subtitle line number {}", i)
            },
            label: format!("frame_{:04}", i),
        })
        .collect();

    let deduplicator = Deduplicator::new();
    c.bench_function("dedup_100_entries", |b| {
        b.iter(|| black_box(deduplicator.deduplicate(entries.clone())))
    });
}

fn bench_srt_generation(c: &mut Criterion) {
    let entries: Vec<SubtitleEntry> = (1..=200)
        .map(|i| SubtitleEntry {
            frame_index: i,
            text: format!("Subtitle line number {}", i),
            label: format!("frame_{:04}", i),
        })
        .collect();

    c.bench_function("srt_200_blocks", |b| {
        b.iter(|| black_box(SrtGenerator::from_entries(&entries, 1.0).generate()))
    });
}

criterion_group!(
    benches,
    bench_similarity,
    bench_quality_filter,
    bench_sanitizer,
    bench_deduplication,
    bench_srt_generation
);
criterion_main!(benches);
