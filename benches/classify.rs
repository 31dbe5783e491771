//! Classification throughput against a populated index.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use knowsync::{
    CandidateStrategy, ContentHasher, DuplicateDetector, FingerprintEntry, FingerprintIndex,
    LexicalScorer, normalize,
};
use std::hint::black_box;

fn populated_index(entries: usize) -> FingerprintIndex {
    let mut index = FingerprintIndex::new();
    for i in 0..entries {
        let canonical = normalize(&format!(
            "note {i} covering subject {} with a few shared words in every entry",
            i % 7
        ));
        let hash = ContentHasher::hash(&canonical);
        index.upsert(FingerprintEntry::new(hash, canonical, format!("src-{i}"), 100));
    }
    index
}

fn bench_classify(c: &mut Criterion) {
    let scorer = LexicalScorer;
    let probe = normalize("note covering a subject with a few shared words and a twist");
    let probe_hash = ContentHasher::hash(&probe);

    let mut group = c.benchmark_group("classify");
    for entries in [100usize, 1_000] {
        let index = populated_index(entries);

        group.bench_with_input(
            BenchmarkId::new("full_scan", entries),
            &index,
            |b, index| {
                let detector =
                    DuplicateDetector::new(index, &scorer, 0.8, CandidateStrategy::FullScan);
                b.iter(|| black_box(detector.classify(black_box(&probe), &probe_hash)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("length_banded", entries),
            &index,
            |b, index| {
                let detector = DuplicateDetector::new(
                    index,
                    &scorer,
                    0.8,
                    CandidateStrategy::LengthBanded { tolerance_pct: 40 },
                );
                b.iter(|| black_box(detector.classify(black_box(&probe), &probe_hash)));
            },
        );
    }
    group.finish();
}

fn bench_normalize_and_hash(c: &mut Criterion) {
    let raw = "Meeting notes 2026-01-15 09:30:00: reviewed the   Deployment \
               checklist, migrations look FINE, rollback rehearsed at 14:00:00.";

    c.bench_function("normalize", |b| b.iter(|| black_box(normalize(black_box(raw)))));

    let canonical = normalize(raw);
    c.bench_function("hash", |b| {
        b.iter(|| black_box(ContentHasher::hash(black_box(&canonical))));
    });
}

criterion_group!(benches, bench_classify, bench_normalize_and_hash);
criterion_main!(benches);
