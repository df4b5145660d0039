//! Performance benchmarks across realistic embedding dimensions.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use veilvec::Client;

/// Embedding widths seen in practice: MiniLM, SBERT, OpenAI small/large.
const DIMENSIONS: &[usize] = &[384, 768, 1536, 3072];

fn generate_embedding(dimension: usize) -> Vec<f32> {
    (0..dimension).map(|i| (i as f32 * 0.37).sin()).collect()
}

fn bench_client() -> Client {
    Client::new(&[0x2Au8; 32], 1.5, 1).unwrap()
}

fn vector_encrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_encrypt");
    let client = bench_client();

    for dimension in DIMENSIONS {
        let embedding = generate_embedding(*dimension);
        group.throughput(Throughput::Elements(*dimension as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(dimension),
            &embedding,
            |b, embedding| {
                b.iter(|| client.encrypt_vector(black_box(embedding)).unwrap());
            },
        );
    }

    group.finish();
}

fn vector_decrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_decrypt");
    let client = bench_client();

    for dimension in DIMENSIONS {
        let embedding = generate_embedding(*dimension);
        let (ciphertext, metadata) = client.encrypt_vector(&embedding).unwrap();

        group.throughput(Throughput::Elements(*dimension as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(dimension),
            &(ciphertext, metadata),
            |b, (ciphertext, metadata)| {
                b.iter(|| {
                    client
                        .decrypt_vector(black_box(ciphertext), black_box(metadata))
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn deterministic_encrypt(c: &mut Criterion) {
    let client = bench_client();
    let field = "category:quarterly-reports/region:emea";

    c.bench_function("deterministic_encrypt", |b| {
        b.iter(|| client.encrypt_deterministic(black_box(field)).unwrap());
    });
}

fn text_encrypt(c: &mut Criterion) {
    let client = bench_client();
    let payload = "x".repeat(4096);

    c.bench_function("text_encrypt_4k", |b| {
        b.iter(|| client.encrypt_text(black_box(&payload)).unwrap());
    });
}

criterion_group!(
    benches,
    vector_encrypt,
    vector_decrypt,
    deterministic_encrypt,
    text_encrypt
);
criterion_main!(benches);
