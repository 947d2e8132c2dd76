use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use ppmac::{Config, Decoder, Encoder};

fn sample_text() -> Vec<u8> {
    let text = include_bytes!("../src/ppm.rs");
    text.iter().cycle().take(64 * 1024).cloned().collect()
}

fn bench_orders(c: &mut Criterion) {
    let input = sample_text();
    let mut group = c.benchmark_group("ppm");
    group.throughput(Throughput::Bytes(input.len() as u64));

    for &order in &[0, 2, 4] {
        let config = Config::with_order(order);
        group.bench_function(format!("compress/order{}", order), |b| {
            b.iter(|| {
                Encoder::new(config)
                    .unwrap()
                    .compress(Cursor::new(&input[..]), vec![])
                    .unwrap()
            })
        });

        let compressed = Encoder::new(config)
            .unwrap()
            .compress(Cursor::new(&input[..]), vec![])
            .unwrap();
        group.bench_function(format!("decompress/order{}", order), |b| {
            b.iter(|| {
                Decoder::new(config)
                    .unwrap()
                    .decompress(Cursor::new(&compressed[..]), vec![])
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_orders);
criterion_main!(benches);
