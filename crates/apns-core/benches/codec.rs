//! Codec benchmarks

use apns_core::{DeviceToken, FeedbackDecoder, FeedbackRecord, NotificationFrame, Payload};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn encode_benchmark(c: &mut Criterion) {
    let payload = Payload::builder()
        .alert("Benchmark notification")
        .badge(7)
        .sound("default")
        .build()
        .unwrap();
    let token = DeviceToken::from_bytes(vec![0xAB; 32]).unwrap();

    c.bench_function("encode_notification_frame", |b| {
        b.iter(|| {
            black_box(
                NotificationFrame::new(token.clone(), &payload)
                    .encode()
                    .unwrap(),
            )
        })
    });
}

fn feedback_benchmark(c: &mut Criterion) {
    let mut stream = Vec::new();
    for i in 0..100u32 {
        let token = DeviceToken::from_bytes(vec![i as u8; 32]).unwrap();
        stream.extend_from_slice(&FeedbackRecord::new(i, token).encode());
    }

    c.bench_function("decode_feedback_100", |b| {
        b.iter(|| {
            let mut decoder = FeedbackDecoder::with_capacity(stream.len());
            for chunk in stream.chunks(512) {
                decoder.push(chunk);
                black_box(decoder.drain().unwrap());
            }
        })
    });
}

criterion_group!(benches, encode_benchmark, feedback_benchmark);
criterion_main!(benches);
