use std::hint::black_box;

use bmcp_ratelimit::MultiWindowLimiter;
use bmcp_ratelimit::RateLimiter;
use bmcp_ratelimit::TokenBucket;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;

fn bench_token_bucket(c: &mut Criterion) {
    let bucket = TokenBucket::new(u32::MAX, u32::MAX);

    c.bench_function("token_bucket_try_consume", |b| b.iter(|| black_box(bucket.try_consume(black_box(1)))));
}

fn bench_multi_window(c: &mut Criterion) {
    let limiter = MultiWindowLimiter::new(u32::MAX, u32::MAX);

    c.bench_function("multi_window_try_consume", |b| b.iter(|| black_box(limiter.try_consume(black_box(1)))));

    // Exhausted limiter exercises the denial path
    let exhausted = MultiWindowLimiter::new(1, 1);
    let _ = exhausted.try_acquire(1);
    c.bench_function("multi_window_denied", |b| b.iter(|| black_box(exhausted.try_acquire(black_box(1)))));
}

criterion_group!(benches, bench_token_bucket, bench_multi_window);
criterion_main!(benches);
