use blob_store::s3::signing::{sign, SigningContext};
use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};


fn signing_benchmark(c: &mut Criterion) {
    let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let body = vec![42u8; 1024 * 1024];

    c.bench_function("sign empty body", |b| b.iter(|| {
        let ctx = SigningContext::new(
            "GET",
            black_box("blob-key"),
            "bucket.s3.us-east-1.amazonaws.com",
            "us-east-1",
            "AKIDEXAMPLE",
            "secret",
            timestamp,
            None,
        );
        sign(&ctx, None)
    }));

    c.bench_function("sign 1MiB body", |b| b.iter(|| {
        let ctx = SigningContext::new(
            "PUT",
            black_box("blob-key"),
            "bucket.s3.us-east-1.amazonaws.com",
            "us-east-1",
            "AKIDEXAMPLE",
            "secret",
            timestamp,
            Some(body.as_slice()),
        );
        sign(&ctx, Some(body.len()))
    }));
}

criterion_group!(benches, signing_benchmark);
criterion_main!(benches);
