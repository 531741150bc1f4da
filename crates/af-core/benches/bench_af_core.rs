use af_core::Document;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;
use serde_json::{json, Value};

fn generate_manifest(items: usize) -> Value {
    let mut rng = rand::thread_rng();
    let list: Vec<Value> = (0..items)
        .map(|i| {
            json!({
                "name": format!("service-{i}"),
                "image": format!("registry.example.com/app:{}", rng.gen_range(0..8)),
                "ports": [80, 443],
                "env": {"LOG_LEVEL": "info", "REGION": "eu-west-1"},
            })
        })
        .collect();
    json!({ "services": list })
}

fn bench_from_json(c: &mut Criterion) {
    let manifest = generate_manifest(1000);
    c.bench_function("from_json_1000_services", |b| {
        b.iter(|| black_box(Document::from_json(black_box(&manifest))))
    });
}

fn bench_logical_eq(c: &mut Criterion) {
    let manifest = generate_manifest(200);
    let a = Document::from_json(&manifest);
    let b = Document::from_json(&manifest);
    c.bench_function("logically_eq_200_services", |bench| {
        bench.iter(|| black_box(a.logically_eq(black_box(&b))))
    });
    c.bench_function("to_json_200_services", |bench| {
        bench.iter(|| black_box(a.to_json()))
    });
}

criterion_group!(benches, bench_from_json, bench_logical_eq);
criterion_main!(benches);
