use af_core::{DedupOptions, Document};
use af_dedup::Deduplicator;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::Rng;
use serde_json::{json, Value};

fn generate_manifest(items: usize) -> Value {
    let mut rng = rand::thread_rng();
    let list: Vec<Value> = (0..items)
        .map(|i| {
            json!({
                "name": format!("service-{i}"),
                "image": format!("registry.example.com/app:{}", rng.gen_range(0..8)),
                "resources": {
                    "limits": {"cpu": "500m", "memory": "512Mi"},
                    "requests": {"cpu": "250m", "memory": "256Mi"},
                },
                "env": [
                    {"name": "LOG_LEVEL", "value": "info"},
                    {"name": "REGION", "value": format!("region-{}", rng.gen_range(0..4))},
                ],
            })
        })
        .collect();
    json!({ "services": list })
}

fn generate_deep(levels: usize) -> Value {
    let mut value = json!({"leaf": "a value long enough to be worth sharing"});
    for i in 0..levels {
        value = json!({"level": i, "left": value.clone(), "right": value});
    }
    value
}

fn bench_manifests(c: &mut Criterion) {
    let dedup = Deduplicator::default();
    for &n in &[100usize, 1000] {
        let doc = Document::from_json(&generate_manifest(n));
        c.bench_function(&format!("dedup_manifest_{n}_services"), |b| {
            b.iter_batched(
                || doc.clone(),
                |mut d| black_box(dedup.run(&mut d)),
                BatchSize::LargeInput,
            )
        });
    }
}

fn bench_bounds(c: &mut Criterion) {
    let doc = Document::from_json(&generate_deep(12));
    for (name, opts) in [
        ("default", DedupOptions::default()),
        ("depth_4", DedupOptions::default().with_max_depth(4)),
        ("width_1", DedupOptions::default().with_max_width(1)),
    ] {
        let dedup = Deduplicator::new(opts);
        c.bench_function(&format!("dedup_deep_12_{name}"), |b| {
            b.iter_batched(
                || doc.clone(),
                |mut d| black_box(dedup.run(&mut d)),
                BatchSize::LargeInput,
            )
        });
    }
}

fn bench_rerun(c: &mut Criterion) {
    let dedup = Deduplicator::default();
    let mut doc = Document::from_json(&generate_manifest(500));
    dedup.run(&mut doc);
    c.bench_function("dedup_rerun_500_services", |b| {
        b.iter_batched(
            || doc.clone(),
            |mut d| black_box(dedup.run(&mut d)),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_manifests, bench_bounds, bench_rerun);
criterion_main!(benches);
