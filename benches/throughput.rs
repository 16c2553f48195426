use brrtnav::{RouteManifest, Router, RouterConfig};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;

fn example_manifest() -> &'static str {
    r#"
config:
  DEBUG: false
routes:
  - zoo
  - "[zoo]/animals"
  - "[zoo/animals]/:id"
  - "[zoo/animals/:id]/toys/:toy_id"
  - "[zoo]/health"
  - "inventory/:warehouse_id"
  - "[inventory/:warehouse_id]/feeds/:feed_id"
  - "static/*path"
  - ":category/:section"
"#
}

fn build_router() -> Router {
    let manifest: RouteManifest =
        serde_yaml::from_str(example_manifest()).expect("failed to parse manifest");
    manifest
        .build_router(RouterConfig::default(), |_| {
            Arc::new(|a: &brrtnav::Activation<'_>| {
                black_box(a.params());
            })
        })
        .expect("failed to build router")
}

fn bench_resolve_throughput(c: &mut Criterion) {
    let mut router = build_router();
    c.bench_function("resolve", |b| {
        let test_paths = [
            "#!/zoo/animals/123",
            "#!/zoo/animals/123/toys/456",
            "#!/zoo/health",
            "#!/inventory/1/feeds/2",
            "#!/cats/lions",
            "#!/static/css/site/main.css",
            "#!/does/not/exist/at/all",
        ];
        b.iter(|| {
            for path in test_paths.iter() {
                black_box(router.resolve(path));
            }
        })
    });
}

fn bench_same_leaf(c: &mut Criterion) {
    let mut router = build_router();
    c.bench_function("resolve_same_leaf", |b| {
        b.iter(|| black_box(router.resolve("zoo/animals/42/toys/7")))
    });
}

criterion_group!(benches, bench_resolve_throughput, bench_same_leaf);
criterion_main!(benches);
