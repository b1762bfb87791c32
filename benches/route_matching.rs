use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use routebind::router::{ParameterCodec, RouteMode, RouteTable};
use std::hint::black_box;

fn zoo_table(extra: usize) -> RouteTable {
    let mut table = RouteTable::new(RouteMode::Bidirectional).with_codec(ParameterCodec::percent());
    for (id, pattern) in [
        ("root", "/"),
        ("animals", "/zoo/animals"),
        ("health", "/zoo/health"),
        ("animal", "/zoo/animals/{id}"),
        ("toy", "/zoo/animals/{id}/toys/{toy_id}"),
        ("feed", "/zoo/animals/{id}/feed"),
    ] {
        table.register(id, pattern).unwrap();
    }
    for i in 0..extra {
        table
            .register(&format!("enclosure_{i}"), &format!("/zoo/enclosures/{i}/keepers/{{keeper}}"))
            .unwrap();
    }
    table
}

fn bench_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_path");
    for extra in [0usize, 100, 1000] {
        let table = zoo_table(extra);
        group.bench_with_input(BenchmarkId::new("toy", extra), &table, |b, table| {
            b.iter(|| table.match_path(black_box("/zoo/animals/17/toys/ball")).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("miss", extra), &table, |b, table| {
            b.iter(|| table.match_path(black_box("/aquarium/fish")).is_err())
        });
    }
    group.finish();
}

fn bench_stringify(c: &mut Criterion) {
    let table = zoo_table(0);
    c.bench_function("stringify_toy", |b| {
        b.iter(|| {
            table
                .stringify("toy", black_box(&[("id", "snow leopard"), ("toy_id", "ball")]))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_match, bench_stringify);
criterion_main!(benches);
