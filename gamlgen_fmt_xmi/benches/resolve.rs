use criterion::{Criterion, criterion_group, criterion_main};
use gamlgen_fmt_xmi::gamlgen_core::render;
use gamlgen_fmt_xmi::*;
use std::hint::black_box;

const MODEL: &str = include_str!("../tests/assets/prey_predator.xmi");
const BODIES: &str = include_str!("../tests/assets/prey_predator.json");

fn resolve_benchmark(c: &mut Criterion) {
    let bodies: Bodies = BODIES.parse().expect("bodies");
    let doc: Document = MODEL.parse().expect("document");

    c.bench_function("parse", |b| {
        b.iter(|| black_box(MODEL).parse::<Document>().expect("document"))
    });
    c.bench_function("build", |b| {
        b.iter(|| {
            ModelBuilder::new(black_box(&doc), &bodies)
                .build("prey_predator")
                .expect("model")
        })
    });
    c.bench_function("render", |b| {
        let model = ModelBuilder::new(&doc, &bodies)
            .build("prey_predator")
            .expect("model");
        b.iter(|| render(black_box(&model)))
    });
}

criterion_group!(benches, resolve_benchmark);
criterion_main!(benches);
