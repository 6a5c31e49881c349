use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use modwire_engine::ModuleDescriptorFactory;
use modwire_types::{Marker, MethodBuilder, ModuleKind, TypeId, TypeModel};

/// `width` chains of `depth` modules each, every module including the next
/// one in its chain and the head of the neighbouring chain, so the graph is
/// full of cycles
fn module_graph(width: usize, depth: usize) -> (TypeModel, TypeId) {
    let mut b = TypeModel::builder();
    let modules: Vec<Vec<TypeId>> = (0..width)
        .map(|w| {
            (0..depth)
                .map(|d| b.declare(&format!("com.bench.Chain{}Module{}", w, d)))
                .collect()
        })
        .collect();

    for (w, chain) in modules.iter().enumerate() {
        for (d, &module) in chain.iter().enumerate() {
            let mut class = b.class(module);
            class.module(ModuleKind::Module);
            class.include(chain[(d + 1) % depth]);
            class.include(modules[(w + 1) % width][0]);
            class.method(
                MethodBuilder::new(format!("provide{}", d))
                    .returns(format!("com.bench.Service{}x{}", w, d))
                    .marker(Marker::Provides),
            );
        }
    }

    let root = modules[0][0];
    (b.build(), root)
}

fn bench_cold_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("transitive_modules_cold");

    for &(width, depth) in &[(4, 8), (16, 16), (32, 64)] {
        let (model, root) = module_graph(width, depth);
        let factory = ModuleDescriptorFactory::new(Arc::new(model));
        group.bench_with_input(
            BenchmarkId::new("graph", format!("{}x{}", width, depth)),
            &root,
            |b, &root| {
                b.iter(|| {
                    factory.clear_cache();
                    factory.transitive_modules(black_box([root])).unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_warm_closure(c: &mut Criterion) {
    let (model, root) = module_graph(16, 16);
    let factory = ModuleDescriptorFactory::new(Arc::new(model));
    factory.transitive_modules([root]).unwrap();

    c.bench_function("transitive_modules_warm", |b| {
        b.iter(|| factory.transitive_modules(black_box([root])).unwrap());
    });
}

criterion_group!(benches, bench_cold_closure, bench_warm_closure);
criterion_main!(benches);
