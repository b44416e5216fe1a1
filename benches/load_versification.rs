//! This bench test parses the embedded text of each built-in versification
//! into a fresh registry.

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use scripture::{Registry, VersificationType};

fn load_versification(c: &mut Criterion) {
    let mut group = c.benchmark_group("load versification");
    for kind in VersificationType::BUILT_IN {
        group.bench_with_input(BenchmarkId::from_parameter(kind.name()), &kind, |b, &kind| {
            b.iter(|| Registry::new().get(kind).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, load_versification);
criterion_main!(benches);
