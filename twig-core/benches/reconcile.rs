//! Reconciler benchmarks: mounting, updating and unmounting a list.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use twig_core::builder::h;
use twig_core::{attrs, children, PositionalId, ReconcilerEngine, VNode};

fn list(len: usize, generation: usize) -> VNode {
    let items = (0..len)
        .map(|i| {
            h(
                "li",
                attrs! { "class" => if (i + generation) % 3 == 0 { "hot" } else { "cold" } },
                children![format!("item {i}")],
            )
        })
        .collect::<Vec<_>>();
    h("ul", attrs! {}, children![items])
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let root = PositionalId::root();

    for len in [10, 100, 1000] {
        let first = list(len, 0);
        let second = list(len, 1);

        group.bench_with_input(BenchmarkId::new("mount", len), &first, |b, tree| {
            b.iter(|| {
                let mut engine = ReconcilerEngine::new();
                black_box(engine.reconcile(None, Some(tree), &root))
            });
        });

        group.bench_with_input(BenchmarkId::new("update", len), &second, |b, next| {
            let mut engine = ReconcilerEngine::new();
            b.iter(|| black_box(engine.reconcile(Some(&first), Some(next), &root)));
        });

        group.bench_with_input(BenchmarkId::new("unmount", len), &first, |b, tree| {
            let mut engine = ReconcilerEngine::new();
            b.iter(|| black_box(engine.reconcile(Some(tree), None, &root)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reconcile);
criterion_main!(benches);
