//! Benchmarks for allocation and collection throughput.
//!
//! Run with: `cargo bench --package pico-gc`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use pico_gc::{GarbageCollector, GcConfig, Value};

fn create_gc(heap_size: usize) -> GarbageCollector {
    let config = GcConfig {
        initial_heap_size: heap_size,
        ..Default::default()
    };
    GarbageCollector::new(config).unwrap()
}

fn bench_allocation_unrooted(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocation_unrooted");

    for &num_fields in &[0u8, 1, 4, 16] {
        group.throughput(Throughput::Elements(1));
        group.bench_function(format!("fields_{}", num_fields), |b| {
            let mut gc = create_gc(1024 * 1024);
            let mut roots: [Value; 0] = [];
            b.iter(|| black_box(gc.allocate(num_fields, &mut roots).unwrap()))
        });
    }

    group.finish();
}

fn bench_allocation_rooted_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocation_rooted_chain");

    group.bench_function("100_linked_objects", |b| {
        b.iter(|| {
            let mut gc = create_gc(64 * 1024);
            let mut roots = vec![Value::Int(0)];
            for _ in 0..100 {
                let obj = gc.allocate(1, &mut roots).unwrap();
                gc.set_field(obj, 0, roots[0]).unwrap();
                roots[0] = Value::Object(obj);
            }
            black_box(roots[0])
        })
    });

    group.finish();
}

fn bench_collect_with_small_live_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect_small_live_set");

    group.bench_function("10_roots_1000_garbage", |b| {
        b.iter(|| {
            let mut gc = create_gc(256 * 1024);
            let mut roots = vec![Value::Int(0); 10];
            for i in 0..10 {
                let obj = gc.allocate(1, &mut roots).unwrap();
                roots[i] = Value::Object(obj);
            }
            for _ in 0..1000 {
                let _ = gc.allocate(1, &mut roots);
            }
            gc.collect(&mut roots);
            black_box(gc.stats().collections)
        })
    });

    group.finish();
}

fn bench_heap_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("heap_growth");

    group.bench_function("grow_from_small_heap", |b| {
        b.iter(|| {
            let mut gc = create_gc(64);
            let mut roots = Vec::new();
            for _ in 0..32 {
                let obj = gc.allocate(4, &mut roots).unwrap();
                roots.push(Value::Object(obj));
            }
            black_box(gc.heap_size())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_allocation_unrooted,
    bench_allocation_rooted_chain,
    bench_collect_with_small_live_set,
    bench_heap_growth
);
criterion_main!(benches);
