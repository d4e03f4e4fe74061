use std::sync::{atomic::AtomicBool, Arc};

use addsub::{
    addsub,
    capture::{Source, Stimulus},
    scoreboard::Scoreboard,
    sim::run_cycle,
    stream::run_threaded,
    AddSubUnit, AxisCplx, ComplexShort, PortsIn,
};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use rand::prelude::*;

const BEATS: u64 = 16384;

fn random_item(rng: &mut ThreadRng) -> AxisCplx {
    AxisCplx::new(rng.gen(), rng.gen(), rng.gen())
}

fn benchmark(c: &mut Criterion) {
    let mut rng = rand::thread_rng();

    let a = random_item(&mut rng);
    let b = random_item(&mut rng);
    let word: u32 = rng.gen();

    c.bench_function("addsub", |bench| bench.iter(|| addsub(black_box(a), black_box(b))));

    c.bench_function("unpack word", |bench| {
        bench.iter(|| ComplexShort::from_word(black_box(word)))
    });

    c.bench_function("register tick", |bench| {
        let mut unit = AddSubUnit::new();
        let ports = PortsIn {
            a: Some(a),
            b: Some(b),
            add_ready: true,
            sub_ready: true,
        };
        bench.iter(|| unit.tick(black_box(ports)))
    });

    let mut group = c.benchmark_group("runtime");
    group.throughput(Throughput::Elements(BEATS));
    group.sample_size(10);
    group.bench_function("threaded", |bench| {
        bench.iter_batched(
            || -> Source { Box::new(Stimulus::new(1, 256, BEATS)) },
            |source| run_threaded(source, 256, Scoreboard::new(), Arc::new(AtomicBool::new(false))),
            BatchSize::SmallInput,
        )
    });
    group.bench_function("cycle", |bench| {
        bench.iter_batched(
            || -> Source { Box::new(Stimulus::new(1, 256, BEATS)) },
            |source| run_cycle(source, Scoreboard::new(), 0.0, 1, &AtomicBool::new(false)),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
