use basalt_perf::BUILTIN_STRATEGIES;
use basalt_ring::HostRingBuffer;
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

fn bench_single_byte(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_single");
    group.throughput(Throughput::Bytes(1));

    for strategy in BUILTIN_STRATEGIES {
        let mut storage = vec![0u8; 1024];
        let rb = HostRingBuffer::create(&mut storage, strategy).expect("failed to create ring");

        group.bench_function(format!("round_trip_{strategy}"), |b| {
            b.iter(|| {
                rb.write_one(black_box(0x5a));
                black_box(rb.read_one());
            });
        });
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_batch_64");
    group.throughput(Throughput::Bytes(64));

    let data = [0xa5u8; 64];
    for strategy in BUILTIN_STRATEGIES {
        let mut storage = vec![0u8; 1024];
        let rb = HostRingBuffer::create(&mut storage, strategy).expect("failed to create ring");
        let mut out = [0u8; 64];

        // Offsets advance by 64 on a 1024-slot ring, so every 16th iteration
        // takes the two-segment path.
        group.bench_function(format!("round_trip_{strategy}"), |b| {
            b.iter(|| {
                rb.write_many(black_box(&data));
                black_box(rb.read_many(&mut out));
            });
        });
    }

    group.finish();
}

fn bench_read_empty(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_empty");

    for strategy in BUILTIN_STRATEGIES {
        let mut storage = vec![0u8; 64];
        let rb = HostRingBuffer::create(&mut storage, strategy).expect("failed to create ring");

        group.bench_function(format!("read_one_{strategy}"), |b| {
            b.iter(|| black_box(rb.read_one()));
        });
    }

    group.finish();
}

fn bench_capacities(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_capacity");
    group.throughput(Throughput::Bytes(256));

    let data = [1u8; 256];
    for &cap in &[257usize, 1024, 4096, 65535] {
        let mut storage = vec![0u8; cap];
        let rb = HostRingBuffer::create(&mut storage, basalt_ring::Strategy::LockFree)
            .expect("failed to create ring");
        let mut out = [0u8; 256];

        group.bench_function(format!("batch_256_cap_{cap}"), |b| {
            b.iter(|| {
                rb.write_many(black_box(&data));
                black_box(rb.read_many(&mut out));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_byte,
    bench_batch,
    bench_read_empty,
    bench_capacities,
);
criterion_main!(benches);
