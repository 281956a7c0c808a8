use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use knoxdb_bench::{gen_values, BENCH_BITS, BENCH_ROWS};
use knoxdb_encoding::compression::bitpacking::{decode, encode, PackScratch};
use pprof::criterion::{Output, PProfProfiler};

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("bitpack_encode");
    group.throughput(Throughput::Elements(BENCH_ROWS as u64));
    for bits in BENCH_BITS {
        let values = gen_values(BENCH_ROWS, bits, bits as u64);
        let min = *values.iter().min().unwrap();
        let max = *values.iter().max().unwrap();
        group.bench_with_input(BenchmarkId::new("alloc", bits), &values, |b, values| {
            b.iter(|| black_box(encode(values, min, max)))
        });
        let mut scratch = PackScratch::new(BENCH_ROWS * 8);
        group.bench_with_input(BenchmarkId::new("scratch", bits), &values, |b, values| {
            b.iter(|| black_box(scratch.encode(values, min, max).1))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("bitpack_decode");
    group.throughput(Throughput::Elements(BENCH_ROWS as u64));
    for bits in BENCH_BITS {
        let values = gen_values(BENCH_ROWS, bits, bits as u64);
        let min = *values.iter().min().unwrap();
        let max = *values.iter().max().unwrap();
        let (buf, w) = encode(&values, min, max);
        let mut dst = vec![0u64; BENCH_ROWS];
        group.bench_with_input(BenchmarkId::from_parameter(bits), &buf, |b, buf| {
            b.iter(|| decode(&mut dst, black_box(buf), w, min).unwrap())
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = bench_encode, bench_decode
}
criterion_main!(benches);
