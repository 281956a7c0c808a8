use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use knoxdb_bench::{gen_values, threshold_for, BENCH_BITS, BENCH_ROWS};
use knoxdb_encoding::bitset::Bitset;
use knoxdb_encoding::compression::bitpacking::{compare, encode, FilterMode, PackedBlock};
use pprof::criterion::{Output, PProfProfiler};

fn bench_compare(c: &mut Criterion) {
    for (name, mode) in [
        ("eq", FilterMode::Equal),
        ("lt", FilterMode::Less),
        ("between", FilterMode::Range),
    ] {
        let mut group = c.benchmark_group(format!("bitpack_compare_{}", name));
        group.throughput(Throughput::Elements(BENCH_ROWS as u64));
        for bits in BENCH_BITS {
            let values = gen_values(BENCH_ROWS, bits, bits as u64);
            let min = *values.iter().min().unwrap();
            let max = *values.iter().max().unwrap();
            let (buf, w) = encode(&values, min, max);
            let lo = threshold_for(w, 0.25);
            let hi = threshold_for(w, 0.5);
            group.bench_with_input(BenchmarkId::from_parameter(bits), &buf, |b, buf| {
                b.iter(|| {
                    let mut out = Bitset::new(BENCH_ROWS);
                    compare(mode, black_box(buf), w, lo, hi, BENCH_ROWS, &mut out);
                    out
                })
            });
        }
        group.finish();
    }
}

fn bench_unpack_then_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("bitpack_typed_filter");
    group.throughput(Throughput::Elements(BENCH_ROWS as u64));
    for bits in BENCH_BITS {
        let values = gen_values(BENCH_ROWS, bits, bits as u64);
        let block = PackedBlock::encode(&values);
        let val = block.min() + threshold_for(bits, 0.5);
        group.bench_with_input(BenchmarkId::new("fused", bits), &block, |b, block| {
            b.iter(|| {
                let mut out = Bitset::new(BENCH_ROWS);
                block.view().filter(FilterMode::Less, val, 0, &mut out).unwrap();
                out
            })
        });
        group.bench_with_input(BenchmarkId::new("unpacked", bits), &values, |b, values| {
            b.iter(|| {
                Bitset::from_indexes(BENCH_ROWS, (0..values.len()).filter(|i| values[*i] < val))
            })
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = bench_compare, bench_unpack_then_compare
}
criterion_main!(benches);
