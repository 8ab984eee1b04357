extern crate criterion;
extern crate lzkit;

use std::fs;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lzkit::codec::{Format, SymbolWriter};
use lzkit::{Algorithm, Lz77, Lzw};

pub fn criterion_benchmark(c: &mut Criterion, file: &str) {
    let data = fs::read(file).expect("Benchmark input not found");
    let algorithms: [&dyn Algorithm; 2] = [&Lz77::new(), &Lzw::new()];

    let mut group = c.benchmark_group("compress");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for algorithm in algorithms.iter() {
        let id = BenchmarkId::new(algorithm.name(), file);
        group.bench_with_input(id, &data, |b, data| {
            b.iter(|| black_box(algorithm.compress_to_vec(data).expect("Error")))
        });
    }
    group.finish();

    let mut group = c.benchmark_group("decompress");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for algorithm in algorithms.iter() {
        let symbols = algorithm.compress_to_vec(&data).expect("Error");
        let id = BenchmarkId::new(algorithm.name(), file);
        group.bench_with_input(id, &symbols, |b, symbols| {
            b.iter(|| black_box(algorithm.decompress_to_vec(symbols).expect("Error")))
        });
    }
    group.finish();

    let mut group = c.benchmark_group("wire");
    let symbols = Lz77::new().compress_to_vec(&data).expect("Error");
    for &format in Format::ALL.iter() {
        let id = BenchmarkId::new(format.name(), file);
        group.bench_with_input(id, &symbols, |b, symbols| {
            b.iter(|| {
                let mut wire = Vec::with_capacity(data.len());
                let mut writer = format.writer(&mut wire);
                writer.set_algorithm("lz77").expect("Error");
                for &symbol in symbols.iter() {
                    writer.write_symbol(symbol).expect("Error");
                }
                writer.finish().expect("Error");
                drop(writer);
                black_box(wire)
            })
        });
    }
    group.finish();
}

pub fn bench_source(c: &mut Criterion) {
    criterion_benchmark(c, "src/window.rs");
}

pub fn bench_manifest(c: &mut Criterion) {
    criterion_benchmark(c, "Cargo.toml");
}

criterion_group!(benches, bench_source, bench_manifest);
criterion_main!(benches);
