use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mlut::{BuildConf, Lut, Method};

pub fn get(c: &mut Criterion) {
    let word = Lut::with_method(&[(5u32, 6u8), (7, 8)], Method::Word);
    let table: Vec<(u32, u32)> = (0..64).map(|i| (i, i + 13)).collect();
    let array = Lut::with_method(&table, Method::Array);
    let extracted = Lut::try_with_conf(&table,
        BuildConf { array_attempts: 0, method: Method::Array, ..Default::default() }).unwrap();

    let mut group = c.benchmark_group("get");
    group.bench_function("word32", |b| b.iter(|| word.get(&7u32)));
    for key in [2u32, 40, 63].iter() {
        group.bench_with_input(BenchmarkId::new("array", key), key, |b, key| {
            b.iter(|| array.get(key))
        });
        group.bench_with_input(BenchmarkId::new("extract", key), key, |b, key| {
            b.iter(|| extracted.get(key))
        });
    }
    group.finish();
}

pub fn build(c: &mut Criterion) {
    let table: Vec<(u32, u32)> = (0..64).map(|i| (i, i + 13)).collect();
    c.bench_function("build_array", |b| b.iter(|| Lut::with_method(&table, Method::Array)));
}

criterion_group!(lut, get, build);
criterion_main!(lut);
