use criterion::{criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use solver_core::{Codec, MemTable, Pos, Table, TpResult};
use std::hint::black_box;

fn bench_codec(c: &mut Criterion) {
    let codec = Codec::new(8);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
    let positions: Vec<Pos> = (0..1024).map(|_| Pos::random(&mut rng, 8)).collect();
    let codes: Vec<u64> = positions.iter().map(|p| codec.encode(p)).collect();

    c.bench_function("encode 8x8", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % positions.len();
            black_box(codec.encode(&positions[i]));
        })
    });

    c.bench_function("decode 8x8", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % codes.len();
            black_box(codec.decode(codes[i]));
        })
    });
}

fn bench_table(c: &mut Criterion) {
    let table = MemTable::new(1_000_003);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(6);
    let codes: Vec<u64> = (0..4096).map(|_| rng.gen_range(0..1u64 << 40)).collect();
    for &code in &codes {
        table.add(code, TpResult::Draw);
    }

    c.bench_function("tt probe", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % codes.len();
            black_box(table.probe(codes[i]));
        })
    });

    c.bench_function("tt add", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % codes.len();
            table.add(codes[i], TpResult::LowerBound0);
        })
    });
}

criterion_group!(benches, bench_codec, bench_table);
criterion_main!(benches);
