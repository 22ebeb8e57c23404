//! Benchmarks of the modular exponentiation and the curve ladders.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use montec::{
    monty_pow, x25519, x25519_clamp_scalar, x448, x448_clamp_scalar, Ed25519Point, Ed448Context, Ed448Point,
};

fn pseudo_random_bytes(len: usize, seed: u8) -> Vec<u8> {
    let mut v = seed as u32 | 1;
    (0..len)
        .map(|_| {
            v = v.wrapping_mul(1103515245).wrapping_add(12345);
            (v >> 16) as u8
        })
        .collect()
}

fn bench_monty_pow(c: &mut Criterion) {
    let mut group = c.benchmark_group("monty_pow");
    for bits in [1024usize, 2048, 4096] {
        let len = bits / 8;
        let mut modulus = pseudo_random_bytes(len, 1);
        modulus[0] |= 0x80;
        modulus[len - 1] |= 1;
        let mut base = pseudo_random_bytes(len, 2);
        base[0] &= 0x7f;
        let exp = pseudo_random_bytes(len, 3);
        let mut out = vec![0u8; len];

        group.bench_with_input(BenchmarkId::from_parameter(bits), &bits, |b, _| {
            b.iter(|| monty_pow(&mut out, black_box(&base), black_box(&exp), &modulus, 0x5eed))
        });
    }
    group.finish();
}

fn bench_x25519(c: &mut Criterion) {
    let mut k: [u8; 32] = pseudo_random_bytes(32, 4).try_into().unwrap();
    x25519_clamp_scalar(&mut k);
    let mut u = [0u8; 32];
    u[0] = 9;
    c.bench_function("x25519", |b| b.iter(|| x25519(black_box(&k), black_box(&u))));
}

fn bench_x448(c: &mut Criterion) {
    let mut k: [u8; 56] = pseudo_random_bytes(56, 5).try_into().unwrap();
    x448_clamp_scalar(&mut k);
    let mut u = [0u8; 56];
    u[0] = 5;
    c.bench_function("x448", |b| b.iter(|| x448(black_box(&k), black_box(&u))));
}

fn bench_edwards(c: &mut Criterion) {
    let k = pseudo_random_bytes(32, 6);
    let g = Ed25519Point::base();
    c.bench_function("ed25519_scalar", |b| {
        b.iter(|| {
            let mut p = g.clone();
            p.scalar(black_box(&k));
            p
        })
    });

    let ctx = Ed448Context::new().unwrap();
    let g = Ed448Point::base(&ctx).unwrap();
    let k = pseudo_random_bytes(56, 7);
    c.bench_function("ed448_scalar", |b| {
        b.iter(|| {
            let mut p = g.clone();
            p.scalar(black_box(&k)).unwrap();
            p
        })
    });
}

criterion_group!(benches, bench_monty_pow, bench_x25519, bench_x448, bench_edwards);
criterion_main!(benches);
