use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};

fn random_block(rng: &mut impl Rng) -> [[f32; 4]; 16] {
    std::array::from_fn(|_| [rng.gen(), rng.gen(), rng.gen(), 1.0])
}

fn gradient_block() -> [[f32; 4]; 16] {
    std::array::from_fn(|i| {
        let v = (i * 17) as f32 / 255.0;
        [v, v, v, 1.0]
    })
}

fn bench_compress(c: &mut Criterion) {
    bc1::init();

    let mut rng = rand_chacha::ChaChaRng::seed_from_u64(123456789);
    let random = random_block(&mut rng);
    let gradient = gradient_block();
    let weights = [1.0_f32; 16];
    let channels = [1.0_f32; 3];

    let mut group = c.benchmark_group("compress");

    for (name, block) in [("random", &random), ("gradient", &gradient)] {
        group.bench_function(format!("hq/{name}"), |b| {
            b.iter(|| {
                bc1::compress_bc1_block(
                    black_box(block),
                    &weights,
                    channels,
                    bc1::Bc1Options {
                        three_color_mode: true,
                        high_quality: true,
                    },
                )
            })
        });
        group.bench_function(format!("normal/{name}"), |b| {
            b.iter(|| {
                bc1::compress_bc1_block(
                    black_box(block),
                    &weights,
                    channels,
                    bc1::Bc1Options::default(),
                )
            })
        });
        group.bench_function(format!("fast/{name}"), |b| {
            b.iter(|| bc1::compress_bc1_block_fast(black_box(block), &weights, channels))
        });
    }

    let random_u8: [[u8; 4]; 16] = std::array::from_fn(|_| {
        let p: [u8; 3] = rng.gen();
        [p[0], p[1], p[2], 255]
    });
    group.bench_function("fast_u8/random", |b| {
        b.iter(|| bc1::compress_bc1_block_fast_u8(black_box(&random_u8)))
    });

    group.finish();
}

criterion_group!(benches, bench_compress);
criterion_main!(benches);
