use criterion::{criterion_group, criterion_main, Criterion};
use diffmatch::{
    DiffuseCorrelation, DiffusionWeight, EndpointDistance, MatchConfig, Matcher, NoProgress,
    RangeDiffusionSlice, RangeImage,
};
use std::hint::black_box;

fn make_image(width: usize, height: usize, seed: usize) -> RangeImage {
    let mut colours = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = (((x * 13 + seed) ^ (y * 7) ^ (x * y)) & 0xFF) as f32;
            colours.push([value, value * 0.5, 12.0]);
        }
    }
    RangeImage::from_colours(colours, width, height).unwrap()
}

fn bench_diffusion(c: &mut Criterion) {
    let img = make_image(128, 64, 0);

    c.bench_function("diffusion_weight_128x64", |b| {
        b.iter(|| {
            black_box(DiffusionWeight::create(&img, &EndpointDistance, 1.0, &NoProgress).unwrap())
        });
    });

    let weights = DiffusionWeight::create(&img, &EndpointDistance, 1.0, &NoProgress).unwrap();
    c.bench_function("diffusion_slice_sweep_steps4", |b| {
        let mut slice = RangeDiffusionSlice::new();
        b.iter(|| {
            for y in 0..img.height() {
                slice.create(y, 4, &img, &weights, &NoProgress).unwrap();
            }
            black_box(slice.get(64, 0, 0))
        });
    });
}

fn bench_correlation(c: &mut Criterion) {
    let img1 = make_image(128, 64, 0);
    let img2 = make_image(128, 64, 31);
    let w1 = DiffusionWeight::create(&img1, &EndpointDistance, 1.0, &NoProgress).unwrap();
    let w2 = DiffusionWeight::create(&img2, &EndpointDistance, 1.0, &NoProgress).unwrap();
    let mut slice1 = RangeDiffusionSlice::new();
    let mut slice2 = RangeDiffusionSlice::new();
    slice1.create(32, 4, &img1, &w1, &NoProgress).unwrap();
    slice2.create(32, 4, &img2, &w2, &NoProgress).unwrap();
    let corr =
        DiffuseCorrelation::new(&EndpointDistance, 1.0, &img1, &slice1, &img2, &slice2).unwrap();

    c.bench_function("diffuse_cost_row_sweep", |b| {
        b.iter(|| {
            let mut acc = 0.0f32;
            for x in 0..127 {
                acc += corr.cost(x, x + 1);
            }
            black_box(acc)
        });
    });
}

fn bench_matcher(c: &mut Criterion) {
    let img1 = make_image(96, 48, 0);
    let img2 = make_image(96, 48, 0);
    let cfg = MatchConfig {
        steps: 3,
        max_levels: 3,
        min_disparity: -8,
        max_disparity: 8,
        ..MatchConfig::default()
    };
    let matcher = Matcher::new(cfg).unwrap();

    c.bench_function("hierarchical_match_96x48", |b| {
        b.iter(|| black_box(matcher.run(&img1, &img2, &EndpointDistance, &NoProgress).unwrap()));
    });
}

criterion_group!(benches, bench_diffusion, bench_correlation, bench_matcher);
criterion_main!(benches);
