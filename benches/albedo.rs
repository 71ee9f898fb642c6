use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgb, Rgb32FImage};
use mid_albedo::albedo_pipeline::{
    match_scale, median_fuse, ExposureNormalizer, ProbeAnalyzer, WhiteBalance,
};

fn generate_capture(width: u32, height: u32, gain: f32) -> Rgb32FImage {
    Rgb32FImage::from_fn(width, height, |x, y| {
        let v = ((x + y) % 256) as f32 / 255.0;
        Rgb([v * gain, (1.0 - v) * gain, 0.5 * gain])
    })
}

fn benchmark_probe_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("probe_analysis");
    let analyzer = ProbeAnalyzer::default();

    for size in [64u32, 256] {
        let probe = generate_capture(size, size, 0.8);
        group.bench_with_input(BenchmarkId::from_parameter(size), &probe, |b, probe| {
            b.iter(|| analyzer.analyze(black_box(probe)));
        });
    }

    group.finish();
}

fn benchmark_normalize(c: &mut Criterion) {
    let capture = generate_capture(500, 500, 3.0);
    let wb = WhiteBalance { coeffs: [1.2, 1.0, 0.8] };

    c.bench_function("normalize_tonemapped_500x500", |b| {
        let normalizer = ExposureNormalizer::tonemapped();
        b.iter(|| normalizer.normalize(black_box(&capture), &wb));
    });
}

fn benchmark_fusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("median_fusion");

    for count in [5usize, 20] {
        let estimates: Vec<Rgb32FImage> = (0..count)
            .map(|i| generate_capture(250, 250, 1.0 + i as f32 * 0.1))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &estimates, |b, estimates| {
            b.iter(|| median_fuse(black_box(estimates)));
        });
    }

    group.finish();
}

fn benchmark_alignment(c: &mut Criterion) {
    let reference = generate_capture(500, 500, 1.0);
    let estimate = generate_capture(500, 500, 2.5);

    c.bench_function("match_scale_500x500", |b| {
        b.iter(|| match_scale(black_box(&estimate), black_box(&reference)));
    });
}

criterion_group!(
    benches,
    benchmark_probe_analysis,
    benchmark_normalize,
    benchmark_fusion,
    benchmark_alignment
);
criterion_main!(benches);
