//! Performance benchmarks for imageops-cutout
//!
//! Measures each pipeline stage separately and the full refinement, to track
//! regressions in the graph cut and the mask cleanup.

use criterion::*;
use image::{DynamicImage, Luma, Rgb};
use imageops_cutout::{
    refine, seed_from_rect, CompositeBackground, FlowGraph, GaussianMixture, GrabCut, Image,
    MaskPostProcessor, RectHint, WHITE,
};
use itertools::iproduct;
use std::hint::black_box;

/// Subject ellipse over a graded backdrop, with mild per-pixel noise
fn create_scene(width: u32, height: u32) -> Image<Rgb<u8>> {
    let mut image: Image<Rgb<u8>> = Image::new(width, height);
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    iproduct!(0..height, 0..width).for_each(|(y, x)| {
        let dx = (x as f32 - center_x) / (width as f32 * 0.3);
        let dy = (y as f32 - center_y) / (height as f32 * 0.4);
        let noise = ((x * 7 + y * 13) % 11) as u8;
        let pixel = if dx.hypot(dy) <= 1.0 {
            Rgb([210 + noise, 160 + noise, 120 + noise])
        } else {
            let shade = ((y * 60) / height) as u8;
            Rgb([40 + shade + noise, 80 + shade, 160 + noise])
        };
        image.put_pixel(x, y, pixel);
    });

    image
}

/// Binary mask of the scene's subject with speckle sprinkled around it
fn create_rough_mask(width: u32, height: u32) -> Image<Luma<u8>> {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    Image::from_fn(width, height, |x, y| {
        let dx = (x as f32 - center_x) / (width as f32 * 0.3);
        let dy = (y as f32 - center_y) / (height as f32 * 0.4);
        let speckle = (x * 31 + y * 17) % 97 == 0;
        Luma([u8::from(dx.hypot(dy) <= 1.0 || speckle)])
    })
}

fn subject_rect(width: u32, height: u32) -> RectHint {
    RectHint::new(
        i64::from(width / 6),
        i64::from(height / 12),
        i64::from(width * 2 / 3),
        i64::from(height * 5 / 6),
    )
}

/// Benchmark the full refinement pipeline
fn bench_refine(c: &mut Criterion) {
    // 640x480 is a typical photo size
    let sizes = vec![(64, 64), (160, 120), (320, 240), (640, 480)];

    let mut group = c.benchmark_group("refine");
    group.sample_size(10); // Fewer samples for expensive operations

    for (width, height) in sizes {
        let pixels = width * height;
        group.throughput(Throughput::Elements(pixels as u64));

        let image = DynamicImage::ImageRgb8(create_scene(width, height));
        let hint = subject_rect(width, height);

        group.bench_with_input(
            BenchmarkId::new("refine_rect", format!("{}x{}", width, height)),
            &(image, hint),
            |b, (img, rect)| b.iter(|| black_box(refine(img, (*rect).into()).unwrap())),
        );
    }

    group.finish();
}

/// Benchmark the iterative graph-cut stage alone
fn bench_grab_cut(c: &mut Criterion) {
    let sizes = vec![(64, 64), (160, 120), (640, 480)];

    let mut group = c.benchmark_group("grab_cut");
    group.sample_size(10);

    for (width, height) in sizes {
        let pixels = width * height;
        group.throughput(Throughput::Elements(pixels as u64));

        let image = create_scene(width, height);
        let seed = seed_from_rect((width, height), subject_rect(width, height)).unwrap();
        let grab_cut = GrabCut::default();

        group.bench_with_input(
            BenchmarkId::new("grab_cut_two_passes", format!("{}x{}", width, height)),
            &(image, seed),
            |b, (img, labels)| {
                b.iter(|| {
                    let mut labels = labels.clone();
                    black_box(grab_cut.refine(img, &mut labels).unwrap())
                })
            },
        );
    }

    group.finish();
}

/// Benchmark color model fitting
fn bench_gmm_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("gmm");
    group.sample_size(10);

    for side in [64u32, 256] {
        let samples: Vec<[f64; 3]> = create_scene(side, side)
            .pixels()
            .map(|Rgb([r, g, b])| [f64::from(*r), f64::from(*g), f64::from(*b)])
            .collect();
        group.throughput(Throughput::Elements(samples.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("fit_five_components", format!("{}x{}", side, side)),
            &samples,
            |b, samples| b.iter(|| black_box(GaussianMixture::fit(samples, 5).unwrap())),
        );
    }

    group.finish();
}

/// Benchmark max-flow on an 8-connected grid with a noisy two-region split,
/// the graph shape one GrabCut iteration builds
fn bench_max_flow(c: &mut Criterion) {
    let sizes = vec![(64usize, 64usize), (160, 120), (640, 480)];

    let mut group = c.benchmark_group("max_flow");
    group.sample_size(10);

    for (width, height) in sizes {
        let nodes = width * height;
        group.throughput(Throughput::Elements(nodes as u64));

        group.bench_with_input(
            BenchmarkId::new("grid", format!("{}x{}", width, height)),
            &(width, height),
            |b, &(width, height)| {
                b.iter(|| {
                    let mut graph = FlowGraph::new(width * height, 8 * width * height);
                    iproduct!(0..height, 0..width).for_each(|(y, x)| {
                        let node = y * width + x;
                        let bias = ((x * 3 + y * 5) % 7) as f64;
                        if x < width / 2 {
                            graph.add_terminal_weights(node, 10.0 + bias, 1.0);
                        } else {
                            graph.add_terminal_weights(node, 1.0, 10.0 + bias);
                        }
                        if x + 1 < width {
                            graph.add_edge(node, node + 1, 5.0);
                        }
                        if y + 1 < height {
                            graph.add_edge(node, node + width, 5.0);
                            if x + 1 < width {
                                graph.add_edge(node, node + width + 1, 5.0 / 2f64.sqrt());
                            }
                            if x > 0 {
                                graph.add_edge(node, node + width - 1, 5.0 / 2f64.sqrt());
                            }
                        }
                    });
                    black_box(graph.max_flow())
                })
            },
        );
    }

    group.finish();
}

/// Benchmark the mask post-processor
fn bench_post_process(c: &mut Criterion) {
    let sizes = vec![(320, 240), (1280, 720)];

    let mut group = c.benchmark_group("post_process");
    group.sample_size(10);

    for (width, height) in sizes {
        let pixels = width * height;
        group.throughput(Throughput::Elements(pixels as u64));

        let mask = create_rough_mask(width, height);
        let processor = MaskPostProcessor::default();

        group.bench_with_input(
            BenchmarkId::new("process", format!("{}x{}", width, height)),
            &mask,
            |b, mask| b.iter(|| black_box(processor.process(mask).unwrap())),
        );
    }

    group.finish();
}

/// Benchmark compositing
fn bench_composite(c: &mut Criterion) {
    let sizes = vec![(640, 480), (1920, 1080)];

    let mut group = c.benchmark_group("composite");
    group.sample_size(10);

    for (width, height) in sizes {
        let pixels = width * height;
        group.throughput(Throughput::Elements(pixels as u64));

        let image = create_scene(width, height);
        let mask = create_rough_mask(width, height);

        group.bench_with_input(
            BenchmarkId::new("replace_background", format!("{}x{}", width, height)),
            &(image.clone(), mask.clone()),
            |b, (img, mask)| b.iter(|| black_box(img.replace_background(mask, WHITE).unwrap())),
        );

        group.bench_with_input(
            BenchmarkId::new("transparent_background", format!("{}x{}", width, height)),
            &(image, mask),
            |b, (img, mask)| b.iter(|| black_box(img.transparent_background(mask).unwrap())),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    // Individual stages
    bench_gmm_fit,
    bench_max_flow,
    bench_grab_cut,
    bench_post_process,
    bench_composite,
    // Full pipeline
    bench_refine,
);
criterion_main!(benches);
