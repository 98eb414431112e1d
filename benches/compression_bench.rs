use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use img_press::{
    encode_image, parse_csv, render_manifest, validate_image_source, CompressionOutcome,
    ImageExtension, ImageRecord,
};

fn create_test_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(img)
}

fn manifest_text(rows: usize) -> String {
    let mut content = String::from("ImageId,ImageURL\n");
    for i in 0..rows {
        content.push_str(&format!("{},https://example.com/images/{}.png\n", i, i));
    }
    content
}

fn bench_source_validation(c: &mut Criterion) {
    let sources = [
        "https://example.com/images/pikachu.png",
        "http://example.com/cactus.jpeg",
        "htt://example.com/broken.jpg",
        "https://example.com/Pikachu",
    ];

    c.bench_function("source_validation", |b| {
        b.iter(|| {
            for source in &sources {
                let _ = validate_image_source(black_box(source));
            }
        })
    });
}

fn bench_manifest_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("manifest_parsing");

    for rows in [10, 1_000, 10_000] {
        let content = manifest_text(rows);
        group.bench_with_input(BenchmarkId::new("parse_csv", rows), &content, |b, content| {
            b.iter(|| parse_csv(black_box(content)))
        });
    }

    group.finish();
}

fn bench_manifest_rendering(c: &mut Criterion) {
    let outcomes: Vec<CompressionOutcome> = (0..1_000)
        .map(|i| {
            if i % 10 == 0 {
                CompressionOutcome::execution_failed(i, "Timed out after 30s, giving up")
            } else {
                CompressionOutcome::Ok(ImageRecord::new(i, format!("storage/compressed/{}.png", i)))
            }
        })
        .collect();

    c.bench_function("render_manifest", |b| {
        b.iter(|| render_manifest(black_box(&outcomes)))
    });
}

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");
    group.sample_size(10);
    let img = create_test_image(256, 256);

    for quality in [50u8, 80, 95] {
        group.bench_with_input(BenchmarkId::new("jpeg", quality), &quality, |b, &quality| {
            b.iter(|| encode_image(black_box(&img), ImageExtension::Jpeg, quality))
        });
        group.bench_with_input(BenchmarkId::new("png", quality), &quality, |b, &quality| {
            b.iter(|| encode_image(black_box(&img), ImageExtension::Png, quality))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_source_validation,
    bench_manifest_parsing,
    bench_manifest_rendering,
    bench_encoding
);
criterion_main!(benches);
