use boundary_guard::{
    Classifier, ColorSpace, FnTransform, FormatWord, GuardContext, SentinelEncoding, TransformId,
};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

// 64K pixels: one 256×256 tile
const PIXELS: usize = 256 * 256;

fn rgb8() -> FormatWord {
    FormatWord::new().with_channels(3).with_bytes(1)
}

fn cmyk8() -> FormatWord {
    FormatWord::new().with_channels(4).with_bytes(1)
}

/// Stand-in for an engine transform with some per-pixel arithmetic.
fn rgb_to_cmyk(src: &[u8], dst: &mut [u8]) {
    let max = src[0].max(src[1]).max(src[2]);
    for c in 0..3 {
        dst[c] = if max == 0 {
            0
        } else {
            ((max - src[c]) as u32 * 255 / max as u32) as u8
        };
    }
    dst[3] = 255 - max;
}

/// A mask: mostly 0x00 / 0xFF pixels with every `interior_every`-th pixel interior.
fn create_mask(interior_every: usize) -> Vec<u8> {
    (0..PIXELS)
        .flat_map(|i| {
            if interior_every > 0 && i % interior_every == 0 {
                [(i % 251) as u8 | 1, 40, 90]
            } else if (i / 64) % 2 == 0 {
                [0, 0, 0]
            } else {
                [255, 255, 255]
            }
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_64k_rgb8");
    let transform = FnTransform::new(TransformId(1), rgb8(), cmyk8(), rgb_to_cmyk);
    let mut ctx = GuardContext::new();
    ctx.register(&transform).unwrap();
    let entry = ctx.cache().lookup(TransformId(1)).unwrap().clone();
    let input = create_mask(97);

    for classifier in [Classifier::Scalar, Classifier::Batched] {
        group.bench_function(format!("{classifier:?}"), |b| {
            b.iter(|| black_box(classifier.count_boundary(&entry, black_box(&input), PIXELS)));
        });
    }
    group.finish();
}

fn bench_sentinel_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("sentinel_scan_64k_lab8");
    let input: Vec<u8> = (0..PIXELS)
        .flat_map(|i| if i % 5 == 0 { [0, 0, 0] } else { [50, 128, 128] })
        .collect();
    let mut flags = vec![0u8; PIXELS];
    let encoding = SentinelEncoding::Integer { lab_bytes: 3 };

    for classifier in [Classifier::Scalar, Classifier::Batched] {
        group.bench_function(format!("{classifier:?}"), |b| {
            b.iter(|| {
                black_box(classifier.mark_sentinels(
                    encoding,
                    3,
                    black_box(&input),
                    PIXELS,
                    &mut flags,
                ))
            });
        });
    }
    group.finish();
}

fn bench_guarded_vs_plain(c: &mut Criterion) {
    let mut group = c.benchmark_group("rgb8_to_cmyk8_64k");
    let transform = FnTransform::new(TransformId(2), rgb8(), cmyk8(), rgb_to_cmyk);
    let mut ctx = GuardContext::new();
    ctx.register(&transform).unwrap();
    let mut output = vec![0u8; PIXELS * 4];

    for (name, interior_every) in [("mask_sparse", 997), ("mask_1pct", 97), ("mask_none", 0)] {
        let input = create_mask(interior_every);

        group.bench_function(format!("plain/{name}"), |b| {
            b.iter(|| {
                use boundary_guard::ColorTransform;
                transform.do_transform(black_box(&input), &mut output, PIXELS);
                black_box(&output);
            })
        });

        group.bench_function(format!("guarded/{name}"), |b| {
            b.iter(|| {
                black_box(ctx.do_transform(&transform, black_box(&input), &mut output, PIXELS));
            })
        });
    }

    // Photographic content: almost every pixel interior, bulk pass 2.
    let photo: Vec<u8> = (0..PIXELS * 3).map(|i| (i * 31 % 253) as u8 + 1).collect();
    group.bench_function("guarded/photo", |b| {
        b.iter(|| black_box(ctx.do_transform(&transform, black_box(&photo), &mut output, PIXELS)))
    });
    group.finish();
}

fn bench_lab_correction(c: &mut Criterion) {
    let mut group = c.benchmark_group("lab8_correction_64k");
    let lab8 = FormatWord::new()
        .with_channels(3)
        .with_bytes(1)
        .with_color_space(ColorSpace::Lab);
    let transform = FnTransform::new(TransformId(3), lab8, rgb8(), |s: &[u8], d: &mut [u8]| {
        d.copy_from_slice(&s[..3])
    });
    let profile = boundary_guard::SentinelProfile::from_transform(&transform)
        .unwrap()
        .unwrap();
    let ctx = GuardContext::new();
    let source: Vec<u8> = (0..PIXELS)
        .flat_map(|i| if i % 3 == 0 { [0, 0, 0] } else { [70, 120, 140] })
        .collect();
    let mut output = vec![0u8; PIXELS * 3];

    group.bench_function("sentinel", |b| {
        b.iter(|| {
            let mut input = source.clone();
            black_box(ctx.do_transform_sentinel(
                Some(&profile),
                &transform,
                &mut input,
                &mut output,
                PIXELS,
            ))
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_classify,
    bench_sentinel_scan,
    bench_guarded_vs_plain,
    bench_lab_correction,
);

criterion_main!(benches);
