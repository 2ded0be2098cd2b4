use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use patch_inpaint as pi;
use std::time::{Duration, Instant};

fn inputs(dim: u32) -> (pi::image::RgbImage, pi::image::RgbImage) {
    let img = pi::image::RgbImage::from_fn(dim, dim, |x, y| {
        pi::image::Rgb([(x * 3 % 251) as u8, (y * 5 % 251) as u8, ((x ^ y) % 200) as u8])
    });

    // a centered hole covering a quarter of the image
    let mut mask = pi::image::RgbImage::new(dim, dim);
    for x in dim / 4..dim * 3 / 4 {
        for y in dim / 4..dim * 3 / 4 {
            mask.put_pixel(x, y, pi::image::Rgb([255, 255, 255]));
        }
    }

    (img, mask)
}

fn bench_discipline(c: &mut Criterion, name: &str, discipline: pi::UpdateDiscipline) {
    static DIM: u32 = 25;

    let mut group = c.benchmark_group(name);
    group.sample_size(10);

    for dim in [DIM, 2 * DIM, 4 * DIM, 8 * DIM].iter() {
        // Build the inputs once to reduce variation between runs,
        // though we still do a memcpy each run
        let (img, mask) = inputs(*dim);

        group.bench_with_input(BenchmarkId::from_parameter(dim), dim, |b, _| {
            b.iter_custom(|iters| {
                let mut total_elapsed = Duration::new(0, 0);
                for _i in 0..iters {
                    let sess = pi::Session::builder()
                        .image(img.clone())
                        .mask(mask.clone())
                        .passes_per_level(20)
                        .update_discipline(discipline)
                        .seed(120)
                        .build()
                        .unwrap();

                    let start = Instant::now();
                    black_box(sess.run(None).unwrap());
                    total_elapsed += start.elapsed();
                }

                total_elapsed
            });
        });
    }
    group.finish();
}

fn in_place(c: &mut Criterion) {
    bench_discipline(c, "in_place", pi::UpdateDiscipline::InPlace);
}

fn double_buffered(c: &mut Criterion) {
    bench_discipline(c, "double_buffered", pi::UpdateDiscipline::DoubleBuffered);
}

criterion_group!(benches, in_place, double_buffered);
criterion_main!(benches);
