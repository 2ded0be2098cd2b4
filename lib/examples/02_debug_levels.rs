use patch_inpaint as pi;

fn main() -> Result<(), pi::Error> {
    let img = pi::image::RgbImage::from_fn(128, 128, |x, y| {
        if ((x / 16) + (y / 16)) % 2 == 0 {
            pi::image::Rgb([30, 30, 30])
        } else {
            pi::image::Rgb([220, 180, 40])
        }
    });

    let mut mask = pi::image::RgbImage::new(128, 128);
    for x in 40..88 {
        for y in 50..78 {
            mask.put_pixel(x, y, pi::image::Rgb([255, 255, 255]));
        }
    }

    let inpainted = pi::Session::builder()
        .image(img)
        .mask(mask)
        // the parallel discipline gives the same result for any thread count
        .update_discipline(pi::UpdateDiscipline::DoubleBuffered)
        .passes_per_level(40)
        // keep every pyramid level around so they can be inspected
        .keep_level_snapshots(true)
        .build()?
        .run(Some(Box::new(|update: pi::ProgressUpdate<'_>| {
            if update.stage.current == update.stage.total {
                println!(
                    "level {} done ({}/{} passes)",
                    update.level, update.total.current, update.total.total
                );
            }
        })))?;

    // writes level_0.png (full resolution) up to the coarsest level, plus offsets.png
    inpainted.save_debug("out/02_debug")?;
    inpainted.save("out/02.png")
}
