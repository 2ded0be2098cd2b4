use patch_inpaint as pi;

fn main() -> Result<(), pi::Error> {
    // a few horizontal bands, with a square punched out of the middle
    let img = pi::image::RgbImage::from_fn(160, 120, |x, y| {
        let band = (y / 15) as u8;
        pi::image::Rgb([40 + band * 25, 90 + (x / 40) as u8 * 30, 200 - band * 20])
    });

    // pure white marks the pixels to fill in, anything else is kept
    let mut mask = pi::image::RgbImage::new(160, 120);
    for x in 60..100 {
        for y in 40..80 {
            mask.put_pixel(x, y, pi::image::Rgb([255, 255, 255]));
        }
    }

    let inpainted = pi::Session::builder()
        .image(img)
        .mask(mask)
        .pyramid_depth(4)
        .passes_per_level(30)
        .build()?
        .run(None)?;

    //save the result to the disk
    inpainted.save("out/01.png")
}
