mod progress_window;

use structopt::StructOpt;

use patch_inpaint::{image::ImageOutputFormat as ImgFmt, Error, Session, UpdateDiscipline};
use progress_window::ProgressWindow;
use std::path::PathBuf;

fn parse_img_fmt(input: &str) -> Result<ImgFmt, String> {
    let fmt = match input {
        "png" => ImgFmt::Png,
        "jpg" => ImgFmt::Jpeg(75),
        "bmp" => ImgFmt::Bmp,
        other => {
            return Err(format!(
                "image format `{}` not one of: 'png', 'jpg', 'bmp'",
                other
            ))
        }
    };

    Ok(fmt)
}

fn parse_discipline(input: &str) -> Result<UpdateDiscipline, String> {
    match input {
        "in-place" => Ok(UpdateDiscipline::InPlace),
        "double-buffered" => Ok(UpdateDiscipline::DoubleBuffered),
        other => Err(format!(
            "update discipline `{}` not one of: 'in-place', 'double-buffered'",
            other
        )),
    }
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
struct Tweaks {
    /// The number of resolutions the image is resolved at, including the full one.
    /// Deeper pyramids capture larger structures, the depth is reduced automatically
    /// for small images.
    #[structopt(long, default_value = "8")]
    depth: u32,
    /// The number of refinement and propagation passes at each pyramid level
    #[structopt(long, default_value = "100")]
    passes: u32,
    /// The minimum distance, in pixels, between a donor pixel and the image border
    #[structopt(long, default_value = "2")]
    margin: u32,
    /// A seed value for the random generator, the same seed and inputs always give
    /// the same output
    #[structopt(long, default_value = "32542341")]
    seed: u64,
    /// How many times a random donor is redrawn after landing on a hole before
    /// one is picked from the list of known pixels
    #[structopt(long, default_value = "1000")]
    sample_attempts: u32,
    /// `in-place` updates every pixel as soon as it improves, `double-buffered`
    /// updates all pixels at the end of a pass and runs in parallel
    #[structopt(
        long,
        default_value = "in-place",
        parse(try_from_str = parse_discipline)
    )]
    discipline: UpdateDiscipline,
    /// Don't show the progress bars
    #[structopt(long)]
    no_progress: bool,
}

#[derive(StructOpt)]
#[structopt(
    name = "patch-inpaint",
    about = "Fills the holes of an image with patches from the rest of it",
    rename_all = "kebab-case"
)]
struct Opt {
    /// Path to the image to inpaint
    #[structopt(long, parse(from_os_str))]
    image: PathBuf,
    /// Path to the hole mask, pure white pixels are reconstructed and every
    /// other pixel is kept. Must be the same size as the image.
    #[structopt(long, parse(from_os_str))]
    mask: PathBuf,
    /// The format to save the inpainted image as.
    ///
    /// NOTE: this will only apply when stdout is specified via `-o -`, otherwise the image
    /// format is determined by the file extension of the path provided to `-o`
    #[structopt(
        long,
        default_value = "png",
        parse(try_from_str = parse_img_fmt)
    )]
    out_fmt: ImgFmt,
    /// The path to save the inpainted image to, the file extensions of the path determines
    /// the image format used. You may use `-` for stdout.
    #[structopt(long = "out", short, parse(from_os_str))]
    output_path: PathBuf,
    /// A directory into which debug images are also saved.
    ///
    /// * `level_<n>.png` - The resolved image of every pyramid level, 0 is the full resolution
    /// * `offsets.png` - The offset of every hole pixel to its donor
    #[structopt(long, parse(from_os_str))]
    debug_out_dir: Option<PathBuf>,
    /// The maximum number of worker threads that can be active at any one time
    /// with the double-buffered discipline. Defaults to the logical core count.
    #[structopt(short = "t", long = "threads")]
    max_threads: Option<usize>,
    #[structopt(flatten)]
    tweaks: Tweaks,
}

fn main() {
    if let Err(e) = real_main() {
        if atty::is(atty::Stream::Stderr) {
            eprintln!("\x1b[31merror\x1b[0m: {}", e);
        } else {
            eprintln!("error: {}", e);
        }

        std::process::exit(1);
    }
}

fn real_main() -> Result<(), Error> {
    let args = Opt::from_args();

    // Check that the extension for the path supplied by the user is one of the ones we support
    {
        match args.output_path.extension().and_then(|ext| ext.to_str()) {
            Some("png") | Some("jpg") | Some("bmp") => {}
            None => {}
            Some(other) => return Err(Error::UnsupportedOutputFormat(other.to_owned())),
        }
    }

    let mut sb = Session::builder()
        .image(&args.image)
        .mask(&args.mask)
        .pyramid_depth(args.tweaks.depth)
        .passes_per_level(args.tweaks.passes)
        .border_margin(args.tweaks.margin)
        .seed(args.tweaks.seed)
        .max_sample_attempts(args.tweaks.sample_attempts)
        .update_discipline(args.tweaks.discipline)
        .keep_level_snapshots(args.debug_out_dir.is_some());

    if let Some(mt) = args.max_threads {
        sb = sb.max_thread_count(mt);
    }

    let session = sb.build()?;

    let progress: Option<Box<dyn patch_inpaint::InpaintProgress>> = if !args.tweaks.no_progress {
        Some(Box::new(ProgressWindow::new()))
    } else {
        None
    };

    let inpainted = session.run(progress)?;

    if let Some(ref dir) = args.debug_out_dir {
        inpainted.save_debug(dir)?;
    }

    if args.output_path.to_str() == Some("-") {
        let out = std::io::stdout();
        let mut out = out.lock();
        inpainted.write(&mut out, args.out_fmt)?;
    } else {
        // This won't respect the output format specified by the user,
        // only the extension on the path they specify
        inpainted.save(&args.output_path)?;
    }

    Ok(())
}
