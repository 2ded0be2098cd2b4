use crate::*;

/// Inpainting session.
///
/// Calling `run()` will reconstruct the masked pixels of the image and return
/// the result, consuming the session in the process. You can provide an
/// `InpaintProgress` implementation to get an update with the current state of
/// the image after every pass.
///
/// # Example
/// ```no_run
/// let session = patch_inpaint::Session::builder()
///     .seed(10)
///     .image(&"imgs/1.jpg")
///     .mask(&"masks/1.png")
///     .build().expect("failed to build session");
///
/// let inpainted = session.run(None).expect("failed to inpaint");
/// inpainted.save("my_inpainted_img.png").expect("failed to save image");
/// ```
pub struct Session {
    image: image::RgbImage,
    mask: image::RgbImage,
    params: Parameters,
}

impl Session {
    /// Creates a new session with default parameters.
    pub fn builder<'a>() -> SessionBuilder<'a> {
        SessionBuilder::default()
    }

    /// Runs the inpainter and outputs the reconstructed image. Fails if some
    /// pyramid level has holes but no known pixel to copy patches from.
    pub fn run(self, progress: Option<Box<dyn InpaintProgress>>) -> Result<InpaintedImage, Error> {
        let inner = Inpainter::resolve(
            self.image,
            self.mask,
            &self.params.to_inpaint_params(),
            progress,
        )?;

        Ok(InpaintedImage { inner })
    }
}

/// Builds a session by setting parameters and adding the input images,
/// calling `build` will check all of the provided inputs to verify that
/// inpainting can be run on them
#[derive(Default)]
pub struct SessionBuilder<'a> {
    image: Option<ImageSource<'a>>,
    mask: Option<ImageSource<'a>>,
    params: Parameters,
}

impl<'a> SessionBuilder<'a> {
    /// Creates a new `SessionBuilder`, can also be created via
    /// `Session::builder()`
    pub fn new() -> Self {
        Self::default()
    }

    /// The image to inpaint. Whatever is under the holes of the mask is
    /// discarded.
    pub fn image<I: Into<ImageSource<'a>>>(mut self, image: I) -> Self {
        self.image = Some(image.into());
        self
    }

    /// The hole mask, pure white pixels are reconstructed, every other pixel
    /// is kept and may be copied from. Must be the same size as the image.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// let session = patch_inpaint::Session::builder()
    ///     .image(&"imgs/3.jpg")
    ///     .mask(&"masks/3_inpaint.png")
    ///     .build().expect("failed to build session");
    /// ```
    pub fn mask<I: Into<ImageSource<'a>>>(mut self, mask: I) -> Self {
        self.mask = Some(mask.into());
        self
    }

    /// Changes the deterministic seed.
    ///
    /// The same inputs and seed always produce the same image.
    ///
    /// Default: 32542341
    pub fn seed(mut self, value: u64) -> Self {
        self.params.seed = value;
        self
    }

    /// The number of resolutions the image is resolved at, including the
    /// full resolution. Coarser levels capture larger structures. The depth
    /// is reduced automatically when the image is too small for it.
    ///
    /// Default: 8
    pub fn pyramid_depth(mut self, levels: u32) -> Self {
        self.params.pyramid_depth = levels;
        self
    }

    /// The number of refinement and propagation passes over every hole pixel
    /// at each pyramid level.
    ///
    /// Default: 100
    pub fn passes_per_level(mut self, passes: u32) -> Self {
        self.params.passes_per_level = passes;
        self
    }

    /// The minimum distance, in pixels, between a donor pixel and the image
    /// border. Must be at least 2 so the 5x5 patch around a donor fits.
    ///
    /// Default: 2
    pub fn border_margin(mut self, margin: u32) -> Self {
        self.params.border_margin = margin;
        self
    }

    /// How many times a random donor is redrawn after landing on a hole
    /// before one is picked from the list of all known pixels instead.
    ///
    /// Default: 1000
    pub fn max_sample_attempts(mut self, attempts: u32) -> Self {
        self.params.max_sample_attempts = attempts;
        self
    }

    /// Whether pixels are updated in place during a pass, or all at once at
    /// the end of it. See `UpdateDiscipline`, the two produce different
    /// images for the same seed.
    ///
    /// Default: `UpdateDiscipline::InPlace`
    pub fn update_discipline(mut self, discipline: UpdateDiscipline) -> Self {
        self.params.update_discipline = discipline;
        self
    }

    /// Controls the maximum number of threads that will be spawned at any one
    /// time in parallel. Only used with `UpdateDiscipline::DoubleBuffered`,
    /// whose output does not depend on it.
    ///
    /// Default: The number of logical cores on this system.
    pub fn max_thread_count(mut self, count: usize) -> Self {
        self.params.max_thread_count = Some(count);
        self
    }

    /// Keeps a copy of every pyramid level once it is resolved, see
    /// `InpaintedImage::level_snapshots` and `InpaintedImage::save_debug`.
    ///
    /// Default: false
    pub fn keep_level_snapshots(mut self, keep: bool) -> Self {
        self.params.keep_level_snapshots = keep;
        self
    }

    /// Creates a `Session`, or returns an error if invalid parameters or input
    /// images were specified.
    pub fn build(self) -> Result<Session, Error> {
        self.check_parameters_validity()?;

        let image = load_image(self.image.ok_or(Error::MissingInput("image"))?)?;
        let mask = load_image(self.mask.ok_or(Error::MissingInput("mask"))?)?;

        if image.dimensions() != mask.dimensions() {
            return Err(Error::SizeMismatch(errors::SizeMismatch {
                image: Dims::new(image.width(), image.height()),
                mask: Dims::new(mask.width(), mask.height()),
            }));
        }

        Ok(Session {
            image,
            mask,
            params: self.params,
        })
    }

    fn check_parameters_validity(&self) -> Result<(), Error> {
        if self.params.pyramid_depth < 1 || self.params.pyramid_depth > 16 {
            return Err(Error::InvalidRange(errors::InvalidRange {
                min: 1.0,
                max: 16.0,
                value: self.params.pyramid_depth as f32,
                name: "pyramid-depth",
            }));
        }

        let min_margin = patch::PATCH_RADIUS as u32;
        if self.params.border_margin < min_margin || self.params.border_margin > 64 {
            return Err(Error::InvalidRange(errors::InvalidRange {
                min: min_margin as f32,
                max: 64.0,
                value: self.params.border_margin as f32,
                name: "border-margin",
            }));
        }

        if self.params.max_sample_attempts == 0 {
            return Err(Error::InvalidRange(errors::InvalidRange {
                min: 1.0,
                max: u32::MAX as f32,
                value: 0.0,
                name: "max-sample-attempts",
            }));
        }

        if let Some(max_count) = self.params.max_thread_count {
            if max_count == 0 {
                return Err(Error::InvalidRange(errors::InvalidRange {
                    min: 1.0,
                    max: 1024.0,
                    value: max_count as f32,
                    name: "max-thread-count",
                }));
            }
        }

        Ok(())
    }
}

/// Helper struct for passing progress information to external callers
pub struct ProgressStat {
    /// The current amount of work that has been done
    pub current: usize,
    /// The total amount of work to do
    pub total: usize,
}

/// The current state of the inpainter
pub struct ProgressUpdate<'a> {
    /// The image of the pyramid level currently being resolved
    pub image: &'a image::RgbImage,
    /// The pyramid level currently being resolved, 0 is the full resolution
    pub level: usize,
    /// The passes done over all levels
    pub total: ProgressStat,
    /// The passes done at the current level
    pub stage: ProgressStat,
}

/// Allows the inpainter to update external callers with the current
/// progress of the reconstruction
pub trait InpaintProgress {
    fn update(&mut self, info: ProgressUpdate<'_>);
}

impl<G> InpaintProgress for G
where
    G: FnMut(ProgressUpdate<'_>) + Send,
{
    fn update(&mut self, info: ProgressUpdate<'_>) {
        self(info)
    }
}
