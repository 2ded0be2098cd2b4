// BEGIN - Embark standard lints v0.4
// do not change or add/remove here, but one can add exceptions after this section
// for more info see: <https://github.com/EmbarkStudios/rust-ecosystem/issues/59>
#![deny(unsafe_code)]
#![warn(
    clippy::all,
    clippy::await_holding_lock,
    clippy::char_lit_as_u8,
    clippy::checked_conversions,
    clippy::dbg_macro,
    clippy::debug_assert_with_mut_call,
    clippy::doc_markdown,
    clippy::empty_enum,
    clippy::enum_glob_use,
    clippy::exit,
    clippy::expl_impl_clone_on_copy,
    clippy::explicit_deref_methods,
    clippy::explicit_into_iter_loop,
    clippy::fallible_impl_from,
    clippy::filter_map_next,
    clippy::float_cmp_const,
    clippy::fn_params_excessive_bools,
    clippy::if_let_mutex,
    clippy::implicit_clone,
    clippy::imprecise_flops,
    clippy::inefficient_to_string,
    clippy::invalid_upcast_comparisons,
    clippy::large_types_passed_by_value,
    clippy::let_unit_value,
    clippy::linkedlist,
    clippy::lossy_float_literal,
    clippy::macro_use_imports,
    clippy::manual_ok_or,
    clippy::map_err_ignore,
    clippy::map_flatten,
    clippy::map_unwrap_or,
    clippy::match_on_vec_items,
    clippy::match_same_arms,
    clippy::match_wildcard_for_single_variants,
    clippy::mem_forget,
    clippy::mismatched_target_os,
    clippy::mut_mut,
    clippy::mutex_integer,
    clippy::needless_borrow,
    clippy::needless_continue,
    clippy::option_option,
    clippy::path_buf_push_overwrite,
    clippy::ptr_as_ptr,
    clippy::ref_option_ref,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::same_functions_in_if_condition,
    clippy::semicolon_if_nothing_returned,
    clippy::string_add_assign,
    clippy::string_add,
    clippy::string_lit_as_bytes,
    clippy::string_to_string,
    clippy::todo,
    clippy::trait_duplication_in_bounds,
    clippy::unimplemented,
    clippy::unnested_or_patterns,
    clippy::unused_self,
    clippy::useless_transmute,
    clippy::verbose_file_reads,
    clippy::zero_sized_map_values,
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms
)]
// END - Embark standard lints v0.4
//! `patch-inpaint` is a light API for PatchMatch inpainting, filling the
//! masked holes of an image with patches copied from its known pixels.
//!
//! First, you build a `Session` via a `SessionBuilder`, which follows the builder pattern. Calling
//! `build` on the `SessionBuilder` loads the image and the hole mask and checks for various errors.
//!
//! `Session` has a `run()` method that reconstructs the holes coarse to fine over an image
//! pyramid, and returns the result as an `InpaintedImage`.
//!
//! You can save, stream, or inspect the image from `InpaintedImage`, including the offset
//! field that says which donor pixel every hole pixel was copied from.
//!
//! ## Masks
//!
//! The mask has the same size as the image. Pure white pixels (255, 255, 255) are holes,
//! every other color marks a known pixel.
//!
//! ## Usage
//! Session follows a "builder pattern" for defining parameters, meaning you chain functions together.
//!
//! ```no_run
//! // Create a new session with default parameters
//! let session = patch_inpaint::Session::builder()
//!     // Set some parameters
//!     .seed(10)
//!     .passes_per_level(50)
//!     // Specify the inputs
//!     .image(&"imgs/1.jpg")
//!     .mask(&"masks/1.png")
//!     // Build the session
//!     .build().expect("failed to build session");
//!
//! // Fill the holes
//! let inpainted = session.run(None).expect("failed to inpaint");
//!
//! // Save the result to disk
//! inpainted.save("my_inpainted_img.png").expect("failed to save image");
//! ```
mod donor;
mod errors;
mod img_pyramid;
mod multires;
mod offset;
mod patch;
mod patchmatch;
pub mod session;
mod utils;

use multires::{InpaintParams, Inpainter};
use utils::load_image;

pub use image;
use std::path::Path;

pub use errors::Error;
pub use offset::{Offset, OffsetField};
pub use patchmatch::UpdateDiscipline;
pub use session::{InpaintProgress, ProgressStat, ProgressUpdate, Session, SessionBuilder};
pub use utils::{is_hole, is_hole_pixel, load_dynamic_image, ImageSource};

/// Simple dimensions struct
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Dims {
    pub width: u32,
    pub height: u32,
}

impl Dims {
    pub fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

struct Parameters {
    pyramid_depth: u32,
    passes_per_level: u32,
    border_margin: u32,
    max_sample_attempts: u32,
    update_discipline: UpdateDiscipline,
    max_thread_count: Option<usize>,
    keep_level_snapshots: bool,
    seed: u64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            pyramid_depth: 8,
            passes_per_level: 100,
            border_margin: 2,
            max_sample_attempts: 1000,
            update_discipline: UpdateDiscipline::InPlace,
            max_thread_count: None,
            keep_level_snapshots: false,
            seed: 32_542_341,
        }
    }
}

impl Parameters {
    fn to_inpaint_params(&self) -> InpaintParams {
        InpaintParams {
            pyramid_depth: self.pyramid_depth,
            passes_per_level: self.passes_per_level,
            border_margin: self.border_margin,
            seed: self.seed,
            max_sample_attempts: self.max_sample_attempts,
            discipline: self.update_discipline,
            max_thread_count: self.max_thread_count.unwrap_or_else(num_cpus::get),
            keep_level_snapshots: self.keep_level_snapshots,
        }
    }
}

/// An image inpainted by a `Session::run()`
pub struct InpaintedImage {
    inner: Inpainter,
}

impl InpaintedImage {
    /// Saves the inpainted image to the specified path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        if let Some(parent_path) = path.parent() {
            std::fs::create_dir_all(&parent_path)?;
        }

        self.inner.color_map.save(&path)?;
        Ok(())
    }

    /// Writes the inpainted image to the specified stream
    pub fn write<W: std::io::Write>(
        self,
        writer: &mut W,
        fmt: image::ImageOutputFormat,
    ) -> Result<(), Error> {
        let dyn_img = self.into_image();
        Ok(dyn_img.write_to(writer, fmt)?)
    }

    /// Saves debug information: every resolved pyramid level, if the session
    /// kept them, as `level_<n>.png` where 0 is the full resolution, and a
    /// visualization of the offset field as `offsets.png`.
    pub fn save_debug<P: AsRef<Path>>(&self, dir: P) -> Result<(), Error> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(&dir)?;

        for (i, level) in self.inner.level_snapshots.iter().enumerate() {
            level.save(&dir.join(format!("level_{}.png", i)))?;
        }
        self.offset_map().save(&dir.join("offsets.png"))?;

        Ok(())
    }

    /// The offset of every pixel to the donor it was copied from. Known
    /// pixels have a zero offset.
    ///
    /// ```no_run
    /// let inpainted = patch_inpaint::Session::builder()
    ///     .image(&"imgs/1.jpg")
    ///     .mask(&"masks/1.png")
    ///     .build().unwrap()
    ///     .run(None).unwrap();
    ///
    /// let offset = inpainted.offset_field().get(10, 20);
    /// println!("(10, 20) was copied from ({}, {})", 10 + offset.dx, 20 + offset.dy);
    /// ```
    pub fn offset_field(&self) -> &OffsetField {
        &self.inner.offsets
    }

    /// Color coded view of the offset field
    pub fn offset_map(&self) -> image::RgbImage {
        self.inner.get_offset_map()
    }

    /// The resolved image of every pyramid level, full resolution first.
    /// Empty unless `SessionBuilder::keep_level_snapshots` was set.
    pub fn level_snapshots(&self) -> &[image::RgbImage] {
        &self.inner.level_snapshots
    }

    /// Returns the inpainted output image
    pub fn into_image(self) -> image::DynamicImage {
        image::DynamicImage::ImageRgb8(self.inner.color_map)
    }
}

impl AsRef<image::RgbImage> for InpaintedImage {
    fn as_ref(&self) -> &image::RgbImage {
        &self.inner.color_map
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn gray(size: u32) -> image::RgbImage {
        image::RgbImage::from_pixel(size, size, image::Rgb([90, 90, 90]))
    }

    #[test]
    fn defaults() {
        let params = Parameters::default().to_inpaint_params();

        assert_eq!(params.pyramid_depth, 8);
        assert_eq!(params.passes_per_level, 100);
        assert_eq!(params.border_margin, 2);
        assert_eq!(params.seed, 32_542_341);
        assert_eq!(params.discipline, UpdateDiscipline::InPlace);
        assert!(params.max_thread_count >= 1);
        assert!(!params.keep_level_snapshots);
    }

    #[test]
    fn missing_inputs() {
        match Session::builder().mask(gray(10)).build() {
            Err(Error::MissingInput("image")) => {}
            _ => panic!("expected a missing image"),
        }
        match Session::builder().image(gray(10)).build() {
            Err(Error::MissingInput("mask")) => {}
            _ => panic!("expected a missing mask"),
        }
    }

    #[test]
    fn size_mismatch() {
        match Session::builder().image(gray(10)).mask(gray(12)).build() {
            Err(Error::SizeMismatch(mismatch)) => {
                assert_eq!(mismatch.image, Dims::square(10));
                assert_eq!(mismatch.mask, Dims::square(12));
            }
            _ => panic!("expected a size mismatch"),
        }
    }

    #[test]
    fn invalid_ranges() {
        let builders = vec![
            Session::builder().pyramid_depth(0),
            Session::builder().pyramid_depth(17),
            Session::builder().border_margin(1),
            Session::builder().border_margin(65),
            Session::builder().max_sample_attempts(0),
            Session::builder().max_thread_count(0),
        ];

        for builder in builders {
            match builder.image(gray(10)).mask(gray(10)).build() {
                Err(Error::InvalidRange(_)) => {}
                _ => panic!("expected an invalid range"),
            }
        }
    }

    #[test]
    fn margin_must_fit_a_patch() {
        let radius = patch::PATCH_RADIUS as u32;

        assert!(Session::builder()
            .border_margin(radius)
            .image(gray(10))
            .mask(gray(10))
            .build()
            .is_ok());

        match Session::builder()
            .border_margin(radius - 1)
            .image(gray(10))
            .mask(gray(10))
            .build()
        {
            Err(Error::InvalidRange(range)) => assert_eq!(range.min, radius as f32),
            _ => panic!("expected an invalid range"),
        }
    }
}
