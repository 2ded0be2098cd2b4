use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::donor::DonorSampler;
use crate::img_pyramid::ImagePyramid;
use crate::offset::{Coord2D, Offset, OffsetField};
use crate::patchmatch::{resolve_level, Canvas, EngineParams, PyramidLevel, UpdateDiscipline};
use crate::session::{InpaintProgress, ProgressStat, ProgressUpdate};
use crate::utils::paint_holes;
use crate::Error;

#[derive(Debug)]
pub(crate) struct InpaintParams {
    /// Number of pyramid levels, including the full resolution one
    pub(crate) pyramid_depth: u32,
    /// Refinement and propagation passes run at every level
    pub(crate) passes_per_level: u32,
    /// Minimum distance between a donor and the image border
    pub(crate) border_margin: u32,
    /// random seed
    pub(crate) seed: u64,
    /// How many times a random donor is redrawn before falling back to the
    /// list of known donors
    pub(crate) max_sample_attempts: u32,
    pub(crate) discipline: UpdateDiscipline,
    pub(crate) max_thread_count: usize,
    pub(crate) keep_level_snapshots: bool,
}

/// The coarse to fine inpainting of a single image
pub struct Inpainter {
    pub(crate) color_map: image::RgbImage,
    pub(crate) offsets: OffsetField,
    // finest level first
    pub(crate) level_snapshots: Vec<image::RgbImage>,
}

impl Inpainter {
    pub(crate) fn resolve(
        mut color_map: image::RgbImage,
        mask: image::RgbImage,
        params: &InpaintParams,
        mut progress: Option<Box<dyn InpaintProgress>>,
    ) -> Result<Self, Error> {
        let (width, height) = color_map.dimensions();
        let hole_count = paint_holes(&mut color_map, &mask);
        let pixel_count = width as usize * height as usize;

        log::info!(
            "inpainting {}x{} image, {} of {} pixels masked ({:.2}%)",
            width,
            height,
            hole_count,
            pixel_count,
            hole_count as f64 / pixel_count.max(1) as f64 * 100.0
        );

        if hole_count == 0 {
            return Ok(Self {
                color_map,
                offsets: OffsetField::new(width, height),
                level_snapshots: Vec::new(),
            });
        }

        let pyramid = ImagePyramid::new(
            color_map,
            mask,
            params.pyramid_depth,
            params.border_margin,
        )?;

        let mut levels: Vec<PyramidLevel> = pyramid
            .levels
            .into_iter()
            .map(|(color_map, mask)| PyramidLevel::new(color_map, mask))
            .collect();

        let engine = EngineParams {
            passes: params.passes_per_level,
            discipline: params.discipline,
            max_thread_count: params.max_thread_count,
        };

        let levels_to_resolve = levels.iter().filter(|l| !l.holes.is_empty()).count();
        let total_passes = levels_to_resolve * params.passes_per_level as usize;
        let mut total_done = 0;

        let mut rng = Pcg32::seed_from_u64(params.seed);
        let mut level_snapshots = Vec::new();
        let coarsest = levels.len() - 1;

        for level_index in (0..levels.len()).rev() {
            let (finer, coarser) = levels.split_at_mut(level_index + 1);
            let level = &mut finer[level_index];
            let (width, height) = level.mask.dimensions();

            log::debug!(
                "level {}: {}x{}, {} hole pixels",
                level_index,
                width,
                height,
                level.holes.len()
            );

            if !level.holes.is_empty() {
                let sampler =
                    DonorSampler::new(&level.mask, params.border_margin, params.max_sample_attempts)
                        .ok_or(Error::NoDonor { level: level_index })?;

                if level_index == coarsest {
                    seed_offsets(&mut level.canvas, &level.holes, &sampler, &mut rng);
                } else {
                    inherit_from_coarser(
                        &mut level.canvas,
                        &level.holes,
                        &coarser[0].canvas,
                        &sampler,
                        &mut rng,
                    );
                }

                resolve_level(
                    &mut level.canvas,
                    &level.holes,
                    &sampler,
                    &engine,
                    &mut rng,
                    &mut |pass, image| {
                        total_done += 1;

                        if let Some(ref mut progress) = progress {
                            progress.update(ProgressUpdate {
                                image,
                                level: level_index,
                                total: ProgressStat {
                                    current: total_done,
                                    total: total_passes,
                                },
                                stage: ProgressStat {
                                    current: pass as usize,
                                    total: engine.passes as usize,
                                },
                            });
                        }
                    },
                );
            }

            log::debug!("level {} resolved", level_index);

            if params.keep_level_snapshots {
                level_snapshots.push(level.canvas.color_map.clone());
            }
        }

        level_snapshots.reverse();

        let Canvas { color_map, offsets } = levels.swap_remove(0).canvas;

        Ok(Self {
            color_map,
            offsets,
            level_snapshots,
        })
    }

    /// Visualizes the offset field, red and green encode the horizontal and
    /// vertical displacement relative to the image size, blue marks pixels
    /// that were inpainted
    pub fn get_offset_map(&self) -> image::RgbImage {
        let (width, height) = self.offsets.dimensions();

        image::RgbImage::from_fn(width, height, |x, y| {
            let offset = self.offsets.get(x, y);
            if offset == Offset::ZERO {
                return image::Rgb([0, 0, 0]);
            }

            let encode = |d: i32, extent: u32| {
                (128.0 + d as f32 / extent as f32 * 127.0).max(0.0).min(255.0) as u8
            };
            image::Rgb([encode(offset.dx, width), encode(offset.dy, height), 255])
        })
    }
}

/// Points every hole of the coarsest level at a random donor
fn seed_offsets<R: Rng>(
    canvas: &mut Canvas,
    holes: &[Coord2D],
    sampler: &DonorSampler<'_>,
    rng: &mut R,
) {
    for &cell in holes {
        let donor = sampler.sample(rng);
        canvas.adopt(cell, Offset::between(cell, donor));
    }
}

/// Carries the result of the coarser level over to the holes of the finer
/// one. Every fine pixel takes the offset of the coarse pixel at half its
/// coordinates, doubled, and the color of the donor that offset lands on at
/// this resolution. Inherited offsets that do not land on a valid donor at
/// this level are replaced by a random donor.
fn inherit_from_coarser<R: Rng>(
    canvas: &mut Canvas,
    holes: &[Coord2D],
    coarser: &Canvas,
    sampler: &DonorSampler<'_>,
    rng: &mut R,
) {
    let (coarse_width, coarse_height) = coarser.color_map.dimensions();

    for &cell in holes {
        // odd sizes leave the last row/column without a parent of its own
        let parent = Coord2D::from(
            (cell.x / 2).min(coarse_width - 1),
            (cell.y / 2).min(coarse_height - 1),
        );
        let offset = coarser.offsets.at(parent).upscaled();

        let offset = if sampler.is_valid_donor(cell.to_signed().shifted(offset)) {
            offset
        } else {
            Offset::between(cell, sampler.sample(rng))
        };
        canvas.adopt(cell, offset);
    }
}
