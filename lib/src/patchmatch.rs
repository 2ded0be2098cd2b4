//! Randomized refinement and propagation of the offset field of a single
//! pyramid level

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::donor::DonorSampler;
use crate::offset::{Coord2D, Offset, OffsetField, SignedCoord2D};
use crate::patch::{patch_distance, Score};
use crate::utils::is_hole;

/// Controls whether the pixels resolved during a pass can see each other's
/// updates before the pass is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateDiscipline {
    /// Every pixel is updated in place as soon as it is visited, so pixels
    /// visited later in the same pass already see the new offsets and colors
    /// (Gauss-Seidel). Single threaded, and consumes the random stream in
    /// traversal order.
    InPlace,
    /// Every pixel of a pass decides against the state left by the previous
    /// pass and all decisions are applied together once the pass is done
    /// (Jacobi). Pixels are spread across worker threads, each pixel drawing
    /// from its own generator derived from the pass seed, so the result does
    /// not depend on the number of threads.
    DoubleBuffered,
}

impl Default for UpdateDiscipline {
    fn default() -> Self {
        Self::InPlace
    }
}

// down, right, up, left
const NEIGHBORS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// The mutable half of a pyramid level
#[derive(Clone)]
pub(crate) struct Canvas {
    pub(crate) color_map: image::RgbImage,
    pub(crate) offsets: OffsetField,
}

impl Canvas {
    /// Points `cell` at the donor `offset` away and copies the donor's color
    pub(crate) fn adopt(&mut self, cell: Coord2D, offset: Offset) {
        let donor = cell.to_signed().shifted(offset);
        debug_assert!(donor.is_in_bounds(self.color_map.dimensions()));

        let donor = donor.to_unsigned();
        let color = *self.color_map.get_pixel(donor.x, donor.y);
        self.color_map.put_pixel(cell.x, cell.y, color);
        self.offsets.set(cell, offset);
    }
}

pub(crate) struct PyramidLevel {
    pub(crate) mask: image::RgbImage,
    /// Hole pixels in column-major order, which is the traversal order of
    /// every pass
    pub(crate) holes: Vec<Coord2D>,
    pub(crate) canvas: Canvas,
}

impl PyramidLevel {
    pub(crate) fn new(color_map: image::RgbImage, mask: image::RgbImage) -> Self {
        let (width, height) = mask.dimensions();

        let mut holes = Vec::new();
        for x in 0..width {
            for y in 0..height {
                if is_hole(&mask, x, y) {
                    holes.push(Coord2D::from(x, y));
                }
            }
        }

        Self {
            mask,
            holes,
            canvas: Canvas {
                color_map,
                offsets: OffsetField::new(width, height),
            },
        }
    }
}

/// Read only view of a level used to score candidates
#[derive(Clone, Copy)]
pub(crate) struct LevelView<'a> {
    color_map: &'a image::RgbImage,
    mask: &'a image::RgbImage,
    offsets: &'a OffsetField,
}

impl<'a> LevelView<'a> {
    pub(crate) fn new(canvas: &'a Canvas, mask: &'a image::RgbImage) -> Self {
        Self {
            color_map: &canvas.color_map,
            mask,
            offsets: &canvas.offsets,
        }
    }

    #[inline]
    pub(crate) fn score(&self, cell: Coord2D, offset: Offset) -> Score {
        let query = cell.to_signed();
        patch_distance(self.color_map, self.mask, query, query.shifted(offset))
    }

    /// The offset currently stored for `cell` and its score
    pub(crate) fn current(&self, cell: Coord2D) -> (Offset, Score) {
        let offset = self.offsets.at(cell);
        (offset, self.score(cell, offset))
    }

    /// Proposes one random donor, returning it only if it beats `current`
    pub(crate) fn refinement<R: Rng>(
        &self,
        cell: Coord2D,
        current: (Offset, Score),
        sampler: &DonorSampler<'_>,
        rng: &mut R,
    ) -> Option<(Offset, Score)> {
        let candidate = Offset::between(cell, sampler.sample(rng));
        let score = self.score(cell, candidate);

        if score < current.1 {
            Some((candidate, score))
        } else {
            None
        }
    }

    /// Tries the offsets of the neighboring hole pixels, returning the best
    /// one only if it beats `current`
    pub(crate) fn propagation(
        &self,
        cell: Coord2D,
        current: (Offset, Score),
    ) -> Option<(Offset, Score)> {
        let dims = self.mask.dimensions();
        let origin = cell.to_signed();
        let mut best: Option<(Offset, Score)> = None;

        for &(dx, dy) in NEIGHBORS.iter() {
            let neighbor = SignedCoord2D::from(origin.x + dx, origin.y + dy);
            if !neighbor.is_in_bounds(dims) {
                continue;
            }

            let neighbor = neighbor.to_unsigned();
            if !is_hole(self.mask, neighbor.x, neighbor.y) {
                continue;
            }

            let candidate = self.offsets.at(neighbor);
            if !origin.shifted(candidate).is_in_bounds(dims) {
                continue;
            }

            let score = self.score(cell, candidate);
            let to_beat = best.map_or(current.1, |(_, s)| s);
            if score < to_beat {
                best = Some((candidate, score));
            }
        }

        best
    }
}

pub(crate) struct EngineParams {
    pub(crate) passes: u32,
    pub(crate) discipline: UpdateDiscipline,
    pub(crate) max_thread_count: usize,
}

/// Runs every refinement and propagation pass over the `holes` of one level,
/// the level's mask being the one `sampler` draws against.
///
/// `on_pass` is called after each pass with the number of passes done and
/// the current state of the level's image.
pub(crate) fn resolve_level<R: Rng>(
    canvas: &mut Canvas,
    holes: &[Coord2D],
    sampler: &DonorSampler<'_>,
    params: &EngineParams,
    rng: &mut R,
    on_pass: &mut dyn FnMut(u32, &image::RgbImage),
) {
    if holes.is_empty() {
        return;
    }

    let mask = sampler.mask();

    for pass in 0..params.passes {
        match params.discipline {
            UpdateDiscipline::InPlace => {
                pass_in_place(canvas, mask, holes, sampler, rng);
            }
            UpdateDiscipline::DoubleBuffered => {
                let pass_seed: u64 = rng.gen();
                pass_double_buffered(
                    canvas,
                    mask,
                    holes,
                    sampler,
                    pass_seed,
                    params.max_thread_count,
                );
            }
        }

        on_pass(pass + 1, &canvas.color_map);
    }
}

fn pass_in_place<R: Rng>(
    canvas: &mut Canvas,
    mask: &image::RgbImage,
    holes: &[Coord2D],
    sampler: &DonorSampler<'_>,
    rng: &mut R,
) {
    for &cell in holes {
        let refined = {
            let view = LevelView::new(canvas, mask);
            view.refinement(cell, view.current(cell), sampler, rng)
        };
        if let Some((offset, _)) = refined {
            canvas.adopt(cell, offset);
        }

        // the cell's own color may have just changed, so score from scratch
        let propagated = {
            let view = LevelView::new(canvas, mask);
            view.propagation(cell, view.current(cell))
        };
        if let Some((offset, _)) = propagated {
            canvas.adopt(cell, offset);
        }
    }
}

fn pass_double_buffered(
    canvas: &mut Canvas,
    mask: &image::RgbImage,
    holes: &[Coord2D],
    sampler: &DonorSampler<'_>,
    pass_seed: u64,
    max_thread_count: usize,
) {
    let decisions: Vec<Option<Offset>> = {
        let view = LevelView::new(canvas, mask);

        let decide = |index: usize, cell: Coord2D| {
            let mut cell_rng = Pcg32::seed_from_u64(pass_seed.wrapping_add(index as u64));

            let current = view.current(cell);
            let refined = view.refinement(cell, current, sampler, &mut cell_rng);
            let best = refined.unwrap_or(current);

            view.propagation(cell, best)
                .or(refined)
                .map(|(offset, _)| offset)
        };

        decide_all(holes, &decide, max_thread_count)
    };

    // donors are always known pixels, which never change, so the order in
    // which decisions are applied does not matter
    for (&cell, decision) in holes.iter().zip(decisions) {
        if let Some(offset) = decision {
            canvas.adopt(cell, offset);
        }
    }
}

// for WASM we do not have threads, so just decide everything serially
#[cfg(target_arch = "wasm32")]
fn decide_all<F>(holes: &[Coord2D], decide: &F, _max_thread_count: usize) -> Vec<Option<Offset>>
where
    F: Fn(usize, Coord2D) -> Option<Offset> + Sync,
{
    holes
        .iter()
        .enumerate()
        .map(|(i, cell)| decide(i, *cell))
        .collect()
}

#[cfg(not(target_arch = "wasm32"))]
fn decide_all<F>(holes: &[Coord2D], decide: &F, max_thread_count: usize) -> Vec<Option<Offset>>
where
    F: Fn(usize, Coord2D) -> Option<Offset> + Sync,
{
    let n_workers = max_thread_count.min(holes.len()).max(1);
    let chunk_size = (holes.len() + n_workers - 1) / n_workers;

    let decided = crossbeam_utils::thread::scope(|scope| {
        let handles: Vec<_> = holes
            .chunks(chunk_size)
            .enumerate()
            .map(|(chunk_index, cells)| {
                scope.spawn(move |_| {
                    cells
                        .iter()
                        .enumerate()
                        .map(|(i, cell)| decide(chunk_index * chunk_size + i, *cell))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(decisions) => decisions,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect::<Vec<_>>()
    });

    match decided {
        Ok(decisions) => decisions,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const WHITE: image::Rgb<u8> = image::Rgb([255, 255, 255]);

    fn checkerboard_level(size: u32, hole: std::ops::Range<u32>) -> PyramidLevel {
        let mut color_map = image::RgbImage::from_fn(size, size, |x, y| {
            if (x / 3 + y / 3) % 2 == 0 {
                image::Rgb([200, 30, 30])
            } else {
                image::Rgb([30, 30, 200])
            }
        });
        let mut mask = image::RgbImage::new(size, size);
        for x in hole.clone() {
            for y in hole.clone() {
                mask.put_pixel(x, y, WHITE);
                color_map.put_pixel(x, y, WHITE);
            }
        }
        PyramidLevel::new(color_map, mask)
    }

    fn seed<R: Rng>(level: &mut PyramidLevel, rng: &mut R) {
        let sampler = DonorSampler::new(&level.mask, 2, 100).unwrap();
        for &cell in &level.holes {
            let donor = sampler.sample(rng);
            level.canvas.adopt(cell, Offset::between(cell, donor));
        }
    }

    fn params(discipline: UpdateDiscipline, threads: usize) -> EngineParams {
        EngineParams {
            passes: 5,
            discipline,
            max_thread_count: threads,
        }
    }

    #[test]
    fn holes_are_column_major() {
        let level = checkerboard_level(16, 6..8);
        assert_eq!(
            level.holes,
            vec![
                Coord2D::from(6, 6),
                Coord2D::from(6, 7),
                Coord2D::from(7, 6),
                Coord2D::from(7, 7)
            ]
        );
    }

    #[test]
    fn adopt_copies_donor_color() {
        let mut level = checkerboard_level(16, 6..8);
        let cell = Coord2D::from(6, 6);
        let donor = Coord2D::from(3, 12);

        level.canvas.adopt(cell, Offset::between(cell, donor));

        assert_eq!(
            level.canvas.color_map.get_pixel(6, 6),
            level.canvas.color_map.get_pixel(3, 12)
        );
        assert_eq!(level.canvas.offsets.target(cell), donor.to_signed());
    }

    #[test]
    fn refinement_and_propagation_only_improve() {
        let mut level = checkerboard_level(32, 12..18);
        let mut rng = Pcg32::seed_from_u64(11);
        seed(&mut level, &mut rng);
        let sampler = DonorSampler::new(&level.mask, 2, 100).unwrap();

        for _ in 0..10 {
            for &cell in &level.holes {
                let view = LevelView::new(&level.canvas, &level.mask);
                let current = view.current(cell);

                if let Some((offset, score)) = view.refinement(cell, current, &sampler, &mut rng) {
                    assert!(score < current.1);
                    assert_eq!(view.score(cell, offset), score);
                }
                if let Some((offset, score)) = view.propagation(cell, current) {
                    assert!(score < current.1);
                    assert_eq!(view.score(cell, offset), score);
                }
            }

            let p = params(UpdateDiscipline::InPlace, 1);
            resolve_level(
                &mut level.canvas,
                &level.holes,
                &sampler,
                &p,
                &mut rng,
                &mut |_, _| {},
            );
        }
    }

    #[test]
    fn propagation_ignores_known_neighbors() {
        let mut level = checkerboard_level(24, 10..12);
        let cell = Coord2D::from(10, 10);

        // give a known neighbor a perfectly good looking offset, it must not
        // be picked up
        level
            .canvas
            .offsets
            .set(Coord2D::from(9, 10), Offset::new(6, 0));

        let view = LevelView::new(&level.canvas, &level.mask);
        assert!(view.propagation(cell, view.current(cell)).is_none());
    }

    #[test]
    fn accepted_offsets_reference_valid_donors() {
        for &(discipline, threads) in &[
            (UpdateDiscipline::InPlace, 1),
            (UpdateDiscipline::DoubleBuffered, 3),
        ] {
            let mut level = checkerboard_level(30, 11..19);
            let mut rng = Pcg32::seed_from_u64(5);
            seed(&mut level, &mut rng);
            let sampler = DonorSampler::new(&level.mask, 2, 100).unwrap();

            let mut passes_seen = 0;
            resolve_level(
                &mut level.canvas,
                &level.holes,
                &sampler,
                &params(discipline, threads),
                &mut rng,
                &mut |pass, _| passes_seen = pass,
            );
            assert_eq!(passes_seen, 5);

            for &cell in &level.holes {
                let target = level.canvas.offsets.target(cell);
                assert!(sampler.is_valid_donor(target));
                let target = target.to_unsigned();
                assert_eq!(
                    level.canvas.color_map.get_pixel(cell.x, cell.y),
                    level.canvas.color_map.get_pixel(target.x, target.y)
                );
            }
        }
    }

    #[test]
    fn double_buffered_is_independent_of_thread_count() {
        let run = |threads| {
            let mut level = checkerboard_level(40, 14..26);
            let mut rng = Pcg32::seed_from_u64(99);
            seed(&mut level, &mut rng);
            let sampler = DonorSampler::new(&level.mask, 2, 100).unwrap();
            resolve_level(
                &mut level.canvas,
                &level.holes,
                &sampler,
                &params(UpdateDiscipline::DoubleBuffered, threads),
                &mut rng,
                &mut |_, _| {},
            );
            level.canvas
        };

        let single = run(1);
        for &threads in &[2, 7] {
            let multi = run(threads);
            assert_eq!(single.offsets, multi.offsets);
            assert_eq!(single.color_map.as_raw(), multi.color_map.as_raw());
        }
    }
}
