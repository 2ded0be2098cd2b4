use rand::Rng;

use crate::offset::{Coord2D, SignedCoord2D};
use crate::utils::is_hole;

/// Picks random donor pixels for one pyramid level.
///
/// A donor is a known pixel at least `margin` pixels away from every border,
/// so that the patch around it always fits inside the image.
pub(crate) struct DonorSampler<'a> {
    mask: &'a image::RgbImage,
    margin: u32,
    max_attempts: u32,
    // every valid donor, in case rejection sampling keeps missing
    fallback: Vec<Coord2D>,
}

impl<'a> DonorSampler<'a> {
    /// Returns `None` if the level has no valid donor at all
    pub(crate) fn new(mask: &'a image::RgbImage, margin: u32, max_attempts: u32) -> Option<Self> {
        let (width, height) = mask.dimensions();
        if width <= margin * 2 || height <= margin * 2 {
            return None;
        }

        let mut fallback = Vec::new();
        for x in margin..width - margin {
            for y in margin..height - margin {
                if !is_hole(mask, x, y) {
                    fallback.push(Coord2D::from(x, y));
                }
            }
        }

        if fallback.is_empty() {
            return None;
        }

        Some(Self {
            mask,
            margin,
            max_attempts,
            fallback,
        })
    }

    #[inline]
    pub(crate) fn mask(&self) -> &'a image::RgbImage {
        self.mask
    }

    /// Returns true if `coord` may be used as a donor
    pub(crate) fn is_valid_donor(&self, coord: SignedCoord2D) -> bool {
        let (width, height) = self.mask.dimensions();
        let margin = self.margin as i32;

        coord.x >= margin
            && coord.y >= margin
            && coord.x < width as i32 - margin
            && coord.y < height as i32 - margin
            && !is_hole(self.mask, coord.x as u32, coord.y as u32)
    }

    /// Draws a donor uniformly from the interior, redrawing whenever it lands
    /// on a hole. Once the attempt budget runs out a donor is picked from the
    /// precomputed list instead.
    pub(crate) fn sample<R: Rng>(&self, rng: &mut R) -> Coord2D {
        let (width, height) = self.mask.dimensions();

        for _ in 0..self.max_attempts {
            let x = rng.gen_range(self.margin..=width - 1 - self.margin);
            let y = rng.gen_range(self.margin..=height - 1 - self.margin);

            if !is_hole(self.mask, x, y) {
                return Coord2D::from(x, y);
            }
        }

        log::warn!(
            "no donor found after {} attempts, picking from {} known pixels",
            self.max_attempts,
            self.fallback.len()
        );
        self.fallback[rng.gen_range(0..self.fallback.len())]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const WHITE: image::Rgb<u8> = image::Rgb([255, 255, 255]);

    #[test]
    fn no_donor_when_interior_is_all_hole() {
        let mut mask = image::RgbImage::new(9, 9);
        for x in 2..7 {
            for y in 2..7 {
                mask.put_pixel(x, y, WHITE);
            }
        }

        assert!(DonorSampler::new(&mask, 2, 100).is_none());
    }

    #[test]
    fn no_donor_when_too_small() {
        let mask = image::RgbImage::new(4, 20);
        assert!(DonorSampler::new(&mask, 2, 100).is_none());
    }

    #[test]
    fn samples_are_known_and_interior() {
        let mut mask = image::RgbImage::new(12, 10);
        for x in 3..9 {
            for y in 3..7 {
                mask.put_pixel(x, y, WHITE);
            }
        }

        let sampler = DonorSampler::new(&mask, 2, 100).unwrap();
        let mut rng = Pcg32::seed_from_u64(7);

        for _ in 0..500 {
            let donor = sampler.sample(&mut rng);
            assert!(donor.x >= 2 && donor.x <= 9);
            assert!(donor.y >= 2 && donor.y <= 7);
            assert!(!is_hole(&mask, donor.x, donor.y));
            assert!(sampler.is_valid_donor(donor.to_signed()));
        }
    }

    #[test]
    fn falls_back_when_attempts_run_out() {
        // a single valid donor in a sea of holes
        let mut mask = image::RgbImage::from_pixel(15, 15, WHITE);
        mask.put_pixel(6, 9, image::Rgb([0, 0, 0]));

        let sampler = DonorSampler::new(&mask, 2, 1).unwrap();
        let mut rng = Pcg32::seed_from_u64(3);

        for _ in 0..20 {
            assert_eq!(sampler.sample(&mut rng), Coord2D::from(6, 9));
        }
    }

    #[test]
    fn validity() {
        let mut mask = image::RgbImage::new(10, 10);
        mask.put_pixel(5, 5, WHITE);
        let sampler = DonorSampler::new(&mask, 2, 10).unwrap();

        assert!(sampler.is_valid_donor(SignedCoord2D::from(2, 7)));
        assert!(!sampler.is_valid_donor(SignedCoord2D::from(1, 5)));
        assert!(!sampler.is_valid_donor(SignedCoord2D::from(8, 5)));
        assert!(!sampler.is_valid_donor(SignedCoord2D::from(5, 5)));
        assert!(!sampler.is_valid_donor(SignedCoord2D::from(-4, 5)));
    }
}
