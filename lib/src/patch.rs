use crate::offset::SignedCoord2D;
use crate::utils::is_hole_pixel;

/// Half the side of the square patch compared around each pixel
pub(crate) const PATCH_RADIUS: i32 = 2;

// every (dx, dy) of the 5x5 neighborhood, column by column
const PATCH_KERNEL: [(i32, i32); 25] = [
    (-2, 2),
    (-1, 2),
    (0, 2),
    (1, 2),
    (2, 2),
    (-2, 1),
    (-1, 1),
    (0, 1),
    (1, 1),
    (2, 1),
    (-2, 0),
    (-1, 0),
    (0, 0),
    (1, 0),
    (2, 0),
    (-2, -1),
    (-1, -1),
    (0, -1),
    (1, -1),
    (2, -1),
    (-2, -2),
    (-1, -2),
    (0, -2),
    (1, -2),
    (2, -2),
];

/// Dissimilarity between two patches, lower is better.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Score(pub(crate) u32);

impl Score {
    /// A pairing that must never be chosen
    pub(crate) const INVALID: Self = Self(100_000_000);

    #[cfg(test)]
    pub(crate) fn is_valid(self) -> bool {
        self < Self::INVALID
    }
}

/// Sum of absolute per channel differences between the patch around the
/// query pixel `a` and the patch around the donor pixel `b`.
///
/// The pairing is `Score::INVALID` as soon as any compared pixel falls
/// outside the image, or any pixel of the *donor* patch is a hole. The query
/// patch is never checked against the mask, so the score is not symmetric.
pub(crate) fn patch_distance(
    color_map: &image::RgbImage,
    mask: &image::RgbImage,
    a: SignedCoord2D,
    b: SignedCoord2D,
) -> Score {
    let dims = color_map.dimensions();
    let mut sum = 0u32;

    for &(dx, dy) in PATCH_KERNEL.iter() {
        let qa = SignedCoord2D::from(a.x + dx, a.y + dy);
        let qb = SignedCoord2D::from(b.x + dx, b.y + dy);

        if !qa.is_in_bounds(dims) || !qb.is_in_bounds(dims) {
            return Score::INVALID;
        }

        let (qa, qb) = (qa.to_unsigned(), qb.to_unsigned());
        if is_hole_pixel(mask.get_pixel(qb.x, qb.y)) {
            return Score::INVALID;
        }

        let pa = color_map.get_pixel(qa.x, qa.y);
        let pb = color_map.get_pixel(qb.x, qb.y);
        sum += pa
            .0
            .iter()
            .zip(pb.0.iter())
            .map(|(&ca, &cb)| u32::from(if ca > cb { ca - cb } else { cb - ca }))
            .sum::<u32>();
    }

    Score(sum)
}
