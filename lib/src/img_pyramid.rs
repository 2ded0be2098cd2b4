use crate::errors::ImageTooSmall;
use crate::utils::is_hole;
use crate::{Dims, Error};

/// The color and mask pyramids of one inpainting run.
///
/// Level 0 is the full resolution, every following level halves both
/// dimensions (rounding down), so the last level is the coarsest.
#[derive(Clone)]
pub(crate) struct ImagePyramid {
    pub(crate) levels: Vec<(image::RgbImage, image::RgbImage)>,
}

impl ImagePyramid {
    /// Builds a pyramid of at most `levels` levels. The depth is clamped so
    /// that even the coarsest level leaves room for a donor patch at least
    /// `margin` pixels away from every border.
    pub(crate) fn new(
        color_map: image::RgbImage,
        mask: image::RgbImage,
        levels: u32,
        margin: u32,
    ) -> Result<Self, Error> {
        let (width, height) = color_map.dimensions();
        let max_levels = Self::max_levels(width, height, margin);

        if max_levels == 0 {
            return Err(Error::ImageTooSmall(ImageTooSmall {
                size: Dims::new(width, height),
                min_side: min_side(margin),
            }));
        }

        let lvls = if levels > max_levels {
            log::warn!(
                "a {}x{} image only supports {} pyramid levels, {} were requested",
                width,
                height,
                max_levels,
                levels
            );
            max_levels
        } else {
            levels
        };

        Ok(Self {
            levels: Self::build_gaussian(lvls, color_map, mask),
        })
    }

    /// The deepest pyramid whose coarsest level still has a side of at least
    /// `2 * margin + 1` pixels
    pub(crate) fn max_levels(width: u32, height: u32, margin: u32) -> u32 {
        let min = min_side(margin);
        let (mut w, mut h) = (width, height);
        let mut lvls = 0;

        while w >= min && h >= min {
            lvls += 1;
            w /= 2;
            h /= 2;
        }

        lvls
    }

    //build gaussian pyramid by downsampling the image and the mask by 2
    fn build_gaussian(
        in_lvls: u32,
        color_map: image::RgbImage,
        mask: image::RgbImage,
    ) -> Vec<(image::RgbImage, image::RgbImage)> {
        let mut lvls = Vec::with_capacity(in_lvls as usize);
        lvls.push((color_map, mask));

        for _ in 1..in_lvls {
            let (prev_color, prev_mask) = &lvls[lvls.len() - 1];
            let (width, height) = (prev_color.width() / 2, prev_color.height() / 2);

            let color = image::imageops::resize(prev_color, width, height, image::imageops::Gaussian);
            let mask = reduce_mask(prev_mask, width, height);
            lvls.push((color, mask));
        }

        lvls
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.levels.len()
    }
}

/// Halves the mask without filtering, a coarse pixel is a hole if any of
/// the 2x2 fine pixels it covers is one, so holes keep the exact hole color
/// and never vanish at coarse levels.
fn reduce_mask(mask: &image::RgbImage, width: u32, height: u32) -> image::RgbImage {
    image::RgbImage::from_fn(width, height, |x, y| {
        let (fx, fy) = (x * 2, y * 2);
        let any_hole = [(fx, fy), (fx + 1, fy), (fx, fy + 1), (fx + 1, fy + 1)]
            .iter()
            .any(|&(x, y)| is_hole(mask, x, y));

        if any_hole {
            image::Rgb([u8::MAX; 3])
        } else {
            image::Rgb([0; 3])
        }
    })
}

#[inline]
fn min_side(margin: u32) -> u32 {
    margin * 2 + 1
}
