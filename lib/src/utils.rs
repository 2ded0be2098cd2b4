use crate::Error;
use std::path::Path;

/// Helper type used to define the source of `ImageSource`'s data
#[derive(Clone)]
pub enum ImageSource<'a> {
    /// A raw buffer of image data, see `image::load_from_memory` for details
    /// on what is supported
    Memory(&'a [u8]),
    /// The path to an image to load from disk. The image format is inferred
    /// from the file extension, see `image::open` for details
    Path(&'a Path),
    /// An already loaded image that is passed directly to the inpainter
    Image(image::DynamicImage),
}

impl<'a> ImageSource<'a> {
    pub fn from_path(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<image::DynamicImage> for ImageSource<'a> {
    fn from(img: image::DynamicImage) -> Self {
        Self::Image(img)
    }
}

impl<'a> From<image::RgbImage> for ImageSource<'a> {
    fn from(img: image::RgbImage) -> Self {
        Self::Image(image::DynamicImage::ImageRgb8(img))
    }
}

impl<'a, S> From<&'a S> for ImageSource<'a>
where
    S: AsRef<Path> + 'a,
{
    fn from(path: &'a S) -> Self {
        Self::Path(path.as_ref())
    }
}

pub fn load_dynamic_image(src: ImageSource<'_>) -> Result<image::DynamicImage, image::ImageError> {
    match src {
        ImageSource::Memory(data) => image::load_from_memory(data),
        ImageSource::Path(path) => image::open(path),
        ImageSource::Image(img) => Ok(img),
    }
}

pub(crate) fn load_image(src: ImageSource<'_>) -> Result<image::RgbImage, Error> {
    Ok(load_dynamic_image(src)?.to_rgb())
}

/// Returns true if the pixel is marked as removed, ie. every channel is
/// saturated.
#[inline]
pub fn is_hole_pixel(pixel: &image::Rgb<u8>) -> bool {
    pixel.0.iter().all(|&c| c >= u8::MAX)
}

/// Returns true if the mask marks the pixel at `(x, y)` as a hole.
///
/// # Panics
///
/// If `(x, y)` lies outside the mask.
#[inline]
pub fn is_hole(mask: &image::RgbImage, x: u32, y: u32) -> bool {
    assert!(
        x < mask.width() && y < mask.height(),
        "mask lookup at ({}, {}) is outside of the {}x{} mask",
        x,
        y,
        mask.width(),
        mask.height()
    );
    is_hole_pixel(mask.get_pixel(x, y))
}

/// Overwrites every hole pixel of `image` with the mask's own color, so that
/// whatever was under the hole can never leak into the reconstruction.
/// Returns the number of hole pixels.
pub(crate) fn paint_holes(image: &mut image::RgbImage, mask: &image::RgbImage) -> usize {
    let mut hole_count = 0;

    for (pixel, mask_pixel) in image.pixels_mut().zip(mask.pixels()) {
        if is_hole_pixel(mask_pixel) {
            *pixel = *mask_pixel;
            hole_count += 1;
        }
    }

    hole_count
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hole_requires_every_channel_saturated() {
        assert!(is_hole_pixel(&image::Rgb([255, 255, 255])));
        assert!(!is_hole_pixel(&image::Rgb([255, 255, 254])));
        assert!(!is_hole_pixel(&image::Rgb([254, 255, 255])));
        assert!(!is_hole_pixel(&image::Rgb([0, 0, 0])));
    }

    #[test]
    #[should_panic]
    fn hole_lookup_out_of_bounds() {
        let mask = image::RgbImage::new(4, 4);
        is_hole(&mask, 4, 0);
    }

    #[test]
    fn painting_replaces_only_holes() {
        let mut img = image::RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]));
        let mut mask = image::RgbImage::new(3, 2);
        mask.put_pixel(1, 1, image::Rgb([255, 255, 255]));
        mask.put_pixel(2, 0, image::Rgb([255, 0, 255]));

        assert_eq!(paint_holes(&mut img, &mask), 1);
        assert_eq!(*img.get_pixel(1, 1), image::Rgb([255, 255, 255]));
        assert_eq!(*img.get_pixel(2, 0), image::Rgb([10, 20, 30]));
    }
}
