use std::fmt;

use crate::Dims;

#[derive(Debug)]
pub struct InvalidRange {
    pub(crate) min: f32,
    pub(crate) max: f32,
    pub(crate) value: f32,
    pub(crate) name: &'static str,
}

impl fmt::Display for InvalidRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parameter '{}' - value '{}' is outside the range of {}-{}",
            self.name, self.value, self.min, self.max
        )
    }
}

#[derive(Debug)]
pub struct SizeMismatch {
    pub(crate) image: Dims,
    pub(crate) mask: Dims,
}

impl fmt::Display for SizeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the image size ({}x{}) must match the mask size ({}x{})",
            self.image.width, self.image.height, self.mask.width, self.mask.height
        )
    }
}

#[derive(Debug)]
pub struct ImageTooSmall {
    pub(crate) size: Dims,
    pub(crate) min_side: u32,
}

impl fmt::Display for ImageTooSmall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the image ({}x{}) is too small to hold a patch, both sides must be at least {} pixels",
            self.size.width, self.size.height, self.min_side
        )
    }
}

#[derive(Debug)]
pub enum Error {
    /// An error in the image library occurred, eg failed to load/save
    Image(image::ImageError),
    /// An input parameter had an invalid range specified
    InvalidRange(InvalidRange),
    /// The image and the hole mask must have the same dimensions
    SizeMismatch(SizeMismatch),
    /// The session was built without a required input, either the image or
    /// the hole mask
    MissingInput(&'static str),
    /// The image has holes, but is too small for a single patch to fit
    ImageTooSmall(ImageTooSmall),
    /// No known pixel far enough from the border exists at the given pyramid
    /// level, so hole pixels there have nothing to copy from
    NoDonor { level: usize },
    /// Io is notoriously error free with no problems, but we cover it just in case!
    Io(std::io::Error),
    /// The user specified an image format we don't support as the output
    UnsupportedOutputFormat(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image(ie) => write!(f, "{}", ie),
            Self::InvalidRange(ir) => write!(f, "{}", ir),
            Self::SizeMismatch(sm) => write!(f, "{}", sm),
            Self::MissingInput(what) => write!(f, "no {} was provided", what),
            Self::ImageTooSmall(its) => write!(f, "{}", its),
            Self::NoDonor { level } => write!(
                f,
                "pyramid level {} has no known pixel far enough from the border to copy patches from",
                level
            ),
            Self::Io(io) => write!(f, "{}", io),
            Self::UnsupportedOutputFormat(fmt) => {
                write!(f, "the output format '{}' is not supported", fmt)
            }
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(ie: image::ImageError) -> Self {
        Self::Image(ie)
    }
}

impl From<std::io::Error> for Error {
    fn from(io: std::io::Error) -> Self {
        Self::Io(io)
    }
}
