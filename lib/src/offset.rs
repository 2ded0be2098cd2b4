//! Per pixel displacement from a hole pixel to the donor pixel it copies from

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Coord2D {
    pub(crate) x: u32,
    pub(crate) y: u32,
}

impl Coord2D {
    pub(crate) fn from(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub(crate) fn to_signed(self) -> SignedCoord2D {
        SignedCoord2D {
            x: self.x as i32,
            y: self.y as i32,
        }
    }

    /// Index of this coordinate in a row-major buffer of the given width
    #[inline]
    pub(crate) fn to_flat(self, width: u32) -> usize {
        self.y as usize * width as usize + self.x as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SignedCoord2D {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl SignedCoord2D {
    pub(crate) fn from(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub(crate) fn is_in_bounds(self, (width, height): (u32, u32)) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < width as i32 && self.y < height as i32
    }

    pub(crate) fn to_unsigned(self) -> Coord2D {
        Coord2D::from(self.x as u32, self.y as u32)
    }

    #[inline]
    pub(crate) fn shifted(self, offset: Offset) -> Self {
        Self::from(self.x + offset.dx, self.y + offset.dy)
    }
}

/// The displacement from a hole pixel to its donor, in pixels of the pyramid
/// level it belongs to.
///
/// Both components are only ever written together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    /// Column displacement
    pub dx: i32,
    /// Row displacement
    pub dy: i32,
}

impl Offset {
    pub const ZERO: Self = Self { dx: 0, dy: 0 };

    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub(crate) fn between(from: Coord2D, to: Coord2D) -> Self {
        Self {
            dx: to.x as i32 - from.x as i32,
            dy: to.y as i32 - from.y as i32,
        }
    }

    /// The same displacement one pyramid level finer, where every pixel is
    /// split in two along both axes
    pub(crate) fn upscaled(self) -> Self {
        Self {
            dx: self.dx * 2,
            dy: self.dy * 2,
        }
    }
}

/// A grid of `Offset`s, parallel to the pixel grid of one pyramid level.
///
/// Only the entries of hole pixels are meaningful, all others stay
/// `Offset::ZERO`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffsetField {
    width: u32,
    height: u32,
    offsets: Vec<Offset>,
}

impl OffsetField {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            offsets: vec![Offset::ZERO; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Gets the offset stored for the pixel at `(x, y)`
    ///
    /// # Panics
    ///
    /// If `(x, y)` is outside of the field.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Offset {
        self.offsets[self.index(x, y)]
    }

    #[inline]
    pub(crate) fn set(&mut self, coord: Coord2D, offset: Offset) {
        let idx = self.index(coord.x, coord.y);
        self.offsets[idx] = offset;
    }

    #[inline]
    pub(crate) fn at(&self, coord: Coord2D) -> Offset {
        self.get(coord.x, coord.y)
    }

    /// The donor pixel that `coord` currently points at, which may well be
    /// outside of the grid
    #[cfg(test)]
    pub(crate) fn target(&self, coord: Coord2D) -> SignedCoord2D {
        coord.to_signed().shifted(self.at(coord))
    }

    /// Returns true if no offset has ever been set to a non-zero displacement
    pub fn is_zero(&self) -> bool {
        self.offsets.iter().all(|o| *o == Offset::ZERO)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "offset lookup at ({}, {}) is outside of the {}x{} field",
            x,
            y,
            self.width,
            self.height
        );
        Coord2D::from(x, y).to_flat(self.width)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_field_is_zeroed() {
        let field = OffsetField::new(7, 3);
        assert_eq!(field.dimensions(), (7, 3));
        assert!(field.is_zero());
        assert_eq!(field.get(6, 2), Offset::ZERO);
    }

    #[test]
    fn target_applies_both_components() {
        let mut field = OffsetField::new(8, 8);
        let from = Coord2D::from(5, 1);
        let to = Coord2D::from(2, 6);

        field.set(from, Offset::between(from, to));

        assert_eq!(field.get(5, 1), Offset::new(-3, 5));
        assert_eq!(field.target(from), to.to_signed());
        assert!(!field.is_zero());
    }

    #[test]
    fn upscaling_doubles() {
        assert_eq!(Offset::new(-3, 4).upscaled(), Offset::new(-6, 8));
    }

    #[test]
    fn bounds() {
        let dims = (4, 3);
        assert!(SignedCoord2D::from(0, 0).is_in_bounds(dims));
        assert!(SignedCoord2D::from(3, 2).is_in_bounds(dims));
        assert!(!SignedCoord2D::from(4, 2).is_in_bounds(dims));
        assert!(!SignedCoord2D::from(-1, 0).is_in_bounds(dims));
    }
}
