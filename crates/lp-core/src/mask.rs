use crate::Error;
use crate::geom::Point;
use crate::image::ImageView;

/// FOREGROUND/BACKGROUND grid produced by an external edge detector.
///
/// Stored as one byte per cell (`1` foreground, `0` background).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl BinaryMask {
    pub fn new(width: usize, height: usize) -> Self {
        let len = width.checked_mul(height).expect("mask size overflow");
        Self {
            width,
            height,
            cells: vec![0; len],
        }
    }

    /// Cells with value `> threshold` become foreground.
    pub fn from_threshold(img: &ImageView<'_, u8>, threshold: u8) -> Self {
        let mut cells = Vec::with_capacity(img.width() * img.height());
        for y in 0..img.height() {
            for &v in img.row(y) {
                cells.push(u8::from(v > threshold));
            }
        }

        Self {
            width: img.width(),
            height: img.height(),
            cells,
        }
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                mask.cells[y * width + x] = u8::from(f(x, y));
            }
        }
        mask
    }

    pub fn from_points(width: usize, height: usize, points: &[Point]) -> Result<Self, Error> {
        let mut mask = Self::new(width, height);
        for &p in points {
            mask.set(p, true)?;
        }
        Ok(mask)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn is_foreground(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x] != 0
    }

    pub fn set(&mut self, p: Point, foreground: bool) -> Result<(), Error> {
        let (x, y) = (p.x as usize, p.y as usize);
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds);
        }
        self.cells[y * self.width + x] = u8::from(foreground);
        Ok(())
    }

    pub fn count_foreground(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    /// Foreground cells in row-major order.
    pub fn foreground_points(&self) -> impl Iterator<Item = Point> + '_ {
        let width = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c != 0)
            .map(move |(i, _)| Point::new((i % width) as u32, (i / width) as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::BinaryMask;
    use crate::{Error, Image, Point};

    #[test]
    fn threshold_is_strict() {
        let img = Image::from_vec(4, 1, vec![0u8, 127, 128, 255]).expect("valid image");
        let mask = BinaryMask::from_threshold(&img.as_view(), 127);
        assert_eq!(mask.cells(), &[0, 0, 1, 1]);
        assert_eq!(mask.count_foreground(), 2);
    }

    #[test]
    fn points_roundtrip_in_row_major_order() {
        let pts = [Point::new(2, 1), Point::new(0, 0), Point::new(1, 1)];
        let mask = BinaryMask::from_points(3, 2, &pts).expect("in-bounds points");
        let out: Vec<Point> = mask.foreground_points().collect();
        assert_eq!(out, vec![Point::new(0, 0), Point::new(1, 1), Point::new(2, 1)]);
        assert!(mask.is_foreground(2, 1));
        assert!(!mask.is_foreground(5, 1));
    }

    #[test]
    fn out_of_bounds_point_is_rejected() {
        let err = BinaryMask::from_points(2, 2, &[Point::new(2, 0)]).unwrap_err();
        assert_eq!(err, Error::OutOfBounds);
    }

    #[test]
    fn from_fn_diagonal() {
        let mask = BinaryMask::from_fn(3, 3, |x, y| x == y);
        assert_eq!(mask.count_foreground(), 3);
        assert!(mask.is_foreground(1, 1));
        assert!(!mask.is_foreground(0, 1));
    }
}
