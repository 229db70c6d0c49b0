use image::{Rgb as Pixel, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use lp_core::{Point, Rgb};

use crate::colorize::ColoredPoint;

fn pixel(c: Rgb) -> Pixel<u8> {
    Pixel(c.to_array())
}

/// Paints each colored point onto a black canvas. Points outside the canvas
/// are skipped.
pub fn render_colored(width: u32, height: u32, colored: &[ColoredPoint]) -> RgbImage {
    let mut img = RgbImage::new(width, height);
    for cp in colored {
        let Point { x, y } = cp.point;
        if x < width && y < height {
            img.put_pixel(x, y, pixel(cp.color));
        }
    }
    img
}

/// Overlays a straight line for every non-adjacent step of `points`, i.e.
/// every place where the beam is blanked and the mirrors jump. Returns the
/// number of jumps drawn.
pub fn draw_jumps(img: &mut RgbImage, points: &[Point], color: Rgb) -> usize {
    let mut jumps = 0;
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.is_adjacent8(b) {
            continue;
        }
        jumps += 1;
        draw_line_segment_mut(
            img,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            pixel(color),
        );
    }
    jumps
}
