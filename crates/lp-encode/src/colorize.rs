use lp_core::{Error, ImageView, Point, Rgb};
use lp_trace::Trajectory;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColoredPoint {
    pub point: Point,
    pub color: Rgb,
}

impl ColoredPoint {
    pub const fn new(point: Point, color: Rgb) -> Self {
        Self { point, color }
    }
}

/// Samples `img` along the trajectory.
///
/// Entry `i` gets the color under its own point when the step to `i + 1` is
/// 8-adjacent, and black when that step is a jump, so the beam is off while
/// the mirrors travel. The final entry always samples its own color.
///
/// A blank trajectory (no foreground) is colored black.
pub fn colorize(t: &Trajectory, img: &ImageView<'_, Rgb>) -> Result<Vec<ColoredPoint>, Error> {
    let points = t.points();
    if t.is_blank() {
        return Ok(points
            .iter()
            .map(|&p| ColoredPoint::new(p, Rgb::BLACK))
            .collect());
    }

    let mut out = Vec::with_capacity(points.len());
    let mut blanked = 0usize;
    for (i, &p) in points.iter().enumerate() {
        let jump = points.get(i + 1).is_some_and(|&next| !p.is_adjacent8(next));
        let color = if jump {
            blanked += 1;
            Rgb::BLACK
        } else {
            *img.at(p).ok_or(Error::OutOfBounds)?
        };
        out.push(ColoredPoint::new(p, color));
    }

    trace!(points = out.len(), blanked, "colorized trajectory");
    Ok(out)
}
