use std::ops::Range;

use lp_core::Point;

use crate::linearize::{Degeneracy, LinearizedPath};

/// The full ordered point sequence the beam traces for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trajectory {
    points: Vec<Point>,
    segments: Vec<Range<usize>>,
    degeneracies: Vec<Degeneracy>,
}

impl Trajectory {
    /// Single-point trajectory at `start` for a frame with no foreground.
    pub fn blank(start: Point) -> Self {
        Self {
            points: vec![start],
            segments: Vec::new(),
            degeneracies: Vec::new(),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `true` when no component contributed points.
    pub fn is_blank(&self) -> bool {
        self.segments.is_empty()
    }

    /// Contiguous range of each stitched component inside [`Self::points`],
    /// in visiting order.
    pub fn segments(&self) -> &[Range<usize>] {
        &self.segments
    }

    /// Degeneracies of all components, in visiting order.
    pub fn degeneracies(&self) -> &[Degeneracy] {
        &self.degeneracies
    }

    pub fn last(&self) -> Point {
        self.points[self.points.len() - 1]
    }
}

/// Merges per-component paths into one trajectory by nearest-point selection.
///
/// From the pen position, the closest remaining point over all remaining paths
/// (squared distance, ties to lower path index then lower point index) picks
/// the next component. Its path is rotated so that point comes first, appended,
/// and the pen moves to the rotated path's last point.
///
/// Each merge step scans every remaining point, so the cost is
/// O(points x components); fine at galvo working resolutions.
pub fn stitch(paths: Vec<LinearizedPath>, start: Point) -> Trajectory {
    let total: usize = paths.iter().map(|p| p.points.len()).sum();
    if total == 0 {
        return Trajectory::blank(start);
    }

    let mut remaining: Vec<Option<LinearizedPath>> = paths
        .into_iter()
        .map(|p| (!p.points.is_empty()).then_some(p))
        .collect();

    let mut points = Vec::with_capacity(total);
    let mut segments = Vec::new();
    let mut degeneracies = Vec::new();
    let mut pen = start;

    while let Some((path_idx, point_idx)) = nearest_point(&remaining, pen) {
        let Some(mut path) = remaining[path_idx].take() else {
            break;
        };

        path.points.rotate_left(point_idx);

        let begin = points.len();
        points.extend_from_slice(&path.points);
        segments.push(begin..points.len());
        degeneracies.extend(path.degeneracies);
        pen = points[points.len() - 1];
    }

    Trajectory {
        points,
        segments,
        degeneracies,
    }
}

fn nearest_point(remaining: &[Option<LinearizedPath>], pen: Point) -> Option<(usize, usize)> {
    let mut best: Option<(u64, usize, usize)> = None;
    for (path_idx, path) in remaining.iter().enumerate() {
        let Some(path) = path else {
            continue;
        };
        for (point_idx, &p) in path.points.iter().enumerate() {
            let d = p.dist2(pen);
            if best.is_none_or(|(bd, _, _)| d < bd) {
                best = Some((d, path_idx, point_idx));
            }
        }
    }
    best.map(|(_, path_idx, point_idx)| (path_idx, point_idx))
}

#[cfg(test)]
mod tests {
    use lp_core::Point;

    use super::{Trajectory, stitch};
    use crate::linearize::LinearizedPath;

    fn path(raw: &[(u32, u32)]) -> LinearizedPath {
        LinearizedPath {
            points: raw.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            degeneracies: Vec::new(),
        }
    }

    fn pts(raw: &[(u32, u32)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn no_paths_is_a_blank_frame() {
        let t = stitch(Vec::new(), Point::new(3, 7));
        assert_eq!(t, Trajectory::blank(Point::new(3, 7)));
        assert!(t.is_blank());
        assert_eq!(t.points(), &[Point::new(3, 7)]);
        assert!(t.degeneracies().is_empty());
    }

    #[test]
    fn two_single_pixels_in_distance_order() {
        let t = stitch(vec![path(&[(10, 0)]), path(&[(0, 0)])], Point::ORIGIN);
        assert_eq!(t.points(), pts(&[(0, 0), (10, 0)]).as_slice());
        assert_eq!(t.segments(), &[0..1, 1..2]);
        assert!(!t.is_blank());
    }

    #[test]
    fn path_is_rotated_not_reversed() {
        let t = stitch(vec![path(&[(0, 5), (1, 5), (2, 5), (3, 5)])], Point::new(3, 9));
        assert_eq!(t.points(), pts(&[(3, 5), (0, 5), (1, 5), (2, 5)]).as_slice());
    }

    #[test]
    fn pen_follows_last_point_of_each_path() {
        let a = path(&[(0, 0), (1, 0), (2, 0)]);
        let b = path(&[(20, 0), (21, 0)]);
        let c = path(&[(3, 1), (3, 2)]);
        let t = stitch(vec![a, b, c], Point::ORIGIN);

        // After a ends at (2,0), c at (3,1) is nearer than b.
        assert_eq!(
            t.points(),
            pts(&[(0, 0), (1, 0), (2, 0), (3, 1), (3, 2), (20, 0), (21, 0)]).as_slice()
        );
        assert_eq!(t.segments(), &[0..3, 3..5, 5..7]);
        assert_eq!(t.last(), Point::new(21, 0));
    }

    #[test]
    fn equal_distances_prefer_lower_path_index() {
        let t = stitch(vec![path(&[(2, 0)]), path(&[(0, 2)])], Point::ORIGIN);
        assert_eq!(t.points(), pts(&[(2, 0), (0, 2)]).as_slice());
    }
}
