use lp_core::Point;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::components::Component;

// Both tables list neighbors in row-major order, so the first hit is the first
// match a row-major scan of the remaining points would find.
const FOUR: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];
const DIAGONAL: [(i64, i64); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// How the linearizer left a stalled point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recovery {
    /// Resumed from the most recent path point that still had an unvisited
    /// neighbor; for a branch this is the junction pixel.
    Backtrack { resume: Point },
    /// No path point had an unvisited neighbor; jumped to the nearest
    /// remaining point instead.
    Jump { to: Point },
}

/// A point where greedy linearization found no unvisited neighbor.
///
/// `at` is the stalled point (for a branch, the tip of the finished arm).
/// The junction the walk returns to is held in [`Recovery::Backtrack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degeneracy {
    pub at: Point,
    pub recovery: Recovery,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearizedPath {
    /// A permutation of the component's points.
    pub points: Vec<Point>,
    pub degeneracies: Vec<Degeneracy>,
}

/// Orders one component into an open path.
///
/// Starting from the row-major first point, each step appends the first
/// unvisited 4-neighbor of the current point, else the first unvisited
/// 8-neighbor. When neither exists a [`Degeneracy`] is recorded and the walk
/// resumes from the most recent path point that still touches an unvisited
/// point. The resume point is not re-appended: the revisit shows up as a
/// non-adjacent step (a jump) so the path stays a permutation.
///
/// Every stall is followed by at least one append, so the number of
/// degeneracies is below the component size.
pub fn linearize(component: &Component) -> LinearizedPath {
    let mut pending = PendingSet::new(component);
    let seed = component.first();
    pending.take(seed);

    let mut points = Vec::with_capacity(component.len());
    let mut degeneracies = Vec::new();
    points.push(seed);

    // Path points that may still have unvisited neighbors, in path order.
    // A point that loses all of them never regains one, so popping it for
    // good preserves the reverse-scan result.
    let mut trail = vec![seed];
    let mut cursor = seed;

    while pending.remaining() > 0 {
        if let Some(next) = pending.next_adjacent(cursor) {
            pending.take(next);
            points.push(next);
            trail.push(next);
            cursor = next;
            continue;
        }

        let at = cursor;
        let resume = loop {
            match trail.last() {
                Some(&q) if pending.next_adjacent(q).is_some() => break Some(q),
                Some(_) => {
                    trail.pop();
                }
                None => break None,
            }
        };

        match resume {
            Some(q) => {
                trace!(?at, ?q, "linearizer backtrack");
                degeneracies.push(Degeneracy {
                    at,
                    recovery: Recovery::Backtrack { resume: q },
                });
                cursor = q;
            }
            None => {
                let Some(to) = pending.nearest(at) else {
                    break;
                };
                warn!(
                    ?at,
                    ?to,
                    remaining = pending.remaining(),
                    "no backtrack candidate, jumping to nearest remaining point"
                );
                degeneracies.push(Degeneracy {
                    at,
                    recovery: Recovery::Jump { to },
                });
                pending.take(to);
                points.push(to);
                trail.push(to);
                cursor = to;
            }
        }
    }

    LinearizedPath {
        points,
        degeneracies,
    }
}

/// Unvisited points of one component, flagged by their index in the sorted
/// point list. Lookups are binary searches, so memory stays proportional to
/// the component whatever its extent.
struct PendingSet<'a> {
    component: &'a Component,
    pending: Vec<bool>,
    remaining: usize,
}

impl<'a> PendingSet<'a> {
    fn new(component: &'a Component) -> Self {
        Self {
            component,
            pending: vec![true; component.len()],
            remaining: component.len(),
        }
    }

    fn remaining(&self) -> usize {
        self.remaining
    }

    fn index(&self, p: Point) -> Option<usize> {
        self.component.points().binary_search(&p).ok()
    }

    fn contains(&self, p: Point) -> bool {
        self.index(p).is_some_and(|i| self.pending[i])
    }

    fn take(&mut self, p: Point) {
        if let Some(i) = self.index(p)
            && self.pending[i]
        {
            self.pending[i] = false;
            self.remaining -= 1;
        }
    }

    fn next_adjacent(&self, p: Point) -> Option<Point> {
        FOUR.iter()
            .chain(DIAGONAL.iter())
            .filter_map(|&(dx, dy)| p.offset(dx, dy))
            .find(|&q| self.contains(q))
    }

    /// Closest pending point by squared distance, ties to row-major first.
    fn nearest(&self, from: Point) -> Option<Point> {
        let mut best: Option<(u64, Point)> = None;
        for (&q, _) in self
            .component
            .points()
            .iter()
            .zip(&self.pending)
            .filter(|(_, pending)| **pending)
        {
            let d = q.dist2(from);
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, q));
            }
        }
        best.map(|(_, q)| q)
    }
}

#[cfg(test)]
mod tests {
    use lp_core::{BinaryMask, Point};

    use super::{Degeneracy, Recovery, linearize};
    use crate::components::{Component, extract_components};

    fn pts(raw: &[(u32, u32)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn component(raw: &[(u32, u32)]) -> Component {
        Component::from_points(pts(raw)).expect("non-empty component")
    }

    fn assert_permutation(c: &Component, path: &[Point]) {
        let mut sorted = path.to_vec();
        sorted.sort();
        assert_eq!(sorted.as_slice(), c.points());
    }

    #[test]
    fn l_shape_is_walked_without_degeneracy() {
        let c = component(&[(0, 0), (0, 1), (1, 1)]);
        let out = linearize(&c);

        assert_eq!(out.points, pts(&[(0, 0), (0, 1), (1, 1)]));
        assert!(out.degeneracies.is_empty());
    }

    #[test]
    fn four_neighbor_wins_over_diagonal() {
        // From (1,1) both (2,1) and (2,2) touch; the 4-neighbor is taken first.
        let c = component(&[(1, 1), (2, 1), (2, 2)]);
        let out = linearize(&c);
        assert_eq!(out.points, pts(&[(1, 1), (2, 1), (2, 2)]));
    }

    #[test]
    fn single_pixel_component() {
        let c = component(&[(5, 5)]);
        let out = linearize(&c);
        assert_eq!(out.points, pts(&[(5, 5)]));
        assert!(out.degeneracies.is_empty());
    }

    #[test]
    fn y_junction_records_one_degeneracy_and_resumes_at_junction() {
        // Stem (4,1)..(4,4) splits at (4,4) into two diagonal arms.
        let c = component(&[
            (4, 1),
            (4, 2),
            (4, 3),
            (4, 4),
            (3, 5),
            (2, 6),
            (5, 5),
            (6, 6),
        ]);
        let out = linearize(&c);

        assert_permutation(&c, &out.points);
        assert_eq!(
            out.points,
            pts(&[
                (4, 1),
                (4, 2),
                (4, 3),
                (4, 4),
                (3, 5),
                (2, 6),
                (5, 5),
                (6, 6)
            ])
        );
        assert_eq!(
            out.degeneracies,
            vec![Degeneracy {
                at: Point::new(2, 6),
                recovery: Recovery::Backtrack {
                    resume: Point::new(4, 4)
                },
            }]
        );
    }

    #[test]
    fn t_junction_resumes_from_most_recent_touching_point() {
        // Vertical bar with a horizontal arm leaving from its middle. At (4,4)
        // the right neighbor precedes the lower one, so the arm is walked first
        // and (5,4) is the latest point still touching (4,5) diagonally.
        let mut raw = Vec::new();
        for y in 1..=7 {
            raw.push((4, y));
        }
        for x in 5..=7 {
            raw.push((x, 4));
        }
        let c = component(&raw);
        let out = linearize(&c);

        assert_permutation(&c, &out.points);
        assert_eq!(out.degeneracies.len(), 1);
        assert_eq!(out.degeneracies[0].at, Point::new(7, 4));
        assert_eq!(
            out.degeneracies[0].recovery,
            Recovery::Backtrack {
                resume: Point::new(5, 4)
            }
        );
        assert_eq!(out.points[6], Point::new(7, 4));
        assert_eq!(out.points[7], Point::new(4, 5));
    }

    #[test]
    fn closed_loop_has_no_degeneracy() {
        let mut raw = Vec::new();
        for x in 2..=5 {
            raw.push((x, 2));
            raw.push((x, 5));
        }
        for y in 3..=4 {
            raw.push((2, y));
            raw.push((5, y));
        }
        let c = component(&raw);
        let out = linearize(&c);

        assert_permutation(&c, &out.points);
        assert!(out.degeneracies.is_empty());
        for w in out.points.windows(2) {
            assert!(w[0].is_adjacent8(w[1]));
        }
    }

    #[test]
    fn disconnected_input_falls_back_to_nearest_jump() {
        let c = component(&[(0, 0), (1, 0), (9, 0), (4, 3)]);
        let out = linearize(&c);

        assert_permutation(&c, &out.points);
        assert_eq!(out.points, pts(&[(0, 0), (1, 0), (4, 3), (9, 0)]));
        assert_eq!(out.degeneracies.len(), 2);
        assert_eq!(
            out.degeneracies[0],
            Degeneracy {
                at: Point::new(1, 0),
                recovery: Recovery::Jump {
                    to: Point::new(4, 3)
                },
            }
        );
    }

    #[test]
    fn far_apart_points_do_not_scale_with_extent() {
        let c = component(&[(0, 0), (u32::MAX, u32::MAX)]);
        let out = linearize(&c);

        assert_eq!(out.points, pts(&[(0, 0), (u32::MAX, u32::MAX)]));
        assert_eq!(
            out.degeneracies,
            vec![Degeneracy {
                at: Point::new(0, 0),
                recovery: Recovery::Jump {
                    to: Point::new(u32::MAX, u32::MAX)
                },
            }]
        );
    }

    #[test]
    fn every_component_of_a_busy_mask_is_permuted() {
        let mask = BinaryMask::from_fn(40, 30, |x, y| {
            (x * 3 + y * 5) % 7 == 0 || (x > 10 && x < 14) || y == 20
        });
        for c in extract_components(&mask) {
            let out = linearize(&c);
            assert_permutation(&c, &out.points);
            assert!(out.degeneracies.len() < c.len());
        }
    }
}
