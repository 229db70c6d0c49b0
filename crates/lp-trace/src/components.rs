use lp_core::{BinaryMask, Point};

const DX: [isize; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
const DY: [isize; 8] = [0, -1, -1, -1, 0, 1, 1, 1];

/// One maximal 8-connected region of foreground pixels.
///
/// Points are stored sorted row-major; the first point is the region's
/// row-major minimum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    points: Vec<Point>,
}

impl Component {
    /// Builds a component from an arbitrary point list. Duplicates are removed.
    ///
    /// Connectivity is not checked; the linearizer handles disconnected input
    /// through its jump fallback.
    pub fn from_points(mut points: Vec<Point>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        points.sort_unstable();
        points.dedup();
        Some(Self { points })
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

    /// Row-major first point, the linearization seed.
    pub fn first(&self) -> Point {
        self.points[0]
    }

    pub fn contains(&self, p: Point) -> bool {
        self.points.binary_search(&p).is_ok()
    }
}

/// Labels foreground cells into 8-connected components.
///
/// Components are returned in row-major order of their first pixel, so label
/// numbering is stable for identical masks. Background is excluded and every
/// foreground cell lands in exactly one component.
pub fn extract_components(mask: &BinaryMask) -> Vec<Component> {
    let (width, height) = mask.dimensions();
    let n = width * height;
    if n == 0 {
        return Vec::new();
    }

    let cells = mask.cells();
    let mut seen = vec![0_u8; n];
    let mut stack = Vec::new();
    let mut components = Vec::new();

    for i in 0..n {
        if cells[i] == 0 || seen[i] != 0 {
            continue;
        }

        let mut points = Vec::new();
        seen[i] = 1;
        stack.clear();
        stack.push(i);

        while let Some(p) = stack.pop() {
            points.push(Point::new((p % width) as u32, (p / width) as u32));
            for dir in 0..8 {
                let Some(nb) = neighbor_index(p, dir, width, height) else {
                    continue;
                };
                if cells[nb] != 0 && seen[nb] == 0 {
                    seen[nb] = 1;
                    stack.push(nb);
                }
            }
        }

        if let Some(c) = Component::from_points(points) {
            components.push(c);
        }
    }

    components
}

#[inline]
fn neighbor_index(p: usize, dir: usize, width: usize, height: usize) -> Option<usize> {
    let x = p % width;
    let y = p / width;
    let nx = x as isize + DX[dir];
    let ny = y as isize + DY[dir];
    if nx < 0 || ny < 0 {
        return None;
    }

    let (nxu, nyu) = (nx as usize, ny as usize);
    if nxu >= width || nyu >= height {
        return None;
    }

    Some(nyu * width + nxu)
}

#[cfg(test)]
mod tests {
    use lp_core::{BinaryMask, Point};

    use super::{Component, extract_components};

    fn pts(raw: &[(u32, u32)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn empty_mask_has_no_components() {
        let mask = BinaryMask::new(8, 8);
        assert!(extract_components(&mask).is_empty());

        let degenerate = BinaryMask::new(0, 4);
        assert!(extract_components(&degenerate).is_empty());
    }

    #[test]
    fn diagonal_touch_joins_components() {
        let mask =
            BinaryMask::from_points(6, 6, &pts(&[(0, 0), (1, 1), (2, 2), (4, 0), (5, 0)]))
                .expect("valid mask");
        let comps = extract_components(&mask);

        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].points(), pts(&[(0, 0), (1, 1), (2, 2)]).as_slice());
        assert_eq!(comps[1].points(), pts(&[(4, 0), (5, 0)]).as_slice());
    }

    #[test]
    fn components_partition_foreground() {
        let mask = BinaryMask::from_fn(20, 12, |x, y| (x + 2 * y) % 5 == 0 || x == 7);
        let comps = extract_components(&mask);

        let total: usize = comps.iter().map(Component::len).sum();
        assert_eq!(total, mask.count_foreground());

        let mut all: Vec<Point> = comps.iter().flat_map(|c| c.points().to_vec()).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);

        for c in &comps {
            assert!(c.points().windows(2).all(|w| w[0] < w[1]));
        }
        for w in comps.windows(2) {
            assert!(w[0].first() < w[1].first());
        }
    }

    #[test]
    fn component_queries() {
        let c = Component::from_points(pts(&[(3, 4), (2, 4), (2, 4), (5, 1)])).expect("non-empty");
        assert_eq!(c.len(), 3);
        assert_eq!(c.first(), Point::new(5, 1));
        assert!(c.contains(Point::new(2, 4)));
        assert!(!c.contains(Point::new(4, 4)));
        assert!(Component::from_points(Vec::new()).is_none());
    }
}
