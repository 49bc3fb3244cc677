//! Convex hull of a cubic's control polygon

use quill_core::Point;
use smallvec::SmallVec;

/// Hull vertex indices into `p`, counter-clockwise in a y-up frame
///
/// Gift wrapping (Jarvis march) from the leftmost point. Among collinear
/// candidates the farthest one wins, so points lying on a hull edge are left
/// out. Coincident points collapse, which can leave fewer than three indices.
pub fn convex_hull(p: &[Point; 4]) -> SmallVec<[usize; 4]> {
    let mut leftmost = 0;
    for (i, point) in p.iter().enumerate() {
        if point.x < p[leftmost].x {
            leftmost = i;
        }
    }

    let mut hull = SmallVec::new();
    let mut current = leftmost;
    loop {
        hull.push(current);

        let mut best = 0;
        for j in 0..p.len() {
            let best_edge = p[best] - p[current];
            let next_edge = p[j] - p[current];
            let cross = best_edge.cross(next_edge);

            if best == current || cross < 0.0 {
                best = j;
            } else if cross == 0.0
                && (next_edge.x.abs() > best_edge.x.abs() || next_edge.y.abs() > best_edge.y.abs())
            {
                best = j;
            }
        }

        current = best;
        if current == leftmost || hull.len() >= p.len() {
            break;
        }
    }
    hull
}
