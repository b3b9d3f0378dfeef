//! Pointer vs. object hit testing
//!
//! Objects are axis-aligned boxes anchored at their top-left corner. A
//! pointer sitting exactly on an edge does not count as a hit.

use glam::Vec2;

/// Strict containment of `point` in the box at `origin` with size `extent`
#[inline]
pub fn point_in_box(point: Vec2, origin: Vec2, extent: Vec2) -> bool {
    let max = origin + extent;
    origin.x < point.x && point.x < max.x && origin.y < point.y && point.y < max.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_in_box_edges_excluded() {
        let o = Vec2::new(0.0, 0.0);
        let e = Vec2::new(10.0, 10.0);
        assert!(point_in_box(Vec2::new(5.0, 5.0), o, e));
        assert!(!point_in_box(Vec2::new(0.0, 5.0), o, e));
        assert!(!point_in_box(Vec2::new(5.0, 10.0), o, e));
        assert!(!point_in_box(Vec2::new(11.0, 5.0), o, e));
    }
}
