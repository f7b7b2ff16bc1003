use gridstar_core::Point;

/// Manhattan (L1) distance between two points.
///
/// Admissible and consistent for unit-cost 4-connected movement, which makes
/// it the A* heuristic of this crate.
#[inline]
pub fn manhattan(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_is_symmetric() {
        let a = Point::new(0, 0);
        let b = Point::new(2, 2);
        assert_eq!(manhattan(a, b), 4);
        assert_eq!(manhattan(b, a), 4);
        assert_eq!(manhattan(a, a), 0);
    }
}
