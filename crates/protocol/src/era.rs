use serde::{Deserialize, Serialize};

/// A closed-open time interval `[min, max)` in whole seconds.
///
/// Zero-width eras (`min == max`) are legal and represent point events.
/// `Era` is an immutable value type: every operation returns a new era.
/// The derived ordering is `(min, max)`, which is exactly the order lanes
/// index their member eras by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Era {
    /// Inclusive start, in seconds.
    pub min: i64,
    /// Exclusive end, in seconds. Always `>= min`.
    pub max: i64,
}

impl Era {
    pub fn new(min: i64, max: i64) -> Self {
        debug_assert!(min <= max, "era min must not exceed max ({min} > {max})");
        Self { min, max }
    }

    /// A zero-width era marking a single instant.
    pub fn point(t: i64) -> Self {
        Self { min: t, max: t }
    }

    pub fn span(self) -> i64 {
        self.max - self.min
    }

    pub fn is_point(self) -> bool {
        self.min == self.max
    }

    /// Whether `t` falls inside the era (closed-open, so never true for a
    /// point era).
    pub fn contains(self, t: i64) -> bool {
        self.min <= t && t < self.max
    }

    /// Closed-open overlap: touching at a boundary is not intersection.
    pub fn intersects(self, other: Era) -> bool {
        self.min < other.max && other.min < self.max
    }

    pub fn shift(self, dt: i64) -> Self {
        Self::new(self.min + dt, self.max + dt)
    }

    pub fn with_min(self, min: i64) -> Self {
        Self::new(min, self.max)
    }

    pub fn with_max(self, max: i64) -> Self {
        Self::new(self.min, max)
    }

    /// The smallest era covering both.
    pub fn union(self, other: Era) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// The overlapping portion, or `None` when the eras do not intersect
    /// (touching at a boundary yields `None`; a point era inside a wider
    /// one yields the point).
    pub fn intersection(self, other: Era) -> Option<Era> {
        self.intersects(other)
            .then(|| Self::new(self.min.max(other.min), self.max.min(other.max)))
    }

    /// The portion(s) of `self` not covered by `other`: zero, one, or two
    /// sub-intervals, two when `other` splits `self`.
    pub fn minus(self, other: Era) -> impl Iterator<Item = Era> {
        let left = (other.min > self.min).then(|| Era::new(self.min, other.min.min(self.max)));
        let right = (other.max < self.max).then(|| Era::new(other.max.max(self.min), self.max));
        [left, right].into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_open_intersection() {
        let a = Era::new(0, 10);
        assert!(a.intersects(Era::new(5, 15)));
        assert!(a.intersects(Era::new(-5, 1)));
        // Touching at a boundary is not intersection.
        assert!(!a.intersects(Era::new(10, 20)));
        assert!(!a.intersects(Era::new(-5, 0)));
    }

    #[test]
    fn point_eras() {
        let p = Era::point(5);
        assert!(p.is_point());
        assert_eq!(p.span(), 0);
        // A point strictly inside an era intersects it.
        assert!(p.intersects(Era::new(0, 10)));
        // A point at an era's boundary does not.
        assert!(!p.intersects(Era::new(5, 10)));
        assert!(!p.intersects(Era::new(0, 5)));
        // Two points at the same instant do not intersect each other.
        assert!(!p.intersects(Era::point(5)));
    }

    #[test]
    fn contains_is_closed_open() {
        let a = Era::new(0, 10);
        assert!(a.contains(0));
        assert!(a.contains(9));
        assert!(!a.contains(10));
        assert!(!Era::point(5).contains(5));
    }

    #[test]
    fn union_and_intersection() {
        let a = Era::new(0, 10);
        let b = Era::new(5, 20);
        assert_eq!(a.union(b), Era::new(0, 20));
        assert_eq!(a.intersection(b), Some(Era::new(5, 10)));
        // Touching eras have an empty intersection.
        assert_eq!(a.intersection(Era::new(10, 20)), None);
        assert_eq!(a.intersection(Era::point(5)), Some(Era::point(5)));
        assert_eq!(a.union(Era::new(30, 40)), Era::new(0, 40));
    }

    #[test]
    fn minus_disjoint_yields_self() {
        let a = Era::new(0, 10);
        let parts: Vec<_> = a.minus(Era::new(20, 30)).collect();
        assert_eq!(parts, vec![a]);
        let parts: Vec<_> = a.minus(Era::new(-10, -5)).collect();
        assert_eq!(parts, vec![a]);
    }

    #[test]
    fn minus_covering_yields_nothing() {
        let a = Era::new(0, 10);
        assert_eq!(a.minus(Era::new(0, 10)).count(), 0);
        assert_eq!(a.minus(Era::new(-5, 15)).count(), 0);
    }

    #[test]
    fn minus_overlap_yields_one_part() {
        let a = Era::new(0, 100);
        let parts: Vec<_> = a.minus(Era::new(0, 50)).collect();
        assert_eq!(parts, vec![Era::new(50, 100)]);
        let parts: Vec<_> = a.minus(Era::new(50, 200)).collect();
        assert_eq!(parts, vec![Era::new(0, 50)]);
    }

    #[test]
    fn minus_split_yields_two_parts() {
        let a = Era::new(0, 100);
        let parts: Vec<_> = a.minus(Era::new(40, 60)).collect();
        assert_eq!(parts, vec![Era::new(0, 40), Era::new(60, 100)]);
    }

    #[test]
    fn ordering_is_min_then_max() {
        let mut eras = vec![Era::new(5, 8), Era::new(0, 20), Era::new(5, 6), Era::new(0, 10)];
        eras.sort();
        assert_eq!(
            eras,
            vec![Era::new(0, 10), Era::new(0, 20), Era::new(5, 6), Era::new(5, 8)]
        );
    }

    #[test]
    fn serde_round_trip() {
        let a = Era::new(-3, 12);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(serde_json::from_str::<Era>(&json).unwrap(), a);
    }
}
