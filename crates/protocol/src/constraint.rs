use serde::{Deserialize, Serialize};

use crate::era::Era;

/// A closed interval `[min, max]` of legal positions for one era edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub min: i64,
    pub max: i64,
}

impl TimeRange {
    pub fn new(min: i64, max: i64) -> Self {
        debug_assert!(min <= max, "range min must not exceed max ({min} > {max})");
        Self { min, max }
    }

    pub fn clamp(self, t: i64) -> i64 {
        t.max(self.min).min(self.max)
    }

    pub fn shift(self, dt: i64) -> Self {
        Self::new(self.min + dt, self.max + dt)
    }

    pub fn intersection(self, other: TimeRange) -> Option<TimeRange> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then(|| Self::new(min, max))
    }
}

/// Independent bounds on the legal positions of an era's min and max edges.
///
/// Either bound may be absent; an absent bound leaves that edge free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraConstraints {
    pub min: Option<TimeRange>,
    pub max: Option<TimeRange>,
}

impl EraConstraints {
    pub fn new(min: Option<TimeRange>, max: Option<TimeRange>) -> Self {
        Self { min, max }
    }

    fn clamp_min_edge(&self, t: i64) -> i64 {
        self.min.map_or(t, |r| r.clamp(t))
    }

    fn clamp_max_edge(&self, t: i64) -> i64 {
        self.max.map_or(t, |r| r.clamp(t))
    }
}

/// Reconciliation policy when an era cannot satisfy both edge constraints
/// at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EraConstraintMode {
    /// Clamp the max edge to its constraint, then pull the min edge down so
    /// it never exceeds the (possibly moved) max. Used while dragging the
    /// right edge.
    KeepMin,
    /// Symmetric to [`EraConstraintMode::KeepMin`]: clamp the min edge,
    /// then push the max edge up past it if needed. Used while dragging
    /// the left edge.
    KeepMax,
    /// Preserve the era's span: clamp the max edge against the max-edge
    /// constraint intersected with the span-shifted min-edge constraint,
    /// then derive the min edge. Used while dragging a whole event.
    KeepSpan,
    /// Clamp the min edge to its constraint first, then clamp the max edge
    /// but never let it cross below the min.
    ClipPrioritizingMinConstraint,
    /// Clamp the max edge to its constraint first, then clamp the min edge
    /// but never let it cross above the max.
    #[default]
    ClipPrioritizingMaxConstraint,
}

/// Resolve `era` against `constraints` under the given mode.
///
/// Pure: no side effects, always returns a valid era (`min <= max`), and
/// idempotent for every mode. Called before every mutating era edit so a
/// placed era always satisfies its constraints.
pub fn constrain_era(era: Era, constraints: &EraConstraints, mode: EraConstraintMode) -> Era {
    match mode {
        EraConstraintMode::KeepMin => {
            let max = constraints.clamp_max_edge(era.max);
            Era::new(era.min.min(max), max)
        }
        EraConstraintMode::KeepMax => {
            let min = constraints.clamp_min_edge(era.min);
            Era::new(min, era.max.max(min))
        }
        EraConstraintMode::KeepSpan => {
            let span = era.span();
            let shifted_min = constraints.min.map(|r| r.shift(span));
            let combined = match (constraints.max, shifted_min) {
                // Disjoint bounds: the span-shifted min bound wins, since
                // the span is the one thing this mode promises to keep.
                (Some(a), Some(b)) => Some(a.intersection(b).unwrap_or(b)),
                (Some(a), None) => Some(a),
                (None, b) => b,
            };
            let max = combined.map_or(era.max, |r| r.clamp(era.max));
            Era::new(max - span, max)
        }
        EraConstraintMode::ClipPrioritizingMinConstraint => {
            let min = constraints.clamp_min_edge(era.min);
            let max = constraints.clamp_max_edge(era.max).max(min);
            Era::new(min, max)
        }
        EraConstraintMode::ClipPrioritizingMaxConstraint => {
            let max = constraints.clamp_max_edge(era.max);
            let min = constraints.clamp_min_edge(era.min).min(max);
            Era::new(min, max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [EraConstraintMode; 5] = [
        EraConstraintMode::KeepMin,
        EraConstraintMode::KeepMax,
        EraConstraintMode::KeepSpan,
        EraConstraintMode::ClipPrioritizingMinConstraint,
        EraConstraintMode::ClipPrioritizingMaxConstraint,
    ];

    fn both(min: TimeRange, max: TimeRange) -> EraConstraints {
        EraConstraints::new(Some(min), Some(max))
    }

    #[test]
    fn unconstrained_is_identity() {
        let era = Era::new(3, 17);
        for mode in MODES {
            assert_eq!(constrain_era(era, &EraConstraints::default(), mode), era);
        }
    }

    #[test]
    fn keep_min_pulls_min_under_moved_max() {
        let c = both(TimeRange::new(0, 100), TimeRange::new(0, 10));
        // Max clamps from 50 down to 10; min (20) would then exceed it.
        let out = constrain_era(Era::new(20, 50), &c, EraConstraintMode::KeepMin);
        assert_eq!(out, Era::new(10, 10));
    }

    #[test]
    fn keep_max_pushes_max_over_moved_min() {
        let c = both(TimeRange::new(30, 100), TimeRange::new(0, 100));
        let out = constrain_era(Era::new(10, 20), &c, EraConstraintMode::KeepMax);
        assert_eq!(out, Era::new(30, 30));
    }

    #[test]
    fn keep_span_preserves_span() {
        let c = both(TimeRange::new(0, 40), TimeRange::new(0, 50));
        let out = constrain_era(Era::new(60, 70), &c, EraConstraintMode::KeepSpan);
        assert_eq!(out.span(), 10);
        assert_eq!(out, Era::new(40, 50));
    }

    #[test]
    fn keep_span_with_only_min_bound() {
        let c = EraConstraints::new(Some(TimeRange::new(5, 100)), None);
        let out = constrain_era(Era::new(0, 10), &c, EraConstraintMode::KeepSpan);
        assert_eq!(out, Era::new(5, 15));
    }

    #[test]
    fn keep_span_disjoint_bounds_keep_span_anyway() {
        // Min edge must sit in [0, 10], max edge in [100, 200]; a span of 5
        // cannot satisfy both. The span-shifted min bound wins.
        let c = both(TimeRange::new(0, 10), TimeRange::new(100, 200));
        let out = constrain_era(Era::new(50, 55), &c, EraConstraintMode::KeepSpan);
        assert_eq!(out.span(), 5);
        assert_eq!(out, Era::new(10, 15));
    }

    #[test]
    fn clip_prioritizing_max_is_default_and_never_crosses() {
        assert_eq!(
            EraConstraintMode::default(),
            EraConstraintMode::ClipPrioritizingMaxConstraint
        );
        let c = both(TimeRange::new(50, 100), TimeRange::new(0, 20));
        let out = constrain_era(Era::new(60, 80), &c, EraConstraintMode::default());
        // Max clamps to 20 first; min would clamp to 50 but may not cross.
        assert_eq!(out, Era::new(20, 20));
    }

    #[test]
    fn clip_prioritizing_min_never_crosses() {
        let c = both(TimeRange::new(50, 100), TimeRange::new(0, 20));
        let out = constrain_era(
            Era::new(60, 80),
            &c,
            EraConstraintMode::ClipPrioritizingMinConstraint,
        );
        assert_eq!(out, Era::new(50, 50));
    }

    #[test]
    fn single_sided_constraints_fall_back_to_simple_clamp() {
        let c = EraConstraints::new(None, Some(TimeRange::new(0, 30)));
        let out = constrain_era(Era::new(10, 50), &c, EraConstraintMode::default());
        assert_eq!(out, Era::new(10, 30));
    }

    #[test]
    fn idempotent_for_every_mode() {
        let constraints = [
            EraConstraints::default(),
            EraConstraints::new(Some(TimeRange::new(0, 10)), None),
            EraConstraints::new(None, Some(TimeRange::new(5, 25))),
            both(TimeRange::new(0, 10), TimeRange::new(5, 25)),
            both(TimeRange::new(0, 10), TimeRange::new(100, 200)),
        ];
        let eras = [
            Era::new(0, 0),
            Era::new(-50, -20),
            Era::new(3, 17),
            Era::new(50, 300),
        ];
        for c in &constraints {
            for era in eras {
                for mode in MODES {
                    let once = constrain_era(era, c, mode);
                    assert!(once.min <= once.max);
                    assert_eq!(constrain_era(once, c, mode), once, "{era:?} {c:?} {mode:?}");
                }
            }
        }
    }
}
