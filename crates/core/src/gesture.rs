//! Drag and resize gestures: geometry in, proposed eras out.
//!
//! Each controller is a small value capturing what was grabbed and where.
//! Per mouse move it computes a proposed era from the pointer position,
//! optionally snaps it to a nearby recorded edge, clamps it so the event
//! keeps a minimum apparent width, and hands it to the owning group with
//! the constraint mode that matches the gesture. The controllers hold no
//! references into the group; the caller threads `&mut EventsGroup` and
//! the current `TimeScale` through every step.

use timelane_protocol::{Era, EraConstraintMode, TimeScale};

use crate::error::GroupError;
use crate::model::{EventId, EventsGroup};

/// Tuning shared by the drag controllers, in pixels so behavior stays
/// zoom-independent.
#[derive(Debug, Clone, Copy)]
pub struct DragConfig {
    /// How close (in pixels) a proposed edge must be to a recorded snap
    /// time before it locks on.
    pub snap_tolerance_px: f64,
    /// Resizes never shrink an event below this apparent width.
    pub min_width_px: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self { snap_tolerance_px: 8.0, min_width_px: 4.0 }
    }
}

/// Which edge of an event a resize gesture grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEdge {
    Min,
    Max,
}

fn draggable_era(group: &EventsGroup, id: EventId) -> Result<Era, GroupError> {
    let event = group.event(id).ok_or(GroupError::UnknownEvent(id))?;
    if !event.allows_user_drag() {
        return Err(GroupError::DragNotAllowed(id));
    }
    Ok(event.era())
}

fn snap(
    group: &mut EventsGroup,
    scale: &TimeScale,
    config: &DragConfig,
    t: i64,
    suppress: &[EventId],
) -> Option<i64> {
    let tolerance = scale.span_of_px(config.snap_tolerance_px);
    group.find_nearest_snap_time(t, t - tolerance, t + tolerance, suppress)
}

/// Resize one edge of an event. The opposite edge stays put (`KeepMax`
/// while dragging the min edge, `KeepMin` for the max edge).
#[derive(Debug, Clone, Copy)]
pub struct EdgeDrag {
    event: EventId,
    edge: DragEdge,
    /// Seconds from the pointer to the grabbed edge at grab time, so the
    /// edge does not jump to the cursor on the first move.
    grab_offset: i64,
    config: DragConfig,
}

impl EdgeDrag {
    pub fn begin(
        group: &EventsGroup,
        scale: &TimeScale,
        event: EventId,
        edge: DragEdge,
        mouse_x: f64,
        config: DragConfig,
    ) -> Result<Self, GroupError> {
        let era = draggable_era(group, event)?;
        let grabbed = match edge {
            DragEdge::Min => era.min,
            DragEdge::Max => era.max,
        };
        let grab_offset = grabbed - scale.time_at(mouse_x);
        Ok(Self { event, edge, grab_offset, config })
    }

    pub fn update(
        &self,
        group: &mut EventsGroup,
        scale: &TimeScale,
        mouse_x: f64,
        disable_snap: bool,
    ) -> Result<(), GroupError> {
        self.step(group, scale, mouse_x, disable_snap, true)
    }

    pub fn finish(
        &self,
        group: &mut EventsGroup,
        scale: &TimeScale,
        mouse_x: f64,
        disable_snap: bool,
    ) -> Result<(), GroupError> {
        self.step(group, scale, mouse_x, disable_snap, false)
    }

    fn step(
        &self,
        group: &mut EventsGroup,
        scale: &TimeScale,
        mouse_x: f64,
        disable_snap: bool,
        ongoing: bool,
    ) -> Result<(), GroupError> {
        let era = group
            .event(self.event)
            .ok_or(GroupError::UnknownEvent(self.event))?
            .era();
        let mut proposed = scale.time_at(mouse_x) + self.grab_offset;
        if !disable_snap
            && let Some(t) = snap(group, scale, &self.config, proposed, &[self.event])
        {
            proposed = t;
        }
        let min_span = scale.span_of_px(self.config.min_width_px).max(0);
        let (new_era, mode) = match self.edge {
            DragEdge::Min => (
                Era::new(proposed.min(era.max - min_span), era.max),
                EraConstraintMode::KeepMax,
            ),
            DragEdge::Max => (
                Era::new(era.min, proposed.max(era.min + min_span)),
                EraConstraintMode::KeepMin,
            ),
        };
        group.set_era(self.event, ongoing, new_era, mode)
    }
}

/// Translate a whole event, preserving its span. Snaps whichever edge has
/// the nearer candidate; ties go to the min edge.
#[derive(Debug, Clone, Copy)]
pub struct EventDrag {
    event: EventId,
    grab_offset: i64,
    config: DragConfig,
}

impl EventDrag {
    pub fn begin(
        group: &EventsGroup,
        scale: &TimeScale,
        event: EventId,
        mouse_x: f64,
        config: DragConfig,
    ) -> Result<Self, GroupError> {
        let era = draggable_era(group, event)?;
        let grab_offset = era.min - scale.time_at(mouse_x);
        Ok(Self { event, grab_offset, config })
    }

    pub fn update(
        &self,
        group: &mut EventsGroup,
        scale: &TimeScale,
        mouse_x: f64,
        disable_snap: bool,
    ) -> Result<(), GroupError> {
        self.step(group, scale, mouse_x, disable_snap, true)
    }

    pub fn finish(
        &self,
        group: &mut EventsGroup,
        scale: &TimeScale,
        mouse_x: f64,
        disable_snap: bool,
    ) -> Result<(), GroupError> {
        self.step(group, scale, mouse_x, disable_snap, false)
    }

    fn step(
        &self,
        group: &mut EventsGroup,
        scale: &TimeScale,
        mouse_x: f64,
        disable_snap: bool,
        ongoing: bool,
    ) -> Result<(), GroupError> {
        let span = group
            .event(self.event)
            .ok_or(GroupError::UnknownEvent(self.event))?
            .era()
            .span();
        let mut min = scale.time_at(mouse_x) + self.grab_offset;
        if !disable_snap {
            let max = min + span;
            let min_candidate = snap(group, scale, &self.config, min, &[self.event]);
            let max_candidate = snap(group, scale, &self.config, max, &[self.event]);
            let shift = match (min_candidate, max_candidate) {
                (Some(a), Some(b)) if (b - max).abs() < (a - min).abs() => Some(b - max),
                (Some(a), _) => Some(a - min),
                (None, Some(b)) => Some(b - max),
                (None, None) => None,
            };
            if let Some(shift) = shift {
                min += shift;
            }
        }
        group.set_era(
            self.event,
            ongoing,
            Era::new(min, min + span),
            EraConstraintMode::KeepSpan,
        )
    }
}

/// Drag the shared boundary between two adjacent events in a lane: one
/// boundary time drives the left event's max and the right event's min.
#[derive(Debug, Clone, Copy)]
pub struct GapDrag {
    left: EventId,
    right: EventId,
    grab_offset: i64,
    config: DragConfig,
}

impl GapDrag {
    pub fn begin(
        group: &EventsGroup,
        scale: &TimeScale,
        left: EventId,
        right: EventId,
        mouse_x: f64,
        config: DragConfig,
    ) -> Result<Self, GroupError> {
        let left_era = draggable_era(group, left)?;
        draggable_era(group, right)?;
        let grab_offset = left_era.max - scale.time_at(mouse_x);
        Ok(Self { left, right, grab_offset, config })
    }

    pub fn update(
        &self,
        group: &mut EventsGroup,
        scale: &TimeScale,
        mouse_x: f64,
        disable_snap: bool,
    ) -> Result<(), GroupError> {
        self.step(group, scale, mouse_x, disable_snap, true)
    }

    pub fn finish(
        &self,
        group: &mut EventsGroup,
        scale: &TimeScale,
        mouse_x: f64,
        disable_snap: bool,
    ) -> Result<(), GroupError> {
        self.step(group, scale, mouse_x, disable_snap, false)
    }

    fn step(
        &self,
        group: &mut EventsGroup,
        scale: &TimeScale,
        mouse_x: f64,
        disable_snap: bool,
        ongoing: bool,
    ) -> Result<(), GroupError> {
        let left_era = group
            .event(self.left)
            .ok_or(GroupError::UnknownEvent(self.left))?
            .era();
        let right_era = group
            .event(self.right)
            .ok_or(GroupError::UnknownEvent(self.right))?
            .era();

        let mut boundary = scale.time_at(mouse_x) + self.grab_offset;
        if !disable_snap
            && let Some(t) = snap(group, scale, &self.config, boundary, &[self.left, self.right])
        {
            boundary = t;
        }
        let min_span = scale.span_of_px(self.config.min_width_px).max(0);
        let lowest = left_era.min + min_span;
        let highest = right_era.max - min_span;
        // When the pair is too small to give both sides the minimum
        // width, the boundary has no legal positions; hold it in place.
        boundary = if lowest <= highest {
            boundary.clamp(lowest, highest)
        } else {
            left_era.max
        };

        // Shrink before growing, so the growing side never transiently
        // intersects its neighbor and gets packed into another lane.
        let shrink_left = boundary <= left_era.max;
        let set_left = |group: &mut EventsGroup| {
            group.set_era(
                self.left,
                ongoing,
                Era::new(left_era.min, boundary),
                EraConstraintMode::KeepMin,
            )
        };
        let set_right = |group: &mut EventsGroup| {
            group.set_era(
                self.right,
                ongoing,
                Era::new(boundary, right_era.max),
                EraConstraintMode::KeepMax,
            )
        };
        if shrink_left {
            set_left(group)?;
            set_right(group)
        } else {
            set_right(group)?;
            set_left(group)
        }
    }
}

/// Drag-to-pan and wheel zoom over a [`TimeScale`]. Purely geometric; no
/// group involvement.
#[derive(Debug, Clone, Copy)]
pub struct PanDrag {
    last_x: f64,
}

impl PanDrag {
    pub fn begin(mouse_x: f64) -> Self {
        Self { last_x: mouse_x }
    }

    /// Pan so the content follows the pointer.
    pub fn update(&mut self, scale: &mut TimeScale, mouse_x: f64) {
        scale.pan_px(self.last_x - mouse_x);
        self.last_x = mouse_x;
    }

    /// Zoom by `factor` (> 1 zooms in) about the pointer.
    pub fn zoom(scale: &mut TimeScale, anchor_x: f64, factor: f64) {
        scale.zoom_about_px(anchor_x, factor);
    }
}

#[cfg(test)]
mod tests {
    use timelane_protocol::{EraConstraints, TimeRange};

    use super::*;
    use crate::model::Event;

    // One pixel per second, so pixel math reads directly in seconds.
    fn scale() -> TimeScale {
        TimeScale::new(0, 1000, 1000.0)
    }

    fn config() -> DragConfig {
        DragConfig { snap_tolerance_px: 10.0, min_width_px: 4.0 }
    }

    fn group_with(events: &[(i64, i64)]) -> (EventsGroup, Vec<EventId>) {
        let mut group = EventsGroup::new();
        let ids = events
            .iter()
            .map(|&(min, max)| {
                group
                    .add_event(Event::new("e", Era::new(min, max)))
                    .unwrap()
            })
            .collect();
        (group, ids)
    }

    #[test]
    fn edge_drag_moves_one_edge_and_keeps_the_other() {
        let (mut group, ids) = group_with(&[(100, 200)]);
        let scale = scale();
        let drag =
            EdgeDrag::begin(&group, &scale, ids[0], DragEdge::Max, 200.0, config()).unwrap();
        drag.update(&mut group, &scale, 350.0, true).unwrap();
        assert_eq!(group.event(ids[0]).unwrap().era(), Era::new(100, 350));
        drag.finish(&mut group, &scale, 320.0, true).unwrap();
        assert_eq!(group.event(ids[0]).unwrap().era(), Era::new(100, 320));
    }

    #[test]
    fn edge_drag_snaps_to_a_nearby_edge() {
        let (mut group, ids) = group_with(&[(100, 200), (406, 500)]);
        let scale = scale();
        let drag =
            EdgeDrag::begin(&group, &scale, ids[0], DragEdge::Max, 200.0, config()).unwrap();
        // Proposed max 400 is within tolerance of the other event's 406
        // edge; the dragged event's own edges never attract.
        drag.update(&mut group, &scale, 400.0, false).unwrap();
        assert_eq!(group.event(ids[0]).unwrap().era(), Era::new(100, 406));
        // With snapping disabled the raw position wins.
        drag.update(&mut group, &scale, 400.0, true).unwrap();
        assert_eq!(group.event(ids[0]).unwrap().era(), Era::new(100, 400));
    }

    #[test]
    fn edge_drag_respects_minimum_width() {
        let (mut group, ids) = group_with(&[(100, 200)]);
        let scale = scale();
        let drag =
            EdgeDrag::begin(&group, &scale, ids[0], DragEdge::Max, 200.0, config()).unwrap();
        // Dragging the max edge far past the min edge pins at min width.
        drag.update(&mut group, &scale, 50.0, true).unwrap();
        assert_eq!(group.event(ids[0]).unwrap().era(), Era::new(100, 104));
    }

    #[test]
    fn edge_drag_honors_grab_offset() {
        let (mut group, ids) = group_with(&[(100, 200)]);
        let scale = scale();
        // Grabbed 5 px left of the edge; the edge tracks that offset.
        let drag =
            EdgeDrag::begin(&group, &scale, ids[0], DragEdge::Max, 195.0, config()).unwrap();
        drag.update(&mut group, &scale, 295.0, true).unwrap();
        assert_eq!(group.event(ids[0]).unwrap().era(), Era::new(100, 300));
    }

    #[test]
    fn begin_fails_on_pinned_events() {
        let mut group = EventsGroup::new();
        let id = group
            .add_event(Event::new("pinned", Era::new(0, 10)).with_allows_user_drag(false))
            .unwrap();
        let scale = scale();
        assert!(matches!(
            EdgeDrag::begin(&group, &scale, id, DragEdge::Min, 0.0, config()),
            Err(GroupError::DragNotAllowed(_))
        ));
        assert!(matches!(
            EventDrag::begin(&group, &scale, id, 5.0, config()),
            Err(GroupError::DragNotAllowed(_))
        ));
    }

    #[test]
    fn event_drag_preserves_span_and_constraints_still_apply() {
        let mut group = EventsGroup::new();
        let id = group
            .add_event(
                Event::new("e", Era::new(100, 200)).with_constraints(EraConstraints::new(
                    Some(TimeRange::new(0, 1000)),
                    Some(TimeRange::new(0, 250)),
                )),
            )
            .unwrap();
        let scale = scale();
        let drag = EventDrag::begin(&group, &scale, id, 150.0, config()).unwrap();
        // Raw proposal is [200, 300); the max constraint caps at 250 and
        // KeepSpan slides min back to keep the 100s span.
        drag.update(&mut group, &scale, 250.0, true).unwrap();
        assert_eq!(group.event(id).unwrap().era(), Era::new(150, 250));
    }

    #[test]
    fn event_drag_snaps_the_nearer_edge() {
        let (mut group, ids) = group_with(&[(100, 200), (503, 600)]);
        let scale = scale();
        let drag = EventDrag::begin(&group, &scale, ids[0], 100.0, config()).unwrap();
        // Proposed era [400, 500): the max edge is 3s from the 503 edge,
        // the min edge has no candidate. The whole event shifts by +3.
        drag.finish(&mut group, &scale, 400.0, false).unwrap();
        assert_eq!(group.event(ids[0]).unwrap().era(), Era::new(403, 503));
    }

    #[test]
    fn gap_drag_moves_the_shared_boundary() {
        let (mut group, ids) = group_with(&[(0, 100), (100, 200)]);
        let scale = scale();
        let drag =
            GapDrag::begin(&group, &scale, ids[0], ids[1], 100.0, config()).unwrap();
        drag.update(&mut group, &scale, 140.0, true).unwrap();
        assert_eq!(group.event(ids[0]).unwrap().era(), Era::new(0, 140));
        assert_eq!(group.event(ids[1]).unwrap().era(), Era::new(140, 200));
        // Both stay in the one lane throughout.
        assert_eq!(group.lanes().len(), 1);

        drag.finish(&mut group, &scale, 60.0, true).unwrap();
        assert_eq!(group.event(ids[0]).unwrap().era(), Era::new(0, 60));
        assert_eq!(group.event(ids[1]).unwrap().era(), Era::new(60, 200));
        assert_eq!(group.lanes().len(), 1);
    }

    #[test]
    fn gap_drag_keeps_both_sides_at_minimum_width() {
        let (mut group, ids) = group_with(&[(0, 100), (100, 200)]);
        let scale = scale();
        let drag =
            GapDrag::begin(&group, &scale, ids[0], ids[1], 100.0, config()).unwrap();
        drag.update(&mut group, &scale, 500.0, true).unwrap();
        assert_eq!(group.event(ids[1]).unwrap().era(), Era::new(196, 200));
        drag.update(&mut group, &scale, -500.0, true).unwrap();
        assert_eq!(group.event(ids[0]).unwrap().era(), Era::new(0, 4));
    }

    #[test]
    fn gap_drag_holds_the_boundary_when_the_pair_is_too_small() {
        // Two 3s events at 1 px/s with a 4 px minimum width: no boundary
        // position can give both sides the minimum, so the drag pins it.
        let (mut group, ids) = group_with(&[(0, 3), (3, 6)]);
        let scale = scale();
        let drag =
            GapDrag::begin(&group, &scale, ids[0], ids[1], 3.0, config()).unwrap();
        drag.update(&mut group, &scale, 500.0, true).unwrap();
        assert_eq!(group.event(ids[0]).unwrap().era(), Era::new(0, 3));
        assert_eq!(group.event(ids[1]).unwrap().era(), Era::new(3, 6));
        drag.finish(&mut group, &scale, -500.0, true).unwrap();
        assert_eq!(group.event(ids[0]).unwrap().era(), Era::new(0, 3));
        assert_eq!(group.event(ids[1]).unwrap().era(), Era::new(3, 6));
    }

    #[test]
    fn pan_drag_follows_the_pointer() {
        let mut scale = TimeScale::new(0, 1000, 1000.0);
        let mut drag = PanDrag::begin(400.0);
        drag.update(&mut scale, 300.0);
        assert_eq!((scale.view_min(), scale.view_max()), (100, 1100));
        drag.update(&mut scale, 350.0);
        assert_eq!((scale.view_min(), scale.view_max()), (50, 1050));
    }
}
