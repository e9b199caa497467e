use std::collections::{HashMap, HashSet};

use timelane_protocol::{Era, EraConstraintMode, EraConstraints, StyleClasses, constrain_era};

use crate::change::{ChangeKind, ChangeRecord, ChangeStream, EventChange};
use crate::error::GroupError;
use crate::index::OrderedIndex;
use crate::model::event::EventSnapshot;
use crate::model::{Event, EventId, GroupId, Lane};

/// Owner of a set of events, their lane assignment, and the snap-time
/// index.
///
/// Lanes are a dense prefix: trailing empty lanes are pruned after every
/// settled mutation, so `lanes().len()` is exactly the number of rows the
/// painter must draw. All mutation of owned events routes through this
/// type, which keeps three structures consistent:
///
/// - each lane's era index (mutual non-overlap per lane);
/// - the reverse event → lane-number map;
/// - the global snap-time index (every placed event contributes both of
///   its era edges).
#[derive(Debug)]
pub struct EventsGroup {
    id: GroupId,
    events: HashMap<EventId, Event>,
    lanes: Vec<Lane>,
    lane_nums: HashMap<EventId, usize>,
    snapshots: HashMap<EventId, EventSnapshot>,
    snap_times: OrderedIndex<i64, HashSet<EventId>>,
    next_event: u64,
    /// Fires when an event's era or lane placement changed.
    pub position_changes: ChangeStream,
    /// Fires for an event whose immediate right neighbor (by lane start
    /// order) changed identity. Drag-resize uses the right neighbor to
    /// bound overshoot label rendering.
    pub right_neighbor_changes: ChangeStream,
    /// Fires when an event's style key changed.
    pub style_changes: ChangeStream,
    /// Fires when an event's label changed.
    pub label_changes: ChangeStream,
}

impl Default for EventsGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl EventsGroup {
    pub fn new() -> Self {
        Self {
            id: GroupId::next(),
            events: HashMap::new(),
            lanes: Vec::new(),
            lane_nums: HashMap::new(),
            snapshots: HashMap::new(),
            snap_times: OrderedIndex::new(),
            next_event: 0,
            position_changes: ChangeStream::default(),
            right_neighbor_changes: ChangeStream::default(),
            style_changes: ChangeStream::default(),
            label_changes: ChangeStream::default(),
        }
    }

    /// Number of owned events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Read-only view of the lanes, for painters: an event's vertical
    /// offset is its lane number times the lane height.
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// The lane an event currently occupies.
    pub fn lane_num(&self, id: EventId) -> Option<usize> {
        self.lane_nums.get(&id).copied()
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    pub fn event_ids(&self) -> impl Iterator<Item = EventId> {
        self.events.keys().copied()
    }

    /// Every currently-recorded snap time, in order. Painters use these
    /// for alignment guides.
    pub fn snap_times(&self) -> impl Iterator<Item = i64> {
        self.snap_times.iter().map(|(t, _)| *t)
    }

    /// Attach a detached event. Fails fast if some group already owns it.
    /// The era is re-clamped against the event's constraints before
    /// placement.
    pub fn add_event(&mut self, mut event: Event) -> Result<EventId, GroupError> {
        if event.owner.is_some() {
            return Err(GroupError::AlreadyOwned);
        }
        event.era = constrain_era(event.era, &event.constraints, EraConstraintMode::default());
        event.owner = Some(self.id);
        let id = EventId(self.next_event);
        self.next_event += 1;
        let era = event.era;
        self.events.insert(id, event);

        let mut changes = Vec::new();
        self.resettle(&mut changes, false, id, Some(era), true)?;
        self.record_snapshot(id);
        self.dispatch(changes);
        Ok(id)
    }

    /// Detach an event, evicting it from its lane and the snap index and
    /// cascading into the span it vacated. The returned event is a plain
    /// value again.
    pub fn remove_event(&mut self, id: EventId) -> Result<Event, GroupError> {
        if !self.events.contains_key(&id) {
            return Err(GroupError::UnknownEvent(id));
        }
        let mut changes = Vec::new();
        self.resettle(&mut changes, false, id, None, true)?;
        self.snapshots.remove(&id);
        let Some(mut event) = self.events.remove(&id) else {
            return Err(GroupError::UnknownEvent(id));
        };
        event.owner = None;
        self.dispatch(changes);
        Ok(event)
    }

    /// Detach every event at once. Bulk teardown fires no notifications.
    pub fn clear_events(&mut self) -> Vec<Event> {
        self.lanes.clear();
        self.lane_nums.clear();
        self.snapshots.clear();
        self.snap_times.clear();
        self.events
            .drain()
            .map(|(_, mut event)| {
                event.owner = None;
                event
            })
            .collect()
    }

    /// Move or resize an event. The era is resolved against the event's
    /// constraints under `mode` before placement; `ongoing` marks
    /// live-preview updates.
    pub fn set_era(
        &mut self,
        id: EventId,
        ongoing: bool,
        era: Era,
        mode: EraConstraintMode,
    ) -> Result<(), GroupError> {
        let event = self.events.get_mut(&id).ok_or(GroupError::UnknownEvent(id))?;
        event.era = constrain_era(era, &event.constraints, mode);
        self.update_event(ongoing, id)
    }

    pub fn set_label(&mut self, id: EventId, label: impl Into<String>) -> Result<(), GroupError> {
        let event = self.events.get_mut(&id).ok_or(GroupError::UnknownEvent(id))?;
        event.label = label.into();
        self.update_event(false, id)
    }

    pub fn set_classes(&mut self, id: EventId, classes: StyleClasses) -> Result<(), GroupError> {
        let event = self.events.get_mut(&id).ok_or(GroupError::UnknownEvent(id))?;
        event.classes = classes;
        self.update_event(false, id)
    }

    pub fn set_allows_user_drag(&mut self, id: EventId, allow: bool) -> Result<(), GroupError> {
        let event = self.events.get_mut(&id).ok_or(GroupError::UnknownEvent(id))?;
        event.allows_user_drag = allow;
        Ok(())
    }

    /// Replace an event's edge constraints. The current era is re-clamped
    /// immediately so a placed era always satisfies its constraints.
    pub fn set_era_constraints(
        &mut self,
        id: EventId,
        constraints: EraConstraints,
    ) -> Result<(), GroupError> {
        let event = self.events.get_mut(&id).ok_or(GroupError::UnknownEvent(id))?;
        event.constraints = constraints;
        event.era = constrain_era(event.era, &event.constraints, EraConstraintMode::default());
        self.update_event(false, id)
    }

    /// Re-run lane placement for an event at its current era. A no-op
    /// (no notifications, no lane changes) when the event is already
    /// correctly placed.
    pub fn resettle_event(&mut self, ongoing: bool, id: EventId) -> Result<(), GroupError> {
        let era = self.events.get(&id).ok_or(GroupError::UnknownEvent(id))?.era;
        let mut changes = Vec::new();
        self.resettle(&mut changes, ongoing, id, Some(era), true)?;
        self.dispatch(changes);
        Ok(())
    }

    /// The closest recorded edge time to `t` within `[min, max]`, while
    /// pretending the edges of `suppress` do not exist (so a dragged event
    /// never snaps to itself). Ties go to the earlier candidate.
    ///
    /// Suppression is scoped: exactly the removals that changed the index
    /// are recorded and unconditionally restored after the query, which is
    /// itself infallible — the index is bit-identical afterwards.
    pub fn find_nearest_snap_time(
        &mut self,
        t: i64,
        min: i64,
        max: i64,
        suppress: &[EventId],
    ) -> Option<i64> {
        let mut suppressed_edges: Vec<(i64, EventId)> = Vec::new();
        for &id in suppress {
            let Some(event) = self.events.get(&id) else { continue };
            let era = event.era;
            for edge in [era.min, era.max] {
                if self.remove_snap_edge(edge, id) {
                    suppressed_edges.push((edge, id));
                }
            }
        }

        let before = self.snap_times.entry_before(&t).map(|(k, _)| *k);
        let after = self.snap_times.entry_at_or_after(&t).map(|(k, _)| *k);
        let before = before.filter(|&b| b >= min && b <= max);
        let after = after.filter(|&a| a >= min && a <= max);
        let nearest = match (before, after) {
            (Some(b), Some(a)) => Some(if t - b <= a - t { b } else { a }),
            (b, a) => b.or(a),
        };

        for (edge, id) in suppressed_edges {
            self.add_snap_edge(edge, id);
        }
        nearest
    }

    /// First-fit: the lowest-numbered lane with no era intersecting `era`,
    /// appending a fresh lane when every existing one is blocked.
    fn lane_with_room(&mut self, era: Era) -> usize {
        for (num, lane) in self.lanes.iter().enumerate() {
            if !lane.has_events_intersecting(era) {
                return num;
            }
        }
        self.lanes.push(Lane::new());
        self.lanes.len() - 1
    }

    /// Diff the event against its last snapshot and settle whatever
    /// changed: a new era resettles placement, a new style key or label
    /// only notifies.
    fn update_event(&mut self, ongoing: bool, id: EventId) -> Result<(), GroupError> {
        let Some(event) = self.events.get(&id) else {
            return Err(GroupError::UnknownEvent(id));
        };
        let Some(prev) = self.snapshots.get(&id) else {
            return Err(GroupError::UnknownEvent(id));
        };
        let era = event.era;
        let era_changed = prev.era != era;
        let style_changed = prev.style_key != event.classes.style_key();
        let label_changed = prev.label != event.label;
        if !(era_changed || style_changed || label_changed) {
            return Ok(());
        }

        let mut changes = Vec::new();
        if era_changed {
            self.resettle(&mut changes, ongoing, id, Some(era), true)?;
        }
        if style_changed {
            changes.push((ChangeKind::Style, EventChange { ongoing, event: id }));
        }
        if label_changed {
            changes.push((ChangeKind::Label, EventChange { ongoing, event: id }));
        }
        self.record_snapshot(id);
        self.dispatch(changes);
        Ok(())
    }

    /// Move an event to `new_era` (or unplace it), restoring the packing
    /// invariants:
    ///
    /// 1. pull it out of its old lane and, unless nothing changed, the
    ///    snap index;
    /// 2. first-fit a destination lane and insert;
    /// 3. notify whichever left neighbors now observe a different right
    ///    neighbor, then the moved event itself;
    /// 4. cascade: every event in a lane below the old one that intersects
    ///    the vacated span gets resettled at its own era, letting it float
    ///    up into the space that opened.
    ///
    /// Cascaded calls pass `prune = false`; the outermost call prunes
    /// trailing empty lanes once everything has settled.
    fn resettle(
        &mut self,
        changes: &mut Vec<ChangeRecord>,
        ongoing: bool,
        id: EventId,
        new_era: Option<Era>,
        prune: bool,
    ) -> Result<(), GroupError> {
        let old_lane_num = self.lane_nums.remove(&id);
        let mut old_era = None;
        let mut old_left = None;
        if let Some(num) = old_lane_num
            && let Some(lane) = self.lanes.get_mut(num)
            && let Some(era) = lane.era_of(id)
        {
            old_left = lane.left_neighbor(era);
            lane.remove_event(id);
            old_era = Some(era);
        }

        let new_lane_num = new_era.map(|era| self.lane_with_room(era));

        // Already correctly placed at an unchanged era: put it back and
        // report nothing.
        if new_era == old_era && new_lane_num == old_lane_num {
            if let (Some(num), Some(era)) = (new_lane_num, new_era) {
                if let Some(lane) = self.lanes.get_mut(num) {
                    lane.add_event(id, era)?;
                }
                self.lane_nums.insert(id, num);
            }
            if prune {
                self.prune_empty_lanes();
            }
            return Ok(());
        }

        if let Some(era) = old_era {
            self.remove_snap_edges(id, era);
        }

        let mut new_left = None;
        if let (Some(num), Some(era)) = (new_lane_num, new_era) {
            if let Some(lane) = self.lanes.get_mut(num) {
                lane.add_event(id, era)?;
                new_left = lane.left_neighbor(era);
            }
            self.lane_nums.insert(id, num);
            self.add_snap_edges(id, era);
        }

        if old_left != new_left {
            for neighbor in [old_left, new_left].into_iter().flatten() {
                changes.push((ChangeKind::RightNeighbor, EventChange { ongoing, event: neighbor }));
            }
        }
        changes.push((ChangeKind::Position, EventChange { ongoing, event: id }));

        if let (Some(old), Some(from)) = (old_era, old_lane_num) {
            let vacated: Vec<Era> = match new_era {
                Some(new) => old.minus(new).collect(),
                None => vec![old],
            };
            if !vacated.is_empty() {
                let mut num = from + 1;
                while num < self.lanes.len() {
                    let mut pending: Vec<EventId> = Vec::new();
                    for &sub in &vacated {
                        for candidate in self.lanes[num].events_intersecting(sub) {
                            if !pending.contains(&candidate) {
                                pending.push(candidate);
                            }
                        }
                    }
                    for candidate in pending {
                        let Some(era) =
                            self.lanes.get(num).and_then(|lane| lane.era_of(candidate))
                        else {
                            continue;
                        };
                        self.resettle(changes, ongoing, candidate, Some(era), false)?;
                    }
                    num += 1;
                }
            }
        }

        if prune {
            self.prune_empty_lanes();
        }
        Ok(())
    }

    fn prune_empty_lanes(&mut self) {
        while self.lanes.last().is_some_and(Lane::is_empty) {
            self.lanes.pop();
        }
    }

    fn add_snap_edges(&mut self, id: EventId, era: Era) {
        self.add_snap_edge(era.min, id);
        self.add_snap_edge(era.max, id);
    }

    fn remove_snap_edges(&mut self, id: EventId, era: Era) {
        self.remove_snap_edge(era.min, id);
        self.remove_snap_edge(era.max, id);
    }

    fn add_snap_edge(&mut self, t: i64, id: EventId) {
        if let Some(ids) = self.snap_times.get_mut(&t) {
            ids.insert(id);
        } else {
            self.snap_times.insert(t, HashSet::from([id]));
        }
    }

    /// Returns true if the edge was actually recorded for `id`.
    fn remove_snap_edge(&mut self, t: i64, id: EventId) -> bool {
        let Some(ids) = self.snap_times.get_mut(&t) else {
            return false;
        };
        let removed = ids.remove(&id);
        if ids.is_empty() {
            self.snap_times.remove(&t);
        }
        removed
    }

    fn record_snapshot(&mut self, id: EventId) {
        if let Some(event) = self.events.get(&id) {
            self.snapshots.insert(id, EventSnapshot::of(event));
        }
    }

    fn dispatch(&mut self, changes: Vec<ChangeRecord>) {
        for (kind, change) in changes {
            match kind {
                ChangeKind::Position => self.position_changes.emit(&change),
                ChangeKind::RightNeighbor => self.right_neighbor_changes.emit(&change),
                ChangeKind::Style => self.style_changes.emit(&change),
                ChangeKind::Label => self.label_changes.emit(&change),
            }
        }
    }
}
