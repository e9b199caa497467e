use std::cmp::Ordering;
use std::collections::HashMap;

use timelane_protocol::Era;

use crate::error::LaneOverlap;
use crate::index::OrderedIndex;
use crate::model::EventId;

/// One horizontal row of mutually non-overlapping eras.
///
/// The index keys eras by `(min, max)`; each key maps to the ordered group
/// of events sharing exactly that era (ties by insertion order — in
/// practice only point events can share a key, since any wider duplicate
/// would intersect itself). A reverse map gives O(1) era lookup on
/// removal.
#[derive(Debug, Default)]
pub struct Lane {
    index: OrderedIndex<Era, Vec<EventId>>,
    eras: HashMap<EventId, Era>,
}

impl Lane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events in the lane.
    pub fn len(&self) -> usize {
        self.eras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eras.is_empty()
    }

    /// Where `era` lies relative to an indexed key, for pruned descent:
    /// subtrees on the far side of a non-intersecting key can never
    /// intersect either, because lane keys are mutually non-overlapping.
    fn classify(era: Era, key: &Era) -> Ordering {
        if era.max <= key.min {
            Ordering::Less
        } else if key.max <= era.min {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Short-circuiting closed-open intersection test.
    pub fn has_events_intersecting(&self, era: Era) -> bool {
        self.index.find_match(|key| Self::classify(era, key)).is_some()
    }

    /// Every event at every key intersecting `era`, in key order.
    pub fn events_intersecting(&self, era: Era) -> Vec<EventId> {
        let mut out = Vec::new();
        self.index.visit_matches(
            |key| Self::classify(era, key),
            &mut |_, ids: &Vec<EventId>| out.extend_from_slice(ids),
        );
        out
    }

    /// Place an event. The caller must have established there is room;
    /// an intersecting era is an invariant violation and leaves the lane
    /// untouched.
    pub fn add_event(&mut self, event: EventId, era: Era) -> Result<(), LaneOverlap> {
        if self.has_events_intersecting(era) {
            return Err(LaneOverlap { era });
        }
        if let Some(group) = self.index.get_mut(&era) {
            group.push(event);
        } else {
            self.index.insert(era, vec![event]);
        }
        self.eras.insert(event, era);
        Ok(())
    }

    /// Remove an event, returning the era it vacated.
    pub fn remove_event(&mut self, event: EventId) -> Option<Era> {
        let era = self.eras.remove(&event)?;
        let mut now_empty = false;
        if let Some(group) = self.index.get_mut(&era) {
            group.retain(|id| *id != event);
            now_empty = group.is_empty();
        }
        if now_empty {
            self.index.remove(&era);
        }
        Some(era)
    }

    /// The era an event currently occupies here.
    pub fn era_of(&self, event: EventId) -> Option<Era> {
        self.eras.get(&event).copied()
    }

    // Query sentinels ordering before (or after) every real era sharing a
    // start time, so entry navigation selects by start irrespective of end.
    const fn before_all(t: i64) -> Era {
        Era { min: t, max: i64::MIN }
    }

    const fn after_all(t: i64) -> Era {
        Era { min: t, max: i64::MAX }
    }

    /// Latest entry starting strictly before `t`.
    pub fn entry_starting_before(&self, t: i64) -> Option<(Era, &[EventId])> {
        self.index
            .entry_before(&Self::before_all(t))
            .map(|(era, ids)| (*era, ids.as_slice()))
    }

    /// Latest entry starting at or before `t`.
    pub fn entry_starting_at_or_before(&self, t: i64) -> Option<(Era, &[EventId])> {
        self.index
            .entry_at_or_before(&Self::after_all(t))
            .map(|(era, ids)| (*era, ids.as_slice()))
    }

    /// Earliest entry starting strictly after `t`.
    pub fn entry_starting_after(&self, t: i64) -> Option<(Era, &[EventId])> {
        self.index
            .entry_after(&Self::after_all(t))
            .map(|(era, ids)| (*era, ids.as_slice()))
    }

    /// Earliest entry starting at or after `t`.
    pub fn entry_starting_at_or_after(&self, t: i64) -> Option<(Era, &[EventId])> {
        self.index
            .entry_at_or_after(&Self::before_all(t))
            .map(|(era, ids)| (*era, ids.as_slice()))
    }

    /// Hit-testing: the event whose era contains `t`, if any. Only the
    /// latest-starting era can contain `t`, so one lookup suffices.
    pub fn event_containing(&self, t: i64) -> Option<EventId> {
        let (era, ids) = self.entry_starting_at_or_before(t)?;
        if era.contains(t) { ids.first().copied() } else { None }
    }

    /// The event immediately to the left of `era` (the last member of the
    /// preceding entry).
    pub fn left_neighbor(&self, era: Era) -> Option<EventId> {
        self.entry_starting_before(era.min)
            .and_then(|(_, ids)| ids.last().copied())
    }

    /// All entries in start order.
    pub fn entries(&self) -> impl Iterator<Item = (Era, &[EventId])> {
        self.index.iter().map(|(era, ids)| (*era, ids.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> EventId {
        EventId::test_id(raw)
    }

    #[test]
    fn rejects_intersecting_eras() {
        let mut lane = Lane::new();
        lane.add_event(id(1), Era::new(0, 10)).unwrap();
        assert!(lane.add_event(id(2), Era::new(5, 15)).is_err());
        // Touching at the boundary is fine.
        lane.add_event(id(3), Era::new(10, 20)).unwrap();
        assert_eq!(lane.len(), 2);
    }

    #[test]
    fn point_events_share_a_key() {
        let mut lane = Lane::new();
        lane.add_event(id(1), Era::point(5)).unwrap();
        lane.add_event(id(2), Era::point(5)).unwrap();
        let hits = lane.events_intersecting(Era::new(0, 10));
        assert_eq!(hits, vec![id(1), id(2)]);
        assert_eq!(lane.remove_event(id(1)), Some(Era::point(5)));
        assert_eq!(lane.events_intersecting(Era::new(0, 10)), vec![id(2)]);
    }

    #[test]
    fn intersection_queries_prune_correctly() {
        let mut lane = Lane::new();
        for (raw, min) in [(1, 0), (2, 20), (3, 40), (4, 60), (5, 80)] {
            lane.add_event(id(raw), Era::new(min, min + 10)).unwrap();
        }
        assert!(lane.has_events_intersecting(Era::new(25, 30)));
        assert!(!lane.has_events_intersecting(Era::new(10, 20)));
        assert_eq!(
            lane.events_intersecting(Era::new(25, 65)),
            vec![id(2), id(3), id(4)]
        );
    }

    #[test]
    fn entry_navigation_selects_by_start_time() {
        let mut lane = Lane::new();
        lane.add_event(id(1), Era::new(0, 10)).unwrap();
        lane.add_event(id(2), Era::new(20, 30)).unwrap();

        let starts = |entry: Option<(Era, &[EventId])>| entry.map(|(era, _)| era.min);
        assert_eq!(starts(lane.entry_starting_before(20)), Some(0));
        assert_eq!(starts(lane.entry_starting_at_or_before(20)), Some(20));
        assert_eq!(starts(lane.entry_starting_after(0)), Some(20));
        assert_eq!(starts(lane.entry_starting_at_or_after(0)), Some(0));
        assert_eq!(starts(lane.entry_starting_before(0)), None);
        assert_eq!(starts(lane.entry_starting_after(20)), None);
    }

    #[test]
    fn hit_testing_is_closed_open() {
        let mut lane = Lane::new();
        lane.add_event(id(1), Era::new(0, 10)).unwrap();
        lane.add_event(id(2), Era::new(10, 20)).unwrap();
        assert_eq!(lane.event_containing(0), Some(id(1)));
        assert_eq!(lane.event_containing(9), Some(id(1)));
        assert_eq!(lane.event_containing(10), Some(id(2)));
        assert_eq!(lane.event_containing(20), None);
        assert_eq!(lane.event_containing(-1), None);
    }

    #[test]
    fn left_neighbor_ignores_end_times() {
        let mut lane = Lane::new();
        lane.add_event(id(1), Era::new(0, 100)).unwrap();
        lane.add_event(id(2), Era::new(100, 110)).unwrap();
        assert_eq!(lane.left_neighbor(Era::new(100, 110)), Some(id(1)));
        assert_eq!(lane.left_neighbor(Era::new(0, 100)), None);
    }
}
