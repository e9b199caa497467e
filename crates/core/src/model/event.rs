use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use timelane_protocol::{Era, EraConstraints, StyleClasses};

/// Identity of an event within its owning group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub(crate) u64);

impl EventId {
    #[cfg(test)]
    pub(crate) const fn test_id(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event #{}", self.0)
    }
}

/// Identity of an [`crate::model::EventsGroup`], used as the ownership
/// handle stamped onto events. Allocated process-wide so handles from
/// different groups never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(u64);

impl GroupId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A single timeline event: an identity-based entity owning a time era
/// plus display metadata the lane index ignores.
///
/// A detached event is a plain value; `EventsGroup::add_event` takes it
/// over, stamps the ownership handle, and from then on all mutation goes
/// through the owning group so lane placement stays consistent. The
/// ownership handle is checked, never dereferenced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub(crate) label: String,
    pub(crate) era: Era,
    pub(crate) allows_user_drag: bool,
    pub(crate) constraints: EraConstraints,
    pub(crate) classes: StyleClasses,
    #[serde(skip)]
    pub(crate) owner: Option<GroupId>,
}

impl Event {
    pub fn new(label: impl Into<String>, era: Era) -> Self {
        Self {
            label: label.into(),
            era,
            allows_user_drag: true,
            constraints: EraConstraints::default(),
            classes: StyleClasses::new(),
            owner: None,
        }
    }

    pub fn with_allows_user_drag(mut self, allow: bool) -> Self {
        self.allows_user_drag = allow;
        self
    }

    pub fn with_constraints(mut self, constraints: EraConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_classes(mut self, classes: StyleClasses) -> Self {
        self.classes = classes;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn era(&self) -> Era {
        self.era
    }

    pub fn allows_user_drag(&self) -> bool {
        self.allows_user_drag
    }

    pub fn constraints(&self) -> &EraConstraints {
        &self.constraints
    }

    pub fn classes(&self) -> &StyleClasses {
        &self.classes
    }

    pub fn style_key(&self) -> &str {
        self.classes.style_key()
    }

    /// Whether some group currently owns this event.
    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }
}

/// Per-event state captured after every settle, diffed by the group to
/// decide which facets of an update need resettlement or notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EventSnapshot {
    pub label: String,
    pub era: Era,
    pub style_key: String,
}

impl EventSnapshot {
    pub fn of(event: &Event) -> Self {
        Self {
            label: event.label.clone(),
            era: event.era,
            style_key: event.classes.style_key().to_owned(),
        }
    }
}
