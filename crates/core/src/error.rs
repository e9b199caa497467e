use thiserror::Error;
use timelane_protocol::Era;

use crate::model::EventId;

/// Attempt to place an era into a lane it intersects. Under first-fit
/// placement the group never triggers this; seeing it means a caller drove
/// a [`crate::model::Lane`] directly into an illegal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("era [{}, {}) overlaps an existing era in this lane", era.min, era.max)]
pub struct LaneOverlap {
    pub era: Era,
}

/// Invariant violations surfaced by [`crate::model::EventsGroup`].
///
/// These are programmer errors: they propagate to the caller (which in a
/// UI context typically aborts the gesture) and never leave the group in a
/// corrupted state. Expected misses — unknown lookups, absent neighbors,
/// no snap candidate — are `Option`s, not errors.
#[derive(Debug, Error)]
pub enum GroupError {
    #[error("event is already owned by another group")]
    AlreadyOwned,
    #[error("{0} is not owned by this group")]
    UnknownEvent(EventId),
    #[error("{0} does not allow user drags")]
    DragNotAllowed(EventId),
    #[error(transparent)]
    Overlap(#[from] LaneOverlap),
}
