//! Lane assignment and interval indexing for timeline events.
//!
//! An [`EventsGroup`] owns a set of [`Event`]s and packs them into the
//! smallest dense prefix of [`Lane`]s such that no two events in a lane
//! overlap in time. Lanes and the global snap-time table are backed by
//! [`index::OrderedIndex`], a balanced ordered map supporting the pruned
//! interval searches and directional entry navigation the packing needs.
//! [`gesture`] turns pointer geometry into constrained era edits.

pub mod change;
pub mod error;
pub mod gesture;
pub mod index;
pub mod model;

pub use change::{ChangeStream, EventChange, Subscription};
pub use error::{GroupError, LaneOverlap};
pub use gesture::{DragConfig, DragEdge, EdgeDrag, EventDrag, GapDrag, PanDrag};
pub use index::OrderedIndex;
pub use model::{Event, EventId, EventsGroup, GroupId, Lane};
