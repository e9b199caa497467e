pub mod event;
pub mod group;
pub mod lane;

pub use event::{Event, EventId, GroupId};
pub use group::EventsGroup;
pub use lane::Lane;
