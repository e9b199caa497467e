//! Change notifications crossing the engine/painter boundary.
//!
//! Mutations never call back into the model: they gather plain change
//! records while the structures update and emit them afterwards, so a
//! subscriber can never observe (or re-enter) a half-settled group.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::EventId;

/// One change notification. Subscribers receive only this record, never a
/// handle into the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventChange {
    /// True for live-preview (mid-drag) updates, false once the value is
    /// committed on release.
    pub ongoing: bool,
    pub event: EventId,
}

/// Which stream a buffered record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChangeKind {
    Position,
    RightNeighbor,
    Style,
    Label,
}

pub(crate) type ChangeRecord = (ChangeKind, EventChange);

/// Handle returned by [`ChangeStream::subscribe`]; pass it back to
/// [`ChangeStream::unsubscribe`] to stop delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

/// A push-style notification stream.
#[derive(Default)]
pub struct ChangeStream {
    subscribers: Vec<(u64, Box<dyn FnMut(&EventChange)>)>,
    next_id: u64,
}

impl ChangeStream {
    pub fn subscribe(&mut self, callback: impl FnMut(&EventChange) + 'static) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        Subscription(id)
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != subscription.0);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn emit(&mut self, change: &EventChange) {
        for (_, callback) in &mut self.subscribers {
            callback(change);
        }
    }
}

impl fmt::Debug for ChangeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeStream")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn subscribe_emit_unsubscribe() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut stream = ChangeStream::default();

        let sink = Rc::clone(&seen);
        let sub = stream.subscribe(move |change| sink.borrow_mut().push(*change));
        assert_eq!(stream.subscriber_count(), 1);

        let change = EventChange { ongoing: true, event: EventId::test_id(7) };
        stream.emit(&change);
        assert_eq!(seen.borrow().as_slice(), &[change]);

        assert!(stream.unsubscribe(sub));
        assert!(!stream.unsubscribe(sub));
        stream.emit(&change);
        assert_eq!(seen.borrow().len(), 1);
    }
}
