//! `publish` and `publish_value`: turn a cold source into a connectable
//! one shared through a subject.

use crate::{
  observable::ConnectableObservable,
  subject::{BehaviorSubject, Subject},
};

/// Shares `source` through a plain [`Subject`]: late subscribers miss what
/// was emitted before they attached.
pub fn publish<S, Item, Err>(source: S) -> ConnectableObservable<S, Subject<Item, Err>> {
  ConnectableObservable::new(source, Subject::new())
}

/// Shares `source` through a [`BehaviorSubject`] starting at `seed`, so
/// every subscriber first receives the latest value.
pub fn publish_value<S, Item, Err>(source: S, seed: Item) -> ConnectableObservable<S, BehaviorSubject<Item, Err>> {
  ConnectableObservable::new(source, BehaviorSubject::new(seed))
}
