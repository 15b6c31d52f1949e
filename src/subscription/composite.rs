use smallvec::SmallVec;

use super::{BoxSubscription, Subscription};
use crate::rc::{MutArc, RcDeref, RcDerefMut};

/// Items tracked by id, so one can be removed when it finishes on its own.
struct Entries<U> {
  next_id: usize,
  items: SmallVec<[(usize, U); 2]>,
}

impl<U> Default for Entries<U> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<U> Entries<U> {
  fn add(&mut self, item: U) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.items.push((id, item));
    id
  }

  fn remove(&mut self, id: usize) -> Option<U> {
    let idx = self.items.iter().position(|(i, _)| *i == id)?;
    Some(self.items.remove(idx).1)
  }

  fn drain(&mut self) -> impl Iterator<Item = U> + '_ { self.items.drain(..).map(|(_, v)| v) }
}

#[derive(Default)]
struct Inner {
  closed: bool,
  entries: Entries<BoxSubscription>,
}

/// Owns a set of subscriptions and disposes all of them together.
#[derive(Clone, Default)]
pub struct CompositeSubscription(MutArc<Inner>);

impl CompositeSubscription {
  /// Adds a subscription and returns its id. When the composite is already
  /// closed the subscription is disposed right away and `None` is returned.
  pub fn add<S: Subscription + 'static>(&self, subscription: S) -> Option<usize> {
    let mut inner = self.0.rc_deref_mut();
    if inner.closed {
      drop(inner);
      subscription.unsubscribe();
      None
    } else {
      Some(inner.entries.add(BoxSubscription::new(subscription)))
    }
  }

  /// Removes the subscription with `id` and disposes it.
  pub fn remove(&self, id: usize) -> bool {
    let removed = self.0.rc_deref_mut().entries.remove(id);
    match removed {
      Some(s) => {
        s.unsubscribe();
        true
      }
      None => false,
    }
  }

  /// Forgets the subscription with `id` without disposing it.
  pub fn detach(&self, id: usize) -> bool { self.0.rc_deref_mut().entries.remove(id).is_some() }

  /// Forgets every subscription that already closed on its own.
  pub fn prune(&self) { self.0.rc_deref_mut().entries.items.retain(|(_, s)| !s.is_closed()); }

  pub fn len(&self) -> usize { self.0.rc_deref().entries.items.len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Subscription for CompositeSubscription {
  fn unsubscribe(self) {
    let items: SmallVec<[BoxSubscription; 2]> = {
      let mut inner = self.0.rc_deref_mut();
      if inner.closed {
        return;
      }
      inner.closed = true;
      let items = inner.entries.drain().collect();
      items
    };
    for s in items {
      s.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}
