use super::{BoxSubscription, Subscription};
use crate::rc::{MutArc, RcDeref, RcDerefMut};

#[derive(Default)]
struct Inner {
  closed: bool,
  current: Option<BoxSubscription>,
}

/// A reassignable slot: assigning a new subscription disposes the previous
/// one, and anything assigned after unsubscription is disposed immediately.
#[derive(Clone, Default)]
pub struct SerialSubscription(MutArc<Inner>);

impl SerialSubscription {
  pub fn assign<S: Subscription + 'static>(&self, subscription: S) {
    let mut inner = self.0.rc_deref_mut();
    if inner.closed {
      drop(inner);
      subscription.unsubscribe();
    } else {
      let prev = inner.current.replace(BoxSubscription::new(subscription));
      drop(inner);
      if let Some(prev) = prev {
        prev.unsubscribe();
      }
    }
  }

  /// Disposes the held subscription but keeps the slot usable.
  pub fn clear(&self) {
    let prev = self.0.rc_deref_mut().current.take();
    if let Some(prev) = prev {
      prev.unsubscribe();
    }
  }
}

impl Subscription for SerialSubscription {
  fn unsubscribe(self) {
    let prev = {
      let mut inner = self.0.rc_deref_mut();
      if inner.closed {
        return;
      }
      inner.closed = true;
      inner.current.take()
    };
    if let Some(prev) = prev {
      prev.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}
