use super::{BoxSubscription, Subscription};
use crate::{
  error::RxError,
  rc::{MutArc, RcDeref, RcDerefMut},
};

enum Slot {
  Empty,
  Assigned(BoxSubscription),
  Disposed,
}

/// Holds at most one subscription, assignable once.
///
/// Unsubscribing disposes whatever is assigned. Assigning after the slot was
/// unsubscribed disposes the new value right away instead of storing it.
#[derive(Clone)]
pub struct SingleAssignmentSubscription(MutArc<Slot>);

impl Default for SingleAssignmentSubscription {
  fn default() -> Self { SingleAssignmentSubscription(MutArc::own(Slot::Empty)) }
}

impl SingleAssignmentSubscription {
  /// Fails with `RxError::InvalidOperation` if a subscription is already
  /// assigned.
  pub fn assign<S: Subscription + 'static>(&self, subscription: S) -> Result<(), RxError> {
    let mut slot = self.0.rc_deref_mut();
    if matches!(*slot, Slot::Assigned(_)) {
      return Err(RxError::InvalidOperation("subscription already assigned".to_owned()));
    }
    if matches!(*slot, Slot::Disposed) {
      drop(slot);
      subscription.unsubscribe();
      return Ok(());
    }
    *slot = Slot::Assigned(BoxSubscription::new(subscription));
    Ok(())
  }

  pub fn is_assigned(&self) -> bool { matches!(*self.0.rc_deref(), Slot::Assigned(_)) }

  /// Whether both handles share one slot.
  pub fn ptr_eq(&self, other: &Self) -> bool { self.0.ptr_eq(&other.0) }
}

impl Subscription for SingleAssignmentSubscription {
  fn unsubscribe(self) {
    let prev = std::mem::replace(&mut *self.0.rc_deref_mut(), Slot::Disposed);
    if let Slot::Assigned(s) = prev {
      s.unsubscribe()
    }
  }

  fn is_closed(&self) -> bool { matches!(*self.0.rc_deref(), Slot::Disposed) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::subscription::tests::CountingSubscription;

  #[test]
  fn second_assign_fails() {
    let slot = SingleAssignmentSubscription::default();
    assert!(slot.assign(CountingSubscription::default()).is_ok());
    assert!(slot.is_assigned());
    let second = CountingSubscription::default();
    assert!(matches!(slot.assign(second.clone()), Err(RxError::InvalidOperation(_))));
    assert_eq!(second.0.get(), 0);
  }

  #[test]
  fn unsubscribe_disposes_assigned() {
    let slot = SingleAssignmentSubscription::default();
    let inner = CountingSubscription::default();
    slot.assign(inner.clone()).unwrap();
    slot.clone().unsubscribe();
    slot.clone().unsubscribe();
    assert_eq!(inner.0.get(), 1);
    assert!(slot.is_closed());
  }

  #[test]
  fn assign_after_dispose_disposes_immediately() {
    let slot = SingleAssignmentSubscription::default();
    slot.clone().unsubscribe();
    let inner = CountingSubscription::default();
    assert!(slot.assign(inner.clone()).is_ok());
    assert_eq!(inner.0.get(), 1);
    assert!(!slot.is_assigned());
  }

  #[test]
  fn reentrant_unsubscribe_is_a_noop() {
    use std::{cell::RefCell, rc::Rc};

    struct Reenter(Rc<RefCell<Option<SingleAssignmentSubscription>>>, CountingSubscription);
    impl Subscription for Reenter {
      fn unsubscribe(self) {
        self.1.unsubscribe();
        let outer = self.0.borrow_mut().take();
        if let Some(outer) = outer {
          outer.unsubscribe();
        }
      }
      fn is_closed(&self) -> bool { false }
    }

    let slot = SingleAssignmentSubscription::default();
    let handle = Rc::new(RefCell::new(Some(slot.clone())));
    let count = CountingSubscription::default();
    slot.assign(Reenter(handle, count.clone())).unwrap();
    slot.clone().unsubscribe();
    assert_eq!(count.0.get(), 1);
    assert!(slot.is_closed());
  }
}
