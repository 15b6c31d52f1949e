//! Cancellation handles.
//!
//! Every `actual_subscribe` returns a [`Subscription`]; unsubscribing it tears
//! the pipeline down from the consumer back to the source. The shapes that
//! operators compose with live in the submodules: [`SingleAssignmentSubscription`],
//! [`SerialSubscription`] and [`CompositeSubscription`]. All of them are
//! idempotent and hand the actual teardown to exactly one caller.

use std::fmt::{Debug, Formatter};

mod composite;
mod serial;
mod single_assignment;

pub use composite::CompositeSubscription;
pub use serial::SerialSubscription;
pub use single_assignment::SingleAssignmentSubscription;

/// Subscription returns from `Observable.actual_subscribe(observer)` to allow
/// unsubscribing.
pub trait Subscription {
  /// Deregisters the stream before it has finished receiving all events.
  /// Calling it on an already closed subscription does nothing.
  fn unsubscribe(self);

  fn is_closed(&self) -> bool;
}

/// Synchronous sources have nothing left to cancel once `actual_subscribe`
/// returns.
impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<S: Subscription> Subscription for Option<S> {
  #[inline]
  fn unsubscribe(self) {
    if let Some(s) = self {
      s.unsubscribe()
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.as_ref().map_or(true, Subscription::is_closed) }
}

impl<A: Subscription, B: Subscription> Subscription for (A, B) {
  fn unsubscribe(self) {
    self.0.unsubscribe();
    self.1.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.0.is_closed() && self.1.is_closed() }
}

impl<A: Subscription, B: Subscription, C: Subscription> Subscription for (A, B, C) {
  fn unsubscribe(self) {
    self.0.unsubscribe();
    self.1.unsubscribe();
    self.2.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.0.is_closed() && self.1.is_closed() && self.2.is_closed() }
}

/// Helper trait for calling unsubscribe on boxed trait objects
pub trait DynSubscription {
  fn box_unsubscribe(self: Box<Self>);
  fn box_is_closed(&self) -> bool;
}

impl<T: Subscription> DynSubscription for T {
  #[inline]
  fn box_unsubscribe(self: Box<Self>) { (*self).unsubscribe() }

  #[inline]
  fn box_is_closed(&self) -> bool { self.is_closed() }
}

/// A type erased subscription.
pub struct BoxSubscription(Box<dyn DynSubscription>);

impl BoxSubscription {
  pub fn new(subscription: impl Subscription + 'static) -> Self {
    BoxSubscription(Box::new(subscription))
  }
}

impl Subscription for BoxSubscription {
  #[inline]
  fn unsubscribe(self) { self.0.box_unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.box_is_closed() }
}

impl Debug for BoxSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BoxSubscription")
      .field("is_closed", &self.is_closed())
      .finish()
  }
}

/// A subscription that runs a teardown action once when unsubscribed.
pub struct FnSubscription<F: FnOnce()>(F);

impl<F: FnOnce()> FnSubscription<F> {
  pub fn new(teardown: F) -> Self { FnSubscription(teardown) }
}

impl<F: FnOnce()> Subscription for FnSubscription<F> {
  #[inline]
  fn unsubscribe(self) { (self.0)() }

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Wrapper around a subscription which provides the
/// `unsubscribe_when_dropped()` method.
pub struct SubscriptionWrapper<T: Subscription>(pub(crate) T);

impl<T: Subscription> SubscriptionWrapper<T> {
  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard<T> { SubscriptionGuard(Some(self.0)) }

  /// Consumes this wrapper and returns the underlying subscription.
  pub fn into_inner(self) -> T { self.0 }
}

impl<T: Subscription> Subscription for SubscriptionWrapper<T> {
  #[inline]
  fn unsubscribe(self) { self.0.unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(Option<T>);

impl<T: Subscription> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(Some(subscription)) }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) {
    if let Some(s) = self.0.take() {
      s.unsubscribe()
    }
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;

  /// Counts how many times it has been unsubscribed.
  #[derive(Clone, Default)]
  pub(crate) struct CountingSubscription(pub(crate) Rc<Cell<usize>>);

  impl Subscription for CountingSubscription {
    fn unsubscribe(self) { self.0.set(self.0.get() + 1) }

    fn is_closed(&self) -> bool { self.0.get() > 0 }
  }

  #[test]
  fn tuple_unsubscribes_all() {
    let (a, b) = (CountingSubscription::default(), CountingSubscription::default());
    let pair = (a.clone(), b.clone());
    assert!(!pair.is_closed());
    pair.unsubscribe();
    assert_eq!(a.0.get(), 1);
    assert_eq!(b.0.get(), 1);
  }

  #[test]
  fn boxed_delegates() {
    let a = CountingSubscription::default();
    let boxed = BoxSubscription::new(a.clone());
    assert!(!boxed.is_closed());
    boxed.unsubscribe();
    assert!(a.is_closed());
  }

  #[test]
  fn guard_unsubscribes_on_drop() {
    let a = CountingSubscription::default();
    {
      let _guard = SubscriptionWrapper(a.clone()).unsubscribe_when_dropped();
      assert_eq!(a.0.get(), 0);
    }
    assert_eq!(a.0.get(), 1);
  }

  #[test]
  fn fn_subscription_runs_teardown() {
    let hit = Rc::new(Cell::new(false));
    let c_hit = hit.clone();
    FnSubscription::new(move || c_hit.set(true)).unsubscribe();
    assert!(hit.get());
  }
}
