use std::{
  marker::PhantomData,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{SingleAssignmentSubscription, Subscription},
};

/// Drops source values until `notifier` emits a value.
///
/// The notifier is released after its first value. A notifier error is
/// forwarded; a notifier that completes without a value keeps the gate shut.
pub struct SkipUntilOp<S, N, NItem> {
  source: S,
  notifier: N,
  _hint: PhantomData<fn(NItem)>,
}

impl<S: Clone, N: Clone, NItem> Clone for SkipUntilOp<S, N, NItem> {
  fn clone(&self) -> Self {
    SkipUntilOp { source: self.source.clone(), notifier: self.notifier.clone(), _hint: PhantomData }
  }
}

impl<S, N, NItem> SkipUntilOp<S, N, NItem> {
  #[inline]
  pub(crate) fn new(source: S, notifier: N) -> Self { SkipUntilOp { source, notifier, _hint: PhantomData } }
}

impl<Item, Err, O, S, N, NItem> Observable<Item, Err, O> for SkipUntilOp<S, N, NItem>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, SkipUntilObserver<O, Err>>,
  S::Unsub: 'static,
  N: Observable<NItem, Err, SkipUntilNotifierObserver<O, Err>>,
  N::Unsub: 'static,
{
  type Unsub = Subscriber<O, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscriber = Subscriber::new(observer);
    let open = Arc::new(AtomicBool::new(false));
    let notifier_slot = SingleAssignmentSubscription::default();
    let notifier_observer = SkipUntilNotifierObserver {
      observer: subscriber.clone(),
      open: open.clone(),
      slot: notifier_slot.clone(),
      error_fn: |o, err| Observer::<Item, Err>::error(o, err),
    };
    let notifier_unsub = self.notifier.actual_subscribe(notifier_observer);
    // Fresh slot, assigning can only fail on a second assignment.
    let _ = notifier_slot.assign(notifier_unsub);
    let source_unsub = self.source.actual_subscribe(SkipUntilObserver { observer: subscriber.clone(), open });
    subscriber.set_upstream((notifier_slot, source_unsub));
    subscriber
  }
}

impl<Item, Err, S, N, NItem> ObservableExt<Item, Err> for SkipUntilOp<S, N, NItem>
where
  S: ObservableExt<Item, Err>,
  N: ObservableExt<NItem, Err>,
{
}

pub struct SkipUntilObserver<O, Err> {
  observer: Subscriber<O, Err>,
  open: Arc<AtomicBool>,
}

impl<Item, Err, O> Observer<Item, Err> for SkipUntilObserver<O, Err>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.open.load(Ordering::Acquire) {
      self.observer.next(value)
    }
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { Observer::<Item, Err>::is_closed(&self.observer) }
}

pub struct SkipUntilNotifierObserver<O, Err> {
  observer: Subscriber<O, Err>,
  open: Arc<AtomicBool>,
  slot: SingleAssignmentSubscription,
  error_fn: fn(Subscriber<O, Err>, Err),
}

impl<NItem, Err, O> Observer<NItem, Err> for SkipUntilNotifierObserver<O, Err> {
  fn next(&mut self, _: NItem) {
    if !self.open.swap(true, Ordering::AcqRel) {
      self.slot.clone().unsubscribe();
    }
  }

  fn error(self, err: Err) {
    if !self.open.load(Ordering::Acquire) {
      (self.error_fn)(self.observer, err)
    }
  }

  fn complete(self) {}

  fn is_closed(&self) -> bool { self.open.load(Ordering::Acquire) || Subscription::is_closed(&self.observer) }
}
