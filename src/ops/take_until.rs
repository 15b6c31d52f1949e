use std::marker::PhantomData;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
};

/// Mirrors the source until `notifier` emits a value, then completes.
///
/// A notifier error is forwarded; a notifier that completes without a value
/// leaves the source running.
pub struct TakeUntilOp<S, N, NItem> {
  source: S,
  notifier: N,
  _hint: PhantomData<fn(NItem)>,
}

impl<S: Clone, N: Clone, NItem> Clone for TakeUntilOp<S, N, NItem> {
  fn clone(&self) -> Self {
    TakeUntilOp { source: self.source.clone(), notifier: self.notifier.clone(), _hint: PhantomData }
  }
}

impl<S, N, NItem> TakeUntilOp<S, N, NItem> {
  #[inline]
  pub(crate) fn new(source: S, notifier: N) -> Self { TakeUntilOp { source, notifier, _hint: PhantomData } }
}

impl<Item, Err, O, S, N, NItem> Observable<Item, Err, O> for TakeUntilOp<S, N, NItem>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, Subscriber<O, Err>>,
  S::Unsub: 'static,
  N: Observable<NItem, Err, TakeUntilNotifierObserver<O, Err>>,
  N::Unsub: 'static,
{
  type Unsub = Subscriber<O, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscriber = Subscriber::new(observer);
    let notifier_observer = TakeUntilNotifierObserver::new::<Item>(subscriber.clone());
    let notifier_unsub = self.notifier.actual_subscribe(notifier_observer);
    let source_unsub = self.source.actual_subscribe(subscriber.clone());
    subscriber.set_upstream((notifier_unsub, source_unsub));
    subscriber
  }
}

impl<Item, Err, S, N, NItem> ObservableExt<Item, Err> for TakeUntilOp<S, N, NItem>
where
  S: ObservableExt<Item, Err>,
  N: ObservableExt<NItem, Err>,
{
}

/// Observer of the notifier.
///
/// The source item type only matters for completing the downstream, so it is
/// erased behind a function pointer.
pub struct TakeUntilNotifierObserver<O, Err> {
  observer: Subscriber<O, Err>,
  complete_fn: fn(Subscriber<O, Err>),
  error_fn: fn(Subscriber<O, Err>, Err),
}

impl<O, Err> TakeUntilNotifierObserver<O, Err> {
  fn new<Item>(observer: Subscriber<O, Err>) -> Self
  where
    O: Observer<Item, Err>,
  {
    TakeUntilNotifierObserver {
      observer,
      complete_fn: |o| Observer::<Item, Err>::complete(o),
      error_fn: |o, err| Observer::<Item, Err>::error(o, err),
    }
  }
}

impl<NItem, Err, O> Observer<NItem, Err> for TakeUntilNotifierObserver<O, Err> {
  fn next(&mut self, _: NItem) { (self.complete_fn)(self.observer.clone()) }

  fn error(self, err: Err) { (self.error_fn)(self.observer, err) }

  fn complete(self) {}

  fn is_closed(&self) -> bool { crate::subscription::Subscription::is_closed(&self.observer) }
}
