use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscriber::Subscriber,
  subscription::Subscription,
};

#[derive(Clone)]
pub struct MergeOp<S1, S2> {
  source1: S1,
  source2: S2,
}

impl<S1, S2> MergeOp<S1, S2> {
  #[inline]
  pub(crate) fn new(source1: S1, source2: S2) -> Self { MergeOp { source1, source2 } }
}

impl<Item, Err, O, S1, S2> Observable<Item, Err, O> for MergeOp<S1, S2>
where
  O: Observer<Item, Err>,
  S1: Observable<Item, Err, MergeObserver<O, Err>>,
  S2: Observable<Item, Err, MergeObserver<O, Err>>,
{
  type Unsub = (S1::Unsub, S2::Unsub);

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = MergeObserver { observer: Subscriber::new(observer), completed: Arc::default() };
    let u1 = self.source1.actual_subscribe(observer.clone());
    let u2 = self.source2.actual_subscribe(observer);
    (u1, u2)
  }
}

impl<Item, Err, S1, S2> ObservableExt<Item, Err> for MergeOp<S1, S2>
where
  S1: ObservableExt<Item, Err>,
  S2: ObservableExt<Item, Err>,
{
}

/// Feeds one of the merged sources into the shared downstream guard.
pub struct MergeObserver<O, Err> {
  observer: Subscriber<O, Err>,
  completed: Arc<AtomicUsize>,
}

impl<O, Err> Clone for MergeObserver<O, Err> {
  fn clone(&self) -> Self { MergeObserver { observer: self.observer.clone(), completed: self.completed.clone() } }
}

impl<Item, Err, O> Observer<Item, Err> for MergeObserver<O, Err>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    if self.completed.fetch_add(1, Ordering::AcqRel) == 1 {
      self.observer.complete()
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { Subscription::is_closed(&self.observer) }
}
