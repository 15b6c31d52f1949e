use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::{SingleAssignmentSubscription, Subscription},
};

/// Emits only the first `count` values, then completes and releases the
/// source.
#[derive(Clone)]
pub struct TakeOp<S> {
  source: S,
  count: usize,
}

impl<S> TakeOp<S> {
  #[inline]
  pub(crate) fn new(source: S, count: usize) -> Self { TakeOp { source, count } }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for TakeOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, TakeObserver<O>>,
  S::Unsub: 'static,
{
  type Unsub = SingleAssignmentSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let upstream = SingleAssignmentSubscription::default();
    if self.count == 0 {
      observer.complete();
      upstream.clone().unsubscribe();
      return upstream;
    }
    let observer = TakeObserver { observer: Some(observer), remaining: self.count, upstream: upstream.clone() };
    let unsub = self.source.actual_subscribe(observer);
    // Fresh slot, assigning can only fail on a second assignment.
    let _ = upstream.assign(unsub);
    upstream
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for TakeOp<S> where S: ObservableExt<Item, Err> {}

pub struct TakeObserver<O> {
  observer: Option<O>,
  remaining: usize,
  upstream: SingleAssignmentSubscription,
}

impl<Item, Err, O> Observer<Item, Err> for TakeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(observer) = self.observer.as_mut() {
      self.remaining -= 1;
      observer.next(value);
      if self.remaining == 0 {
        self.observer.take().complete();
        self.upstream.clone().unsubscribe();
      }
    }
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// Emits values while `predicate` holds, completes on the first one that
/// fails it.
#[derive(Clone)]
pub struct TakeWhileOp<S, F> {
  source: S,
  predicate: F,
}

impl<S, F> TakeWhileOp<S, F> {
  #[inline]
  pub(crate) fn new(source: S, predicate: F) -> Self { TakeWhileOp { source, predicate } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for TakeWhileOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, TakeWhileObserver<O, F>>,
  S::Unsub: 'static,
  F: FnMut(&Item) -> bool,
{
  type Unsub = SingleAssignmentSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let upstream = SingleAssignmentSubscription::default();
    let observer =
      TakeWhileObserver { observer: Some(observer), predicate: self.predicate, upstream: upstream.clone() };
    let unsub = self.source.actual_subscribe(observer);
    // Fresh slot, assigning can only fail on a second assignment.
    let _ = upstream.assign(unsub);
    upstream
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for TakeWhileOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> bool,
{
}

pub struct TakeWhileObserver<O, F> {
  observer: Option<O>,
  predicate: F,
  upstream: SingleAssignmentSubscription,
}

impl<Item, Err, O, F> Observer<Item, Err> for TakeWhileObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    if (self.predicate)(&value) {
      self.observer.next(value);
    } else {
      self.observer.take().complete();
      self.upstream.clone().unsubscribe();
    }
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
