//! `distinct_until_changed` and its keyed variants: suppress consecutive
//! duplicates.

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

/// Uses the value itself as its key.
pub fn default_key<Item: Clone, Err>(v: &Item) -> Result<Item, Err> { Ok(v.clone()) }

/// Compares keys with `PartialEq`.
pub fn default_key_eq<K: PartialEq, Err>(a: &K, b: &K) -> Result<bool, Err> { Ok(a == b) }

/// Emits a value only when its key differs from the key of the last emitted
/// value. Both the key selector and the comparer may fail; the failure is
/// delivered as the error and the remembered key is dropped.
#[derive(Clone)]
pub struct DistinctUntilChangedOp<S, F, C> {
  source: S,
  key: F,
  same: C,
}

impl<S, F, C> DistinctUntilChangedOp<S, F, C> {
  #[inline]
  pub(crate) fn new(source: S, key: F, same: C) -> Self { DistinctUntilChangedOp { source, key, same } }
}

impl<Item, Err, O, S, F, C, K> Observable<Item, Err, O> for DistinctUntilChangedOp<S, F, C>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, DistinctUntilChangedObserver<O, F, C, K>>,
  F: FnMut(&Item) -> Result<K, Err>,
  C: FnMut(&K, &K) -> Result<bool, Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(DistinctUntilChangedObserver {
      observer: Some(observer),
      key: self.key,
      same: self.same,
      last: None,
    })
  }
}

impl<Item, Err, S, F, C, K> ObservableExt<Item, Err> for DistinctUntilChangedOp<S, F, C>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> Result<K, Err>,
  C: FnMut(&K, &K) -> Result<bool, Err>,
{
}

pub struct DistinctUntilChangedObserver<O, F, C, K> {
  observer: Option<O>,
  key: F,
  same: C,
  last: Option<K>,
}

impl<Item, Err, O, F, C, K> Observer<Item, Err> for DistinctUntilChangedObserver<O, F, C, K>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Result<K, Err>,
  C: FnMut(&K, &K) -> Result<bool, Err>,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    let checked = (self.key)(&value).and_then(|key| match &self.last {
      Some(last) => (self.same)(last, &key).map(|same| (!same).then_some(key)),
      None => Ok(Some(key)),
    });
    match checked {
      Ok(Some(key)) => {
        self.last = Some(key);
        self.observer.next(value);
      }
      Ok(None) => {}
      Err(err) => {
        self.last = None;
        self.observer.take().error(err);
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

/// Infallible keyed variant, comparing keys with `PartialEq`.
#[derive(Clone)]
pub struct DistinctUntilKeyChangedOp<S, F> {
  source: S,
  key: F,
}

impl<S, F> DistinctUntilKeyChangedOp<S, F> {
  #[inline]
  pub(crate) fn new(source: S, key: F) -> Self { DistinctUntilKeyChangedOp { source, key } }
}

impl<Item, Err, O, S, F, K> Observable<Item, Err, O> for DistinctUntilKeyChangedOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, DistinctUntilKeyChangedObserver<O, F, K>>,
  F: FnMut(&Item) -> K,
  K: PartialEq,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(DistinctUntilKeyChangedObserver { observer, key: self.key, last: None })
  }
}

impl<Item, Err, S, F, K> ObservableExt<Item, Err> for DistinctUntilKeyChangedOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> K,
  K: PartialEq,
{
}

pub struct DistinctUntilKeyChangedObserver<O, F, K> {
  observer: O,
  key: F,
  last: Option<K>,
}

impl<Item, Err, O, F, K> Observer<Item, Err> for DistinctUntilKeyChangedObserver<O, F, K>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> K,
  K: PartialEq,
{
  fn next(&mut self, value: Item) {
    let key = (self.key)(&value);
    if self.last.as_ref() != Some(&key) {
      self.last = Some(key);
      self.observer.next(value);
    }
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[test]
  fn primitive_type() {
    let mut x = vec![];
    observable::from_iter::<_, RxError>([1, 1, 2, 2, 2, 3, 1, 1])
      .distinct_until_changed()
      .subscribe(|v| x.push(v));
    assert_eq!(x, vec![1, 2, 3, 1]);
  }

  #[test]
  fn keyed() {
    let mut x = vec![];
    observable::from_iter::<_, RxError>([(1, 'a'), (1, 'b'), (2, 'c'), (1, 'd')])
      .distinct_until_key_changed(|v| v.0)
      .subscribe(|v| x.push(v.1));
    assert_eq!(x, vec!['a', 'c', 'd']);
  }

  #[test]
  fn comparer_failure_becomes_error() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 1),
      on_next(230, 2),
      on_next(240, 3),
      on_completed(250),
    ]);
    let c_xs = xs.clone();
    let res = scheduler.start_with(move || {
      c_xs.try_distinct_until_changed_by(
        |v| Ok(*v),
        |a, b| if *b == 3 { Err(RxError::custom("cmp", "three")) } else { Ok(a == b) },
      )
    });
    assert_eq!(
      res.messages(),
      vec![on_next(210, 1), on_next(230, 2), on_error(240, RxError::custom("cmp", "three"))]
    );
    assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 240)]);
  }

  #[test]
  fn key_failure_becomes_error() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_next(230, 3),
      on_completed(250),
    ]);
    let res = scheduler.start_with(move || {
      xs.try_distinct_until_changed_by(
        |v| if *v == 2 { Err(RxError::custom("key", "two")) } else { Ok(*v) },
        |a, b| Ok(a == b),
      )
    });
    assert_eq!(res.messages(), vec![on_next(210, 1), on_error(220, RxError::custom("key", "two"))]);
  }
}
