use std::collections::VecDeque;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

/// Ignores the last `count` values.
///
/// A value is emitted as soon as `count` newer values arrived behind it, so
/// the output trails the source by `count` values instead of waiting for
/// completion.
#[derive(Clone)]
pub struct SkipLastOp<S> {
  source: S,
  count: usize,
}

impl<S> SkipLastOp<S> {
  #[inline]
  pub(crate) fn new(source: S, count: usize) -> Self { SkipLastOp { source, count } }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for SkipLastOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, SkipLastObserver<O, Item>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(SkipLastObserver {
      observer,
      count: self.count,
      queue: VecDeque::with_capacity(self.count + 1),
    })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for SkipLastOp<S> where S: ObservableExt<Item, Err> {}

pub struct SkipLastObserver<O, Item> {
  observer: O,
  count: usize,
  queue: VecDeque<Item>,
}

impl<Item, Err, O> Observer<Item, Err> for SkipLastObserver<O, Item>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    self.queue.push_back(value);
    if self.queue.len() > self.count {
      if let Some(v) = self.queue.pop_front() {
        self.observer.next(v);
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

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[test]
  fn base_function() {
    let mut values = vec![];
    observable::from_iter::<_, RxError>(0..10).skip_last(5).subscribe(|v| values.push(v));
    assert_eq!(values, vec![0, 1, 2, 3, 4]);
  }

  #[test]
  fn emits_while_streaming() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_next(230, 3),
      on_next(240, 4),
      on_completed(250),
    ]);
    let res = scheduler.start_with(move || xs.skip_last(2));
    assert_eq!(res.messages(), vec![on_next(230, 1), on_next(240, 2), on_completed(250)]);
  }

  #[test]
  fn fewer_values_than_count() {
    let mut count = 0;
    observable::from_iter::<_, RxError>(0..3).skip_last(5).subscribe(|_| count += 1);
    assert_eq!(count, 0);
  }
}
