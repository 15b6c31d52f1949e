use std::{collections::VecDeque, time::Duration};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::Scheduler,
};

/// Emits only the last `count` values, in arrival order, once the source
/// completes.
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut values = vec![];
/// observable::from_iter::<_, RxError>(0..10).take_last(3).subscribe(|v| values.push(v));
/// assert_eq!(values, vec![7, 8, 9]);
/// ```
#[derive(Clone)]
pub struct TakeLastOp<S> {
  source: S,
  count: usize,
}

impl<S> TakeLastOp<S> {
  #[inline]
  pub(crate) fn new(source: S, count: usize) -> Self { TakeLastOp { source, count } }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for TakeLastOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, TakeLastObserver<O, Item>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(TakeLastObserver {
      observer,
      count: self.count,
      queue: VecDeque::new(),
    })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for TakeLastOp<S> where S: ObservableExt<Item, Err> {}

pub struct TakeLastObserver<O, Item> {
  observer: O,
  count: usize,
  queue: VecDeque<Item>,
}

impl<Item, Err, O> Observer<Item, Err> for TakeLastObserver<O, Item>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.count == 0 {
      return;
    }
    if self.queue.len() == self.count {
      self.queue.pop_front();
    }
    self.queue.push_back(value);
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(mut self) {
    for v in self.queue.drain(..) {
      if self.observer.is_closed() {
        return;
      }
      self.observer.next(v);
    }
    self.observer.complete()
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// Emits, once the source completes, the values that arrived within
/// `duration` before the completion.
#[derive(Clone)]
pub struct TakeLastForOp<S, SD> {
  source: S,
  duration: Duration,
  scheduler: SD,
}

impl<S, SD> TakeLastForOp<S, SD> {
  #[inline]
  pub(crate) fn new(source: S, duration: Duration, scheduler: SD) -> Self {
    TakeLastForOp { source, duration, scheduler }
  }
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for TakeLastForOp<S, SD>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, TakeLastForObserver<O, Item, SD>>,
  SD: Scheduler,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(TakeLastForObserver {
      observer,
      duration: self.duration,
      scheduler: self.scheduler,
      queue: VecDeque::new(),
    })
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for TakeLastForOp<S, SD>
where
  S: ObservableExt<Item, Err>,
  SD: Scheduler,
{
}

pub struct TakeLastForObserver<O, Item, SD> {
  observer: O,
  duration: Duration,
  scheduler: SD,
  queue: VecDeque<(Duration, Item)>,
}

impl<O, Item, SD: Scheduler> TakeLastForObserver<O, Item, SD> {
  fn prune(&mut self, now: Duration) {
    while let Some((at, _)) = self.queue.front() {
      if now.saturating_sub(*at) >= self.duration {
        self.queue.pop_front();
      } else {
        break;
      }
    }
  }
}

impl<Item, Err, O, SD> Observer<Item, Err> for TakeLastForObserver<O, Item, SD>
where
  O: Observer<Item, Err>,
  SD: Scheduler,
{
  fn next(&mut self, value: Item) {
    let now = self.scheduler.now();
    self.queue.push_back((now, value));
    self.prune(now);
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(mut self) {
    self.prune(self.scheduler.now());
    for (_, v) in self.queue.drain(..) {
      if self.observer.is_closed() {
        return;
      }
      self.observer.next(v);
    }
    self.observer.complete()
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[test]
  fn emits_buffer_on_complete() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_next(230, 3),
      on_next(240, 4),
      on_completed(250),
    ]);
    let c_xs = xs.clone();
    let res = scheduler.start_with(move || c_xs.take_last(2));
    assert_eq!(res.messages(), vec![on_next(250, 3), on_next(250, 4), on_completed(250)]);
    assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 250)]);
  }

  #[test]
  fn zero_yields_only_the_terminal() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_cold_observable::<i32, RxError>(vec![
      on_next(10, 1),
      on_next(20, 2),
      on_completed(30),
    ]);
    let res = scheduler.start_with(move || xs.take_last(0));
    assert_eq!(res.messages(), vec![on_completed(230)]);
  }

  #[test]
  fn error_discards_buffer() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_error(230, RxError::Timeout),
    ]);
    let res = scheduler.start_with(move || xs.take_last(5));
    assert_eq!(res.messages(), vec![on_error(230, RxError::Timeout)]);
  }

  #[test]
  fn dispose_discards_buffer() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_completed(300),
    ]);
    let c_xs = xs.clone();
    let res = scheduler.start_with_dispose(move || c_xs.take_last(5), 250);
    assert!(res.messages().is_empty());
    assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 250)]);
  }

  #[test]
  fn duration_window_keeps_recent_values() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_next(230, 3),
      on_next(240, 4),
      on_completed(250),
    ]);
    let c_scheduler = scheduler.clone();
    let res = scheduler.start_with(move || xs.take_last_for(TestScheduler::ticks(25), c_scheduler));
    assert_eq!(res.messages(), vec![on_next(250, 3), on_next(250, 4), on_completed(250)]);
  }

  #[test]
  fn duration_window_prunes_on_arrival() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(300, 2),
      on_completed(305),
    ]);
    let c_scheduler = scheduler.clone();
    let res = scheduler.start_with(move || xs.take_last_for(TestScheduler::ticks(50), c_scheduler));
    assert_eq!(res.messages(), vec![on_next(305, 2), on_completed(305)]);
  }
}
