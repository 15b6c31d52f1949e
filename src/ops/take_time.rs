//! Time gated `take_for` and `skip_for`.
//!
//! Both start their timer when subscribed, before subscribing the source, so
//! a value the source emits at the very gate time was scheduled earlier and
//! still counts as "before" the gate.

use std::{
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  time::Duration,
};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::{Scheduler, Task, TaskHandle, TaskState},
  subscriber::Subscriber,
};

/// Mirrors the source for `duration` after subscription, then completes.
#[derive(Clone)]
pub struct TakeForOp<S, SD> {
  source: S,
  duration: Duration,
  scheduler: SD,
}

impl<S, SD> TakeForOp<S, SD> {
  #[inline]
  pub(crate) fn new(source: S, duration: Duration, scheduler: SD) -> Self {
    TakeForOp { source, duration, scheduler }
  }
}

fn complete_downstream<O, Item, Err>(observer: &mut Subscriber<O, Err>) -> TaskState
where
  O: Observer<Item, Err>,
{
  Observer::<Item, Err>::complete(observer.clone());
  TaskState::Finished
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for TakeForOp<S, SD>
where
  O: Observer<Item, Err> + 'static,
  S: Observable<Item, Err, Subscriber<O, Err>>,
  S::Unsub: 'static,
  SD: Scheduler,
  Err: 'static,
{
  type Unsub = Subscriber<O, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscriber = Subscriber::new(observer);
    let timer = self
      .scheduler
      .schedule(Task::new(subscriber.clone(), complete_downstream::<O, Item, Err>), Some(self.duration));
    let upstream = self.source.actual_subscribe(subscriber.clone());
    subscriber.set_upstream((timer, upstream));
    subscriber
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for TakeForOp<S, SD>
where
  S: ObservableExt<Item, Err>,
  SD: Scheduler,
{
}

/// Drops the values the source emits during the first `duration` after
/// subscription.
#[derive(Clone)]
pub struct SkipForOp<S, SD> {
  source: S,
  duration: Duration,
  scheduler: SD,
}

impl<S, SD> SkipForOp<S, SD> {
  #[inline]
  pub(crate) fn new(source: S, duration: Duration, scheduler: SD) -> Self {
    SkipForOp { source, duration, scheduler }
  }
}

fn open_gate(gate: &mut Arc<AtomicBool>) -> TaskState {
  gate.store(true, Ordering::Release);
  TaskState::Finished
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for SkipForOp<S, SD>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, SkipForObserver<O>>,
  SD: Scheduler,
{
  type Unsub = (Option<TaskHandle>, S::Unsub);

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let gate = Arc::new(AtomicBool::new(self.duration.is_zero()));
    let timer = (!self.duration.is_zero())
      .then(|| self.scheduler.schedule(Task::new(gate.clone(), open_gate), Some(self.duration)));
    let upstream = self.source.actual_subscribe(SkipForObserver { observer, open: gate });
    (timer, upstream)
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for SkipForOp<S, SD>
where
  S: ObservableExt<Item, Err>,
  SD: Scheduler,
{
}

pub struct SkipForObserver<O> {
  observer: O,
  open: Arc<AtomicBool>,
}

impl<Item, Err, O> Observer<Item, Err> for SkipForObserver<O>
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
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use crate::prelude::*;

  #[test]
  fn take_for_completes_at_deadline() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_next(230, 3),
      on_completed(300),
    ]);
    let (c_xs, c_scheduler) = (xs.clone(), scheduler.clone());
    let res = scheduler.start_with(move || c_xs.take_for(TestScheduler::ticks(25), c_scheduler));
    assert_eq!(res.messages(), vec![on_next(210, 1), on_next(220, 2), on_completed(225)]);
    assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 225)]);
  }

  #[test]
  fn take_for_source_ends_first() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![on_next(210, 1), on_error(220, RxError::Timeout)]);
    let c_scheduler = scheduler.clone();
    let res = scheduler.start_with(move || xs.take_for(TestScheduler::ticks(50), c_scheduler));
    assert_eq!(res.messages(), vec![on_next(210, 1), on_error(220, RxError::Timeout)]);
  }

  #[test]
  fn take_for_releases_source_inside_merge() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(260, 2),
      on_completed(500),
    ]);
    let ys = scheduler.create_hot_observable::<i32, RxError>(vec![on_completed(400)]);
    let (c_xs, c_scheduler) = (xs.clone(), scheduler.clone());
    let res = scheduler.start_with(move || c_xs.take_for(TestScheduler::ticks(50), c_scheduler).merge(ys));
    assert_eq!(res.messages(), vec![on_next(210, 1), on_completed(400)]);
    assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 250)]);
  }

  #[test]
  fn skip_for_opens_gate() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_next(230, 3),
      on_completed(240),
    ]);
    let c_scheduler = scheduler.clone();
    let res = scheduler.start_with(move || xs.skip_for(TestScheduler::ticks(15), c_scheduler));
    assert_eq!(res.messages(), vec![on_next(220, 2), on_next(230, 3), on_completed(240)]);
  }

  #[test]
  fn skip_for_zero_passes_through() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![on_next(210, 1), on_completed(220)]);
    let c_scheduler = scheduler.clone();
    let res = scheduler.start_with(move || xs.skip_for(Duration::ZERO, c_scheduler));
    assert_eq!(res.messages(), vec![on_next(210, 1), on_completed(220)]);
  }
}
