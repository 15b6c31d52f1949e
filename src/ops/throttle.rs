use std::time::Duration;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::{MutArc, RcDerefMut},
  scheduler::{Scheduler, Task, TaskState},
  subscriber::Subscriber,
  subscription::SerialSubscription,
};

/// Emits a value only after `duration` passed without another value.
///
/// Each value restarts the silence timer and replaces the held one, so a
/// burst of values spaced closer than `duration` yields its last value once,
/// `duration` after the burst ended. Completion flushes the held value
/// first; an error drops it.
#[derive(Clone)]
pub struct ThrottleOp<S, SD> {
  source: S,
  duration: Duration,
  scheduler: SD,
}

impl<S, SD> ThrottleOp<S, SD> {
  #[inline]
  pub(crate) fn new(source: S, duration: Duration, scheduler: SD) -> Self {
    ThrottleOp { source, duration, scheduler }
  }
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for ThrottleOp<S, SD>
where
  O: Observer<Item, Err> + 'static,
  S: Observable<Item, Err, ThrottleObserver<O, SD, Item, Err>>,
  SD: Scheduler,
  Item: 'static,
  Err: 'static,
{
  type Unsub = (SerialSubscription, S::Unsub);

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let timer = SerialSubscription::default();
    let observer = ThrottleObserver {
      observer: Subscriber::new(observer),
      scheduler: self.scheduler,
      duration: self.duration,
      held: MutArc::own(None),
      timer: timer.clone(),
    };
    let unsub = self.source.actual_subscribe(observer);
    (timer, unsub)
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for ThrottleOp<S, SD>
where
  S: ObservableExt<Item, Err>,
  SD: Scheduler,
{
}

pub struct ThrottleObserver<O, SD, Item, Err> {
  observer: Subscriber<O, Err>,
  scheduler: SD,
  duration: Duration,
  held: MutArc<Option<Item>>,
  timer: SerialSubscription,
}

fn emit_held<O, Item, Err>((observer, held): &mut (Subscriber<O, Err>, MutArc<Option<Item>>)) -> TaskState
where
  O: Observer<Item, Err>,
{
  let value = held.rc_deref_mut().take();
  if let Some(value) = value {
    Observer::<Item, Err>::next(observer, value);
  }
  TaskState::Finished
}

impl<Item, Err, O, SD> Observer<Item, Err> for ThrottleObserver<O, SD, Item, Err>
where
  O: Observer<Item, Err> + 'static,
  SD: Scheduler,
  Item: 'static,
  Err: 'static,
{
  fn next(&mut self, value: Item) {
    *self.held.rc_deref_mut() = Some(value);
    let task = Task::new((self.observer.clone(), self.held.clone()), emit_held::<O, Item, Err>);
    self.timer.assign(self.scheduler.schedule(task, Some(self.duration)));
  }

  fn error(self, err: Err) {
    self.timer.clear();
    self.held.rc_deref_mut().take();
    self.observer.error(err)
  }

  fn complete(mut self) {
    self.timer.clear();
    let value = self.held.rc_deref_mut().take();
    if let Some(value) = value {
      self.observer.next(value);
    }
    self.observer.complete()
  }

  #[inline]
  fn is_closed(&self) -> bool { Observer::<Item, Err>::is_closed(&self.observer) }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[test]
  fn emits_last_value_of_each_burst() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(150, 0),
      on_next(210, 1),
      on_next(215, 2),
      on_next(220, 3),
      on_next(300, 4),
      on_next(305, 5),
      on_next(400, 6),
      on_completed(500),
    ]);
    let c_scheduler = scheduler.clone();
    let res = scheduler.start_with(move || xs.throttle(TestScheduler::ticks(20), c_scheduler));
    assert_eq!(
      res.messages(),
      vec![on_next(240, 3), on_next(325, 5), on_next(420, 6), on_completed(500)]
    );
  }

  #[test]
  fn completion_flushes_held_value() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_completed(230),
    ]);
    let c_scheduler = scheduler.clone();
    let res = scheduler.start_with(move || xs.throttle(TestScheduler::ticks(20), c_scheduler));
    assert_eq!(res.messages(), vec![on_next(230, 2), on_completed(230)]);
  }

  #[test]
  fn error_drops_held_value() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_next(230, 3),
      on_next(240, 4),
      on_next(250, 5),
      on_error(260, RxError::Timeout),
    ]);
    let c_scheduler = scheduler.clone();
    let res = scheduler.start_with(move || xs.throttle(TestScheduler::ticks(40), c_scheduler));
    assert_eq!(res.messages(), vec![on_error(260, RxError::Timeout)]);
  }

  #[test]
  fn dispose_cancels_pending_timer() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![on_next(210, 1), on_completed(400)]);
    let c_scheduler = scheduler.clone();
    let res = scheduler.start_with_dispose(move || xs.throttle(TestScheduler::ticks(50), c_scheduler), 230);
    assert!(res.messages().is_empty());
  }
}
