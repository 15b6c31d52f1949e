use std::time::Duration;

use super::{Observable, ObservableExt, TypeHint};
use crate::{
  observer::Observer,
  scheduler::{Scheduler, Task, TaskHandle, TaskState},
};

/// Emits `0, 1, 2, ...`, one value every `period`, the first one `period`
/// after subscription. Never completes on its own.
///
/// Each period is measured from when the previous value was actually
/// emitted, so an overloaded scheduler delays later values rather than
/// dropping them.
pub fn interval<Err, SD>(period: Duration, scheduler: SD) -> IntervalObservable<Err, SD> {
  IntervalObservable { period, scheduler, _hint: TypeHint::default() }
}

pub struct IntervalObservable<Err, SD> {
  period: Duration,
  scheduler: SD,
  _hint: TypeHint<usize, Err>,
}

impl<Err, SD: Clone> Clone for IntervalObservable<Err, SD> {
  fn clone(&self) -> Self {
    IntervalObservable { period: self.period, scheduler: self.scheduler.clone(), _hint: TypeHint::default() }
  }
}

struct Ticker<O> {
  observer: O,
  count: usize,
  period: Duration,
}

fn tick<O, Err>(ticker: &mut Ticker<O>) -> TaskState
where
  O: Observer<usize, Err>,
{
  if ticker.observer.is_closed() {
    return TaskState::Finished;
  }
  ticker.observer.next(ticker.count);
  ticker.count += 1;
  TaskState::Sleeping(ticker.period)
}

impl<Err, SD, O> Observable<usize, Err, O> for IntervalObservable<Err, SD>
where
  O: Observer<usize, Err> + 'static,
  SD: Scheduler,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let ticker = Ticker { observer, count: 0, period: self.period };
    self.scheduler.schedule(Task::new(ticker, tick::<O, Err>), Some(self.period))
  }
}

impl<Err, SD> ObservableExt<usize, Err> for IntervalObservable<Err, SD> {}
