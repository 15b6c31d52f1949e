use std::time::Duration;

use super::{Observable, ObservableExt, TypeHint};
use crate::{
  observer::Observer,
  scheduler::{Scheduler, Task, TaskHandle, TaskState},
};

#[derive(Clone, Copy)]
enum Due {
  After(Duration),
  At(Duration),
}

/// Emits `value` once `delay` elapsed on `scheduler`, then completes.
pub fn timer<Item, Err, SD>(value: Item, delay: Duration, scheduler: SD) -> TimerObservable<Item, Err, SD> {
  TimerObservable { value, due: Due::After(delay), scheduler, _hint: TypeHint::default() }
}

/// Emits `value` when the clock of `scheduler` reaches `at`, then completes.
/// A time already passed fires as soon as possible.
pub fn timer_at<Item, Err, SD>(value: Item, at: Duration, scheduler: SD) -> TimerObservable<Item, Err, SD> {
  TimerObservable { value, due: Due::At(at), scheduler, _hint: TypeHint::default() }
}

pub struct TimerObservable<Item, Err, SD> {
  value: Item,
  due: Due,
  scheduler: SD,
  _hint: TypeHint<Item, Err>,
}

impl<Item: Clone, Err, SD: Clone> Clone for TimerObservable<Item, Err, SD> {
  fn clone(&self) -> Self {
    TimerObservable {
      value: self.value.clone(),
      due: self.due,
      scheduler: self.scheduler.clone(),
      _hint: TypeHint::default(),
    }
  }
}

fn fire<O, Item, Err>(state: &mut Option<(O, Item)>) -> TaskState
where
  O: Observer<Item, Err>,
{
  if let Some((mut observer, value)) = state.take() {
    observer.next(value);
    observer.complete();
  }
  TaskState::Finished
}

impl<Item, Err, SD, O> Observable<Item, Err, O> for TimerObservable<Item, Err, SD>
where
  O: Observer<Item, Err> + 'static,
  SD: Scheduler,
  Item: 'static,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let task = Task::new(Some((observer, self.value)), fire::<O, Item, Err>);
    match self.due {
      Due::After(delay) => self.scheduler.schedule(task, Some(delay)),
      Due::At(at) => self.scheduler.schedule_at(task, at),
    }
  }
}

impl<Item, Err, SD> ObservableExt<Item, Err> for TimerObservable<Item, Err, SD> {}
