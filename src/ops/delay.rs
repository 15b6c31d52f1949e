use std::time::Duration;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::{Scheduler, Task, TaskState},
  subscriber::Subscriber,
  subscription::{CompositeSubscription, Subscription},
};

/// Shifts every value, and the completion, `delay` later on `scheduler`.
/// Errors are forwarded at once and cancel the values still in flight.
#[derive(Clone)]
pub struct DelayOp<S, SD> {
  source: S,
  delay: Duration,
  scheduler: SD,
}

impl<S, SD> DelayOp<S, SD> {
  #[inline]
  pub(crate) fn new(source: S, delay: Duration, scheduler: SD) -> Self { DelayOp { source, delay, scheduler } }
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for DelayOp<S, SD>
where
  O: Observer<Item, Err> + 'static,
  S: Observable<Item, Err, DelayObserver<O, SD, Err>>,
  SD: Scheduler,
  Item: 'static,
  Err: 'static,
{
  type Unsub = (CompositeSubscription, S::Unsub);

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let in_flight = CompositeSubscription::default();
    let observer = DelayObserver {
      observer: Subscriber::new(observer),
      delay: self.delay,
      scheduler: self.scheduler,
      in_flight: in_flight.clone(),
    };
    let unsub = self.source.actual_subscribe(observer);
    (in_flight, unsub)
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for DelayOp<S, SD>
where
  S: ObservableExt<Item, Err>,
  SD: Scheduler,
{
}

pub struct DelayObserver<O, SD, Err> {
  observer: Subscriber<O, Err>,
  delay: Duration,
  scheduler: SD,
  in_flight: CompositeSubscription,
}

fn delayed_next<O, Item, Err>((observer, value): &mut (Subscriber<O, Err>, Option<Item>)) -> TaskState
where
  O: Observer<Item, Err>,
{
  if let Some(value) = value.take() {
    Observer::<Item, Err>::next(observer, value);
  }
  TaskState::Finished
}

fn delayed_complete<O, Item, Err>(observer: &mut Subscriber<O, Err>) -> TaskState
where
  O: Observer<Item, Err>,
{
  Observer::<Item, Err>::complete(observer.clone());
  TaskState::Finished
}

impl<O, SD: Scheduler, Err> DelayObserver<O, SD, Err> {
  fn defer<T: 'static>(&self, task: Task<T>) {
    self.in_flight.prune();
    self.in_flight.add(self.scheduler.schedule(task, Some(self.delay)));
  }
}

impl<Item, Err, O, SD> Observer<Item, Err> for DelayObserver<O, SD, Err>
where
  O: Observer<Item, Err> + 'static,
  SD: Scheduler,
  Item: 'static,
  Err: 'static,
{
  fn next(&mut self, value: Item) {
    self.defer(Task::new((self.observer.clone(), Some(value)), delayed_next::<O, Item, Err>));
  }

  fn error(self, err: Err) {
    self.in_flight.unsubscribe();
    self.observer.error(err)
  }

  fn complete(self) { self.defer(Task::new(self.observer.clone(), delayed_complete::<O, Item, Err>)); }

  #[inline]
  fn is_closed(&self) -> bool { Observer::<Item, Err>::is_closed(&self.observer) }
}
