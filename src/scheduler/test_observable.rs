//! Scripted sources for virtual time tests.
//!
//! Both record every subscription as a [`SubscriptionLog`] window so a test
//! can assert exactly when an operator held its upstream.

use std::rc::Rc;

use tracing::trace;

use super::test_scheduler::TestScheduler;
use crate::{
  notification::{Notification, Recorded, SubscriptionLog},
  observable::{Observable, ObservableExt},
  observer::{BoxObserver, Observer},
  rc::{MutRc, RcDeref, RcDerefMut},
  subscriber::Subscriber,
  subscription::{CompositeSubscription, Subscription},
};

struct HotState<Item, Err> {
  next_id: usize,
  observers: Vec<(usize, Subscriber<BoxObserver<Item, Err>, Err>)>,
  logs: Vec<SubscriptionLog>,
}

/// Emits its messages on an absolute timeline, whoever is listening.
pub struct HotObservable<Item, Err> {
  scheduler: TestScheduler,
  state: MutRc<HotState<Item, Err>>,
}

impl<Item, Err> Clone for HotObservable<Item, Err> {
  fn clone(&self) -> Self { HotObservable { scheduler: self.scheduler.clone(), state: self.state.clone() } }
}

impl<Item, Err> HotObservable<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  pub(crate) fn new(scheduler: TestScheduler, messages: Vec<Recorded<Notification<Item, Err>>>) -> Self {
    let state = MutRc::own(HotState { next_id: 0, observers: vec![], logs: vec![] });
    for Recorded { time, value } in messages {
      let c_state = state.clone();
      scheduler.schedule_absolute(time, move || {
        let targets: Vec<_> = c_state.rc_deref().observers.iter().map(|(_, s)| s.clone()).collect();
        for target in targets {
          value.clone().accept(&mut Some(target));
        }
      });
    }
    HotObservable { scheduler, state }
  }
}

impl<Item, Err> HotObservable<Item, Err> {
  /// Subscription windows in subscribe order.
  pub fn subscriptions(&self) -> Vec<SubscriptionLog> { self.state.rc_deref().logs.clone() }
}

impl<Item, Err, O> Observable<Item, Err, O> for HotObservable<Item, Err>
where
  O: Observer<Item, Err> + 'static,
  Item: 'static,
  Err: 'static,
{
  type Unsub = Subscriber<BoxObserver<Item, Err>, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscriber = Subscriber::new(Box::new(observer) as BoxObserver<Item, Err>);
    let now = self.scheduler.clock();
    let (id, log_index) = {
      let mut state = self.state.rc_deref_mut();
      state.logs.push(SubscriptionLog::open(now));
      let id = state.next_id;
      state.next_id += 1;
      state.observers.push((id, subscriber.clone()));
      (id, state.logs.len() - 1)
    };
    trace!(time = now, "hot observable subscribed");
    subscriber.set_upstream(HotDetach { scheduler: self.scheduler, state: self.state, id, log_index });
    subscriber
  }
}

impl<Item, Err> ObservableExt<Item, Err> for HotObservable<Item, Err> {}

/// Detaches one observer and closes its window, run by the observer's guard
/// on its terminal or on unsubscribe.
struct HotDetach<Item, Err> {
  scheduler: TestScheduler,
  state: MutRc<HotState<Item, Err>>,
  id: usize,
  log_index: usize,
}

impl<Item, Err> Subscription for HotDetach<Item, Err> {
  fn unsubscribe(self) {
    let now = self.scheduler.clock();
    let mut state = self.state.rc_deref_mut();
    if let Some(pos) = state.observers.iter().position(|(id, _)| *id == self.id) {
      state.observers.remove(pos);
      state.logs[self.log_index].unsubscribe = now;
      trace!(time = now, "hot observable unsubscribed");
    }
  }

  fn is_closed(&self) -> bool { false }
}

/// Replays its messages relative to each subscriber's own subscribe time.
pub struct ColdObservable<Item, Err> {
  scheduler: TestScheduler,
  messages: Rc<Vec<Recorded<Notification<Item, Err>>>>,
  logs: MutRc<Vec<SubscriptionLog>>,
}

impl<Item, Err> Clone for ColdObservable<Item, Err> {
  fn clone(&self) -> Self {
    ColdObservable {
      scheduler: self.scheduler.clone(),
      messages: self.messages.clone(),
      logs: self.logs.clone(),
    }
  }
}

impl<Item, Err> ColdObservable<Item, Err> {
  pub(crate) fn new(scheduler: TestScheduler, messages: Vec<Recorded<Notification<Item, Err>>>) -> Self {
    ColdObservable { scheduler, messages: Rc::new(messages), logs: MutRc::default() }
  }

  /// Subscription windows in subscribe order.
  pub fn subscriptions(&self) -> Vec<SubscriptionLog> { self.logs.rc_deref().clone() }
}

impl<Item, Err, O> Observable<Item, Err, O> for ColdObservable<Item, Err>
where
  O: Observer<Item, Err> + 'static,
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type Unsub = Subscriber<O, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscriber = Subscriber::new(observer);
    let now = self.scheduler.clock();
    let log_index = {
      let mut logs = self.logs.rc_deref_mut();
      logs.push(SubscriptionLog::open(now));
      logs.len() - 1
    };
    trace!(time = now, "cold observable subscribed");

    let tasks = CompositeSubscription::default();
    for Recorded { time, value } in self.messages.iter().cloned() {
      let target = subscriber.clone();
      tasks.add(self.scheduler.schedule_relative(time, move || value.accept(&mut Some(target))));
    }
    subscriber.set_upstream(ColdDetach { scheduler: self.scheduler, logs: self.logs, log_index, tasks });
    subscriber
  }
}

impl<Item, Err> ObservableExt<Item, Err> for ColdObservable<Item, Err> {}

/// Cancels the pending messages of one subscription and closes its window.
struct ColdDetach {
  scheduler: TestScheduler,
  logs: MutRc<Vec<SubscriptionLog>>,
  log_index: usize,
  tasks: CompositeSubscription,
}

impl Subscription for ColdDetach {
  fn unsubscribe(self) {
    let now = self.scheduler.clock();
    let closed = {
      let mut logs = self.logs.rc_deref_mut();
      let log = &mut logs[self.log_index];
      let open = log.is_open();
      if open {
        log.unsubscribe = now;
      }
      open
    };
    if closed {
      trace!(time = now, "cold observable unsubscribed");
    }
    self.tasks.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.tasks.is_closed() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    error::RxError,
    scheduler::test_scheduler::{on_completed, on_error, on_next},
  };

  #[test]
  fn two_views_of_one_hot_timeline() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(250, 2),
      on_completed(300),
    ]);
    let (a, b) = (scheduler.create_observer(), scheduler.create_observer());
    let (c_xs, c_a) = (xs.clone(), a.clone());
    scheduler.schedule_absolute(200, move || {
      c_xs.subscribe_with(c_a);
    });
    let (c_xs, c_b) = (xs.clone(), b.clone());
    scheduler.schedule_absolute(220, move || {
      c_xs.subscribe_with(c_b);
    });
    scheduler.start();

    assert_eq!(a.messages(), vec![on_next(210, 1), on_next(250, 2), on_completed(300)]);
    assert_eq!(b.messages(), vec![on_next(250, 2), on_completed(300)]);
    assert_eq!(
      xs.subscriptions(),
      vec![SubscriptionLog::new(200, 300), SubscriptionLog::new(220, 300)]
    );
  }

  #[test]
  fn cold_error_ends_window() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_cold_observable(vec![
      on_next(10, 1),
      on_error(20, RxError::Timeout),
      on_next(30, 2),
    ]);
    let c_xs = xs.clone();
    let res = scheduler.start_with(move || c_xs);
    assert_eq!(res.messages(), vec![on_next(210, 1), on_error(220, RxError::Timeout)]);
    assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 220)]);
    assert_eq!(scheduler.pending_count(), 0);
  }

  #[test]
  fn cold_zero_offset_runs_one_tick_after_subscribe() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(0, 1), on_completed(0)]);
    let res = scheduler.start_with(move || xs);
    assert_eq!(res.messages(), vec![on_next(201, 1), on_completed(201)]);
  }
}
