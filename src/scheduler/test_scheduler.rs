//! Virtual time scheduler for deterministic testing of time-based operators.
//!
//! Virtual time is an integer tick count that only moves when a scheduled
//! action runs (or when explicitly told to). Actions run one at a time, in
//! due-time order, ties broken by scheduling order. An action scheduled at or
//! before the current clock runs one tick later, so even "immediate" work is
//! visible on the timeline.
//!
//! The usual test protocol creates the observable under test at
//! [`CREATED`], subscribes at [`SUBSCRIBED`] and disposes at [`DISPOSED`]:
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let scheduler = TestScheduler::new();
//! let xs = scheduler.create_cold_observable::<i32, RxError>(vec![
//!   on_next(10, 1),
//!   on_next(20, 2),
//!   on_completed(30),
//! ]);
//! let c_xs = xs.clone();
//! let res = scheduler.start_with(move || c_xs);
//! assert_eq!(res.messages(), vec![on_next(210, 1), on_next(220, 2), on_completed(230)]);
//! assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 230)]);
//! ```

use std::{cmp::Ordering, collections::BinaryHeap, time::Duration};

use tracing::{debug, trace};

use super::{
  test_observable::{ColdObservable, HotObservable},
  test_observer::TestObserver,
  Scheduler, Task, TaskHandle, TaskState,
};
use crate::{
  notification::{Notification, Recorded},
  observable::{Observable, ObservableExt},
  rc::{MutRc, RcDeref, RcDerefMut},
  subscriber::Subscriber,
  subscription::Subscription,
};

/// Virtual time at which `start_with` creates the observable under test.
pub const CREATED: u64 = 100;
/// Virtual time at which `start_with` subscribes.
pub const SUBSCRIBED: u64 = 200;
/// Virtual time at which `start_with` disposes the subscription.
pub const DISPOSED: u64 = 1000;

const NANOS_PER_TICK: u64 = 100;

/// Builds a recorded `next` notification.
pub fn on_next<Item, Err>(time: u64, value: Item) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Next(value))
}

/// Builds a recorded `error` notification.
pub fn on_error<Item, Err>(time: u64, err: Err) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Error(err))
}

/// Builds a recorded `complete` notification.
pub fn on_completed<Item, Err>(time: u64) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Completed)
}

struct ScheduledTask {
  due: u64,
  seq: u64,
  task: Box<dyn FnMut() -> TaskState>,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by seq
    other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
  }
}

#[derive(Default)]
struct State {
  clock: u64,
  next_seq: u64,
  queue: BinaryHeap<ScheduledTask>,
}

enum Head {
  Cancelled,
  Due,
  Idle,
}

/// A deterministic, single threaded virtual time scheduler.
///
/// Clones share the same clock and queue.
#[derive(Clone, Default)]
pub struct TestScheduler(MutRc<State>);

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// Converts a tick count to the `Duration` operators are configured with.
  pub const fn ticks(n: u64) -> Duration { Duration::from_nanos(n * NANOS_PER_TICK) }

  /// Converts a `Duration` back to ticks, rounding down.
  pub fn to_ticks(d: Duration) -> u64 { (d.as_nanos() / NANOS_PER_TICK as u128) as u64 }

  /// Current virtual time in ticks.
  pub fn clock(&self) -> u64 { self.0.rc_deref().clock }

  /// Number of scheduled actions that are neither run nor cancelled.
  pub fn pending_count(&self) -> usize {
    self.0.rc_deref().queue.iter().filter(|t| !t.handle.is_closed()).count()
  }

  fn enqueue(&self, due: u64, task: Box<dyn FnMut() -> TaskState>, handle: TaskHandle) {
    let mut state = self.0.rc_deref_mut();
    let due = if due <= state.clock { state.clock + 1 } else { due };
    let seq = state.next_seq;
    state.next_seq += 1;
    state.queue.push(ScheduledTask { due, seq, task, handle });
  }

  fn schedule_task<S: 'static>(&self, due: u64, mut task: Task<S>) -> TaskHandle {
    let handle = TaskHandle::new();
    self.enqueue(due, Box::new(move || task.step()), handle.clone());
    handle
  }

  /// Schedules `action` at absolute virtual time `time`.
  pub fn schedule_absolute(&self, time: u64, action: impl FnOnce() + 'static) -> TaskHandle {
    self.schedule_task(time, Task::new(Some(action), run_once))
  }

  /// Schedules `action` `delay` ticks from now.
  pub fn schedule_relative(&self, delay: u64, action: impl FnOnce() + 'static) -> TaskHandle {
    self.schedule_absolute(self.clock().saturating_add(delay), action)
  }

  fn pop_due(&self, limit: Option<u64>) -> Option<ScheduledTask> {
    let mut state = self.0.rc_deref_mut();
    loop {
      let head = match state.queue.peek() {
        Some(t) if t.handle.is_closed() => Head::Cancelled,
        Some(t) if limit.map_or(true, |limit| t.due <= limit) => Head::Due,
        _ => Head::Idle,
      };
      match head {
        Head::Cancelled => {
          state.queue.pop();
        }
        Head::Due => {
          let task = state.queue.pop()?;
          if task.due > state.clock {
            state.clock = task.due;
          }
          return Some(task);
        }
        Head::Idle => return None,
      }
    }
  }

  fn run_until(&self, limit: Option<u64>) {
    while let Some(mut scheduled) = self.pop_due(limit) {
      trace!(time = scheduled.due, seq = scheduled.seq, "run scheduled action");
      // A panic here unwinds out of `start`, leaving the clock at this action.
      match (scheduled.task)() {
        TaskState::Finished => scheduled.handle.mark_finished(),
        TaskState::Yield => self.requeue(scheduled, 0),
        TaskState::Sleeping(d) => self.requeue(scheduled, Self::to_ticks(d)),
      }
    }
  }

  fn requeue(&self, scheduled: ScheduledTask, delay: u64) {
    if scheduled.handle.is_cancelled() {
      scheduled.handle.mark_finished();
      return;
    }
    let due = self.clock().saturating_add(delay);
    self.enqueue(due, scheduled.task, scheduled.handle);
  }

  /// Runs every pending action, including the ones scheduled while running.
  pub fn start(&self) {
    debug!(clock = self.clock(), "test scheduler start");
    self.run_until(None);
    debug!(clock = self.clock(), "test scheduler idle");
  }

  /// Runs the actions due up to `time`, then moves the clock to `time`.
  pub fn advance_to(&self, time: u64) {
    self.run_until(Some(time));
    let mut state = self.0.rc_deref_mut();
    if time > state.clock {
      state.clock = time;
    }
  }

  pub fn advance_by(&self, ticks: u64) { self.advance_to(self.clock().saturating_add(ticks)) }

  /// Moves the clock forward without running anything.
  pub fn sleep(&self, ticks: u64) {
    let mut state = self.0.rc_deref_mut();
    state.clock = state.clock.saturating_add(ticks);
  }

  /// A hot source emitting `messages` at their absolute times.
  pub fn create_hot_observable<Item, Err>(
    &self, messages: Vec<Recorded<Notification<Item, Err>>>,
  ) -> HotObservable<Item, Err>
  where
    Item: Clone + 'static,
    Err: Clone + 'static,
  {
    HotObservable::new(self.clone(), messages)
  }

  /// A cold source replaying `messages` relative to each subscribe time.
  pub fn create_cold_observable<Item, Err>(
    &self, messages: Vec<Recorded<Notification<Item, Err>>>,
  ) -> ColdObservable<Item, Err> {
    ColdObservable::new(self.clone(), messages)
  }

  /// An observer recording what it receives against this clock.
  pub fn create_observer<Item, Err>(&self) -> TestObserver<Item, Err> {
    TestObserver::new(self.clone())
  }

  /// Runs the standard protocol: create at [`CREATED`], subscribe at
  /// [`SUBSCRIBED`], dispose at [`DISPOSED`].
  pub fn start_with<Item, Err, S, F>(&self, create: F) -> TestObserver<Item, Err>
  where
    F: FnOnce() -> S + 'static,
    S: ObservableExt<Item, Err> + Observable<Item, Err, Subscriber<TestObserver<Item, Err>, Err>> + 'static,
    S::Unsub: 'static,
    Item: 'static,
    Err: 'static,
  {
    self.start_with_timing(create, CREATED, SUBSCRIBED, DISPOSED)
  }

  /// Like [`TestScheduler::start_with`] with an earlier disposal time.
  pub fn start_with_dispose<Item, Err, S, F>(&self, create: F, disposed: u64) -> TestObserver<Item, Err>
  where
    F: FnOnce() -> S + 'static,
    S: ObservableExt<Item, Err> + Observable<Item, Err, Subscriber<TestObserver<Item, Err>, Err>> + 'static,
    S::Unsub: 'static,
    Item: 'static,
    Err: 'static,
  {
    self.start_with_timing(create, CREATED, SUBSCRIBED, disposed)
  }

  /// Creates the observable at `created`, subscribes a recording observer at
  /// `subscribed`, disposes that subscription at `disposed`, and runs the
  /// scheduler until nothing is pending.
  pub fn start_with_timing<Item, Err, S, F>(
    &self, create: F, created: u64, subscribed: u64, disposed: u64,
  ) -> TestObserver<Item, Err>
  where
    F: FnOnce() -> S + 'static,
    S: ObservableExt<Item, Err> + Observable<Item, Err, Subscriber<TestObserver<Item, Err>, Err>> + 'static,
    S::Unsub: 'static,
    Item: 'static,
    Err: 'static,
  {
    let observer = self.create_observer();
    let source = MutRc::own(None);
    let subscription = MutRc::own(None);

    let c_source = source.clone();
    self.schedule_absolute(created, move || {
      *c_source.rc_deref_mut() = Some(create());
    });

    let (c_source, c_subscription, c_observer) = (source, subscription.clone(), observer.clone());
    self.schedule_absolute(subscribed, move || {
      let source = c_source.rc_deref_mut().take();
      if let Some(source) = source {
        let handle = source.subscribe_with(c_observer);
        *c_subscription.rc_deref_mut() = Some(handle);
      }
    });

    self.schedule_absolute(disposed, move || {
      let handle = subscription.rc_deref_mut().take();
      if let Some(handle) = handle {
        handle.unsubscribe();
      }
    });

    self.start();
    observer
  }
}

fn run_once<F: FnOnce()>(action: &mut Option<F>) -> TaskState {
  if let Some(action) = action.take() {
    action();
  }
  TaskState::Finished
}

impl Scheduler for TestScheduler {
  fn now(&self) -> Duration { Self::ticks(self.clock()) }

  fn schedule<S: 'static>(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    let delay = delay.map_or(0, Self::to_ticks);
    self.schedule_task(self.clock().saturating_add(delay), task)
  }

  fn schedule_at<S: 'static>(&self, task: Task<S>, due: Duration) -> TaskHandle {
    self.schedule_task(Self::to_ticks(due), task)
  }
}
