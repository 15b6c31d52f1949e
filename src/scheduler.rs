//! Scheduling abstraction.
//!
//! A [`Scheduler`] runs [`Task`]s now, after a delay, or at an absolute point
//! on its own clock, and hands back a [`TaskHandle`] that cancels the task if
//! it has not run yet. A task is a small state machine: every step reports a
//! [`TaskState`], which is how recursive and periodic work is expressed
//! without the task re-entering the scheduler itself.
//!
//! Concrete schedulers:
//! - [`TestScheduler`]: deterministic virtual time, used to verify timing.
//! - [`CurrentThreadScheduler`]: a trampoline on the calling thread.
//! - `LocalSpawner` from `futures` behind the `futures-scheduler` feature.

use std::{
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  time::{Duration, Instant},
};

use once_cell::sync::Lazy;

use crate::subscription::Subscription;

mod current_thread;
#[cfg(feature = "futures-scheduler")]
mod futures_scheduler;
pub mod test_observable;
pub mod test_observer;
pub mod test_scheduler;

pub use current_thread::CurrentThreadScheduler;
pub use test_observable::{ColdObservable, HotObservable};
pub use test_observer::TestObserver;
pub use test_scheduler::TestScheduler;

/// What a task wants after one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
  /// Done, drop the task.
  Finished,
  /// Run again as soon as the scheduler gets to it.
  Yield,
  /// Run again after the given delay, measured from when this step ran.
  Sleeping(Duration),
}

/// A unit of scheduled work: some state and a function stepping it.
pub struct Task<S> {
  state: S,
  handler: fn(&mut S) -> TaskState,
}

impl<S> Task<S> {
  pub fn new(state: S, handler: fn(&mut S) -> TaskState) -> Self { Task { state, handler } }

  #[inline]
  pub fn step(&mut self) -> TaskState { (self.handler)(&mut self.state) }
}

#[derive(Default)]
struct HandleState {
  cancelled: AtomicBool,
  finished: AtomicBool,
}

/// Cancellation handle of a scheduled task.
#[derive(Clone, Default)]
pub struct TaskHandle(Arc<HandleState>);

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  /// A handle for work that already ran.
  pub fn finished() -> Self {
    let handle = Self::default();
    handle.mark_finished();
    handle
  }

  pub fn mark_finished(&self) { self.0.finished.store(true, Ordering::Release); }

  pub fn is_cancelled(&self) -> bool { self.0.cancelled.load(Ordering::Acquire) }

  pub fn is_finished(&self) -> bool { self.0.finished.load(Ordering::Acquire) }
}

impl Subscription for TaskHandle {
  #[inline]
  fn unsubscribe(self) { self.0.cancelled.store(true, Ordering::Release); }

  #[inline]
  fn is_closed(&self) -> bool { self.is_cancelled() || self.is_finished() }
}

struct Periodic<S> {
  state: S,
  period: Duration,
  action: fn(&mut S),
}

fn periodic_step<S>(p: &mut Periodic<S>) -> TaskState {
  (p.action)(&mut p.state);
  TaskState::Sleeping(p.period)
}

/// A Scheduler orders tasks and runs them on its clock.
pub trait Scheduler: Clone + 'static {
  /// Current time of this scheduler, measured from its own epoch.
  fn now(&self) -> Duration;

  /// Runs `task` after `delay`, or as soon as possible when `delay` is `None`.
  fn schedule<S: 'static>(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle;

  /// Runs `task` when the clock reaches `due`. A due time in the past runs as
  /// soon as possible.
  fn schedule_at<S: 'static>(&self, task: Task<S>, due: Duration) -> TaskHandle {
    let delay = due.saturating_sub(self.now());
    self.schedule(task, Some(delay))
  }

  /// Calls `action` every `period`, first one `period` from now, until the
  /// returned handle is unsubscribed. Each period is measured from when the
  /// previous call actually ran, so a busy scheduler drifts rather than
  /// skipping calls.
  fn schedule_periodic<S: 'static>(
    &self, state: S, period: Duration, action: fn(&mut S),
  ) -> TaskHandle {
    self.schedule(Task::new(Periodic { state, period, action }, periodic_step), Some(period))
  }
}

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Wall clock time since the process wide scheduler epoch.
pub(crate) fn wall_clock() -> Duration { EPOCH.elapsed() }
