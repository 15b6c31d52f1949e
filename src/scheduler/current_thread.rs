use std::{
  cell::RefCell,
  cmp::Ordering,
  collections::BinaryHeap,
  time::Duration,
};

use tracing::trace;

use super::{wall_clock, Scheduler, Task, TaskHandle, TaskState};
use crate::subscription::Subscription;

struct Queued {
  due: Duration,
  seq: u64,
  task: Box<dyn FnMut() -> TaskState>,
  handle: TaskHandle,
}

impl PartialEq for Queued {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Queued {
  fn cmp(&self, other: &Self) -> Ordering {
    other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
  }
}

#[derive(Default)]
struct Trampoline {
  running: bool,
  seq: u64,
  queue: BinaryHeap<Queued>,
}

thread_local! {
  static TRAMPOLINE: RefCell<Trampoline> = RefCell::new(Trampoline::default());
}

/// Runs work on the calling thread.
///
/// The first `schedule` on a thread drains the queue before returning; work
/// scheduled while the queue is draining is queued instead of run
/// recursively, so recursive scheduling never grows the stack. Delayed work
/// blocks the thread until it is due.
#[derive(Clone, Copy, Default)]
pub struct CurrentThreadScheduler;

impl CurrentThreadScheduler {
  fn push(due: Duration, task: Box<dyn FnMut() -> TaskState>, handle: TaskHandle) -> bool {
    TRAMPOLINE.with(|t| {
      let mut t = t.borrow_mut();
      let seq = t.seq;
      t.seq += 1;
      t.queue.push(Queued { due, seq, task, handle });
      let owner = !t.running;
      t.running = true;
      owner
    })
  }

  fn drain() {
    let _reset = ResetOnPanic;
    loop {
      let next = TRAMPOLINE.with(|t| {
        let mut t = t.borrow_mut();
        let next = t.queue.pop();
        if next.is_none() {
          t.running = false;
        }
        next
      });
      let Some(mut queued) = next else { break };
      if queued.handle.is_closed() {
        continue;
      }
      let now = wall_clock();
      if queued.due > now {
        std::thread::sleep(queued.due - now);
      }
      trace!(seq = queued.seq, "current thread task");
      match (queued.task)() {
        TaskState::Finished => queued.handle.mark_finished(),
        TaskState::Yield => Self::requeue(queued, Duration::ZERO),
        TaskState::Sleeping(d) => Self::requeue(queued, d),
      }
    }
  }

  fn requeue(queued: Queued, delay: Duration) {
    if queued.handle.is_cancelled() {
      queued.handle.mark_finished();
      return;
    }
    Self::push(wall_clock() + delay, queued.task, queued.handle);
  }
}

/// A task panicking mid-drain must not leave the thread believing a drain is
/// still running.
struct ResetOnPanic;

impl Drop for ResetOnPanic {
  fn drop(&mut self) {
    if std::thread::panicking() {
      let _ = TRAMPOLINE.try_with(|t| {
        if let Ok(mut t) = t.try_borrow_mut() {
          t.running = false;
          t.queue.clear();
        }
      });
    }
  }
}

impl Scheduler for CurrentThreadScheduler {
  fn now(&self) -> Duration { wall_clock() }

  fn schedule<S: 'static>(&self, mut task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let due = wall_clock() + delay.unwrap_or_default();
    if Self::push(due, Box::new(move || task.step()), handle.clone()) {
      Self::drain();
    }
    handle
  }
}
