use std::time::Duration;

use futures::{executor::LocalSpawner, task::LocalSpawnExt};
use tracing::error;

use super::{wall_clock, Scheduler, Task, TaskHandle, TaskState};
use crate::subscription::Subscription;

async fn sleep(d: Duration) { futures_time::task::sleep(d.into()).await; }

/// Runs tasks on a `futures` local executor, delays backed by `futures-time`.
impl Scheduler for LocalSpawner {
  fn now(&self) -> Duration { wall_clock() }

  fn schedule<S: 'static>(&self, mut task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let c_handle = handle.clone();
    let fut = async move {
      if let Some(delay) = delay {
        sleep(delay).await;
      }
      while !c_handle.is_closed() {
        match task.step() {
          TaskState::Finished => break,
          TaskState::Yield => sleep(Duration::ZERO).await,
          TaskState::Sleeping(d) => sleep(d).await,
        }
      }
      c_handle.mark_finished();
    };
    if let Err(err) = self.spawn_local(fut) {
      error!(%err, "local executor refused a scheduled task");
      handle.mark_finished();
    }
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use futures::executor::LocalPool;

  use super::*;

  #[test]
  fn runs_on_local_pool() {
    let mut pool = LocalPool::new();
    let hits = Rc::new(RefCell::new(vec![]));
    pool.spawner().schedule(
      Task::new((hits.clone(), 0), |(hits, n)| {
        *n += 1;
        hits.borrow_mut().push(*n);
        if *n < 3 { TaskState::Sleeping(Duration::from_millis(1)) } else { TaskState::Finished }
      }),
      Some(Duration::from_millis(1)),
    );
    pool.run();
    assert_eq!(*hits.borrow(), vec![1, 2, 3]);
  }

  #[test]
  fn cancelled_before_run() {
    let mut pool = LocalPool::new();
    let hits = Rc::new(RefCell::new(0));
    let handle = pool.spawner().schedule(
      Task::new(hits.clone(), |hits| {
        *hits.borrow_mut() += 1;
        TaskState::Finished
      }),
      Some(Duration::from_millis(1)),
    );
    handle.unsubscribe();
    pool.run();
    assert_eq!(*hits.borrow(), 0);
  }
}
