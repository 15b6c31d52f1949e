use super::test_scheduler::TestScheduler;
use crate::{
  notification::{Notification, Recorded},
  observer::Observer,
  rc::{MutRc, RcDeref, RcDerefMut},
};

/// Records every notification it receives, stamped with the scheduler's
/// virtual clock. Clones share the same record.
pub struct TestObserver<Item, Err> {
  scheduler: TestScheduler,
  messages: MutRc<Vec<Recorded<Notification<Item, Err>>>>,
}

impl<Item, Err> Clone for TestObserver<Item, Err> {
  fn clone(&self) -> Self {
    TestObserver { scheduler: self.scheduler.clone(), messages: self.messages.clone() }
  }
}

impl<Item, Err> TestObserver<Item, Err> {
  pub fn new(scheduler: TestScheduler) -> Self { TestObserver { scheduler, messages: MutRc::default() } }

  fn record(&self, n: Notification<Item, Err>) {
    let time = self.scheduler.clock();
    self.messages.rc_deref_mut().push(Recorded::new(time, n));
  }

  pub fn messages(&self) -> Vec<Recorded<Notification<Item, Err>>>
  where
    Item: Clone,
    Err: Clone,
  {
    self.messages.rc_deref().clone()
  }

  /// Just the values, without timestamps or terminal notifications.
  pub fn values(&self) -> Vec<Item>
  where
    Item: Clone,
  {
    self
      .messages
      .rc_deref()
      .iter()
      .filter_map(|r| match &r.value {
        Notification::Next(v) => Some(v.clone()),
        _ => None,
      })
      .collect()
  }
}

impl<Item, Err> Observer<Item, Err> for TestObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.record(Notification::Next(value)) }

  fn error(self, err: Err) { self.record(Notification::Error(err)) }

  fn complete(self) { self.record(Notification::Completed) }

  fn is_closed(&self) -> bool { false }
}
