use std::fmt;

use crate::observer::Observer;

/// One event of a sequence, materialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Completed,
}

impl<Item, Err> Notification<Item, Err> {
  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }

  /// Delivers this notification to `observer`.
  pub fn accept<O>(self, observer: &mut Option<O>)
  where
    O: Observer<Item, Err>,
  {
    match self {
      Notification::Next(v) => {
        if let Some(o) = observer.as_mut() {
          o.next(v)
        }
      }
      Notification::Error(err) => {
        if let Some(o) = observer.take() {
          o.error(err)
        }
      }
      Notification::Completed => {
        if let Some(o) = observer.take() {
          o.complete()
        }
      }
    }
  }
}

/// A value stamped with the virtual time it was produced at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Recorded<T> {
  pub time: u64,
  pub value: T,
}

impl<T> Recorded<T> {
  pub fn new(time: u64, value: T) -> Self { Recorded { time, value } }
}

impl<T: fmt::Display> fmt::Display for Recorded<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}@{}", self.value, self.time)
  }
}

impl<Item: fmt::Debug, Err: fmt::Debug> fmt::Display for Notification<Item, Err> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Notification::Next(v) => write!(f, "next({v:?})"),
      Notification::Error(e) => write!(f, "error({e:?})"),
      Notification::Completed => f.write_str("completed"),
    }
  }
}

/// The interval during which a test source held a live subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionLog {
  pub subscribe: u64,
  pub unsubscribe: u64,
}

impl SubscriptionLog {
  /// Marks a subscription that was never disposed.
  pub const INFINITE: u64 = u64::MAX;

  pub fn new(subscribe: u64, unsubscribe: u64) -> Self {
    SubscriptionLog { subscribe, unsubscribe }
  }

  pub fn open(subscribe: u64) -> Self {
    SubscriptionLog { subscribe, unsubscribe: Self::INFINITE }
  }

  pub fn is_open(&self) -> bool { self.unsubscribe == Self::INFINITE }
}

impl fmt::Display for SubscriptionLog {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_open() {
      write!(f, "({}, Infinite)", self.subscribe)
    } else {
      write!(f, "({}, {})", self.subscribe, self.unsubscribe)
    }
  }
}
