use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

/// Calls `func` with a reference to every value before forwarding it.
#[derive(Clone)]
pub struct TapOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> TapOp<S, F> {
  #[inline]
  pub(crate) fn new(source: S, func: F) -> Self { TapOp { source, func } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for TapOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, TapObserver<O, F>>,
  F: FnMut(&Item),
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(TapObserver { observer, func: self.func })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for TapOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item),
{
}

pub struct TapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for TapObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item),
{
  fn next(&mut self, value: Item) {
    (self.func)(&value);
    self.observer.next(value)
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// Side effect for `error` that does nothing.
pub fn noop_error<Err>(_: &Err) -> Result<(), Err> { Ok(()) }

/// Side effect for `complete` that does nothing.
pub fn noop_complete<Err>() -> Result<(), Err> { Ok(()) }

/// Runs a side effect per notification before forwarding it. A side effect
/// that fails replaces the notification with its own error.
#[derive(Clone)]
pub struct TryTapOp<S, N, E, C> {
  source: S,
  on_next: N,
  on_error: E,
  on_complete: C,
}

impl<S, N, E, C> TryTapOp<S, N, E, C> {
  #[inline]
  pub(crate) fn new(source: S, on_next: N, on_error: E, on_complete: C) -> Self {
    TryTapOp { source, on_next, on_error, on_complete }
  }
}

impl<Item, Err, O, S, N, E, C> Observable<Item, Err, O> for TryTapOp<S, N, E, C>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, TryTapObserver<O, N, E, C>>,
  N: FnMut(&Item) -> Result<(), Err>,
  E: FnOnce(&Err) -> Result<(), Err>,
  C: FnOnce() -> Result<(), Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(TryTapObserver {
      observer: Some(observer),
      on_next: self.on_next,
      on_error: self.on_error,
      on_complete: self.on_complete,
    })
  }
}

impl<Item, Err, S, N, E, C> ObservableExt<Item, Err> for TryTapOp<S, N, E, C>
where
  S: ObservableExt<Item, Err>,
  N: FnMut(&Item) -> Result<(), Err>,
  E: FnOnce(&Err) -> Result<(), Err>,
  C: FnOnce() -> Result<(), Err>,
{
}

pub struct TryTapObserver<O, N, E, C> {
  observer: Option<O>,
  on_next: N,
  on_error: E,
  on_complete: C,
}

impl<Item, Err, O, N, E, C> Observer<Item, Err> for TryTapObserver<O, N, E, C>
where
  O: Observer<Item, Err>,
  N: FnMut(&Item) -> Result<(), Err>,
  E: FnOnce(&Err) -> Result<(), Err>,
  C: FnOnce() -> Result<(), Err>,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    match (self.on_next)(&value) {
      Ok(()) => self.observer.next(value),
      Err(err) => self.observer.take().error(err),
    }
  }

  fn error(self, err: Err) {
    let err = match (self.on_error)(&err) {
      Ok(()) => err,
      Err(replaced) => replaced,
    };
    self.observer.error(err)
  }

  fn complete(self) {
    match (self.on_complete)() {
      Ok(()) => self.observer.complete(),
      Err(err) => self.observer.error(err),
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn sees_every_value() {
    let mut seen = vec![];
    let mut forwarded = vec![];
    observable::from_iter::<_, RxError>(0..3)
      .tap(|v| seen.push(*v))
      .subscribe(|v| forwarded.push(v));
    assert_eq!(seen, vec![0, 1, 2]);
    assert_eq!(forwarded, seen);
  }

  #[test]
  fn failing_next_effect_replaces_value() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_next(230, 3),
      on_completed(250),
    ]);
    let c_xs = xs.clone();
    let res = scheduler.start_with(move || {
      c_xs.try_tap_next(|v| if *v == 2 { Err(RxError::custom("tap", "two")) } else { Ok(()) })
    });
    assert_eq!(res.messages(), vec![on_next(210, 1), on_error(220, RxError::custom("tap", "two"))]);
    assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 220)]);
  }

  #[test]
  fn failing_complete_effect_becomes_error() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(10, 1), on_completed(20)]);
    let res = scheduler.start_with(move || {
      xs.try_tap(|_| Ok(()), |_| Ok(()), || Err(RxError::custom("tap", "done")))
    });
    assert_eq!(res.messages(), vec![on_next(210, 1), on_error(220, RxError::custom("tap", "done"))]);
  }

  #[test]
  fn failing_error_effect_supersedes_error() {
    let log = Rc::new(RefCell::new(vec![]));
    let (c_log, e_log) = (log.clone(), log.clone());
    observable::throw_err::<i32, _>(RxError::Timeout)
      .try_tap(
        |_| Ok(()),
        move |err| {
          c_log.borrow_mut().push(format!("saw {err}"));
          Err(RxError::Canceled)
        },
        || Ok(()),
      )
      .subscribe_all(|_| {}, move |err| e_log.borrow_mut().push(format!("got {err}")), || {});
    assert_eq!(*log.borrow(), vec!["saw operation timed out", "got operation was canceled"]);
  }
}
