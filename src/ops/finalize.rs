use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::{MutArc, RcDerefMut},
  subscription::Subscription,
};

/// Runs `func` once the subscription ends, whichever way: after the terminal
/// notification was forwarded, or when unsubscribed.
#[derive(Clone)]
pub struct FinalizeOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> FinalizeOp<S, F> {
  #[inline]
  pub(crate) fn new(source: S, func: F) -> Self { FinalizeOp { source, func } }
}

fn run_once<F: FnOnce()>(func: &MutArc<Option<F>>) {
  let func = func.rc_deref_mut().take();
  if let Some(func) = func {
    func()
  }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for FinalizeOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, FinalizerObserver<O, F>>,
  F: FnOnce(),
{
  type Unsub = FinalizerSubscription<S::Unsub, F>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let func = MutArc::own(Some(self.func));
    let subscription = self.source.actual_subscribe(FinalizerObserver { observer, func: func.clone() });
    FinalizerSubscription { subscription, func }
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for FinalizeOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnOnce(),
{
}

pub struct FinalizerObserver<O, F> {
  observer: O,
  func: MutArc<Option<F>>,
}

impl<Item, Err, O, F> Observer<Item, Err> for FinalizerObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) {
    self.observer.error(err);
    run_once(&self.func);
  }

  fn complete(self) {
    self.observer.complete();
    run_once(&self.func);
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

pub struct FinalizerSubscription<U, F> {
  subscription: U,
  func: MutArc<Option<F>>,
}

impl<U, F> Subscription for FinalizerSubscription<U, F>
where
  U: Subscription,
  F: FnOnce(),
{
  fn unsubscribe(self) {
    self.subscription.unsubscribe();
    run_once(&self.func);
  }

  #[inline]
  fn is_closed(&self) -> bool { self.subscription.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn finalize_on_complete() {
    let finalized = Rc::new(Cell::new(0));
    let mut nexted = false;
    let c_finalized = finalized.clone();
    observable::of::<_, RxError>(1)
      .finalize(move || c_finalized.set(c_finalized.get() + 1))
      .subscribe(|_| nexted = true);
    assert_eq!(finalized.get(), 1);
    assert!(nexted);
  }

  #[test]
  fn finalize_on_error() {
    let finalized = Rc::new(Cell::new(0));
    let c_finalized = finalized.clone();
    observable::throw_err::<i32, _>(RxError::Timeout)
      .finalize(move || c_finalized.set(c_finalized.get() + 1))
      .subscribe_all(|_| {}, |_| {}, || {});
    assert_eq!(finalized.get(), 1);
  }

  #[test]
  fn finalize_once_on_unsubscribe() {
    let finalized = Rc::new(Cell::new(0));
    let c_finalized = finalized.clone();
    let subject = Subject::<i32, RxError>::new();
    let subscription = subject
      .clone()
      .finalize(move || c_finalized.set(c_finalized.get() + 1))
      .subscribe(|_| {});
    assert_eq!(finalized.get(), 0);
    subscription.unsubscribe();
    assert_eq!(finalized.get(), 1);
    assert!(subject.is_empty());
  }

  #[test]
  fn finalize_runs_after_terminal_is_delivered() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(10, 1), on_completed(20)]);
    let finalized_at = Rc::new(Cell::new(0));
    let (c_scheduler, c_at) = (scheduler.clone(), finalized_at.clone());
    let res = scheduler.start_with(move || xs.finalize(move || c_at.set(c_scheduler.clock())));
    assert_eq!(res.messages(), vec![on_next(210, 1), on_completed(220)]);
    assert_eq!(finalized_at.get(), 220);
  }
}
