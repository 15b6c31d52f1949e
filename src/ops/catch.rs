//! Error recovery: switch to another source when the current one fails.

use tracing::debug;

use super::sequence::{subscribe_sequence, Advance, OkSources, SequenceObserver};
use crate::{
  error::{ErrorKind, RxError},
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::{SerialSubscription, SingleAssignmentSubscription},
};

/// Decides whether a catch handler accepts an error.
pub trait ErrorFilter<Err> {
  fn accepts(&mut self, err: &Err) -> bool;
}

/// Accepts every error.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyError;

impl<Err> ErrorFilter<Err> for AnyError {
  #[inline]
  fn accepts(&mut self, _: &Err) -> bool { true }
}

impl ErrorFilter<RxError> for ErrorKind {
  #[inline]
  fn accepts(&mut self, err: &RxError) -> bool { self.matches(err) }
}

/// Accepts the errors a predicate accepts.
#[derive(Clone)]
pub struct ErrorPredicate<P>(pub P);

impl<Err, P> ErrorFilter<Err> for ErrorPredicate<P>
where
  P: FnMut(&Err) -> bool,
{
  #[inline]
  fn accepts(&mut self, err: &Err) -> bool { (self.0)(err) }
}

/// On an error the filter accepts, hands it to `handler` and continues with
/// the observable the handler returns. The replacement is subscribed at the
/// moment the error arrives. Errors the filter rejects, and errors the
/// handler itself returns, go downstream.
#[derive(Clone)]
pub struct CatchOp<S, H, F> {
  source: S,
  handler: H,
  filter: F,
}

impl<S, H, F> CatchOp<S, H, F> {
  #[inline]
  pub(crate) fn new(source: S, handler: H, filter: F) -> Self { CatchOp { source, handler, filter } }
}

impl<Item, Err, O, S, H, F, R> Observable<Item, Err, O> for CatchOp<S, H, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, CatchObserver<O, H, F>>,
  S::Unsub: 'static,
  H: FnOnce(Err) -> Result<R, Err>,
  R: Observable<Item, Err, O>,
  R::Unsub: 'static,
  F: ErrorFilter<Err>,
{
  type Unsub = SerialSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let serial = SerialSubscription::default();
    let slot = SingleAssignmentSubscription::default();
    serial.assign(slot.clone());
    let observer = CatchObserver { observer, handler: self.handler, filter: self.filter, serial: serial.clone() };
    let unsub = self.source.actual_subscribe(observer);
    // Fresh slot, assigning can only fail on a second assignment.
    let _ = slot.assign(unsub);
    serial
  }
}

impl<Item, Err, S, H, F, R> ObservableExt<Item, Err> for CatchOp<S, H, F>
where
  S: ObservableExt<Item, Err>,
  H: FnOnce(Err) -> Result<R, Err>,
  R: ObservableExt<Item, Err>,
{
}

pub struct CatchObserver<O, H, F> {
  observer: O,
  handler: H,
  filter: F,
  serial: SerialSubscription,
}

impl<Item, Err, O, H, F, R> Observer<Item, Err> for CatchObserver<O, H, F>
where
  O: Observer<Item, Err>,
  H: FnOnce(Err) -> Result<R, Err>,
  R: Observable<Item, Err, O>,
  R::Unsub: 'static,
  F: ErrorFilter<Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(mut self, err: Err) {
    if !self.filter.accepts(&err) {
      self.observer.error(err);
      return;
    }
    match (self.handler)(err) {
      Ok(replacement) => {
        debug!("catch recovered, subscribing the replacement source");
        let slot = SingleAssignmentSubscription::default();
        self.serial.assign(slot.clone());
        let unsub = replacement.actual_subscribe(self.observer);
        let _ = slot.assign(unsub);
      }
      Err(err) => self.observer.error(err),
    }
  }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// Subscribes the sources one after the other, moving on whenever the
/// active one fails. Completes with the first source that completes; when
/// every source failed, forwards the last error.
pub fn catch_all<I, Err>(sources: I) -> CatchAll<OkSources<I::IntoIter, Err>>
where
  I: IntoIterator,
{
  CatchAll { sources: OkSources::new(sources.into_iter()) }
}

#[derive(Clone)]
pub struct CatchAll<I> {
  sources: I,
}

impl<Item, Err, O, I, S> Observable<Item, Err, O> for CatchAll<I>
where
  O: Observer<Item, Err>,
  I: Iterator<Item = Result<S, Err>>,
  S: Observable<Item, Err, SequenceObserver<I, O, Err>>,
  S::Unsub: 'static,
{
  type Unsub = SerialSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    subscribe_sequence(self.sources, observer, Advance::OnError)
  }
}

impl<Item, Err, I, S> ObservableExt<Item, Err> for CatchAll<I>
where
  I: Iterator<Item = Result<S, Err>>,
  S: ObservableExt<Item, Err>,
{
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn recovers_at_the_error_time() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(150, 1),
      on_next(210, 2),
      on_next(220, 3),
      on_error(230, RxError::custom("io", "reset")),
    ]);
    let ys = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(220, 9),
      on_next(240, 4),
      on_completed(250),
    ]);
    let (c_xs, c_ys) = (xs.clone(), ys.clone());
    let res = scheduler.start_with(move || c_xs.catch(move |_| Ok(c_ys)));
    assert_eq!(res.messages(), vec![on_next(210, 2), on_next(220, 3), on_next(240, 4), on_completed(250)]);
    assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 230)]);
    assert_eq!(ys.subscriptions(), vec![SubscriptionLog::new(230, 250)]);
  }

  #[test]
  fn mismatched_kind_passes_through() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![on_next(210, 1), on_error(230, RxError::Timeout)]);
    let ys = scheduler.create_hot_observable::<i32, RxError>(vec![on_next(240, 4), on_completed(250)]);
    let c_ys = ys.clone();
    let res = scheduler.start_with(move || xs.catch_kind(ErrorKind::Canceled, move |_| Ok(c_ys)));
    assert_eq!(res.messages(), vec![on_next(210, 1), on_error(230, RxError::Timeout)]);
    assert!(ys.subscriptions().is_empty());
  }

  #[test]
  fn matching_kind_recovers() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![on_error(230, RxError::custom("io", "reset"))]);
    let ys = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(10, 4), on_completed(20)]);
    let res = scheduler.start_with(move || xs.catch_kind(ErrorKind::Custom("io"), move |_| Ok(ys)));
    assert_eq!(res.messages(), vec![on_next(240, 4), on_completed(250)]);
  }

  #[test]
  fn failing_handler_error_is_delivered() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![on_next(210, 1), on_error(230, RxError::Timeout)]);
    let res = scheduler.start_with(move || {
      xs.catch(|err| Err::<observable::ObservableOf<i32, RxError>, _>(RxError::custom("handler", err.to_string())))
    });
    assert_eq!(
      res.messages(),
      vec![on_next(210, 1), on_error(230, RxError::custom("handler", "operation timed out"))]
    );
  }

  #[test]
  fn predicate_filter() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![on_error(220, RxError::NoElements)]);
    let res = scheduler.start_with(move || {
      xs.catch_when(|err: &RxError| *err == RxError::NoElements, |_| Ok(observable::of::<_, RxError>(0)))
    });
    assert_eq!(res.messages(), vec![on_next(220, 0), on_completed(220)]);
  }

  #[test]
  fn catch_all_forwards_the_last_error() {
    let scheduler = TestScheduler::new();
    let o1 = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(10, 1), on_error(20, RxError::Timeout)]);
    let o2 = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(10, 2), on_error(20, RxError::Canceled)]);
    let (c1, c2) = (o1.clone(), o2.clone());
    let res = scheduler.start_with(move || observable::catch_all(vec![c1, c2]));
    assert_eq!(res.messages(), vec![on_next(210, 1), on_next(230, 2), on_error(240, RxError::Canceled)]);
    assert_eq!(o1.subscriptions(), vec![SubscriptionLog::new(200, 220)]);
    assert_eq!(o2.subscriptions(), vec![SubscriptionLog::new(220, 240)]);
  }

  #[test]
  fn catch_all_stops_at_first_completion() {
    let scheduler = TestScheduler::new();
    let o1 = scheduler.create_cold_observable::<i32, RxError>(vec![on_error(10, RxError::Timeout)]);
    let o2 = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(10, 2), on_completed(20)]);
    let o3 = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(10, 3), on_completed(20)]);
    let c3 = o3.clone();
    let res = scheduler.start_with(move || observable::catch_all(vec![o1, o2, c3]));
    assert_eq!(res.messages(), vec![on_next(220, 2), on_completed(230)]);
    assert!(o3.subscriptions().is_empty());
  }

  #[test]
  fn catch_all_of_long_synchronous_sequence() {
    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();
    let sources = (0..100_000)
      .map(|_| observable::throw_err::<i32, RxError>(RxError::Timeout).box_it())
      .chain(std::iter::once(observable::of(7).box_it()));
    observable::catch_all(sources).subscribe(move |v| c_values.borrow_mut().push(v));
    assert_eq!(*values.borrow(), vec![7]);
  }
}
