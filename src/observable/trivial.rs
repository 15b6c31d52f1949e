use super::{Observable, ObservableExt, TypeHint};
use crate::observer::Observer;

/// Creates an observable that completes right away without emitting.
pub fn empty<Item, Err>() -> EmptyObservable<Item, Err> { EmptyObservable(TypeHint::default()) }

/// Creates an observable that never emits anything, not even a terminal.
pub fn never<Item, Err>() -> NeverObservable<Item, Err> { NeverObservable(TypeHint::default()) }

/// Creates an observable that only errors with `err`.
pub fn throw_err<Item, Err>(err: Err) -> ThrowObservable<Item, Err> {
  ThrowObservable(err, TypeHint::default())
}

pub struct EmptyObservable<Item, Err>(TypeHint<Item, Err>);

pub struct NeverObservable<Item, Err>(TypeHint<Item, Err>);

pub struct ThrowObservable<Item, Err>(Err, TypeHint<Item, Err>);

impl<Item, Err> Clone for EmptyObservable<Item, Err> {
  fn clone(&self) -> Self { EmptyObservable(TypeHint::default()) }
}

impl<Item, Err> Clone for NeverObservable<Item, Err> {
  fn clone(&self) -> Self { NeverObservable(TypeHint::default()) }
}

impl<Item, Err: Clone> Clone for ThrowObservable<Item, Err> {
  fn clone(&self) -> Self { ThrowObservable(self.0.clone(), TypeHint::default()) }
}

impl<Item, Err, O> Observable<Item, Err, O> for EmptyObservable<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    if !observer.is_closed() {
      observer.complete();
    }
  }
}

impl<Item, Err, O> Observable<Item, Err, O> for NeverObservable<Item, Err> {
  type Unsub = ();

  #[inline]
  fn actual_subscribe(self, _: O) -> Self::Unsub {}
}

impl<Item, Err, O> Observable<Item, Err, O> for ThrowObservable<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    if !observer.is_closed() {
      observer.error(self.0);
    }
  }
}

impl<Item, Err> ObservableExt<Item, Err> for EmptyObservable<Item, Err> {}

impl<Item, Err> ObservableExt<Item, Err> for NeverObservable<Item, Err> {}

impl<Item, Err> ObservableExt<Item, Err> for ThrowObservable<Item, Err> {}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[test]
  fn empty_only_completes() {
    let mut hits = 0;
    let mut completed = false;
    observable::empty::<i32, RxError>().subscribe_all(|_| hits += 1, |_| {}, || completed = true);
    assert_eq!(hits, 0);
    assert!(completed);
  }

  #[test]
  fn throw_only_errors() {
    let mut err = None;
    observable::throw_err::<i32, _>(RxError::Timeout).subscribe_all(
      |_| unreachable!(),
      |e| err = Some(e),
      || unreachable!(),
    );
    assert_eq!(err, Some(RxError::Timeout));
  }

  #[test]
  fn never_stays_silent() {
    let scheduler = TestScheduler::new();
    let res = scheduler.start_with(observable::never::<i32, RxError>);
    assert!(res.messages().is_empty());
  }
}
