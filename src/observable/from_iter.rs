use super::{Observable, ObservableExt, TypeHint};
use crate::observer::Observer;

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Stops early, without
/// completing, once the observer reports itself closed.
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut sum = 0;
/// observable::from_iter::<_, RxError>(0..10).subscribe(|v| sum += v);
/// assert_eq!(sum, 45);
/// ```
pub fn from_iter<Iter, Err>(iter: Iter) -> ObservableIter<Iter, Err>
where
  Iter: IntoIterator,
{
  ObservableIter(iter, TypeHint::default())
}

pub struct ObservableIter<Iter, Err>(Iter, TypeHint<(), Err>);

impl<Iter: Clone, Err> Clone for ObservableIter<Iter, Err> {
  fn clone(&self) -> Self { ObservableIter(self.0.clone(), TypeHint::default()) }
}

impl<Iter, Err, O> Observable<Iter::Item, Err, O> for ObservableIter<Iter, Err>
where
  Iter: IntoIterator,
  O: Observer<Iter::Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    for v in self.0 {
      if observer.is_closed() {
        return;
      }
      observer.next(v);
    }
    if !observer.is_closed() {
      observer.complete();
    }
  }
}

impl<Iter, Err> ObservableExt<Iter::Item, Err> for ObservableIter<Iter, Err> where Iter: IntoIterator {}
