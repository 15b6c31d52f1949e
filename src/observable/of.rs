use super::{Observable, ObservableExt, TypeHint};
use crate::observer::Observer;

/// Creates an observable producing a single value, then completing.
///
/// # Example
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut seen = vec![];
/// observable::of::<_, RxError>(123).subscribe(|v| seen.push(v));
/// assert_eq!(seen, vec![123]);
/// ```
pub fn of<Item, Err>(v: Item) -> ObservableOf<Item, Err> { ObservableOf(v, TypeHint::default()) }

pub struct ObservableOf<Item, Err>(Item, TypeHint<Item, Err>);

impl<Item: Clone, Err> Clone for ObservableOf<Item, Err> {
  fn clone(&self) -> Self { ObservableOf(self.0.clone(), TypeHint::default()) }
}

impl<Item, Err, O> Observable<Item, Err, O> for ObservableOf<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    if observer.is_closed() {
      return;
    }
    observer.next(self.0);
    observer.complete();
  }
}

impl<Item, Err> ObservableExt<Item, Err> for ObservableOf<Item, Err> {}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[test]
  fn emits_then_completes() {
    let mut value = 0;
    let mut completed = false;
    observable::of::<_, RxError>(100).subscribe_all(|v| value = v, |_| {}, || completed = true);
    assert_eq!(value, 100);
    assert!(completed);
  }

  #[test]
  fn runs_one_subscription_per_clone() {
    let mut hits = 0;
    let o = observable::of::<_, RxError>(1);
    o.clone().subscribe(|_| hits += 1);
    o.subscribe(|_| hits += 1);
    assert_eq!(hits, 2);
  }
}
