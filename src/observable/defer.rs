use super::{Observable, ObservableExt};

/// Creates an observable that calls `factory` for every subscription and
/// subscribes to what it returns.
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut hits = 0;
/// observable::defer(|| observable::of::<_, RxError>(1)).subscribe(|v| hits += v);
/// assert_eq!(hits, 1);
/// ```
pub fn defer<F, S>(factory: F) -> Defer<F>
where
  F: FnOnce() -> S,
{
  Defer(factory)
}

#[derive(Clone)]
pub struct Defer<F>(F);

impl<F, S, Item, Err, O> Observable<Item, Err, O> for Defer<F>
where
  F: FnOnce() -> S,
  S: Observable<Item, Err, O>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { (self.0)().actual_subscribe(observer) }
}

impl<F, S, Item, Err> ObservableExt<Item, Err> for Defer<F>
where
  F: FnOnce() -> S,
  S: ObservableExt<Item, Err>,
{
}
