//! Sequential composition: subscribe the next source when the active one
//! completes.

use tracing::debug;

use super::sequence::{subscribe_sequence, Advance, OkSources, SequenceObserver};
use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::{SerialSubscription, SingleAssignmentSubscription},
};

/// `source1` followed by `source2`. The second source is subscribed at the
/// moment the first one completes; an error from either is terminal.
#[derive(Clone)]
pub struct ConcatOp<S1, S2> {
  source1: S1,
  source2: S2,
}

impl<S1, S2> ConcatOp<S1, S2> {
  #[inline]
  pub(crate) fn new(source1: S1, source2: S2) -> Self { ConcatOp { source1, source2 } }
}

impl<Item, Err, O, S1, S2> Observable<Item, Err, O> for ConcatOp<S1, S2>
where
  O: Observer<Item, Err>,
  S1: Observable<Item, Err, ConcatObserver<O, S2>>,
  S1::Unsub: 'static,
  S2: Observable<Item, Err, O>,
  S2::Unsub: 'static,
{
  type Unsub = SerialSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let serial = SerialSubscription::default();
    let slot = SingleAssignmentSubscription::default();
    serial.assign(slot.clone());
    let observer = ConcatObserver { observer, next: self.source2, serial: serial.clone() };
    let unsub = self.source1.actual_subscribe(observer);
    // Fresh slot, assigning can only fail on a second assignment.
    let _ = slot.assign(unsub);
    serial
  }
}

impl<Item, Err, S1, S2> ObservableExt<Item, Err> for ConcatOp<S1, S2>
where
  S1: ObservableExt<Item, Err>,
  S2: ObservableExt<Item, Err>,
{
}

pub struct ConcatObserver<O, S> {
  observer: O,
  next: S,
  serial: SerialSubscription,
}

impl<Item, Err, O, S> Observer<Item, Err> for ConcatObserver<O, S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, O>,
  S::Unsub: 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    debug!("concat advancing to the next source");
    let slot = SingleAssignmentSubscription::default();
    self.serial.assign(slot.clone());
    let unsub = self.next.actual_subscribe(self.observer);
    let _ = slot.assign(unsub);
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// Subscribes the sources one after the other, each when the previous one
/// completes. The first error is terminal.
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut values = vec![];
/// observable::concat(vec![
///   observable::from_iter::<_, RxError>(vec![1, 2]),
///   observable::from_iter(vec![3]),
/// ])
/// .subscribe(|v| values.push(v));
/// assert_eq!(values, vec![1, 2, 3]);
/// ```
pub fn concat<I, Err>(sources: I) -> ConcatAll<OkSources<I::IntoIter, Err>>
where
  I: IntoIterator,
{
  ConcatAll { sources: OkSources::new(sources.into_iter()) }
}

/// Like [`concat`], over an iterator that may fail to produce the next
/// source. Such a failure is delivered as the error.
pub fn try_concat<I, S, Err>(sources: I) -> ConcatAll<I::IntoIter>
where
  I: IntoIterator<Item = Result<S, Err>>,
{
  ConcatAll { sources: sources.into_iter() }
}

#[derive(Clone)]
pub struct ConcatAll<I> {
  sources: I,
}

impl<Item, Err, O, I, S> Observable<Item, Err, O> for ConcatAll<I>
where
  O: Observer<Item, Err>,
  I: Iterator<Item = Result<S, Err>>,
  S: Observable<Item, Err, SequenceObserver<I, O, Err>>,
  S::Unsub: 'static,
{
  type Unsub = SerialSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    subscribe_sequence(self.sources, observer, Advance::OnComplete)
  }
}

impl<Item, Err, I, S> ObservableExt<Item, Err> for ConcatAll<I>
where
  I: Iterator<Item = Result<S, Err>>,
  S: ObservableExt<Item, Err>,
{
}
