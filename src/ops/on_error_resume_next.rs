use super::sequence::{subscribe_sequence, Advance, OkSources, SequenceObserver};
use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::SerialSubscription,
};

/// Subscribes the sources one after the other, moving on when the active
/// one terminates either way. Errors are dropped; the result completes after
/// the last source.
pub fn on_error_resume_next<I, Err>(sources: I) -> OnErrorResumeNext<OkSources<I::IntoIter, Err>>
where
  I: IntoIterator,
{
  OnErrorResumeNext { sources: OkSources::new(sources.into_iter()) }
}

#[derive(Clone)]
pub struct OnErrorResumeNext<I> {
  sources: I,
}

impl<Item, Err, O, I, S> Observable<Item, Err, O> for OnErrorResumeNext<I>
where
  O: Observer<Item, Err>,
  I: Iterator<Item = Result<S, Err>>,
  S: Observable<Item, Err, SequenceObserver<I, O, Err>>,
  S::Unsub: 'static,
{
  type Unsub = SerialSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    subscribe_sequence(self.sources, observer, Advance::OnEither)
  }
}

impl<Item, Err, I, S> ObservableExt<Item, Err> for OnErrorResumeNext<I>
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
  fn continues_after_error_and_completion() {
    let scheduler = TestScheduler::new();
    let a = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(10, 1), on_error(20, RxError::Timeout)]);
    let b = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(10, 2), on_completed(20)]);
    let c = scheduler.create_cold_observable::<i32, RxError>(vec![on_error(10, RxError::Canceled)]);
    let (c_a, c_b, c_c) = (a.clone(), b.clone(), c.clone());
    let res = scheduler.start_with(move || observable::on_error_resume_next(vec![c_a, c_b, c_c]));
    assert_eq!(res.messages(), vec![on_next(210, 1), on_next(230, 2), on_completed(250)]);
    assert_eq!(a.subscriptions(), vec![SubscriptionLog::new(200, 220)]);
    assert_eq!(b.subscriptions(), vec![SubscriptionLog::new(220, 240)]);
    assert_eq!(c.subscriptions(), vec![SubscriptionLog::new(240, 250)]);
  }

  #[test]
  fn synchronous_sources() {
    let values = Rc::new(RefCell::new(vec![]));
    let (c_next, c_complete) = (values.clone(), values.clone());
    observable::on_error_resume_next(vec![
      observable::throw_err::<i32, RxError>(RxError::Timeout).box_it(),
      observable::of(1).box_it(),
      observable::throw_err(RxError::Canceled).box_it(),
      observable::of(2).box_it(),
    ])
    .subscribe_all(
      move |v| c_next.borrow_mut().push(v),
      |_| panic!("errors are dropped"),
      move || c_complete.borrow_mut().push(-1),
    );
    assert_eq!(*values.borrow(), vec![1, 2, -1]);
  }
}
