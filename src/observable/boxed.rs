//! Type erased observables.
//!
//! Operator chains have long, unnameable types. Boxing trades the static
//! dispatch of a chain for one nameable type per item and error type, so
//! different chains can share a collection or a function signature.

use super::{Observable, ObservableExt};
use crate::{
  observer::{BoxObserver, Observer},
  subscription::BoxSubscription,
};

/// Object safe view of an observable subscribed through a boxed observer.
pub trait DynObservable<Item, Err> {
  fn box_subscribe(self: Box<Self>, observer: BoxObserver<Item, Err>) -> BoxSubscription;
}

impl<T, Item, Err> DynObservable<Item, Err> for T
where
  T: Observable<Item, Err, BoxObserver<Item, Err>>,
  T::Unsub: 'static,
{
  fn box_subscribe(self: Box<Self>, observer: BoxObserver<Item, Err>) -> BoxSubscription {
    BoxSubscription::new((*self).actual_subscribe(observer))
  }
}

/// Like [`DynObservable`], for observables that can be cloned.
pub trait DynObservableClone<Item, Err>: DynObservable<Item, Err> {
  fn box_clone(&self) -> Box<dyn DynObservableClone<Item, Err>>;
}

impl<T, Item, Err> DynObservableClone<Item, Err> for T
where
  T: Observable<Item, Err, BoxObserver<Item, Err>> + Clone + 'static,
  T::Unsub: 'static,
{
  fn box_clone(&self) -> Box<dyn DynObservableClone<Item, Err>> { Box::new(self.clone()) }
}

/// A boxed observable, subscribable once.
pub struct BoxOp<Item, Err>(Box<dyn DynObservable<Item, Err>>);

/// A boxed observable that can be cloned and so subscribed many times.
pub struct BoxOpClone<Item, Err>(Box<dyn DynObservableClone<Item, Err>>);

impl<Item, Err> BoxOp<Item, Err> {
  pub fn new<S>(source: S) -> Self
  where
    S: Observable<Item, Err, BoxObserver<Item, Err>> + 'static,
    S::Unsub: 'static,
  {
    BoxOp(Box::new(source))
  }
}

impl<Item, Err> BoxOpClone<Item, Err> {
  pub fn new<S>(source: S) -> Self
  where
    S: Observable<Item, Err, BoxObserver<Item, Err>> + Clone + 'static,
    S::Unsub: 'static,
  {
    BoxOpClone(Box::new(source))
  }
}

impl<Item, Err> Clone for BoxOpClone<Item, Err> {
  fn clone(&self) -> Self { BoxOpClone(self.0.box_clone()) }
}

impl<Item, Err, O> Observable<Item, Err, O> for BoxOp<Item, Err>
where
  O: Observer<Item, Err> + 'static,
{
  type Unsub = BoxSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.0.box_subscribe(Box::new(observer)) }
}

impl<Item, Err, O> Observable<Item, Err, O> for BoxOpClone<Item, Err>
where
  O: Observer<Item, Err> + 'static,
{
  type Unsub = BoxSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.0.box_subscribe(Box::new(observer)) }
}

impl<Item, Err> ObservableExt<Item, Err> for BoxOp<Item, Err> {}

impl<Item, Err> ObservableExt<Item, Err> for BoxOpClone<Item, Err> {}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn heterogeneous_collection() {
    let seen = Rc::new(RefCell::new(vec![]));
    let sources: Vec<BoxOp<i32, RxError>> = vec![
      observable::of(1).box_it(),
      observable::from_iter([2, 3]).map(|v| v * 10).box_it(),
      observable::empty().box_it(),
    ];
    for source in sources {
      let c_seen = seen.clone();
      source.subscribe(move |v| c_seen.borrow_mut().push(v));
    }
    assert_eq!(*seen.borrow(), vec![1, 20, 30]);
  }

  #[test]
  fn cloned_box_subscribes_twice() {
    let seen = Rc::new(RefCell::new(vec![]));
    let boxed = observable::of::<_, RxError>(42).box_it_clone();
    for source in [boxed.clone(), boxed] {
      let c_seen = seen.clone();
      source.subscribe(move |v| c_seen.borrow_mut().push(v));
    }
    assert_eq!(*seen.borrow(), vec![42, 42]);
  }

  #[test]
  fn boxed_virtual_time_source() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(10, 1), on_completed(20)]);
    let c_xs = xs.clone();
    let res = scheduler.start_with(move || c_xs.box_it());
    assert_eq!(res.messages(), vec![on_next(210, 1), on_completed(220)]);
    assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 220)]);
  }
}
