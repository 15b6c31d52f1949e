use super::{Observable, ObservableExt, TypeHint};
use crate::{
  observer::{BoxObserver, Observer},
  subscriber::Subscriber,
  subscription::Subscription,
};

/// The handle a [`create`] callback pushes notifications through.
///
/// It sits behind a termination guard: anything pushed after a terminal, or
/// after the consumer unsubscribed, is dropped.
pub struct Emitter<Item, Err>(Subscriber<BoxObserver<Item, Err>, Err>);

impl<Item, Err> Clone for Emitter<Item, Err> {
  fn clone(&self) -> Self { Emitter(self.0.clone()) }
}

impl<Item, Err> Observer<Item, Err> for Emitter<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { self.0.next(value) }

  #[inline]
  fn error(self, err: Err) { self.0.error(err) }

  #[inline]
  fn complete(self) { self.0.complete() }

  #[inline]
  fn is_closed(&self) -> bool { Subscription::is_closed(&self.0) }
}

/// Creates an observable from a subscribe callback.
///
/// The callback gets an [`Emitter`] and returns the teardown of whatever it
/// started. The teardown runs exactly once: when the consumer unsubscribes or
/// when the emitter terminates, whichever comes first. A callback that
/// terminates synchronously has its teardown run as soon as it returns.
///
/// ```
/// use rxcore::prelude::*;
///
/// let source = observable::create(|mut emitter: Emitter<i32, RxError>| {
///   emitter.next(1);
///   emitter.next(2);
///   emitter.complete();
/// });
/// let mut seen = vec![];
/// source.subscribe(move |v| seen.push(v));
/// ```
pub fn create<F, Item, Err, U>(subscribe: F) -> Create<F, Item, Err>
where
  F: FnOnce(Emitter<Item, Err>) -> U,
  U: Subscription + 'static,
{
  Create(subscribe, TypeHint::default())
}

pub struct Create<F, Item, Err>(F, TypeHint<Item, Err>);

impl<F: Clone, Item, Err> Clone for Create<F, Item, Err> {
  fn clone(&self) -> Self { Create(self.0.clone(), TypeHint::default()) }
}

impl<F, Item, Err, O, U> Observable<Item, Err, O> for Create<F, Item, Err>
where
  F: FnOnce(Emitter<Item, Err>) -> U,
  U: Subscription + 'static,
  O: Observer<Item, Err> + 'static,
  Item: 'static,
  Err: 'static,
{
  type Unsub = Subscriber<BoxObserver<Item, Err>, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscriber = Subscriber::new(Box::new(observer) as BoxObserver<Item, Err>);
    let teardown = (self.0)(Emitter(subscriber.clone()));
    subscriber.set_upstream(teardown);
    subscriber
  }
}

impl<F, Item, Err> ObservableExt<Item, Err> for Create<F, Item, Err> {}
