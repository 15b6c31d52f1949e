//! Observable traits and source factories.
//!
//! [`Observable`] is the subscribe half of the contract, implemented once per
//! observer type an observable can drive. [`ObservableExt`] carries every
//! operator and the `subscribe*` entry points; each operator type opts into it
//! with an empty impl.

use std::{marker::PhantomData, time::Duration};

use crate::{
  error::ErrorKind,
  observer::{BoxObserver, Observer, ObserverAll, ObserverNext},
  ops::{
    catch::{AnyError, CatchOp, ErrorPredicate},
    concat::ConcatOp,
    delay::DelayOp,
    distinct_until_changed::{
      default_key, default_key_eq, DistinctUntilChangedOp, DistinctUntilKeyChangedOp,
    },
    filter::FilterOp,
    finalize::FinalizeOp,
    map::{MapOp, TryMapOp},
    merge::MergeOp,
    publish::{publish, publish_value},
    skip::{SkipOp, SkipWhileOp},
    skip_last::SkipLastOp,
    skip_until::SkipUntilOp,
    take::{TakeOp, TakeWhileOp},
    take_last::{TakeLastForOp, TakeLastOp},
    take_time::{SkipForOp, TakeForOp},
    take_until::TakeUntilOp,
    tap::{noop_complete, noop_error, TapOp, TryTapOp},
    throttle::ThrottleOp,
    throttle_with::ThrottleWithOp,
  },
  scheduler::Scheduler,
  subject::{BehaviorSubject, Subject},
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionWrapper},
};

mod boxed;
mod connectable;
mod create;
mod defer;
mod from_iter;
mod generate;
mod interval;
mod of;
mod timer;
mod trivial;

pub use boxed::{BoxOp, BoxOpClone};
pub use connectable::{Connection, ConnectableObservable};
pub use create::{create, Create, Emitter};
pub use defer::{defer, Defer};
pub use from_iter::{from_iter, ObservableIter};
pub use generate::{
  generate, generate_at, generate_timed, try_generate, try_generate_at, try_generate_timed, Fallible, Generate,
  GenerateAt, GenerateTimed, Infallible, StateFn,
};
pub use interval::{interval, IntervalObservable};
pub use of::{of, ObservableOf};
pub use timer::{timer, timer_at, TimerObservable};
pub use trivial::{empty, never, throw_err, EmptyObservable, NeverObservable, ThrowObservable};

pub use crate::ops::{
  catch::{catch_all, CatchAll},
  concat::{concat, try_concat, ConcatAll},
  on_error_resume_next::{on_error_resume_next, OnErrorResumeNext},
};

/// The subscribe half of the contract.
///
/// `actual_subscribe` wires `observer` to the source and returns the handle
/// tearing the subscription down. Most callers want the `subscribe*` methods
/// of [`ObservableExt`], which add the termination guard.
pub trait Observable<Item, Err, O> {
  type Unsub: Subscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

pub trait ObservableExt<Item, Err>: Sized {
  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  fn map<B, F>(self, f: F) -> MapOp<Self, F, Item>
  where
    F: FnMut(Item) -> B,
  {
    MapOp::new(self, f)
  }

  /// Like `map`, an `Err` returned by the selector terminates the stream with
  /// that error.
  fn try_map<B, F>(self, f: F) -> TryMapOp<Self, F, Item>
  where
    F: FnMut(Item) -> Result<B, Err>,
  {
    TryMapOp::new(self, f)
  }

  /// Emits only the values satisfying `filter`.
  fn filter<F>(self, filter: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Item) -> bool,
  {
    FilterOp::new(self, filter)
  }

  /// Interleaves the values of `self` and `other`; completes once both have
  /// completed, errors as soon as either errors.
  fn merge<S>(self, other: S) -> MergeOp<Self, S>
  where
    S: ObservableExt<Item, Err>,
  {
    MergeOp::new(self, other)
  }

  /// Emits the values of `self`, then once it completes those of `other`.
  fn concat<S>(self, other: S) -> ConcatOp<Self, S>
  where
    S: ObservableExt<Item, Err>,
  {
    ConcatOp::new(self, other)
  }

  /// Emits only the first `count` values, then completes.
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp::new(self, count) }

  /// Emits values while `predicate` holds, completes at the first that fails.
  fn take_while<F>(self, predicate: F) -> TakeWhileOp<Self, F>
  where
    F: FnMut(&Item) -> bool,
  {
    TakeWhileOp::new(self, predicate)
  }

  /// Drops the first `count` values.
  fn skip(self, count: usize) -> SkipOp<Self> { SkipOp::new(self, count) }

  /// Drops values while `predicate` holds, emits everything after.
  fn skip_while<F>(self, predicate: F) -> SkipWhileOp<Self, F>
  where
    F: FnMut(&Item) -> bool,
  {
    SkipWhileOp::new(self, predicate)
  }

  /// Drops the last `count` values.
  fn skip_last(self, count: usize) -> SkipLastOp<Self> { SkipLastOp::new(self, count) }

  /// Emits only the last `count` values, when the source completes.
  fn take_last(self, count: usize) -> TakeLastOp<Self> { TakeLastOp::new(self, count) }

  /// Emits, when the source completes, the values produced within `duration`
  /// of its completion.
  fn take_last_for<SD: Scheduler>(self, duration: Duration, scheduler: SD) -> TakeLastForOp<Self, SD> {
    TakeLastForOp::new(self, duration, scheduler)
  }

  /// Emits values for `duration` after subscription, then completes.
  fn take_for<SD: Scheduler>(self, duration: Duration, scheduler: SD) -> TakeForOp<Self, SD> {
    TakeForOp::new(self, duration, scheduler)
  }

  /// Drops the values produced within `duration` of subscription.
  fn skip_for<SD: Scheduler>(self, duration: Duration, scheduler: SD) -> SkipForOp<Self, SD> {
    SkipForOp::new(self, duration, scheduler)
  }

  /// Emits values until `notifier` emits. A notifier that completes without
  /// a value never stops the source.
  fn take_until<N, NItem>(self, notifier: N) -> TakeUntilOp<Self, N, NItem>
  where
    N: ObservableExt<NItem, Err>,
  {
    TakeUntilOp::new(self, notifier)
  }

  /// Drops values until `notifier` emits.
  fn skip_until<N, NItem>(self, notifier: N) -> SkipUntilOp<Self, N, NItem>
  where
    N: ObservableExt<NItem, Err>,
  {
    SkipUntilOp::new(self, notifier)
  }

  /// Drops values equal to the previous one.
  #[allow(clippy::type_complexity)]
  fn distinct_until_changed(
    self,
  ) -> DistinctUntilChangedOp<Self, fn(&Item) -> Result<Item, Err>, fn(&Item, &Item) -> Result<bool, Err>>
  where
    Item: Clone + PartialEq,
  {
    DistinctUntilChangedOp::new(self, default_key::<Item, Err>, default_key_eq::<Item, Err>)
  }

  /// Drops values whose key equals the key of the previous value.
  fn distinct_until_key_changed<K, F>(self, key: F) -> DistinctUntilKeyChangedOp<Self, F>
  where
    F: FnMut(&Item) -> K,
    K: PartialEq,
  {
    DistinctUntilKeyChangedOp::new(self, key)
  }

  /// Drops values whose key `same` as the previous key. A failing key
  /// selector or comparer terminates the stream with its error.
  fn try_distinct_until_changed_by<K, F, C>(self, key: F, same: C) -> DistinctUntilChangedOp<Self, F, C>
  where
    F: FnMut(&Item) -> Result<K, Err>,
    C: FnMut(&K, &K) -> Result<bool, Err>,
  {
    DistinctUntilChangedOp::new(self, key, same)
  }

  /// Calls `f` with a reference to each value before passing it on.
  fn tap<F>(self, f: F) -> TapOp<Self, F>
  where
    F: FnMut(&Item),
  {
    TapOp::new(self, f)
  }

  /// Runs side effects for each notification. A side effect returning `Err`
  /// replaces the notification it saw with that error.
  fn try_tap<N, E, C>(self, on_next: N, on_error: E, on_complete: C) -> TryTapOp<Self, N, E, C>
  where
    N: FnMut(&Item) -> Result<(), Err>,
    E: FnOnce(&Err) -> Result<(), Err>,
    C: FnOnce() -> Result<(), Err>,
  {
    TryTapOp::new(self, on_next, on_error, on_complete)
  }

  /// `try_tap` with only a `next` side effect.
  #[allow(clippy::type_complexity)]
  fn try_tap_next<N>(self, on_next: N) -> TryTapOp<Self, N, fn(&Err) -> Result<(), Err>, fn() -> Result<(), Err>>
  where
    N: FnMut(&Item) -> Result<(), Err>,
  {
    TryTapOp::new(self, on_next, noop_error::<Err>, noop_complete::<Err>)
  }

  /// Calls `f` exactly once when the subscription ends, however it ends.
  fn finalize<F>(self, f: F) -> FinalizeOp<Self, F>
  where
    F: FnOnce(),
  {
    FinalizeOp::new(self, f)
  }

  /// On error, continues with the observable `handler` builds from it. An
  /// `Err` from the handler is delivered downstream instead.
  fn catch<R, H>(self, handler: H) -> CatchOp<Self, H, AnyError>
  where
    H: FnOnce(Err) -> Result<R, Err>,
  {
    CatchOp::new(self, handler, AnyError)
  }

  /// `catch` for errors of one kind only; other errors pass through.
  fn catch_kind<R, H>(self, kind: ErrorKind, handler: H) -> CatchOp<Self, H, ErrorKind>
  where
    H: FnOnce(Err) -> Result<R, Err>,
  {
    CatchOp::new(self, handler, kind)
  }

  /// `catch` for errors accepted by `filter`; other errors pass through.
  fn catch_when<R, H, P>(self, filter: P, handler: H) -> CatchOp<Self, H, ErrorPredicate<P>>
  where
    H: FnOnce(Err) -> Result<R, Err>,
    P: FnMut(&Err) -> bool,
  {
    CatchOp::new(self, handler, ErrorPredicate(filter))
  }

  /// Emits a value once `duration` passed without another value arriving.
  /// Completion flushes the pending value first, an error drops it.
  fn throttle<SD: Scheduler>(self, duration: Duration, scheduler: SD) -> ThrottleOp<Self, SD> {
    ThrottleOp::new(self, duration, scheduler)
  }

  /// Like `throttle`, the silence window of each value is the observable
  /// `selector` returns for it, ended by its first notification.
  fn throttle_with<D, DItem, F>(self, selector: F) -> ThrottleWithOp<Self, F, DItem>
  where
    F: FnMut(&Item) -> Result<D, Err>,
    D: ObservableExt<DItem, Err>,
  {
    ThrottleWithOp::new(self, selector)
  }

  /// Shifts every notification but errors by `duration`.
  fn delay<SD: Scheduler>(self, duration: Duration, scheduler: SD) -> DelayOp<Self, SD> {
    DelayOp::new(self, duration, scheduler)
  }

  /// Shares one upstream subscription through a [`Subject`], started by
  /// `connect`.
  fn publish(self) -> ConnectableObservable<Self, Subject<Item, Err>> { publish(self) }

  /// `publish` through a [`BehaviorSubject`] holding `seed`, so every
  /// subscriber first gets the latest value.
  fn publish_value(self, seed: Item) -> ConnectableObservable<Self, BehaviorSubject<Item, Err>> {
    publish_value(self, seed)
  }

  /// Erases the type of this observable.
  fn box_it(self) -> BoxOp<Item, Err>
  where
    Self: Observable<Item, Err, BoxObserver<Item, Err>> + 'static,
    <Self as Observable<Item, Err, BoxObserver<Item, Err>>>::Unsub: 'static,
  {
    BoxOp::new(self)
  }

  /// Erases the type of this observable, keeping it cloneable.
  fn box_it_clone(self) -> BoxOpClone<Item, Err>
  where
    Self: Observable<Item, Err, BoxObserver<Item, Err>> + Clone + 'static,
    <Self as Observable<Item, Err, BoxObserver<Item, Err>>>::Unsub: 'static,
  {
    BoxOpClone::new(self)
  }

  /// Subscribes `observer` behind a termination guard.
  fn subscribe_with<O>(self, observer: O) -> SubscriptionWrapper<Subscriber<O, Err>>
  where
    O: Observer<Item, Err>,
    Self: Observable<Item, Err, Subscriber<O, Err>>,
    <Self as Observable<Item, Err, Subscriber<O, Err>>>::Unsub: 'static,
  {
    let subscriber = Subscriber::new(observer);
    let upstream = self.actual_subscribe(subscriber.clone());
    subscriber.set_upstream(upstream);
    SubscriptionWrapper(subscriber)
  }

  /// Subscribes a `next` handler. Errors are logged as unobserved.
  fn subscribe<N>(self, next: N) -> SubscriptionWrapper<Subscriber<ObserverNext<N>, Err>>
  where
    N: FnMut(Item),
    Self: Observable<Item, Err, Subscriber<ObserverNext<N>, Err>>,
    <Self as Observable<Item, Err, Subscriber<ObserverNext<N>, Err>>>::Unsub: 'static,
  {
    self.subscribe_with(ObserverNext(next))
  }

  /// Subscribes one handler per notification kind.
  #[allow(clippy::type_complexity)]
  fn subscribe_all<N, E, C>(
    self, next: N, error: E, complete: C,
  ) -> SubscriptionWrapper<Subscriber<ObserverAll<N, E, C>, Err>>
  where
    N: FnMut(Item),
    E: FnOnce(Err),
    C: FnOnce(),
    Self: Observable<Item, Err, Subscriber<ObserverAll<N, E, C>, Err>>,
    <Self as Observable<Item, Err, Subscriber<ObserverAll<N, E, C>, Err>>>::Unsub: 'static,
  {
    self.subscribe_with(ObserverAll::new(next, error, complete))
  }
}

/// Marker keeping the item and error types of a source in its type.
pub(crate) type TypeHint<Item, Err> = PhantomData<fn() -> (Item, Err)>;
