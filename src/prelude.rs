//! Prelude module for convenient imports

pub use crate::{
  error::{ErrorKind, RxError},
  notification::{Notification, Recorded, SubscriptionLog},
  observable,
  observable::{
    BoxOp, BoxOpClone, ConnectableObservable, Connection, Emitter, Observable, ObservableExt,
  },
  observer::{BoxObserver, Observer, ObserverAll, ObserverNext},
  ops::catch::{ErrorFilter, ErrorPredicate},
  scheduler::{
    test_scheduler::{on_completed, on_error, on_next, CREATED, DISPOSED, SUBSCRIBED},
    ColdObservable, CurrentThreadScheduler, HotObservable, Scheduler, Task, TaskHandle, TaskState,
    TestObserver, TestScheduler,
  },
  subject::{BehaviorSubject, Subject},
  subscriber::Subscriber,
  subscription::{
    BoxSubscription, CompositeSubscription, FnSubscription, SerialSubscription,
    SingleAssignmentSubscription, Subscription, SubscriptionGuard, SubscriptionWrapper,
  },
};
