//! # rxcore: a push-based reactive streams engine
//!
//! Observables push values to observers until they complete or fail.
//! Operators compose observables, schedulers decide when work runs, and a
//! virtual-time [`TestScheduler`](scheduler::TestScheduler) makes every
//! timing behavior reproducible in tests.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let mut seen = vec![];
//! observable::from_iter::<_, RxError>(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| seen.push(v));
//! assert_eq!(seen, vec![0, 4, 8, 12, 16]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Subscribes an observer to a source |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`Subscriber`] | Guard enforcing the notification grammar |
//! | [`Scheduler`] | Runs tasks now, later, or periodically |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): a [`Scheduler`] for the `futures`
//!   local executor, timers backed by `futures-time`.
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Subscriber`]: subscriber::Subscriber
//! [`Scheduler`]: scheduler::Scheduler

pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;

pub use prelude::*;
