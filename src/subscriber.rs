use std::{
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  thread::{self, ThreadId},
};

use crate::{
  observer::Observer,
  rc::{MutArc, RcDerefMut},
  subscription::{BoxSubscription, Subscription},
};

enum Terminal<Err> {
  Error(Err),
  Complete,
}

impl<Err> Terminal<Err> {
  fn deliver<Item, O: Observer<Item, Err>>(self, observer: O) {
    match self {
      Terminal::Error(err) => observer.error(err),
      Terminal::Complete => observer.complete(),
    }
  }
}

/// The termination guard every consumer and every fan-in operator sits behind.
///
/// A `Subscriber` is at the same time the observer handed upstream and the
/// subscription handed back to the consumer:
///
/// - delivery is serialized through one lock, so producers racing on
///   different threads never interleave calls into the wrapped observer;
/// - after the first `error` or `complete` every later notification is
///   dropped, and the upstream subscription registered with
///   [`Subscriber::set_upstream`] is released exactly once;
/// - `unsubscribe` flips an atomic flag first, so it stops delivery at once,
///   never blocks on an in-flight delivery, and may be called from inside a
///   callback of the same subscription.
///
/// A terminal raised on the thread that is inside `next` (a consumer
/// completing the subject it listens to, say) cannot take the lock. It is
/// parked and delivered by that `next` as soon as the callback returns.
pub struct Subscriber<O, Err> {
  closed: Arc<AtomicBool>,
  observer: MutArc<Option<O>>,
  delivering: MutArc<Option<ThreadId>>,
  pending: MutArc<Option<Terminal<Err>>>,
  upstream: MutArc<Option<BoxSubscription>>,
}

impl<O, Err> Clone for Subscriber<O, Err> {
  fn clone(&self) -> Self {
    Subscriber {
      closed: self.closed.clone(),
      observer: self.observer.clone(),
      delivering: self.delivering.clone(),
      pending: self.pending.clone(),
      upstream: self.upstream.clone(),
    }
  }
}

impl<O, Err> Subscriber<O, Err> {
  pub fn new(observer: O) -> Self {
    Subscriber {
      closed: Arc::new(AtomicBool::new(false)),
      observer: MutArc::own(Some(observer)),
      delivering: MutArc::own(None),
      pending: MutArc::own(None),
      upstream: MutArc::own(None),
    }
  }

  /// Registers the subscription to tear down when this subscriber
  /// terminates. If it already terminated, `upstream` is released right away.
  pub fn set_upstream(&self, upstream: impl Subscription + 'static) {
    if self.closed.load(Ordering::Acquire) {
      upstream.unsubscribe();
      return;
    }
    let prev = self.upstream.rc_deref_mut().replace(BoxSubscription::new(upstream));
    if let Some(prev) = prev {
      prev.unsubscribe();
    }
    // Closed while storing: the closer may have already looked at the slot.
    if self.closed.load(Ordering::Acquire) {
      self.release_upstream();
    }
  }

  fn release_upstream(&self) {
    let upstream = self.upstream.rc_deref_mut().take();
    if let Some(upstream) = upstream {
      upstream.unsubscribe();
    }
  }

  fn delivering_here(&self) -> bool { *self.delivering.rc_deref_mut() == Some(thread::current().id()) }

  fn terminate<Item>(&self, terminal: Terminal<Err>)
  where
    O: Observer<Item, Err>,
  {
    if self.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    let observer = match self.observer.try_rc_deref_mut().map(|mut o| o.take()) {
      Some(observer) => observer,
      None if self.delivering_here() => {
        *self.pending.rc_deref_mut() = Some(terminal);
        return;
      }
      // Another thread is delivering, wait for it.
      None => self.observer.rc_deref_mut().take(),
    };
    if let Some(o) = observer {
      terminal.deliver::<Item, O>(o);
    }
    self.release_upstream();
  }
}

impl<Item, Err, O> Observer<Item, Err> for Subscriber<O, Err>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.closed.load(Ordering::Acquire) {
      return;
    }
    let mut observer = self.observer.rc_deref_mut();
    if let Some(o) = observer.as_mut() {
      *self.delivering.rc_deref_mut() = Some(thread::current().id());
      o.next(value);
      self.delivering.rc_deref_mut().take();
    }
    if self.closed.load(Ordering::Acquire) {
      let o = observer.take();
      drop(observer);
      let pending = self.pending.rc_deref_mut().take();
      if let (Some(o), Some(terminal)) = (o, pending) {
        terminal.deliver::<Item, O>(o);
        self.release_upstream();
      }
    }
  }

  fn error(self, err: Err) { self.terminate::<Item>(Terminal::Error(err)) }

  fn complete(self) { self.terminate::<Item>(Terminal::Complete) }

  #[inline]
  fn is_closed(&self) -> bool { self.closed.load(Ordering::Acquire) }
}

impl<O, Err> Subscription for Subscriber<O, Err> {
  fn unsubscribe(self) {
    if !self.closed.swap(true, Ordering::AcqRel) {
      // A delivery in flight holds the lock and drops the observer itself
      // once it sees the flag.
      if let Some(mut observer) = self.observer.try_rc_deref_mut() {
        observer.take();
      }
    }
    self.release_upstream();
  }

  #[inline]
  fn is_closed(&self) -> bool { self.closed.load(Ordering::Acquire) }
}
