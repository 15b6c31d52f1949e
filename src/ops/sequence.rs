//! Engine shared by the N-ary `concat`, `catch_all` and
//! `on_error_resume_next`: subscribe the sources of an iterator one after
//! the other.
//!
//! A source that terminates synchronously while being subscribed must not
//! subscribe its successor from inside that call, or a long sequence of
//! synchronous sources would grow the stack without bound. Advancing bumps a
//! pending counter instead; only the outermost caller drains it, in a loop.

use std::marker::PhantomData;

use tracing::debug;

use crate::{
  observable::Observable,
  observer::Observer,
  rc::{MutArc, RcDerefMut},
  subscriber::Subscriber,
  subscription::{SerialSubscription, SingleAssignmentSubscription, Subscription},
};

/// Which terminal of the active source moves on to the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Advance {
  /// `concat`: completion advances, an error is terminal.
  OnComplete,
  /// `catch_all`: an error advances, completion is terminal. Running out of
  /// sources forwards the last error.
  OnError,
  /// `on_error_resume_next`: both advance, errors are dropped.
  OnEither,
}

/// Iterator adapter turning plain sources into the fallible form the engine
/// consumes.
pub struct OkSources<I, Err>(I, PhantomData<fn() -> Err>);

impl<I, Err> OkSources<I, Err> {
  pub(crate) fn new(iter: I) -> Self { OkSources(iter, PhantomData) }
}

impl<I: Clone, Err> Clone for OkSources<I, Err> {
  fn clone(&self) -> Self { OkSources(self.0.clone(), PhantomData) }
}

impl<I: Iterator, Err> Iterator for OkSources<I, Err> {
  type Item = Result<I::Item, Err>;

  #[inline]
  fn next(&mut self) -> Option<Self::Item> { self.0.next().map(Ok) }
}

struct SequenceState<I, Err> {
  sources: I,
  pending: usize,
  draining: bool,
  last_error: Option<Err>,
}

pub struct SequenceObserver<I, O, Err> {
  state: MutArc<SequenceState<I, Err>>,
  observer: Subscriber<O, Err>,
  serial: SerialSubscription,
  mode: Advance,
}

impl<I, O, Err> Clone for SequenceObserver<I, O, Err> {
  fn clone(&self) -> Self {
    SequenceObserver {
      state: self.state.clone(),
      observer: self.observer.clone(),
      serial: self.serial.clone(),
      mode: self.mode,
    }
  }
}

/// Subscribes `observer` to the first source of `sources` and returns the
/// handle of whichever source is active.
pub(crate) fn subscribe_sequence<Item, Err, O, I, S>(
  sources: I, observer: O, mode: Advance,
) -> SerialSubscription
where
  O: Observer<Item, Err>,
  I: Iterator<Item = Result<S, Err>>,
  S: Observable<Item, Err, SequenceObserver<I, O, Err>>,
  S::Unsub: 'static,
{
  let sequence = SequenceObserver {
    state: MutArc::own(SequenceState { sources, pending: 0, draining: false, last_error: None }),
    observer: Subscriber::new(observer),
    serial: SerialSubscription::default(),
    mode,
  };
  sequence.advance::<Item, S>();
  sequence.serial
}

impl<I, O, Err> SequenceObserver<I, O, Err> {
  fn stopped<Item>(&self) -> bool
  where
    O: Observer<Item, Err>,
  {
    Observer::<Item, Err>::is_closed(&self.observer) || self.serial.is_closed()
  }

  fn advance<Item, S>(&self)
  where
    O: Observer<Item, Err>,
    I: Iterator<Item = Result<S, Err>>,
    S: Observable<Item, Err, Self>,
    S::Unsub: 'static,
  {
    {
      let mut state = self.state.rc_deref_mut();
      state.pending += 1;
      if state.draining {
        return;
      }
      state.draining = true;
    }
    loop {
      let next = {
        let mut state = self.state.rc_deref_mut();
        if state.pending == 0 || self.stopped::<Item>() {
          state.draining = false;
          return;
        }
        state.pending -= 1;
        state.sources.next()
      };
      match next {
        Some(Ok(source)) => {
          debug!(mode = ?self.mode, "subscribing the next source");
          let slot = SingleAssignmentSubscription::default();
          self.serial.assign(slot.clone());
          let unsub = source.actual_subscribe(self.clone());
          // Fresh slot, assigning can only fail on a second assignment.
          let _ = slot.assign(unsub);
        }
        Some(Err(err)) => Observer::<Item, Err>::error(self.observer.clone(), err),
        None => {
          let last_error = self.state.rc_deref_mut().last_error.take();
          match last_error {
            Some(err) => Observer::<Item, Err>::error(self.observer.clone(), err),
            None => Observer::<Item, Err>::complete(self.observer.clone()),
          }
        }
      }
    }
  }
}

impl<Item, Err, O, I, S> Observer<Item, Err> for SequenceObserver<I, O, Err>
where
  O: Observer<Item, Err>,
  I: Iterator<Item = Result<S, Err>>,
  S: Observable<Item, Err, Self>,
  S::Unsub: 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) {
    match self.mode {
      Advance::OnComplete => self.observer.error(err),
      Advance::OnError => {
        debug!("source failed, recovering with the next one");
        self.state.rc_deref_mut().last_error = Some(err);
        self.advance::<Item, S>();
      }
      Advance::OnEither => self.advance::<Item, S>(),
    }
  }

  fn complete(self) {
    match self.mode {
      Advance::OnError => self.observer.complete(),
      Advance::OnComplete | Advance::OnEither => self.advance::<Item, S>(),
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.stopped::<Item>() }
}
