use tracing::debug;

use crate::{
  observable::{Connection, ConnectableObservable, Observable, ObservableExt},
  observer::Observer,
  rc::{MutArc, RcDerefMut},
  subscription::Subscription,
};

#[derive(Default)]
struct RefCountState {
  subscribers: usize,
  connection: Option<Connection>,
}

/// Connects a [`ConnectableObservable`] when its first subscriber arrives and
/// disconnects it when the last one leaves. A later subscriber connects
/// again. Clones share the count and the connection.
pub struct RefCountOp<S, P> {
  connectable: ConnectableObservable<S, P>,
  state: MutArc<RefCountState>,
}

impl<S: Clone, P: Clone> Clone for RefCountOp<S, P> {
  fn clone(&self) -> Self { RefCountOp { connectable: self.connectable.clone(), state: self.state.clone() } }
}

impl<S, P> RefCountOp<S, P> {
  pub(crate) fn new(connectable: ConnectableObservable<S, P>) -> Self {
    RefCountOp { connectable, state: MutArc::own(RefCountState::default()) }
  }
}

impl<Item, Err, O, S, P> Observable<Item, Err, O> for RefCountOp<S, P>
where
  S: Observable<Item, Err, P> + Clone,
  S::Unsub: 'static,
  P: Observable<Item, Err, O> + Observer<Item, Err> + Clone,
{
  type Unsub = RefCountSubscription<P::Unsub>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let inner = self.connectable.clone().actual_subscribe(observer);
    let first = {
      let mut state = self.state.rc_deref_mut();
      state.subscribers += 1;
      state.subscribers == 1
    };
    if first {
      debug!("ref count connecting on first subscriber");
      let connection = self.connectable.connect::<Item, Err>();
      self.state.rc_deref_mut().connection = Some(connection);
    }
    RefCountSubscription { inner, state: self.state }
  }
}

impl<Item, Err, S, P> ObservableExt<Item, Err> for RefCountOp<S, P> where P: ObservableExt<Item, Err> {}

/// Detaches one subscriber and, if it was the last one, disconnects.
pub struct RefCountSubscription<U> {
  inner: U,
  state: MutArc<RefCountState>,
}

impl<U: Subscription> Subscription for RefCountSubscription<U> {
  fn unsubscribe(self) {
    self.inner.unsubscribe();
    let last = {
      let mut state = self.state.rc_deref_mut();
      state.subscribers = state.subscribers.saturating_sub(1);
      if state.subscribers == 0 { state.connection.take() } else { None }
    };
    if let Some(connection) = last {
      debug!("ref count disconnecting after last subscriber");
      connection.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.inner.is_closed() }
}
