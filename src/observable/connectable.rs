use tracing::debug;

use super::{Observable, ObservableExt};
use crate::{
  observer::Observer,
  ops::ref_count::RefCountOp,
  rc::{MutArc, RcDerefMut},
  subscription::{SingleAssignmentSubscription, Subscription},
};

/// Handle of the shared upstream subscription of a [`ConnectableObservable`].
///
/// Every `connect` made while a connection is live returns a handle to that
/// same connection; [`Connection::ptr_eq`] tells them apart.
#[derive(Clone, Default)]
pub struct Connection(SingleAssignmentSubscription);

impl Connection {
  pub fn ptr_eq(&self, other: &Self) -> bool { self.0.ptr_eq(&other.0) }
}

impl Subscription for Connection {
  fn unsubscribe(self) {
    debug!("connectable disconnect");
    self.0.unsubscribe()
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// Shares one subscription to `source` among every subscriber of the
/// subject `P`.
///
/// Subscribing only attaches to the subject; nothing flows until
/// [`ConnectableObservable::connect`] subscribes the subject to the source.
/// Clones share the subject and the connection.
pub struct ConnectableObservable<S, P> {
  source: S,
  subject: P,
  connection: MutArc<Option<Connection>>,
}

impl<S: Clone, P: Clone> Clone for ConnectableObservable<S, P> {
  fn clone(&self) -> Self {
    ConnectableObservable {
      source: self.source.clone(),
      subject: self.subject.clone(),
      connection: self.connection.clone(),
    }
  }
}

impl<S, P> ConnectableObservable<S, P> {
  pub fn new(source: S, subject: P) -> Self {
    ConnectableObservable { source, subject, connection: MutArc::own(None) }
  }

  /// Subscribes the subject to the source, unless already connected, in
  /// which case the live connection is returned. After that connection was
  /// unsubscribed, connecting subscribes the source anew.
  pub fn connect<Item, Err>(&self) -> Connection
  where
    S: Observable<Item, Err, P> + Clone,
    S::Unsub: 'static,
    P: Observer<Item, Err> + Clone,
  {
    let connection = {
      let mut slot = self.connection.rc_deref_mut();
      match slot.as_ref() {
        Some(live) if !live.is_closed() => return live.clone(),
        _ => {
          let connection = Connection::default();
          *slot = Some(connection.clone());
          connection
        }
      }
    };
    debug!("connectable connect");
    let upstream = self.source.clone().actual_subscribe(self.subject.clone());
    let assigned = connection.0.assign(upstream);
    debug_assert!(assigned.is_ok());
    connection
  }

  /// An observable that connects on its first subscriber and disconnects
  /// when its last subscriber leaves.
  pub fn ref_count(self) -> RefCountOp<S, P> { RefCountOp::new(self) }
}

impl<Item, Err, O, S, P> Observable<Item, Err, O> for ConnectableObservable<S, P>
where
  P: Observable<Item, Err, O> + Clone,
{
  type Unsub = P::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.subject.actual_subscribe(observer) }
}

impl<Item, Err, S, P> ObservableExt<Item, Err> for ConnectableObservable<S, P> where P: ObservableExt<Item, Err> {}
