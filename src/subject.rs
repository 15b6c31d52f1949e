//! Hot multicast sources that are also observers.
//!
//! A [`Subject`] forwards every notification it receives to the observers
//! subscribed at that moment. It is the target `publish` connects its
//! upstream to.

use tracing::trace;

use crate::{
  observable::{Observable, ObservableExt},
  observer::{BoxObserver, Observer},
  rc::{MutArc, RcDeref, RcDerefMut},
  subscriber::Subscriber,
  subscription::Subscription,
};

mod behavior_subject;

pub use behavior_subject::BehaviorSubject;

enum Terminal<Err> {
  Error(Err),
  Completed,
}

struct SubjectState<Item, Err> {
  next_id: usize,
  observers: Vec<(usize, Subscriber<BoxObserver<Item, Err>, Err>)>,
  terminal: Option<Terminal<Err>>,
}

/// Clones share the same observer list.
pub struct Subject<Item, Err>(MutArc<SubjectState<Item, Err>>);

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Subject(self.0.clone()) }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self {
    Subject(MutArc::own(SubjectState { next_id: 0, observers: vec![], terminal: None }))
  }
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Self::default() }

  /// Number of observers currently attached.
  pub fn len(&self) -> usize { self.0.rc_deref().observers.len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  fn snapshot(&self) -> Vec<Subscriber<BoxObserver<Item, Err>, Err>> {
    self.0.rc_deref().observers.iter().map(|(_, o)| o.clone()).collect()
  }

  /// Marks the subject terminated and detaches every observer.
  fn terminate(&self, terminal: Terminal<Err>) -> Option<Vec<Subscriber<BoxObserver<Item, Err>, Err>>> {
    let mut state = self.0.rc_deref_mut();
    if state.terminal.is_some() {
      return None;
    }
    state.terminal = Some(terminal);
    Some(state.observers.drain(..).map(|(_, o)| o).collect())
  }

  /// Attaches an already wrapped observer, or hands it the terminal if the
  /// subject is done.
  pub(crate) fn attach(&self, subscriber: Subscriber<BoxObserver<Item, Err>, Err>) -> SubjectSubscription<Item, Err>
  where
    Err: Clone,
  {
    let mut state = self.0.rc_deref_mut();
    let terminal = match &state.terminal {
      Some(Terminal::Error(err)) => Some(Terminal::Error(err.clone())),
      Some(Terminal::Completed) => Some(Terminal::Completed),
      None => None,
    };
    let id = state.next_id;
    match terminal {
      Some(terminal) => {
        drop(state);
        match terminal {
          Terminal::Error(err) => subscriber.clone().error(err),
          Terminal::Completed => subscriber.clone().complete(),
        }
      }
      None => {
        state.next_id += 1;
        state.observers.push((id, subscriber.clone()));
        trace!(observers = state.observers.len(), "subject attach");
      }
    }
    SubjectSubscription { subject: self.clone(), id, subscriber }
  }

  fn detach(&self, id: usize) {
    let mut state = self.0.rc_deref_mut();
    if let Some(pos) = state.observers.iter().position(|(i, _)| *i == id) {
      state.observers.remove(pos);
      trace!(observers = state.observers.len(), "subject detach");
    }
  }
}

impl<Item, Err> Observer<Item, Err> for Subject<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) {
    for mut observer in self.snapshot() {
      observer.next(value.clone());
    }
  }

  fn error(self, err: Err) {
    if let Some(observers) = self.terminate(Terminal::Error(err.clone())) {
      for observer in observers {
        observer.error(err.clone());
      }
    }
  }

  fn complete(self) {
    if let Some(observers) = self.terminate(Terminal::Completed) {
      for observer in observers {
        observer.complete();
      }
    }
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().terminal.is_some() }
}

impl<Item, Err, O> Observable<Item, Err, O> for Subject<Item, Err>
where
  O: Observer<Item, Err> + 'static,
  Err: Clone,
{
  type Unsub = SubjectSubscription<Item, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.attach(Subscriber::new(Box::new(observer) as BoxObserver<Item, Err>))
  }
}

impl<Item, Err> ObservableExt<Item, Err> for Subject<Item, Err> {}

/// Detaches one observer from a subject.
pub struct SubjectSubscription<Item, Err> {
  subject: Subject<Item, Err>,
  id: usize,
  subscriber: Subscriber<BoxObserver<Item, Err>, Err>,
}

impl<Item, Err> Subscription for SubjectSubscription<Item, Err> {
  fn unsubscribe(self) {
    self.subject.detach(self.id);
    self.subscriber.unsubscribe();
  }

  fn is_closed(&self) -> bool { Subscription::is_closed(&self.subscriber) }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::{error::RxError, observable::ObservableExt};

  #[test]
  fn multicasts_to_current_observers() {
    let log = Rc::new(RefCell::new(vec![]));
    let mut subject = Subject::<i32, RxError>::new();
    let c_log = log.clone();
    subject.clone().subscribe(move |v| c_log.borrow_mut().push(("a", v)));
    subject.next(1);
    let c_log = log.clone();
    subject.clone().subscribe(move |v| c_log.borrow_mut().push(("b", v)));
    subject.next(2);
    assert_eq!(*log.borrow(), vec![("a", 1), ("a", 2), ("b", 2)]);
    assert_eq!(subject.len(), 2);
  }

  #[test]
  fn unsubscribe_detaches() {
    let hits = Rc::new(RefCell::new(0));
    let mut subject = Subject::<i32, RxError>::new();
    let c_hits = hits.clone();
    let subscription = subject.clone().subscribe(move |_| *c_hits.borrow_mut() += 1);
    subject.next(1);
    subscription.unsubscribe();
    subject.next(2);
    assert_eq!(*hits.borrow(), 1);
    assert!(subject.is_empty());
  }

  #[test]
  fn late_subscriber_gets_terminal_only() {
    let subject = Subject::<i32, RxError>::new();
    subject.clone().error(RxError::Timeout);
    let got = Rc::new(RefCell::new(None));
    let c_got = got.clone();
    subject.clone().subscribe_all(|_| {}, move |e| *c_got.borrow_mut() = Some(e), || {});
    assert_eq!(*got.borrow(), Some(RxError::Timeout));
    assert!(subject.is_empty());
  }

  #[test]
  fn observer_unsubscribing_itself_during_next() {
    let subject = Subject::<i32, RxError>::new();
    let slot: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::default();
    let hits = Rc::new(RefCell::new(vec![]));
    let (c_slot, c_hits) = (slot.clone(), hits.clone());
    let subscription = subject.clone().subscribe(move |v| {
      c_hits.borrow_mut().push(v);
      let unsubscribe = c_slot.borrow_mut().take();
      if let Some(unsubscribe) = unsubscribe {
        unsubscribe();
      }
    });
    *slot.borrow_mut() = Some(Box::new(move || subscription.unsubscribe()));
    let mut c_subject = subject.clone();
    c_subject.next(1);
    c_subject.next(2);
    assert_eq!(*hits.borrow(), vec![1]);
  }

  #[test]
  fn observer_completing_its_subject_during_next() {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
      let mut subject = Subject::<i32, RxError>::new();
      let events = Rc::new(RefCell::new(vec![]));
      let (n, c) = (events.clone(), events.clone());
      let c_subject = subject.clone();
      subject.clone().subscribe_all(
        move |v| {
          n.borrow_mut().push(format!("next {v}"));
          c_subject.clone().complete();
        },
        |_| {},
        move || c.borrow_mut().push("complete".to_owned()),
      );
      subject.next(1);
      subject.next(2);
      let _ = tx.send(events.take());
    });
    let events = rx.recv_timeout(std::time::Duration::from_secs(3)).expect("delivery never returned");
    assert_eq!(events, vec!["next 1", "complete"]);
  }
}
