use super::{Subject, SubjectSubscription};
use crate::{
  observable::{Observable, ObservableExt},
  observer::{BoxObserver, Observer},
  rc::{MutArc, RcDeref, RcDerefMut},
  subscriber::Subscriber,
};

/// A subject holding a current value: every new subscriber first receives
/// the latest value, then whatever follows. Once terminated it only replays
/// the terminal.
pub struct BehaviorSubject<Item, Err> {
  subject: Subject<Item, Err>,
  value: MutArc<Item>,
}

impl<Item, Err> Clone for BehaviorSubject<Item, Err> {
  fn clone(&self) -> Self { BehaviorSubject { subject: self.subject.clone(), value: self.value.clone() } }
}

impl<Item, Err> BehaviorSubject<Item, Err> {
  pub fn new(value: Item) -> Self { BehaviorSubject { subject: Subject::new(), value: MutArc::own(value) } }

  /// The latest value.
  pub fn value(&self) -> Item
  where
    Item: Clone,
  {
    self.value.rc_deref().clone()
  }

  pub fn len(&self) -> usize { self.subject.len() }

  pub fn is_empty(&self) -> bool { self.subject.is_empty() }
}

impl<Item, Err> Observer<Item, Err> for BehaviorSubject<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) {
    *self.value.rc_deref_mut() = value.clone();
    self.subject.next(value);
  }

  #[inline]
  fn error(self, err: Err) { self.subject.error(err) }

  #[inline]
  fn complete(self) { self.subject.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.subject.is_closed() }
}

impl<Item, Err, O> Observable<Item, Err, O> for BehaviorSubject<Item, Err>
where
  O: Observer<Item, Err> + 'static,
  Item: Clone,
  Err: Clone,
{
  type Unsub = SubjectSubscription<Item, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let mut subscriber = Subscriber::new(Box::new(observer) as BoxObserver<Item, Err>);
    if !self.subject.is_closed() {
      let value = self.value();
      subscriber.next(value);
    }
    self.subject.attach(subscriber)
  }
}

impl<Item, Err> ObservableExt<Item, Err> for BehaviorSubject<Item, Err> {}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::error::RxError;

  #[test]
  fn replays_latest_value() {
    let log = Rc::new(RefCell::new(vec![]));
    let mut subject = BehaviorSubject::<i32, RxError>::new(0);
    let c_log = log.clone();
    subject.clone().subscribe(move |v| c_log.borrow_mut().push(("a", v)));
    subject.next(1);
    let c_log = log.clone();
    subject.clone().subscribe(move |v| c_log.borrow_mut().push(("b", v)));
    subject.next(2);
    assert_eq!(*log.borrow(), vec![("a", 0), ("a", 1), ("b", 1), ("a", 2), ("b", 2)]);
    assert_eq!(subject.value(), 2);
  }

  #[test]
  fn completed_replays_only_completion() {
    let subject = BehaviorSubject::<i32, RxError>::new(5);
    subject.clone().complete();
    let log = Rc::new(RefCell::new(vec![]));
    let (c_next, c_complete) = (log.clone(), log.clone());
    subject.subscribe_all(
      move |v| c_next.borrow_mut().push(v),
      |_| {},
      move || c_complete.borrow_mut().push(-1),
    );
    assert_eq!(*log.borrow(), vec![-1]);
  }
}
