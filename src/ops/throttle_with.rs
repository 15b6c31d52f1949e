use std::marker::PhantomData;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::{MutArc, RcDerefMut},
  subscriber::Subscriber,
  subscription::{SerialSubscription, SingleAssignmentSubscription, Subscription},
};

/// Throttle whose silence window is an observable chosen per value.
///
/// For every value `selector` returns a duration observable. The held value
/// is emitted on the first notification of its duration observable, unless a
/// newer value arrived first, in which case the older duration subscription
/// is dropped along with its value. A failing selector or a duration
/// observable error terminates the stream.
pub struct ThrottleWithOp<S, F, DItem> {
  source: S,
  selector: F,
  _hint: PhantomData<fn(DItem)>,
}

impl<S: Clone, F: Clone, DItem> Clone for ThrottleWithOp<S, F, DItem> {
  fn clone(&self) -> Self {
    ThrottleWithOp { source: self.source.clone(), selector: self.selector.clone(), _hint: PhantomData }
  }
}

impl<S, F, DItem> ThrottleWithOp<S, F, DItem> {
  #[inline]
  pub(crate) fn new(source: S, selector: F) -> Self { ThrottleWithOp { source, selector, _hint: PhantomData } }
}

impl<Item, Err, O, S, F, D, DItem> Observable<Item, Err, O> for ThrottleWithOp<S, F, DItem>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, ThrottleWithObserver<O, F, Item, Err, DItem>>,
  F: FnMut(&Item) -> Result<D, Err>,
  D: Observable<DItem, Err, DurationObserver<O, Item, Err>>,
  D::Unsub: 'static,
{
  type Unsub = (SerialSubscription, S::Unsub);

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let durations = SerialSubscription::default();
    let observer = ThrottleWithObserver {
      observer: Subscriber::new(observer),
      selector: self.selector,
      held: MutArc::own(None),
      next_id: 0,
      durations: durations.clone(),
      _hint: PhantomData,
    };
    let unsub = self.source.actual_subscribe(observer);
    (durations, unsub)
  }
}

impl<Item, Err, S, F, D, DItem> ObservableExt<Item, Err> for ThrottleWithOp<S, F, DItem>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> Result<D, Err>,
  D: ObservableExt<DItem, Err>,
{
}

/// The held value, tagged with the id of the value it is.
type Held<Item> = MutArc<Option<(usize, Item)>>;

pub struct ThrottleWithObserver<O, F, Item, Err, DItem> {
  observer: Subscriber<O, Err>,
  selector: F,
  held: Held<Item>,
  next_id: usize,
  durations: SerialSubscription,
  _hint: PhantomData<fn(DItem)>,
}

impl<Item, Err, O, F, D, DItem> Observer<Item, Err> for ThrottleWithObserver<O, F, Item, Err, DItem>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Result<D, Err>,
  D: Observable<DItem, Err, DurationObserver<O, Item, Err>>,
  D::Unsub: 'static,
{
  fn next(&mut self, value: Item) {
    let duration = match (self.selector)(&value) {
      Ok(duration) => duration,
      Err(err) => {
        self.durations.clear();
        self.held.rc_deref_mut().take();
        self.observer.clone().error(err);
        return;
      }
    };
    let id = self.next_id;
    self.next_id += 1;
    *self.held.rc_deref_mut() = Some((id, value));

    let slot = SingleAssignmentSubscription::default();
    self.durations.assign(slot.clone());
    let unsub = duration.actual_subscribe(DurationObserver {
      observer: self.observer.clone(),
      held: self.held.clone(),
      id,
      slot: slot.clone(),
    });
    // Fresh slot, assigning can only fail on a second assignment.
    let _ = slot.assign(unsub);
  }

  fn error(self, err: Err) {
    self.durations.clear();
    self.held.rc_deref_mut().take();
    self.observer.error(err)
  }

  fn complete(mut self) {
    self.durations.clear();
    let held = self.held.rc_deref_mut().take();
    if let Some((_, value)) = held {
      self.observer.next(value);
    }
    self.observer.complete()
  }

  #[inline]
  fn is_closed(&self) -> bool { Observer::<Item, Err>::is_closed(&self.observer) }
}

/// Watches the duration observable of one held value.
pub struct DurationObserver<O, Item, Err> {
  observer: Subscriber<O, Err>,
  held: Held<Item>,
  id: usize,
  slot: SingleAssignmentSubscription,
}

impl<O, Item, Err> DurationObserver<O, Item, Err> {
  fn emit(&mut self)
  where
    O: Observer<Item, Err>,
  {
    let value = {
      let mut held = self.held.rc_deref_mut();
      match held.take() {
        Some((id, value)) if id == self.id => Some(value),
        other => {
          *held = other;
          None
        }
      }
    };
    if let Some(value) = value {
      Observer::<Item, Err>::next(&mut self.observer, value);
    }
    self.slot.clone().unsubscribe();
  }
}

impl<DItem, Err, O, Item> Observer<DItem, Err> for DurationObserver<O, Item, Err>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, _: DItem) { self.emit() }

  fn error(self, err: Err) {
    self.held.rc_deref_mut().take();
    Observer::<Item, Err>::error(self.observer, err)
  }

  fn complete(mut self) { self.emit() }

  fn is_closed(&self) -> bool { self.slot.is_closed() || Subscription::is_closed(&self.observer) }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  #[test]
  fn duration_observable_releases_held_value() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_next(250, 3),
      on_completed(300),
    ]);
    let c_scheduler = scheduler.clone();
    let res = scheduler.start_with(move || {
      xs.throttle_with(move |_| {
        Ok(c_scheduler.create_cold_observable::<(), RxError>(vec![on_next(20, ())]))
      })
    });
    assert_eq!(res.messages(), vec![on_next(240, 2), on_next(270, 3), on_completed(300)]);
  }

  #[test]
  fn completing_duration_also_releases() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![on_next(210, 1), on_completed(300)]);
    let c_scheduler = scheduler.clone();
    let res = scheduler.start_with(move || {
      xs.throttle_with(move |_| Ok(c_scheduler.create_cold_observable::<(), RxError>(vec![on_completed(15)])))
    });
    assert_eq!(res.messages(), vec![on_next(225, 1), on_completed(300)]);
  }

  #[test]
  fn newer_value_disposes_older_duration() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_completed(300),
    ]);
    let durations = scheduler.create_cold_observable::<(), RxError>(vec![on_next(50, ())]);
    let c_durations = durations.clone();
    let res = scheduler.start_with(move || xs.throttle_with(move |_| Ok(c_durations.clone())));
    assert_eq!(res.messages(), vec![on_next(270, 2), on_completed(300)]);
    assert_eq!(durations.subscriptions(), vec![SubscriptionLog::new(210, 220), SubscriptionLog::new(220, 270)]);
  }

  #[test]
  fn failing_selector_terminates() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
      on_next(210, 1),
      on_next(220, 2),
      on_completed(300),
    ]);
    let c_xs = xs.clone();
    let c_scheduler = scheduler.clone();
    let res = scheduler.start_with(move || {
      c_xs.throttle_with(move |v| {
        if *v == 2 {
          Err(RxError::custom("selector", "two"))
        } else {
          Ok(c_scheduler.create_cold_observable::<(), RxError>(vec![on_next(50, ())]))
        }
      })
    });
    assert_eq!(res.messages(), vec![on_error(220, RxError::custom("selector", "two"))]);
    assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 220)]);
  }

  #[test]
  fn duration_error_terminates() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32, RxError>(vec![on_next(210, 1), on_completed(300)]);
    let c_scheduler = scheduler.clone();
    let res = scheduler.start_with(move || {
      xs.throttle_with(move |_| {
        Ok(c_scheduler.create_cold_observable::<(), RxError>(vec![on_error(5, RxError::Timeout)]))
      })
    });
    assert_eq!(res.messages(), vec![on_error(215, RxError::Timeout)]);
  }
}
