//! Virtual-time scenarios exercising operator chains end to end.

use rxcore::prelude::*;

#[test]
fn cold_source_replays_per_subscription() {
  let scheduler = TestScheduler::new();
  let xs = scheduler.create_cold_observable::<i32, RxError>(vec![
    on_next(10, 1),
    on_next(20, 2),
    on_completed(30),
  ]);
  let first = scheduler.create_observer::<i32, RxError>();
  let second = scheduler.create_observer::<i32, RxError>();

  let (c_xs, c_first) = (xs.clone(), first.clone());
  scheduler.schedule_absolute(200, move || {
    c_xs.subscribe_with(c_first);
  });
  let (c_xs, c_second) = (xs.clone(), second.clone());
  scheduler.schedule_absolute(240, move || {
    c_xs.subscribe_with(c_second);
  });
  scheduler.start();

  assert_eq!(first.messages(), vec![on_next(210, 1), on_next(220, 2), on_completed(230)]);
  assert_eq!(second.messages(), vec![on_next(250, 1), on_next(260, 2), on_completed(270)]);
  assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 230), SubscriptionLog::new(240, 270)]);
}

#[test]
fn hot_source_shares_one_timeline() {
  let scheduler = TestScheduler::new();
  let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
    on_next(210, 1),
    on_next(250, 2),
    on_completed(280),
  ]);
  let first = scheduler.create_observer::<i32, RxError>();
  let second = scheduler.create_observer::<i32, RxError>();

  let (c_xs, c_first) = (xs.clone(), first.clone());
  scheduler.schedule_absolute(200, move || {
    c_xs.subscribe_with(c_first);
  });
  let (c_xs, c_second) = (xs.clone(), second.clone());
  scheduler.schedule_absolute(240, move || {
    c_xs.subscribe_with(c_second);
  });
  scheduler.start();

  assert_eq!(first.messages(), vec![on_next(210, 1), on_next(250, 2), on_completed(280)]);
  assert_eq!(second.messages(), vec![on_next(250, 2), on_completed(280)]);
}

#[test]
fn catch_switches_to_the_handler_source() {
  let scheduler = TestScheduler::new();
  let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
    on_next(210, 2),
    on_next(220, 3),
    on_error(230, RxError::custom("io", "broken pipe")),
  ]);
  let ys = scheduler.create_hot_observable::<i32, RxError>(vec![on_next(240, 4), on_completed(250)]);
  let (c_xs, c_ys) = (xs.clone(), ys.clone());
  let res = scheduler.start_with(move || c_xs.catch_kind(ErrorKind::Custom("io"), move |_| Ok(c_ys)));

  assert_eq!(res.messages(), vec![on_next(210, 2), on_next(220, 3), on_next(240, 4), on_completed(250)]);
  assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(200, 230)]);
  assert_eq!(ys.subscriptions(), vec![SubscriptionLog::new(230, 250)]);
}

#[test]
fn concat_windows_are_contiguous() {
  let scheduler = TestScheduler::new();
  let o1 = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(10, 1), on_completed(40)]);
  let o2 = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(10, 2), on_completed(30)]);
  let o3 = scheduler.create_cold_observable::<i32, RxError>(vec![on_next(20, 3), on_completed(50)]);
  let (c1, c2, c3) = (o1.clone(), o2.clone(), o3.clone());
  let res = scheduler.start_with(move || observable::concat(vec![c1, c2, c3]));

  assert_eq!(res.messages(), vec![on_next(210, 1), on_next(250, 2), on_next(290, 3), on_completed(320)]);
  assert_eq!(o1.subscriptions(), vec![SubscriptionLog::new(200, 240)]);
  assert_eq!(o2.subscriptions(), vec![SubscriptionLog::new(240, 270)]);
  assert_eq!(o3.subscriptions(), vec![SubscriptionLog::new(270, 320)]);
}

#[test]
fn throttle_emits_once_per_burst() {
  let scheduler = TestScheduler::new();
  let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
    on_next(210, 1),
    on_next(219, 2),
    on_next(228, 3),
    on_next(300, 4),
    on_next(309, 5),
    on_completed(400),
  ]);
  let c_scheduler = scheduler.clone();
  let res = scheduler.start_with(move || xs.throttle(TestScheduler::ticks(10), c_scheduler));

  assert_eq!(res.messages(), vec![on_next(238, 3), on_next(319, 5), on_completed(400)]);
}

#[test]
fn throttle_all_dropped_error_end() {
  let scheduler = TestScheduler::new();
  let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
    on_next(210, 1),
    on_next(220, 2),
    on_next(230, 3),
    on_error(240, RxError::custom("source", "failed")),
  ]);
  let c_scheduler = scheduler.clone();
  let res = scheduler.start_with(move || xs.throttle(TestScheduler::ticks(20), c_scheduler));

  assert_eq!(res.messages(), vec![on_error(240, RxError::custom("source", "failed"))]);
}

#[test]
fn publish_before_connect_receives_nothing_earlier() {
  let scheduler = TestScheduler::new();
  let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
    on_next(210, 1),
    on_next(230, 2),
    on_completed(300),
  ]);
  let published = xs.clone().publish();
  let observer = scheduler.create_observer::<i32, RxError>();
  let connections = std::rc::Rc::new(std::cell::RefCell::new(vec![]));

  let (c_published, c_observer) = (published.clone(), observer.clone());
  scheduler.schedule_absolute(200, move || {
    c_published.subscribe_with(c_observer);
  });
  let (c_published, c_connections) = (published.clone(), connections.clone());
  scheduler.schedule_absolute(220, move || {
    let first = c_published.connect();
    let second = c_published.connect();
    c_connections.borrow_mut().push(first.ptr_eq(&second));
  });
  scheduler.start();

  assert_eq!(observer.messages(), vec![on_next(230, 2), on_completed(300)]);
  assert_eq!(*connections.borrow(), vec![true]);
  assert_eq!(xs.subscriptions(), vec![SubscriptionLog::new(220, 300)]);
}

#[test]
fn take_last_zero_yields_only_the_terminal() {
  let scheduler = TestScheduler::new();
  let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
    on_next(210, 1),
    on_next(220, 2),
    on_error(230, RxError::Timeout),
  ]);
  let res = scheduler.start_with(move || xs.take_last(0));
  assert_eq!(res.messages(), vec![on_error(230, RxError::Timeout)]);
}

#[test]
fn take_reproduces_the_prefix_of_a_cold_source() {
  let recorded = vec![on_next(10, 1), on_next(20, 2), on_next(35, 3), on_completed(50)];

  let scheduler = TestScheduler::new();
  let xs = scheduler.create_cold_observable::<i32, RxError>(recorded.clone());
  let full = scheduler.start_with(move || xs).messages();

  for n in 1..=3 {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_cold_observable::<i32, RxError>(recorded.clone());
    let res = scheduler.start_with(move || xs.take(n)).messages();
    let mut expected = full[..n].to_vec();
    expected.push(on_completed(full[n - 1].time));
    assert_eq!(res, expected);
  }
}

#[test]
fn chained_operators_on_virtual_time() {
  let scheduler = TestScheduler::new();
  let xs = scheduler.create_hot_observable::<i32, RxError>(vec![
    on_next(205, 1),
    on_next(210, 1),
    on_next(220, 2),
    on_next(230, 2),
    on_next(240, 3),
    on_next(250, 4),
    on_next(260, 5),
    on_completed(270),
  ]);
  let res = scheduler.start_with(move || {
    xs.distinct_until_changed()
      .map(|v| v * 10)
      .skip(1)
      .filter(|v| *v != 40)
      .take(2)
  });
  assert_eq!(res.messages(), vec![on_next(220, 20), on_next(240, 30), on_completed(240)]);
}

#[test]
fn generate_feeds_delayed_merge() {
  let scheduler = TestScheduler::new();
  let c_scheduler = scheduler.clone();
  let res = scheduler.start_with(move || {
    let ticks = observable::generate_timed(
      0,
      |x| *x < 3,
      |x| x + 1,
      |x| *x,
      |_| TestScheduler::ticks(10),
      c_scheduler.clone(),
    );
    let later = observable::timer::<_, RxError, _>(100, TestScheduler::ticks(15), c_scheduler.clone());
    ticks.merge(later.delay(TestScheduler::ticks(10), c_scheduler))
  });
  assert_eq!(
    res.messages(),
    vec![on_next(210, 0), on_next(220, 1), on_next(225, 100), on_next(230, 2), on_completed(230)]
  );
}
