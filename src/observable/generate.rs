//! Sources unfolding a state machine on a scheduler.
//!
//! Every step checks `condition` on the current state, emits `select` of it,
//! and moves on with `iterate`. The first state failing the condition
//! completes the stream. The `try_` variants take callbacks returning
//! `Result`; the first `Err` any of them returns ends the stream with it.

use std::time::Duration;

use super::{Observable, ObservableExt, TypeHint};
use crate::{
  observer::Observer,
  scheduler::{Scheduler, Task, TaskHandle, TaskState},
};

/// A per-state callback of the generators.
pub trait StateFn<State, Out, Err> {
  fn call(&mut self, state: &State) -> Result<Out, Err>;
}

/// A callback that cannot fail.
#[derive(Clone)]
pub struct Infallible<F>(F);

impl<State, Out, Err, F> StateFn<State, Out, Err> for Infallible<F>
where
  F: FnMut(&State) -> Out,
{
  #[inline]
  fn call(&mut self, state: &State) -> Result<Out, Err> { Ok((self.0)(state)) }
}

/// A callback returning `Result`.
#[derive(Clone)]
pub struct Fallible<F>(F);

impl<State, Out, Err, F> StateFn<State, Out, Err> for Fallible<F>
where
  F: FnMut(&State) -> Result<Out, Err>,
{
  #[inline]
  fn call(&mut self, state: &State) -> Result<Out, Err> { (self.0)(state) }
}

/// Unfolds `initial` as fast as the scheduler allows.
///
/// Each value is its own scheduled step, so a long or endless sequence never
/// blocks the scheduler or grows the stack.
///
/// ```
/// use rxcore::prelude::*;
///
/// let scheduler = TestScheduler::new();
/// let c_scheduler = scheduler.clone();
/// let res = scheduler.start_with(move || {
///   observable::generate::<_, _, RxError, _, _, _, _>(0, |x| *x < 3, |x| x + 1, |x| x * 10, c_scheduler)
/// });
/// assert_eq!(
///   res.messages(),
///   vec![on_next(201, 0), on_next(202, 10), on_next(203, 20), on_completed(204)]
/// );
/// ```
pub fn generate<State, Item, Err, C, I, R, SD>(
  initial: State, condition: C, iterate: I, select: R, scheduler: SD,
) -> Generate<State, Infallible<C>, Infallible<I>, Infallible<R>, SD, Item, Err>
where
  C: FnMut(&State) -> bool,
  I: FnMut(&State) -> State,
  R: FnMut(&State) -> Item,
{
  Generate::new(initial, Infallible(condition), Infallible(iterate), Infallible(select), scheduler)
}

/// [`generate`] with fallible callbacks. A failing `iterate` errors on the
/// step that would have produced the next value.
pub fn try_generate<State, Item, Err, C, I, R, SD>(
  initial: State, condition: C, iterate: I, select: R, scheduler: SD,
) -> Generate<State, Fallible<C>, Fallible<I>, Fallible<R>, SD, Item, Err>
where
  C: FnMut(&State) -> Result<bool, Err>,
  I: FnMut(&State) -> Result<State, Err>,
  R: FnMut(&State) -> Result<Item, Err>,
{
  Generate::new(initial, Fallible(condition), Fallible(iterate), Fallible(select), scheduler)
}

/// Unfolds `initial`, holding each value back for the relative delay
/// `time_selector` gives for its state.
///
/// Every delay is measured from when the previous value actually fired, not
/// from the subscription, so a slow scheduler shifts the rest of the
/// sequence instead of compressing it.
#[allow(clippy::type_complexity)]
pub fn generate_timed<State, Item, Err, C, I, R, T, SD>(
  initial: State, condition: C, iterate: I, select: R, time_selector: T, scheduler: SD,
) -> GenerateTimed<State, Infallible<C>, Infallible<I>, Infallible<R>, Infallible<T>, SD, Item, Err>
where
  C: FnMut(&State) -> bool,
  I: FnMut(&State) -> State,
  R: FnMut(&State) -> Item,
  T: FnMut(&State) -> Duration,
{
  GenerateTimed {
    inner: Generate::new(initial, Infallible(condition), Infallible(iterate), Infallible(select), scheduler),
    time_selector: Infallible(time_selector),
  }
}

/// [`generate_timed`] with fallible callbacks.
#[allow(clippy::type_complexity)]
pub fn try_generate_timed<State, Item, Err, C, I, R, T, SD>(
  initial: State, condition: C, iterate: I, select: R, time_selector: T, scheduler: SD,
) -> GenerateTimed<State, Fallible<C>, Fallible<I>, Fallible<R>, Fallible<T>, SD, Item, Err>
where
  C: FnMut(&State) -> Result<bool, Err>,
  I: FnMut(&State) -> Result<State, Err>,
  R: FnMut(&State) -> Result<Item, Err>,
  T: FnMut(&State) -> Result<Duration, Err>,
{
  GenerateTimed {
    inner: Generate::new(initial, Fallible(condition), Fallible(iterate), Fallible(select), scheduler),
    time_selector: Fallible(time_selector),
  }
}

/// Unfolds `initial`, emitting each value at the absolute time on the
/// scheduler's clock `time_selector` gives for its state. Times already
/// passed fire as soon as possible.
#[allow(clippy::type_complexity)]
pub fn generate_at<State, Item, Err, C, I, R, T, SD>(
  initial: State, condition: C, iterate: I, select: R, time_selector: T, scheduler: SD,
) -> GenerateAt<State, Infallible<C>, Infallible<I>, Infallible<R>, Infallible<T>, SD, Item, Err>
where
  C: FnMut(&State) -> bool,
  I: FnMut(&State) -> State,
  R: FnMut(&State) -> Item,
  T: FnMut(&State) -> Duration,
{
  GenerateAt {
    inner: Generate::new(initial, Infallible(condition), Infallible(iterate), Infallible(select), scheduler),
    time_selector: Infallible(time_selector),
  }
}

/// [`generate_at`] with fallible callbacks.
#[allow(clippy::type_complexity)]
pub fn try_generate_at<State, Item, Err, C, I, R, T, SD>(
  initial: State, condition: C, iterate: I, select: R, time_selector: T, scheduler: SD,
) -> GenerateAt<State, Fallible<C>, Fallible<I>, Fallible<R>, Fallible<T>, SD, Item, Err>
where
  C: FnMut(&State) -> Result<bool, Err>,
  I: FnMut(&State) -> Result<State, Err>,
  R: FnMut(&State) -> Result<Item, Err>,
  T: FnMut(&State) -> Result<Duration, Err>,
{
  GenerateAt {
    inner: Generate::new(initial, Fallible(condition), Fallible(iterate), Fallible(select), scheduler),
    time_selector: Fallible(time_selector),
  }
}

#[derive(Clone)]
pub struct Generate<State, C, I, R, SD, Item, Err> {
  initial: State,
  condition: C,
  iterate: I,
  select: R,
  scheduler: SD,
  _hint: TypeHint<Item, Err>,
}

impl<State, C, I, R, SD, Item, Err> Generate<State, C, I, R, SD, Item, Err> {
  fn new(initial: State, condition: C, iterate: I, select: R, scheduler: SD) -> Self {
    Generate { initial, condition, iterate, select, scheduler, _hint: TypeHint::default() }
  }

  fn into_unfold<O>(self, observer: O) -> (Unfold<O, State, C, I, R>, SD) {
    let unfold = Unfold {
      observer: Some(observer),
      state: self.initial,
      started: false,
      condition: self.condition,
      iterate: self.iterate,
      select: self.select,
    };
    (unfold, self.scheduler)
  }
}

#[derive(Clone)]
pub struct GenerateTimed<State, C, I, R, T, SD, Item, Err> {
  inner: Generate<State, C, I, R, SD, Item, Err>,
  time_selector: T,
}

#[derive(Clone)]
pub struct GenerateAt<State, C, I, R, T, SD, Item, Err> {
  inner: Generate<State, C, I, R, SD, Item, Err>,
  time_selector: T,
}

struct Unfold<O, State, C, I, R> {
  observer: Option<O>,
  state: State,
  started: bool,
  condition: C,
  iterate: I,
  select: R,
}

impl<O, State, C, I, R> Unfold<O, State, C, I, R> {
  /// Moves to the next state and selects its value, `None` once the
  /// condition fails. The initial state is not iterated.
  fn advance<Item, Err>(&mut self) -> Result<Option<Item>, Err>
  where
    C: StateFn<State, bool, Err>,
    I: StateFn<State, State, Err>,
    R: StateFn<State, Item, Err>,
  {
    if self.started {
      self.state = self.iterate.call(&self.state)?;
    }
    self.started = true;
    if !self.condition.call(&self.state)? {
      return Ok(None);
    }
    self.select.call(&self.state).map(Some)
  }

  fn finish<Item, Err>(&mut self, err: Option<Err>) -> TaskState
  where
    O: Observer<Item, Err>,
  {
    if let Some(observer) = self.observer.take() {
      match err {
        Some(err) => observer.error(err),
        None => observer.complete(),
      }
    }
    TaskState::Finished
  }
}

fn unfold_step<O, State, C, I, R, Item, Err>(u: &mut Unfold<O, State, C, I, R>) -> TaskState
where
  O: Observer<Item, Err>,
  C: StateFn<State, bool, Err>,
  I: StateFn<State, State, Err>,
  R: StateFn<State, Item, Err>,
{
  match u.observer.as_ref() {
    Some(observer) if !observer.is_closed() => {}
    _ => return TaskState::Finished,
  }
  match u.advance::<Item, Err>() {
    Ok(Some(value)) => {
      Observer::<Item, Err>::next(&mut u.observer, value);
      TaskState::Yield
    }
    Ok(None) => u.finish::<Item, Err>(None),
    Err(err) => u.finish::<Item, Err>(Some(err)),
  }
}

impl<State, C, I, R, SD, Item, Err, O> Observable<Item, Err, O> for Generate<State, C, I, R, SD, Item, Err>
where
  O: Observer<Item, Err> + 'static,
  State: 'static,
  C: StateFn<State, bool, Err> + 'static,
  I: StateFn<State, State, Err> + 'static,
  R: StateFn<State, Item, Err> + 'static,
  SD: Scheduler,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let (unfold, scheduler) = self.into_unfold(observer);
    scheduler.schedule(Task::new(unfold, unfold_step::<O, State, C, I, R, Item, Err>), None)
  }
}

impl<State, C, I, R, SD, Item, Err> ObservableExt<Item, Err> for Generate<State, C, I, R, SD, Item, Err> {}

/// Whether a timed delay is relative to now or a point on the clock.
#[derive(Clone, Copy)]
enum Clock {
  Relative,
  Absolute,
}

struct TimedUnfold<O, State, C, I, R, T, SD, Item, Err> {
  unfold: Unfold<O, State, C, I, R>,
  time_selector: T,
  scheduler: SD,
  clock: Clock,
  pending: Option<Result<Item, Err>>,
}

impl<O, State, C, I, R, T, SD, Item, Err> TimedUnfold<O, State, C, I, R, T, SD, Item, Err>
where
  C: StateFn<State, bool, Err>,
  I: StateFn<State, State, Err>,
  R: StateFn<State, Item, Err>,
  T: StateFn<State, Duration, Err>,
  SD: Scheduler,
{
  /// Prepares the next value and returns the delay before it fires, `None`
  /// once the condition fails.
  fn prepare(&mut self) -> Result<Option<Duration>, Err> {
    let prepared = self.unfold.advance::<Item, Err>().and_then(|value| match value {
      Some(value) => self.time_selector.call(&self.unfold.state).map(|due| Some((value, due))),
      None => Ok(None),
    });
    Ok(prepared?.map(|(value, due)| {
      self.pending = Some(Ok(value));
      match self.clock {
        Clock::Relative => due,
        Clock::Absolute => due.saturating_sub(self.scheduler.now()),
      }
    }))
  }
}

#[allow(clippy::type_complexity)]
fn timed_step<O, State, C, I, R, T, SD, Item, Err>(
  t: &mut TimedUnfold<O, State, C, I, R, T, SD, Item, Err>,
) -> TaskState
where
  O: Observer<Item, Err>,
  C: StateFn<State, bool, Err>,
  I: StateFn<State, State, Err>,
  R: StateFn<State, Item, Err>,
  T: StateFn<State, Duration, Err>,
  SD: Scheduler,
{
  match t.unfold.observer.as_ref() {
    Some(observer) if !observer.is_closed() => {}
    _ => return TaskState::Finished,
  }
  match t.pending.take() {
    Some(Ok(value)) => Observer::<Item, Err>::next(&mut t.unfold.observer, value),
    Some(Err(err)) => return t.unfold.finish::<Item, Err>(Some(err)),
    // Only the first step can run with nothing prepared.
    None => return t.unfold.finish::<Item, Err>(None),
  }
  match t.prepare() {
    Ok(Some(delay)) => TaskState::Sleeping(delay),
    Ok(None) => t.unfold.finish::<Item, Err>(None),
    Err(err) => t.unfold.finish::<Item, Err>(Some(err)),
  }
}

fn subscribe_timed<O, State, C, I, R, T, SD, Item, Err>(
  inner: Generate<State, C, I, R, SD, Item, Err>, time_selector: T, clock: Clock, observer: O,
) -> TaskHandle
where
  O: Observer<Item, Err> + 'static,
  State: 'static,
  C: StateFn<State, bool, Err> + 'static,
  I: StateFn<State, State, Err> + 'static,
  R: StateFn<State, Item, Err> + 'static,
  T: StateFn<State, Duration, Err> + 'static,
  SD: Scheduler,
  Item: 'static,
  Err: 'static,
{
  let (unfold, scheduler) = inner.into_unfold(observer);
  let mut timed = TimedUnfold { unfold, time_selector, scheduler: scheduler.clone(), clock, pending: None };
  // A first state that ends the stream still ends it on a step of its own.
  let first = timed.prepare().unwrap_or_else(|err| {
    timed.pending = Some(Err(err));
    None
  });
  let task = Task::new(timed, timed_step::<O, State, C, I, R, T, SD, Item, Err>);
  scheduler.schedule(task, first)
}

impl<State, C, I, R, T, SD, Item, Err, O> Observable<Item, Err, O>
  for GenerateTimed<State, C, I, R, T, SD, Item, Err>
where
  O: Observer<Item, Err> + 'static,
  State: 'static,
  C: StateFn<State, bool, Err> + 'static,
  I: StateFn<State, State, Err> + 'static,
  R: StateFn<State, Item, Err> + 'static,
  T: StateFn<State, Duration, Err> + 'static,
  SD: Scheduler,
  Item: 'static,
  Err: 'static,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    subscribe_timed(self.inner, self.time_selector, Clock::Relative, observer)
  }
}

impl<State, C, I, R, T, SD, Item, Err, O> Observable<Item, Err, O> for GenerateAt<State, C, I, R, T, SD, Item, Err>
where
  O: Observer<Item, Err> + 'static,
  State: 'static,
  C: StateFn<State, bool, Err> + 'static,
  I: StateFn<State, State, Err> + 'static,
  R: StateFn<State, Item, Err> + 'static,
  T: StateFn<State, Duration, Err> + 'static,
  SD: Scheduler,
  Item: 'static,
  Err: 'static,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    subscribe_timed(self.inner, self.time_selector, Clock::Absolute, observer)
  }
}

impl<State, C, I, R, T, SD, Item, Err> ObservableExt<Item, Err>
  for GenerateTimed<State, C, I, R, T, SD, Item, Err>
{
}

impl<State, C, I, R, T, SD, Item, Err> ObservableExt<Item, Err> for GenerateAt<State, C, I, R, T, SD, Item, Err> {}
