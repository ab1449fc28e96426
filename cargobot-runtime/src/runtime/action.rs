use std::time::Duration;

use super::{Alongside, Context, ParallelRace, ResourceSet, Sequential, Timeout};

/// Action identifier.
///
/// Handed out by the scheduler for every scheduled action. Identifiers are
/// never reused within one scheduler.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub(super) u64);

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Action trait.
///
/// An action is the unit of schedulable work. It declares the resources it
/// requires and is driven through its lifecycle by the scheduler, or by the
/// group that owns it:
///
/// 1. `start` exactly once.
/// 2. `step` zero or more times, once per tick, each followed by a poll of
///    `is_finished`.
/// 3. `end` exactly once, with `interrupted` set when the action was
///    cancelled before it reported finished.
///
/// No hook may block. Long running behavior is expressed by `is_finished`
/// returning false over many ticks. The action can be ended without ever
/// being stepped, so `end` must not assume `step` ran.
///
/// Any hook error is fatal and propagates out of the scheduler tick.
pub trait Action<R> {
    /// Human readable name used in log messages.
    fn name(&self) -> &str {
        "action"
    }

    /// Resources this action requires.
    ///
    /// Must remain constant for the lifetime of the action.
    fn requirements(&self) -> ResourceSet {
        ResourceSet::empty()
    }

    /// Start the action.
    fn start(&mut self, _ctx: &Context, _robot: &mut R) -> super::Result {
        Ok(())
    }

    /// Step the action.
    fn step(&mut self, _ctx: &Context, _robot: &mut R) -> super::Result {
        Ok(())
    }

    /// Action termination condition.
    fn is_finished(&self, _ctx: &Context, _robot: &R) -> bool {
        false
    }

    /// End the action.
    fn end(&mut self, _ctx: &Context, _robot: &mut R, _interrupted: bool) -> super::Result {
        Ok(())
    }
}

pub type BoxedAction<R> = Box<dyn Action<R>>;

impl<R, A: Action<R> + ?Sized> Action<R> for Box<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn requirements(&self) -> ResourceSet {
        (**self).requirements()
    }

    fn start(&mut self, ctx: &Context, robot: &mut R) -> super::Result {
        (**self).start(ctx, robot)
    }

    fn step(&mut self, ctx: &Context, robot: &mut R) -> super::Result {
        (**self).step(ctx, robot)
    }

    fn is_finished(&self, ctx: &Context, robot: &R) -> bool {
        (**self).is_finished(ctx, robot)
    }

    fn end(&mut self, ctx: &Context, robot: &mut R, interrupted: bool) -> super::Result {
        (**self).end(ctx, robot, interrupted)
    }
}

/// Composition adapters for actions.
pub trait ActionExt<R>: Action<R> + Sized + 'static {
    /// Box the action.
    fn boxed(self) -> BoxedAction<R> {
        Box::new(self)
    }

    /// End the action after the duration has elapsed.
    fn with_timeout(self, duration: Duration) -> Timeout<R> {
        Timeout::new(self, duration)
    }

    /// Run an auxiliary action alongside this one until this one finishes.
    fn along_with(self, auxiliary: impl Action<R> + 'static) -> super::Result<Alongside<R>> {
        Alongside::new(self, auxiliary)
    }

    /// Run both actions until either one finishes.
    fn race_with(self, other: impl Action<R> + 'static) -> super::Result<ParallelRace<R>> {
        ParallelRace::new(vec![self.boxed(), other.boxed()])
    }

    /// Run another action once this one finishes.
    fn and_then(self, next: impl Action<R> + 'static) -> Sequential<R> {
        Sequential::new(vec![self.boxed(), next.boxed()])
    }
}

impl<R, A: Action<R> + 'static> ActionExt<R> for A {}
