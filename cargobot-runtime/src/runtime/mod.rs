use std::time::Duration;

pub use self::action::{Action, ActionExt, ActionId, BoxedAction};
pub use self::catalog::{Catalog, Routine};
pub use self::error::Error;
pub use self::group::{Alongside, ParallelAll, ParallelRace, Sequential, Timeout};
pub use self::registry::{DefaultFactory, Registry};
pub use self::resource::{Resource, ResourceSet};
pub use self::scheduler::Scheduler;

mod action;
mod catalog;
mod error;
mod group;
mod registry;
mod resource;
mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub type Result<T = ()> = std::result::Result<T, error::Error>;

/// Tick context.
///
/// The tick context is provided to every action hook. It carries the
/// scheduler clock, which only advances between ticks.
#[derive(Clone, Debug)]
pub struct Context {
    /// Fixed tick period.
    period: Duration,
    /// Iteration count.
    iteration: u64,
}

impl Context {
    /// Construct a new context with a fixed tick period.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            iteration: 0,
        }
    }

    /// Retrieve the iteration count.
    ///
    /// The first tick of the scheduler is iteration zero.
    #[inline]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Retrieve the tick period.
    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time elapsed on the scheduler clock since the given iteration.
    pub fn elapsed_since(&self, iteration: u64) -> Duration {
        let ticks = self.iteration.saturating_sub(iteration);
        let nanos = self.period.as_nanos().saturating_mul(u128::from(ticks));

        Duration::new(
            u64::try_from(nanos / 1_000_000_000).unwrap_or(u64::MAX),
            (nanos % 1_000_000_000) as u32,
        )
    }

    /// Convert a duration to a number of ticks.
    ///
    /// Rounds up, so any non-zero duration lasts at least one tick.
    pub fn ticks_for(&self, duration: Duration) -> u64 {
        if self.period.is_zero() {
            return 0;
        }

        let period = self.period.as_nanos();
        duration.as_nanos().div_ceil(period) as u64
    }

    /// Called after all actions are ticked.
    pub(crate) fn post_tick(&mut self) {
        self.iteration += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_for() {
        let ctx = Context::new(Duration::from_millis(20));

        assert_eq!(ctx.ticks_for(Duration::ZERO), 0);
        assert_eq!(ctx.ticks_for(Duration::from_millis(1)), 1);
        assert_eq!(ctx.ticks_for(Duration::from_millis(60)), 3);
        assert_eq!(ctx.ticks_for(Duration::from_millis(1500)), 75);
        assert_eq!(ctx.ticks_for(Duration::from_millis(61)), 4);
    }

    #[test]
    fn test_elapsed_since() {
        let mut ctx = Context::new(Duration::from_millis(20));
        for _ in 0..5 {
            ctx.post_tick();
        }

        assert_eq!(ctx.iteration(), 5);
        assert_eq!(ctx.elapsed_since(2), Duration::from_millis(60));
        assert_eq!(ctx.elapsed_since(9), Duration::ZERO);
    }

    #[test]
    fn test_elapsed_since_long_run() {
        let mut ctx = Context::new(Duration::from_millis(20));
        ctx.iteration = u64::from(u32::MAX) + 1;

        assert_eq!(
            ctx.elapsed_since(0),
            Duration::from_millis(20 * (u64::from(u32::MAX) + 1))
        );
    }
}
