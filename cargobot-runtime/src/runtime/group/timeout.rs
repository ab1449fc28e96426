use std::time::Duration;

use crate::runtime::{Action, Context, ResourceSet, Result};

use super::Child;

#[derive(Copy, Clone, Debug)]
enum Limit {
    Duration(Duration),
    Ticks(u64),
}

/// End an action after a time limit.
///
/// The group finishes when the child finishes, or when the limit expires,
/// whichever comes first. On expiry the child is interrupted. If the child
/// finishes on the very tick the limit expires the child wins.
///
/// Durations are resolved against the scheduler clock when the group starts.
pub struct Timeout<R> {
    name: String,
    child: Child<R>,
    limit: Limit,
    ticks: u64,
    elapsed: u64,
    expired: bool,
}

impl<R> Timeout<R> {
    /// Construct a timeout from a duration.
    pub fn new(action: impl Action<R> + 'static, duration: Duration) -> Self {
        Self::with_limit(Box::new(action), Limit::Duration(duration))
    }

    /// Construct a timeout from a number of ticks.
    pub fn ticks(action: impl Action<R> + 'static, ticks: u64) -> Self {
        Self::with_limit(Box::new(action), Limit::Ticks(ticks))
    }

    fn with_limit(action: crate::runtime::BoxedAction<R>, limit: Limit) -> Self {
        Self {
            name: format!("{} (timeout)", action.name()),
            child: Child::new(action),
            limit,
            ticks: 0,
            elapsed: 0,
            expired: false,
        }
    }

    /// Check if the limit expired before the child finished.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.expired
    }
}

impl<R> Action<R> for Timeout<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> ResourceSet {
        self.child.action.requirements()
    }

    fn start(&mut self, ctx: &Context, robot: &mut R) -> Result {
        self.ticks = match self.limit {
            Limit::Duration(duration) => ctx.ticks_for(duration),
            Limit::Ticks(ticks) => ticks,
        };
        self.elapsed = 0;
        self.expired = false;

        self.child.reset();
        self.child.start(ctx, robot)
    }

    fn step(&mut self, ctx: &Context, robot: &mut R) -> Result {
        if !self.child.is_running() {
            return Ok(());
        }

        self.elapsed += 1;
        self.child.step(ctx, robot)?;

        if self.child.poll(ctx, robot) {
            self.child.finish(ctx, robot, false)?;
        } else if self.elapsed >= self.ticks {
            log::debug!("{} expired after {} ticks", self.name, self.elapsed);

            self.expired = true;
            self.child.finish(ctx, robot, true)?;
        }

        Ok(())
    }

    fn is_finished(&self, _ctx: &Context, _robot: &R) -> bool {
        self.child.is_done()
    }

    fn end(&mut self, ctx: &Context, robot: &mut R, _interrupted: bool) -> Result {
        self.child.finish(ctx, robot, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::{Hook, Journal, Probe};
    use crate::runtime::{ActionExt, Scheduler};

    #[test]
    fn test_timeout_expires() {
        let journal = Journal::default();

        let mut scheduler = Scheduler::new(Duration::from_millis(20));
        let id = scheduler
            .schedule(Timeout::ticks(Probe::new("a", &journal), 3))
            .unwrap();

        for _ in 0..3 {
            scheduler.tick(&mut ()).unwrap();
        }

        assert_eq!(journal.count("a", Hook::Step), 3);
        assert_eq!(journal.tick_of("a", Hook::End(true)), Some(2));
        assert!(scheduler.is_scheduled(id));

        scheduler.tick(&mut ()).unwrap();
        assert!(!scheduler.is_scheduled(id));
    }

    #[test]
    fn test_timeout_duration() {
        let journal = Journal::default();

        let mut scheduler = Scheduler::new(Duration::from_millis(20));
        scheduler
            .schedule(Probe::new("a", &journal).with_timeout(Duration::from_millis(50)))
            .unwrap();

        for _ in 0..5 {
            scheduler.tick(&mut ()).unwrap();
        }

        assert_eq!(journal.count("a", Hook::Step), 3);
        assert_eq!(journal.count("a", Hook::End(true)), 1);
    }

    #[test]
    fn test_timeout_child_finishes_first() {
        let journal = Journal::default();

        let mut scheduler = Scheduler::new(Duration::from_millis(20));
        scheduler
            .schedule(Timeout::ticks(Probe::new("a", &journal).finish_after(2), 5))
            .unwrap();

        for _ in 0..4 {
            scheduler.tick(&mut ()).unwrap();
        }

        assert_eq!(journal.tick_of("a", Hook::End(false)), Some(1));
        assert_eq!(journal.count("a", Hook::End(true)), 0);
    }

    #[test]
    fn test_timeout_expired_flag() {
        let journal = Journal::default();

        let mut timeout: Timeout<()> = Timeout::ticks(Probe::new("a", &journal), 2);
        let ctx = Context::new(Duration::from_millis(20));

        timeout.start(&ctx, &mut ()).unwrap();
        timeout.step(&ctx, &mut ()).unwrap();
        assert!(!timeout.is_expired());

        timeout.step(&ctx, &mut ()).unwrap();
        assert!(timeout.is_finished(&ctx, &()));
        assert!(timeout.is_expired());
        assert_eq!(journal.count("a", Hook::End(true)), 1);

        // Restarting clears the flag.
        timeout.start(&ctx, &mut ()).unwrap();
        assert!(!timeout.is_expired());
    }

    #[test]
    fn test_timeout_tie_goes_to_child() {
        let journal = Journal::default();

        let mut timeout: Timeout<()> = Timeout::ticks(Probe::new("a", &journal).finish_after(2), 2);
        let ctx = Context::new(Duration::from_millis(20));

        timeout.start(&ctx, &mut ()).unwrap();
        timeout.step(&ctx, &mut ()).unwrap();
        timeout.step(&ctx, &mut ()).unwrap();

        assert!(timeout.is_finished(&ctx, &()));
        assert!(!timeout.is_expired());
        assert_eq!(journal.count("a", Hook::End(false)), 1);
        assert_eq!(journal.count("a", Hook::End(true)), 0);
    }
}
