use crate::runtime::{Action, Context, ResourceSet, Result};

use super::Child;

/// Run an auxiliary action while the primary action runs.
///
/// Completion is decided by the primary action alone. When the primary
/// finishes the auxiliary is interrupted if it is still running. An auxiliary
/// that finishes early is ended normally and the group keeps running.
pub struct Alongside<R> {
    name: String,
    primary: Child<R>,
    auxiliary: Child<R>,
    requirements: ResourceSet,
}

impl<R> Alongside<R> {
    /// Construct a new alongside group.
    ///
    /// Both actions run at the same time and therefore must not share
    /// resources.
    pub fn new(
        primary: impl Action<R> + 'static,
        auxiliary: impl Action<R> + 'static,
    ) -> Result<Self> {
        let children = [Child::new(Box::new(primary)), Child::new(Box::new(auxiliary))];
        let requirements = super::union_requirements(&children, true)?;

        let [primary, auxiliary] = children;

        Ok(Self {
            name: format!("{} (alongside {})", primary.name(), auxiliary.name()),
            primary,
            auxiliary,
            requirements,
        })
    }

    /// Set the group name.
    pub fn named(mut self, name: impl ToString) -> Self {
        self.name = name.to_string();
        self
    }
}

impl<R> Action<R> for Alongside<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> ResourceSet {
        self.requirements
    }

    fn start(&mut self, ctx: &Context, robot: &mut R) -> Result {
        self.primary.reset();
        self.auxiliary.reset();

        self.primary.start(ctx, robot)?;
        self.auxiliary.start(ctx, robot)
    }

    fn step(&mut self, ctx: &Context, robot: &mut R) -> Result {
        if !self.primary.is_running() {
            return Ok(());
        }

        self.primary.step(ctx, robot)?;
        self.auxiliary.step(ctx, robot)?;

        if self.primary.poll(ctx, robot) {
            self.primary.finish(ctx, robot, false)?;
            self.auxiliary.finish(ctx, robot, true)?;
        } else if self.auxiliary.poll(ctx, robot) {
            log::trace!("{}: auxiliary finished early", self.name);
            self.auxiliary.finish(ctx, robot, false)?;
        }

        Ok(())
    }

    fn is_finished(&self, _ctx: &Context, _robot: &R) -> bool {
        self.primary.is_done()
    }

    fn end(&mut self, ctx: &Context, robot: &mut R, _interrupted: bool) -> Result {
        self.primary.finish(ctx, robot, true)?;
        self.auxiliary.finish(ctx, robot, true)
    }
}
