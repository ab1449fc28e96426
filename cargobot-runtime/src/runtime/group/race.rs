use crate::runtime::{Action, BoxedAction, Context, ResourceSet, Result};

use super::Child;

/// Run actions together until any of them finishes.
///
/// Every child is started at once and stepped each tick. After all children
/// were stepped they are polled in the order they were added. As soon as one
/// or more report finished, those are ended normally and every other child is
/// interrupted, all within the same tick. The first finished child in
/// insertion order is reported as the winner.
pub struct ParallelRace<R> {
    name: String,
    children: Vec<Child<R>>,
    requirements: ResourceSet,
    finished: bool,
}

impl<R> ParallelRace<R> {
    /// Construct a new race group.
    ///
    /// Children run at the same time and therefore must not share resources.
    /// A race without children could never finish and is rejected.
    pub fn new(actions: Vec<BoxedAction<R>>) -> Result<Self> {
        if actions.is_empty() {
            return Err(crate::runtime::Error::EmptyGroup);
        }

        let children: Vec<_> = actions.into_iter().map(Child::new).collect();
        let requirements = super::union_requirements(&children, true)?;

        Ok(Self {
            name: "race".to_owned(),
            children,
            requirements,
            finished: false,
        })
    }

    /// Set the group name.
    pub fn named(mut self, name: impl ToString) -> Self {
        self.name = name.to_string();
        self
    }
}

impl<R> Action<R> for ParallelRace<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> ResourceSet {
        self.requirements
    }

    fn start(&mut self, ctx: &Context, robot: &mut R) -> Result {
        self.finished = false;

        for child in self.children.iter_mut() {
            child.reset();
            child.start(ctx, robot)?;
        }

        Ok(())
    }

    fn step(&mut self, ctx: &Context, robot: &mut R) -> Result {
        if self.finished {
            return Ok(());
        }

        for child in self.children.iter_mut() {
            child.step(ctx, robot)?;
        }

        let finished: Vec<bool> = self
            .children
            .iter()
            .map(|child| child.poll(ctx, robot))
            .collect();

        if let Some(winner) = finished.iter().position(|done| *done) {
            log::debug!("{}: {} won", self.name, self.children[winner].name());

            for (child, done) in self.children.iter_mut().zip(finished) {
                child.finish(ctx, robot, !done)?;
            }

            self.finished = true;
        }

        Ok(())
    }

    fn is_finished(&self, _ctx: &Context, _robot: &R) -> bool {
        self.finished
    }

    fn end(&mut self, ctx: &Context, robot: &mut R, _interrupted: bool) -> Result {
        for child in self.children.iter_mut() {
            child.finish(ctx, robot, true)?;
        }

        Ok(())
    }
}
