//! Action groups.
//!
//! Groups compose child actions into a single action. A group exclusively
//! owns its children and drives their lifecycle itself; the scheduler only
//! ever sees the group. The requirements of a group are the union of the
//! requirements of its children, held for the full lifetime of the group.

pub use self::alongside::Alongside;
pub use self::parallel::ParallelAll;
pub use self::race::ParallelRace;
pub use self::sequential::Sequential;
pub use self::timeout::Timeout;

mod alongside;
mod parallel;
mod race;
mod sequential;
mod timeout;

use super::{BoxedAction, Context, ResourceSet};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ChildState {
    /// Not started yet, or ended and ready to start again.
    Idle,
    /// Started and not yet ended.
    Running,
    /// Reported finished, end deferred until the group ends.
    Finished,
    /// Ended.
    Done,
}

/// Child action slot.
///
/// Tracks where the child is in its lifecycle so the group can guarantee
/// `start` and `end` are each called exactly once per run.
struct Child<R> {
    action: BoxedAction<R>,
    state: ChildState,
}

impl<R> Child<R> {
    fn new(action: BoxedAction<R>) -> Self {
        Self {
            action,
            state: ChildState::Idle,
        }
    }

    #[inline]
    fn is_running(&self) -> bool {
        self.state == ChildState::Running
    }

    #[inline]
    fn is_done(&self) -> bool {
        self.state == ChildState::Done
    }

    #[inline]
    fn is_finished(&self) -> bool {
        self.state == ChildState::Finished
    }

    #[inline]
    fn name(&self) -> &str {
        self.action.name()
    }

    fn reset(&mut self) {
        self.state = ChildState::Idle;
    }

    fn start(&mut self, ctx: &Context, robot: &mut R) -> super::Result {
        self.state = ChildState::Running;
        self.action.start(ctx, robot)
    }

    fn step(&mut self, ctx: &Context, robot: &mut R) -> super::Result {
        if self.is_running() {
            self.action.step(ctx, robot)?;
        }
        Ok(())
    }

    /// Poll the child, only a running child can report finished.
    fn poll(&self, ctx: &Context, robot: &R) -> bool {
        self.is_running() && self.action.is_finished(ctx, robot)
    }

    /// Stop stepping the child without ending it.
    fn settle(&mut self) {
        if self.is_running() {
            self.state = ChildState::Finished;
        }
    }

    /// End the child if it was started.
    ///
    /// A settled child always ends normally.
    fn finish(&mut self, ctx: &Context, robot: &mut R, interrupted: bool) -> super::Result {
        match self.state {
            ChildState::Running => {
                self.state = ChildState::Done;
                self.action.end(ctx, robot, interrupted)
            }
            ChildState::Finished => {
                self.state = ChildState::Done;
                self.action.end(ctx, robot, false)
            }
            ChildState::Idle | ChildState::Done => Ok(()),
        }
    }
}

/// Union of the requirements of all children.
///
/// When `exclusive` is set the children must not share any resource since
/// they would run at the same time.
fn union_requirements<R>(children: &[Child<R>], exclusive: bool) -> super::Result<ResourceSet> {
    let mut requirements = ResourceSet::empty();
    let mut shared = ResourceSet::empty();

    for child in children {
        let child_requirements = child.action.requirements();
        shared = shared.union(requirements.intersection(child_requirements));
        requirements = requirements.union(child_requirements);
    }

    if exclusive && !shared.is_empty() {
        return Err(super::Error::RequirementConflict(shared));
    }

    Ok(requirements)
}
