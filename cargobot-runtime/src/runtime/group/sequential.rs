use crate::runtime::{Action, BoxedAction, Context, ResourceSet, Result};

use super::Child;

/// Run actions one after another.
///
/// Only one child runs at a time. When the active child finishes it is
/// ended and the next child is started in the same tick; its first step
/// follows on the next tick. The group finishes after the last child.
///
/// Interrupting the group interrupts the active child only. Children that
/// were not started yet are never started.
pub struct Sequential<R> {
    name: String,
    children: Vec<Child<R>>,
    index: usize,
    requirements: ResourceSet,
}

impl<R> Sequential<R> {
    pub fn new(actions: Vec<BoxedAction<R>>) -> Self {
        let children: Vec<_> = actions.into_iter().map(Child::new).collect();
        let requirements = children
            .iter()
            .fold(ResourceSet::empty(), |set, child| {
                set.union(child.action.requirements())
            });

        Self {
            name: "sequential".to_owned(),
            children,
            index: 0,
            requirements,
        }
    }

    /// Set the group name.
    pub fn named(mut self, name: impl ToString) -> Self {
        self.name = name.to_string();
        self
    }

    /// Append an action to the end of the sequence.
    pub fn then(mut self, action: impl Action<R> + 'static) -> Self {
        self.requirements = self.requirements.union(action.requirements());
        self.children.push(Child::new(Box::new(action)));
        self
    }
}

impl<R> Action<R> for Sequential<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> ResourceSet {
        self.requirements
    }

    fn start(&mut self, ctx: &Context, robot: &mut R) -> Result {
        self.index = 0;
        self.children.iter_mut().for_each(Child::reset);

        if let Some(child) = self.children.first_mut() {
            child.start(ctx, robot)?;
        }

        Ok(())
    }

    fn step(&mut self, ctx: &Context, robot: &mut R) -> Result {
        let Some(child) = self.children.get_mut(self.index) else {
            return Ok(());
        };

        child.step(ctx, robot)?;

        if child.poll(ctx, robot) {
            child.finish(ctx, robot, false)?;

            log::trace!("{}: {} finished", self.name, child.name());

            self.index += 1;
            if let Some(next) = self.children.get_mut(self.index) {
                next.start(ctx, robot)?;
            }
        }

        Ok(())
    }

    fn is_finished(&self, _ctx: &Context, _robot: &R) -> bool {
        self.index >= self.children.len()
    }

    fn end(&mut self, ctx: &Context, robot: &mut R, _interrupted: bool) -> Result {
        if let Some(child) = self.children.get_mut(self.index) {
            child.finish(ctx, robot, true)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::{Hook, Journal, Probe};
    use crate::runtime::{ActionExt, Resource, Scheduler};

    #[test]
    fn test_sequential_order() {
        let journal = Journal::default();

        let group = Sequential::new(vec![
            Probe::new("a", &journal).finish_after(2).boxed(),
            Probe::new("b", &journal).finish_after(1).boxed(),
        ]);

        let mut scheduler = Scheduler::new(std::time::Duration::from_millis(20));
        let id = scheduler.schedule(group).unwrap();

        for _ in 0..5 {
            scheduler.tick(&mut ()).unwrap();
        }

        assert!(!scheduler.is_scheduled(id));

        let a_end = journal.position("a", Hook::End(false)).unwrap();
        let b_start = journal.position("b", Hook::Start).unwrap();
        assert!(a_end < b_start);

        assert_eq!(journal.tick_of("a", Hook::End(false)), Some(1));
        assert_eq!(journal.tick_of("b", Hook::Start), Some(1));
        assert_eq!(journal.tick_of("b", Hook::End(false)), Some(2));
        assert_eq!(journal.count("b", Hook::Step), 1);
    }

    #[test]
    fn test_sequential_interrupt() {
        let journal = Journal::default();

        let group = Sequential::new(vec![
            Probe::new("a", &journal).boxed(),
            Probe::new("b", &journal).boxed(),
        ]);

        let mut scheduler = Scheduler::new(std::time::Duration::from_millis(20));
        let id = scheduler.schedule(group).unwrap();

        scheduler.tick(&mut ()).unwrap();
        scheduler.tick(&mut ()).unwrap();
        scheduler.cancel(id);
        scheduler.tick(&mut ()).unwrap();

        assert_eq!(journal.count("a", Hook::End(true)), 1);
        assert_eq!(journal.count("b", Hook::Start), 0);
        assert_eq!(journal.count("b", Hook::End(true)), 0);
    }

    #[test]
    fn test_sequential_requirements() {
        let journal = Journal::default();

        let group: Sequential<()> = Sequential::new(vec![
            Probe::new("a", &journal)
                .requires(&[Resource::Drivetrain])
                .boxed(),
        ])
        .then(Probe::new("b", &journal).requires(&[Resource::Shooter, Resource::Magazine]));

        assert_eq!(
            group.requirements(),
            ResourceSet::of(&[Resource::Drivetrain, Resource::Shooter, Resource::Magazine])
        );
    }

    #[test]
    fn test_sequential_empty() {
        let mut scheduler = Scheduler::new(std::time::Duration::from_millis(20));
        let id = scheduler.schedule(Sequential::<()>::new(vec![])).unwrap();

        scheduler.tick(&mut ()).unwrap();
        assert!(scheduler.is_scheduled(id));
        scheduler.tick(&mut ()).unwrap();
        assert!(!scheduler.is_scheduled(id));
    }
}
