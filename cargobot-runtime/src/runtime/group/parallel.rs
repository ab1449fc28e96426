use crate::runtime::{Action, BoxedAction, Context, ResourceSet, Result};

use super::Child;

/// Run actions together until all of them finished.
///
/// Every child is started at once and stepped each tick until it reports
/// finished, after which it is no longer stepped. Finished children are only
/// ended when the group itself ends. Interrupting the group interrupts the
/// children that had not finished yet.
pub struct ParallelAll<R> {
    name: String,
    children: Vec<Child<R>>,
    requirements: ResourceSet,
}

impl<R> ParallelAll<R> {
    /// Construct a new parallel group.
    ///
    /// Children run at the same time and therefore must not share resources.
    pub fn new(actions: Vec<BoxedAction<R>>) -> Result<Self> {
        let children: Vec<_> = actions.into_iter().map(Child::new).collect();
        let requirements = super::union_requirements(&children, true)?;

        Ok(Self {
            name: "parallel".to_owned(),
            children,
            requirements,
        })
    }

    /// Set the group name.
    pub fn named(mut self, name: impl ToString) -> Self {
        self.name = name.to_string();
        self
    }
}

impl<R> Action<R> for ParallelAll<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> ResourceSet {
        self.requirements
    }

    fn start(&mut self, ctx: &Context, robot: &mut R) -> Result {
        for child in self.children.iter_mut() {
            child.reset();
            child.start(ctx, robot)?;
        }

        Ok(())
    }

    fn step(&mut self, ctx: &Context, robot: &mut R) -> Result {
        for child in self.children.iter_mut() {
            child.step(ctx, robot)?;

            if child.poll(ctx, robot) {
                log::trace!("{}: {} finished", self.name, child.name());
                child.settle();
            }
        }

        Ok(())
    }

    fn is_finished(&self, _ctx: &Context, _robot: &R) -> bool {
        self.children.iter().all(|child| child.is_finished())
    }

    fn end(&mut self, ctx: &Context, robot: &mut R, interrupted: bool) -> Result {
        for child in self.children.iter_mut() {
            child.finish(ctx, robot, interrupted)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::{Hook, Journal, Probe};
    use crate::runtime::{ActionExt, Error, Resource, Scheduler};

    #[test]
    fn test_parallel_all_waits_for_last() {
        let journal = Journal::default();

        let group = ParallelAll::new(vec![
            Probe::new("a", &journal).finish_after(2).boxed(),
            Probe::new("b", &journal).finish_after(5).boxed(),
        ])
        .unwrap();

        let mut scheduler = Scheduler::new(std::time::Duration::from_millis(20));
        let id = scheduler.schedule(group).unwrap();

        for _ in 0..5 {
            scheduler.tick(&mut ()).unwrap();
        }

        // Finished on the fifth tick, retired at the start of the sixth.
        assert!(scheduler.is_scheduled(id));
        scheduler.tick(&mut ()).unwrap();
        assert!(!scheduler.is_scheduled(id));

        // Both end together with the group.
        assert_eq!(journal.tick_of("a", Hook::End(false)), Some(5));
        assert_eq!(journal.tick_of("b", Hook::End(false)), Some(5));
        assert_eq!(journal.count("a", Hook::Step), 2);
        assert_eq!(journal.count("b", Hook::Step), 5);
        assert_eq!(journal.count("a", Hook::End(false)), 1);
    }

    #[test]
    fn test_parallel_all_finishes_with_last() {
        let journal = Journal::default();

        let mut group: ParallelAll<()> = ParallelAll::new(vec![
            Probe::new("a", &journal).finish_after(2).boxed(),
            Probe::new("b", &journal).finish_after(5).boxed(),
        ])
        .unwrap();
        let ctx = Context::new(std::time::Duration::from_millis(20));

        group.start(&ctx, &mut ()).unwrap();
        for step in 1..5 {
            group.step(&ctx, &mut ()).unwrap();
            assert!(!group.is_finished(&ctx, &()), "finished after step {}", step);
        }

        group.step(&ctx, &mut ()).unwrap();
        assert!(group.is_finished(&ctx, &()));
        assert_eq!(journal.count("a", Hook::End(false)), 0);

        group.end(&ctx, &mut (), false).unwrap();
        assert_eq!(journal.count("a", Hook::End(false)), 1);
        assert_eq!(journal.count("b", Hook::End(false)), 1);
    }

    #[test]
    fn test_parallel_all_start_error() {
        let journal = Journal::default();

        let group = ParallelAll::new(vec![
            Probe::new("a", &journal).requires(&[Resource::Intake]).boxed(),
            Probe::new("b", &journal).fail_on(Hook::Start).boxed(),
        ])
        .unwrap();

        let mut scheduler = Scheduler::new(std::time::Duration::from_millis(20));
        scheduler.register(Resource::Intake).unwrap();
        let id = scheduler.schedule(group).unwrap();

        assert!(matches!(scheduler.tick(&mut ()), Err(Error::Device(_))));
        assert!(!scheduler.is_scheduled(id));
        assert_eq!(scheduler.active(Resource::Intake), None);
        assert_eq!(journal.count("a", Hook::End(true)), 1);
        assert_eq!(journal.count("b", Hook::End(true)), 1);
    }

    #[test]
    fn test_parallel_all_interrupt() {
        let journal = Journal::default();

        let group = ParallelAll::new(vec![
            Probe::new("a", &journal).finish_after(1).boxed(),
            Probe::new("b", &journal).boxed(),
        ])
        .unwrap();

        let mut scheduler = Scheduler::new(std::time::Duration::from_millis(20));
        let id = scheduler.schedule(group).unwrap();

        scheduler.tick(&mut ()).unwrap();
        scheduler.tick(&mut ()).unwrap();
        scheduler.cancel(id);
        scheduler.tick(&mut ()).unwrap();

        assert_eq!(journal.count("a", Hook::End(false)), 1);
        assert_eq!(journal.count("a", Hook::End(true)), 0);
        assert_eq!(journal.count("b", Hook::End(true)), 1);
    }

    #[test]
    fn test_parallel_all_conflict() {
        let journal = Journal::default();

        let result = ParallelAll::<()>::new(vec![
            Probe::new("a", &journal)
                .requires(&[Resource::Intake, Resource::Magazine])
                .boxed(),
            Probe::new("b", &journal)
                .requires(&[Resource::Magazine])
                .boxed(),
        ]);

        match result {
            Err(Error::RequirementConflict(shared)) => {
                assert_eq!(shared, ResourceSet::from(Resource::Magazine))
            }
            _ => panic!("expected requirement conflict"),
        }
    }
}
