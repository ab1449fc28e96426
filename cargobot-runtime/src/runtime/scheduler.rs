use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use super::{
    Action, ActionId, BoxedAction, Context, Registry, Resource, ResourceSet, Result,
};

/// Scheduled action entry.
struct Scheduled<R> {
    action: BoxedAction<R>,
    requirements: ResourceSet,
    /// Resource this action is the default of.
    default_of: Option<Resource>,
}

enum Request<R> {
    Schedule(ActionId, BoxedAction<R>),
    Cancel(ActionId),
}

/// Cooperative action scheduler.
///
/// The scheduler owns every running action and the resource registry. It is
/// driven by calling `tick` once per fixed period. Each tick runs these
/// phases in order:
///
/// 1. Retire the actions that reported finished during the previous tick,
///    then schedule the default action of every idle resource.
/// 2. Admit queued requests in the order they were made. A new action
///    interrupts the current holder of any resource it requires.
/// 3. Step every running action once, in admission order.
/// 4. Poll every running action and mark the finished ones for retirement.
///
/// Any hook error is returned from `tick` as is. The scheduler does not try
/// to recover from it.
pub struct Scheduler<R> {
    ctx: Context,
    registry: Registry<R>,
    running: BTreeMap<ActionId, Scheduled<R>>,
    pending: VecDeque<Request<R>>,
    retiring: Vec<ActionId>,
    next_id: u64,
}

impl<R> Scheduler<R> {
    /// Construct a new scheduler with a fixed tick period.
    pub fn new(period: Duration) -> Self {
        Self {
            ctx: Context::new(period),
            registry: Registry::new(),
            running: BTreeMap::new(),
            pending: VecDeque::new(),
            retiring: Vec::new(),
            next_id: 0,
        }
    }

    /// Retrieve the tick context.
    #[inline]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Retrieve the resource registry.
    #[inline]
    pub fn registry(&self) -> &Registry<R> {
        &self.registry
    }

    /// Register a resource.
    pub fn register(&mut self, resource: Resource) -> Result {
        self.registry.register(resource)
    }

    /// Set the default action of a resource.
    ///
    /// See [`Registry::set_default`].
    pub fn set_default(
        &mut self,
        resource: Resource,
        factory: impl Fn() -> BoxedAction<R> + 'static,
    ) -> Result {
        self.registry.set_default(resource, factory)
    }

    /// Request an action to be scheduled.
    ///
    /// The action is admitted during the next tick. Fails if the action
    /// requires a resource that was never registered.
    pub fn schedule(&mut self, action: impl Action<R> + 'static) -> Result<ActionId> {
        self.registry.validate(action.requirements())?;

        let id = self.next_id();

        log::trace!("Queue action {} ({})", action.name(), id);

        self.pending
            .push_back(Request::Schedule(id, Box::new(action)));

        Ok(id)
    }

    /// Request an action to be cancelled.
    ///
    /// An action that was not admitted yet is dropped without calling any
    /// of its hooks. A running action is interrupted during the next tick.
    pub fn cancel(&mut self, id: ActionId) {
        let position = self.pending.iter().position(|request| {
            matches!(request, Request::Schedule(pending_id, _) if *pending_id == id)
        });

        if let Some(position) = position {
            self.pending.remove(position);
        } else if self.running.contains_key(&id) {
            self.pending.push_back(Request::Cancel(id));
        }
    }

    /// Check if the action is pending, running or awaiting retirement.
    pub fn is_scheduled(&self, id: ActionId) -> bool {
        self.running.contains_key(&id)
            || self.pending.iter().any(|request| {
                matches!(request, Request::Schedule(pending_id, _) if *pending_id == id)
            })
    }

    /// Retrieve the action holding the resource.
    #[inline]
    pub fn active(&self, resource: Resource) -> Option<ActionId> {
        self.registry.active(resource)
    }

    /// Retrieve the name of a running action.
    pub fn name_of(&self, id: ActionId) -> Option<&str> {
        self.running.get(&id).map(|entry| entry.action.name())
    }

    /// Number of running actions, including those awaiting retirement.
    pub fn len(&self) -> usize {
        self.running.len()
    }

    /// Check if no action is running.
    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Run one scheduler tick.
    pub fn tick(&mut self, robot: &mut R) -> Result {
        self.retire(robot)?;
        self.restore_defaults(robot)?;
        self.admit(robot)?;

        for (id, entry) in self.running.iter_mut() {
            let step_start = Instant::now();

            entry.action.step(&self.ctx, robot)?;

            if step_start.elapsed() > crate::consts::ACTION_DELAY_THRESHOLD {
                log::warn!(
                    "Action {} ({}) is delaying execution",
                    entry.action.name(),
                    id
                );
            }
        }

        for (id, entry) in self.running.iter() {
            if entry.action.is_finished(&self.ctx, robot) {
                self.retiring.push(*id);
            }
        }

        self.ctx.post_tick();

        Ok(())
    }

    /// End every action immediately.
    ///
    /// Actions awaiting retirement end normally, all others are interrupted.
    /// Pending requests are discarded. Default actions return on the next
    /// tick.
    pub fn cancel_all(&mut self, robot: &mut R) -> Result {
        self.pending.clear();

        let retiring = std::mem::take(&mut self.retiring);

        while let Some((id, mut entry)) = self.running.pop_first() {
            let interrupted = !retiring.contains(&id);

            self.registry.release(id);
            entry.action.end(&self.ctx, robot, interrupted)?;
        }

        Ok(())
    }

    fn next_id(&mut self) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id += 1;
        id
    }

    /// End the actions that reported finished.
    fn retire(&mut self, robot: &mut R) -> Result {
        for id in std::mem::take(&mut self.retiring) {
            if let Some(mut entry) = self.running.remove(&id) {
                log::trace!("Retire action {} ({})", entry.action.name(), id);

                self.registry.release(id);
                entry.action.end(&self.ctx, robot, false)?;
            }
        }

        Ok(())
    }

    /// Start the default action of every idle resource.
    fn restore_defaults(&mut self, robot: &mut R) -> Result {
        for resource in self.registry.idle_with_default() {
            if let Some(action) = self.registry.build_default(resource) {
                let id = self.next_id();

                log::trace!("Restore default {} on {}", action.name(), resource);

                self.start(id, action, Some(resource), robot)?;
            }
        }

        Ok(())
    }

    /// Admit the queued requests.
    fn admit(&mut self, robot: &mut R) -> Result {
        while let Some(request) = self.pending.pop_front() {
            match request {
                Request::Schedule(id, action) => {
                    for holder in self.registry.holders(action.requirements()) {
                        if let Some(mut entry) = self.running.remove(&holder) {
                            log::debug!(
                                "Action {} ({}) interrupts {} ({})",
                                action.name(),
                                id,
                                entry.action.name(),
                                holder
                            );

                            self.registry.release(holder);
                            entry.action.end(&self.ctx, robot, true)?;
                        }
                    }

                    self.start(id, action, None, robot)?;
                }
                Request::Cancel(id) => {
                    if let Some(mut entry) = self.running.remove(&id) {
                        log::debug!("Cancel action {} ({})", entry.action.name(), id);

                        self.registry.release(id);
                        entry.action.end(&self.ctx, robot, true)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn start(
        &mut self,
        id: ActionId,
        mut action: BoxedAction<R>,
        default_of: Option<Resource>,
        robot: &mut R,
    ) -> Result {
        let requirements = action.requirements();

        if default_of.is_none() {
            log::debug!("Start action {} ({}) on {}", action.name(), id, requirements);
        }

        self.registry.claim(requirements, id);

        if let Err(e) = action.start(&self.ctx, robot) {
            log::error!("Action {} ({}) failed to start: {}", action.name(), id, e);

            self.registry.release(id);
            if let Err(end_error) = action.end(&self.ctx, robot, true) {
                log::error!("Action {} ({}) failed to end: {}", action.name(), id, end_error);
            }

            return Err(e);
        }

        self.running.insert(
            id,
            Scheduled {
                action,
                requirements,
                default_of,
            },
        );

        Ok(())
    }

    /// Check if the action is the default of a resource.
    pub fn is_default(&self, id: ActionId) -> bool {
        self.running
            .get(&id)
            .is_some_and(|entry| entry.default_of.is_some())
    }

    /// Resources held by a running action.
    pub fn requirements_of(&self, id: ActionId) -> Option<ResourceSet> {
        self.running.get(&id).map(|entry| entry.requirements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::{Hook, Journal, Probe};
    use crate::runtime::{ActionExt, Error};

    fn scheduler() -> Scheduler<()> {
        let mut scheduler = Scheduler::new(Duration::from_millis(20));
        for resource in Resource::ALL {
            scheduler.register(resource).unwrap();
        }
        scheduler
    }

    #[test]
    fn test_lifecycle() {
        let journal = Journal::default();
        let mut scheduler = scheduler();

        let id = scheduler
            .schedule(Probe::new("a", &journal).finish_after(2))
            .unwrap();
        assert!(scheduler.is_scheduled(id));

        for _ in 0..4 {
            scheduler.tick(&mut ()).unwrap();
        }

        assert_eq!(journal.tick_of("a", Hook::Start), Some(0));
        assert_eq!(journal.ticks_of("a", Hook::Step), vec![0, 1]);
        assert_eq!(journal.tick_of("a", Hook::End(false)), Some(2));
        assert_eq!(journal.count("a", Hook::Start), 1);
        assert_eq!(journal.count("a", Hook::End(false)), 1);
        assert_eq!(journal.count("a", Hook::End(true)), 0);
        assert!(!scheduler.is_scheduled(id));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_default_interrupt_reschedule() {
        let journal = Journal::default();
        let mut scheduler = scheduler();

        let default_journal = journal.clone();
        scheduler
            .set_default(Resource::Drivetrain, move || {
                Probe::new("default", &default_journal)
                    .requires(&[Resource::Drivetrain])
                    .boxed()
            })
            .unwrap();

        scheduler.tick(&mut ()).unwrap();
        assert_eq!(journal.tick_of("default", Hook::Start), Some(0));
        let default_id = scheduler.active(Resource::Drivetrain).unwrap();
        assert!(scheduler.is_default(default_id));

        let x = scheduler
            .schedule(
                Probe::new("x", &journal)
                    .finish_after(2)
                    .requires(&[Resource::Drivetrain]),
            )
            .unwrap();

        scheduler.tick(&mut ()).unwrap();
        assert_eq!(journal.tick_of("default", Hook::End(true)), Some(1));
        assert_eq!(journal.tick_of("x", Hook::Start), Some(1));
        assert_eq!(scheduler.active(Resource::Drivetrain), Some(x));

        let default_end = journal.position("default", Hook::End(true)).unwrap();
        let x_start = journal.position("x", Hook::Start).unwrap();
        assert!(default_end < x_start);

        // Finished on the second tick of x.
        scheduler.tick(&mut ()).unwrap();
        assert_eq!(journal.count("default", Hook::Start), 1);

        scheduler.tick(&mut ()).unwrap();
        assert_eq!(journal.tick_of("x", Hook::End(false)), Some(3));
        assert_eq!(journal.ticks_of("default", Hook::Start), vec![0, 3]);
        assert!(!scheduler.is_default(x));

        let default_id = scheduler.active(Resource::Drivetrain).unwrap();
        assert!(scheduler.is_default(default_id));
    }

    #[test]
    fn test_newest_wins() {
        let journal = Journal::default();
        let mut scheduler = scheduler();

        let a = scheduler
            .schedule(Probe::new("a", &journal).requires(&[Resource::Shooter]))
            .unwrap();
        scheduler.tick(&mut ()).unwrap();
        assert_eq!(scheduler.active(Resource::Shooter), Some(a));

        let b = scheduler
            .schedule(Probe::new("b", &journal).requires(&[Resource::Shooter]))
            .unwrap();
        scheduler.tick(&mut ()).unwrap();

        assert_eq!(scheduler.active(Resource::Shooter), Some(b));
        assert_eq!(journal.tick_of("a", Hook::End(true)), Some(1));
        assert_eq!(journal.count("a", Hook::Step), 1);
        assert!(!scheduler.is_scheduled(a));
    }

    #[test]
    fn test_partial_overlap_releases_all() {
        let journal = Journal::default();
        let mut scheduler = scheduler();

        let a = scheduler
            .schedule(
                Probe::new("a", &journal).requires(&[Resource::Drivetrain, Resource::Vision]),
            )
            .unwrap();
        scheduler.tick(&mut ()).unwrap();
        assert_eq!(scheduler.active(Resource::Drivetrain), Some(a));
        assert_eq!(scheduler.active(Resource::Vision), Some(a));

        let b = scheduler
            .schedule(Probe::new("b", &journal).requires(&[Resource::Vision]))
            .unwrap();
        scheduler.tick(&mut ()).unwrap();

        assert_eq!(scheduler.active(Resource::Drivetrain), None);
        assert_eq!(scheduler.active(Resource::Vision), Some(b));
        assert_eq!(scheduler.requirements_of(b), Some(Resource::Vision.into()));
    }

    #[test]
    fn test_interrupt_before_step() {
        let journal = Journal::default();
        let mut scheduler = scheduler();

        scheduler
            .schedule(Probe::new("a", &journal).requires(&[Resource::Intake]))
            .unwrap();
        scheduler
            .schedule(Probe::new("b", &journal).requires(&[Resource::Intake]))
            .unwrap();
        scheduler.tick(&mut ()).unwrap();

        assert_eq!(journal.count("a", Hook::Start), 1);
        assert_eq!(journal.count("a", Hook::Step), 0);
        assert_eq!(journal.tick_of("a", Hook::End(true)), Some(0));
        assert_eq!(journal.count("b", Hook::Step), 1);
    }

    #[test]
    fn test_cancel_pending() {
        let journal = Journal::default();
        let mut scheduler = scheduler();

        let id = scheduler.schedule(Probe::new("a", &journal)).unwrap();
        scheduler.cancel(id);
        scheduler.tick(&mut ()).unwrap();

        assert!(!scheduler.is_scheduled(id));
        assert_eq!(journal.count("a", Hook::Start), 0);
        assert_eq!(journal.count("a", Hook::End(true)), 0);
    }

    #[test]
    fn test_cancel_running() {
        let journal = Journal::default();
        let mut scheduler = scheduler();

        let id = scheduler
            .schedule(Probe::new("a", &journal).requires(&[Resource::Climber]))
            .unwrap();
        scheduler.tick(&mut ()).unwrap();

        scheduler.cancel(id);
        assert!(scheduler.is_scheduled(id));
        scheduler.tick(&mut ()).unwrap();

        assert!(!scheduler.is_scheduled(id));
        assert_eq!(journal.tick_of("a", Hook::End(true)), Some(1));
        assert_eq!(journal.count("a", Hook::Step), 1);
        assert_eq!(scheduler.active(Resource::Climber), None);
    }

    #[test]
    fn test_cancel_all() {
        let journal = Journal::default();
        let mut scheduler = scheduler();

        scheduler
            .schedule(Probe::new("a", &journal).finish_after(1))
            .unwrap();
        scheduler
            .schedule(Probe::new("b", &journal).requires(&[Resource::Magazine]))
            .unwrap();
        scheduler.tick(&mut ()).unwrap();

        let c = scheduler.schedule(Probe::new("c", &journal)).unwrap();
        scheduler.cancel_all(&mut ()).unwrap();

        assert!(scheduler.is_empty());
        assert!(!scheduler.is_scheduled(c));
        assert_eq!(journal.count("a", Hook::End(false)), 1);
        assert_eq!(journal.count("b", Hook::End(true)), 1);
        assert_eq!(journal.count("c", Hook::Start), 0);
        assert_eq!(scheduler.active(Resource::Magazine), None);
    }

    #[test]
    fn test_unregistered_resource() {
        let journal = Journal::default();
        let mut scheduler = Scheduler::new(Duration::from_millis(20));
        scheduler.register(Resource::Drivetrain).unwrap();

        let result = scheduler.schedule(
            Probe::new("a", &journal).requires(&[Resource::Drivetrain, Resource::Climber]),
        );

        assert!(matches!(
            result,
            Err(Error::UnregisteredResource(Resource::Climber))
        ));
    }

    #[test]
    fn test_hook_error_fails_fast() {
        let journal = Journal::default();
        let mut scheduler = scheduler();

        scheduler
            .schedule(Probe::new("a", &journal).fail_on(Hook::Step))
            .unwrap();

        assert!(matches!(scheduler.tick(&mut ()), Err(Error::Device(_))));
        assert_eq!(journal.count("a", Hook::Start), 1);
    }

    #[test]
    fn test_start_error_releases_resources() {
        let journal = Journal::default();
        let mut scheduler = scheduler();

        let default_journal = journal.clone();
        scheduler
            .set_default(Resource::Drivetrain, move || {
                Probe::new("default", &default_journal)
                    .requires(&[Resource::Drivetrain])
                    .boxed()
            })
            .unwrap();
        scheduler.tick(&mut ()).unwrap();

        let bad = scheduler
            .schedule(
                Probe::new("bad", &journal)
                    .fail_on(Hook::Start)
                    .requires(&[Resource::Drivetrain]),
            )
            .unwrap();

        assert!(matches!(scheduler.tick(&mut ()), Err(Error::Device(_))));
        assert_eq!(journal.count("default", Hook::End(true)), 1);
        assert_eq!(journal.count("bad", Hook::Start), 1);
        assert_eq!(journal.count("bad", Hook::End(true)), 1);
        assert!(!scheduler.is_scheduled(bad));
        assert_eq!(scheduler.active(Resource::Drivetrain), None);

        scheduler.cancel_all(&mut ()).unwrap();
        for _ in 0..3 {
            scheduler.tick(&mut ()).unwrap();
        }

        assert_eq!(journal.count("bad", Hook::End(true)), 1);
        assert_eq!(journal.count("default", Hook::Start), 2);

        let default_id = scheduler.active(Resource::Drivetrain).unwrap();
        assert!(scheduler.is_default(default_id));
    }

    #[test]
    fn test_one_holder_per_resource() {
        let journal = Journal::default();
        let mut scheduler = scheduler();

        let requirements = [
            vec![Resource::Drivetrain, Resource::Vision],
            vec![Resource::Shooter, Resource::Magazine],
            vec![Resource::Vision, Resource::Shooter],
            vec![Resource::Magazine],
            vec![Resource::Drivetrain, Resource::Shooter, Resource::Intake],
        ];

        for (i, resources) in requirements.iter().enumerate() {
            scheduler
                .schedule(
                    Probe::new(&format!("p{}", i), &journal)
                        .finish_after(i as u64 + 1)
                        .requires(resources),
                )
                .unwrap();
            scheduler.tick(&mut ()).unwrap();

            for resource in Resource::ALL {
                let holders = scheduler
                    .running
                    .values()
                    .filter(|entry| entry.requirements.contains(resource))
                    .count();
                assert!(holders <= 1);
            }
        }

        let starts: usize = (0..requirements.len())
            .map(|i| journal.count(&format!("p{}", i), Hook::Start))
            .sum();
        let ends: usize = (0..requirements.len())
            .map(|i| {
                journal.count(&format!("p{}", i), Hook::End(true))
                    + journal.count(&format!("p{}", i), Hook::End(false))
            })
            .sum();
        assert_eq!(starts, requirements.len());
        assert_eq!(ends + scheduler.len(), starts);
    }
}
