//! Test actions.
//!
//! The probe action records every hook call into a journal shared between
//! probes, so tests can assert on the exact order and tick of each call.

use std::{cell::RefCell, rc::Rc};

use crate::device::{DeviceError, ErrorKind};

use super::{Action, Context, Resource, ResourceSet, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Hook {
    Start,
    Step,
    End(bool),
}

#[derive(Clone, Debug)]
struct Entry {
    name: String,
    hook: Hook,
    tick: u64,
}

/// Shared hook journal.
#[derive(Clone, Default)]
pub(crate) struct Journal(Rc<RefCell<Vec<Entry>>>);

impl Journal {
    fn record(&self, name: &str, hook: Hook, tick: u64) {
        self.0.borrow_mut().push(Entry {
            name: name.to_owned(),
            hook,
            tick,
        });
    }

    fn matching(&self, name: &str, hook: Hook) -> Vec<(usize, u64)> {
        self.0
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.name == name && entry.hook == hook)
            .map(|(position, entry)| (position, entry.tick))
            .collect()
    }

    /// Position of the first matching call in the journal.
    pub(crate) fn position(&self, name: &str, hook: Hook) -> Option<usize> {
        self.matching(name, hook).first().map(|(position, _)| *position)
    }

    /// Tick of the first matching call.
    pub(crate) fn tick_of(&self, name: &str, hook: Hook) -> Option<u64> {
        self.matching(name, hook).first().map(|(_, tick)| *tick)
    }

    /// Ticks of all matching calls.
    pub(crate) fn ticks_of(&self, name: &str, hook: Hook) -> Vec<u64> {
        self.matching(name, hook)
            .into_iter()
            .map(|(_, tick)| tick)
            .collect()
    }

    pub(crate) fn count(&self, name: &str, hook: Hook) -> usize {
        self.matching(name, hook).len()
    }
}

/// Recording action.
///
/// Never finishes unless told to finish after a number of steps.
pub(crate) struct Probe {
    name: String,
    journal: Journal,
    requirements: ResourceSet,
    finish_after: Option<u64>,
    fail_on: Option<Hook>,
    steps: u64,
}

impl Probe {
    pub(crate) fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_owned(),
            journal: journal.clone(),
            requirements: ResourceSet::empty(),
            finish_after: None,
            fail_on: None,
            steps: 0,
        }
    }

    /// Report finished once stepped this many times.
    pub(crate) fn finish_after(mut self, steps: u64) -> Self {
        self.finish_after = Some(steps);
        self
    }

    pub(crate) fn requires(mut self, resources: &[Resource]) -> Self {
        self.requirements = ResourceSet::of(resources);
        self
    }

    /// Raise a device fault from the hook.
    pub(crate) fn fail_on(mut self, hook: Hook) -> Self {
        self.fail_on = Some(hook);
        self
    }

    fn call(&self, ctx: &Context, hook: Hook) -> Result {
        self.journal.record(&self.name, hook, ctx.iteration());

        let fail = match (self.fail_on, hook) {
            (Some(Hook::End(_)), Hook::End(_)) => true,
            (Some(fail_on), hook) => fail_on == hook,
            (None, _) => false,
        };

        if fail {
            Err(DeviceError::new(&self.name, ErrorKind::Disconnected).into())
        } else {
            Ok(())
        }
    }
}

impl Action<()> for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> ResourceSet {
        self.requirements
    }

    fn start(&mut self, ctx: &Context, _robot: &mut ()) -> Result {
        self.steps = 0;
        self.call(ctx, Hook::Start)
    }

    fn step(&mut self, ctx: &Context, _robot: &mut ()) -> Result {
        self.steps += 1;
        self.call(ctx, Hook::Step)
    }

    fn is_finished(&self, _ctx: &Context, _robot: &()) -> bool {
        self.finish_after.is_some_and(|steps| self.steps >= steps)
    }

    fn end(&mut self, ctx: &Context, _robot: &mut (), interrupted: bool) -> Result {
        self.call(ctx, Hook::End(interrupted))
    }
}
