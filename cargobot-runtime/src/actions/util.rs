use std::time::Duration;

use crate::runtime::{Action, Context, Resource, ResourceSet, Result};

/// Run a function once and finish.
pub struct Instant<R> {
    name: String,
    requirements: ResourceSet,
    func: Box<dyn FnMut(&mut R) -> Result>,
}

impl<R> Instant<R> {
    pub fn new(name: &str, func: impl FnMut(&mut R) -> Result + 'static) -> Self {
        Self {
            name: name.to_owned(),
            requirements: ResourceSet::empty(),
            func: Box::new(func),
        }
    }

    /// Declare the resources the function touches.
    pub fn requires(mut self, resources: &[Resource]) -> Self {
        self.requirements = ResourceSet::of(resources);
        self
    }
}

impl<R> Action<R> for Instant<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> ResourceSet {
        self.requirements
    }

    fn start(&mut self, _ctx: &Context, robot: &mut R) -> Result {
        (self.func)(robot)
    }

    fn is_finished(&self, _ctx: &Context, _robot: &R) -> bool {
        true
    }
}

/// Log a message and finish.
pub struct Print {
    message: String,
}

impl Print {
    pub fn new(message: impl ToString) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl<R> Action<R> for Print {
    fn name(&self) -> &str {
        "print"
    }

    fn start(&mut self, _ctx: &Context, _robot: &mut R) -> Result {
        log::info!("{}", self.message);
        Ok(())
    }

    fn is_finished(&self, _ctx: &Context, _robot: &R) -> bool {
        true
    }
}

/// Wait for a duration.
pub struct Wait {
    duration: Duration,
    ticks: u64,
    elapsed: u64,
}

impl Wait {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            ticks: 0,
            elapsed: 0,
        }
    }
}

impl<R> Action<R> for Wait {
    fn name(&self) -> &str {
        "wait"
    }

    fn start(&mut self, ctx: &Context, _robot: &mut R) -> Result {
        self.ticks = ctx.ticks_for(self.duration);
        self.elapsed = 0;
        Ok(())
    }

    fn step(&mut self, _ctx: &Context, _robot: &mut R) -> Result {
        self.elapsed += 1;
        Ok(())
    }

    fn is_finished(&self, _ctx: &Context, _robot: &R) -> bool {
        self.elapsed >= self.ticks
    }
}

/// Wait until a condition holds.
pub struct WaitUntil<R> {
    name: String,
    condition: Box<dyn Fn(&R) -> bool>,
}

impl<R> WaitUntil<R> {
    pub fn new(name: &str, condition: impl Fn(&R) -> bool + 'static) -> Self {
        Self {
            name: name.to_owned(),
            condition: Box::new(condition),
        }
    }
}

impl<R> Action<R> for WaitUntil<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_finished(&self, _ctx: &Context, robot: &R) -> bool {
        (self.condition)(robot)
    }
}
