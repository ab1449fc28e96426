use super::{Action, BoxedAction, Context, Error, ResourceSet, Result};

/// Named, fully built action tree.
///
/// A routine is built once when it is registered and never rebuilt.
pub struct Routine<R> {
    name: String,
    requirements: ResourceSet,
    action: BoxedAction<R>,
}

impl<R> Routine<R> {
    /// Routine name as shown in the chooser.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resources required by the routine.
    #[inline]
    pub fn requirements(&self) -> ResourceSet {
        self.requirements
    }
}

impl<R> Action<R> for Routine<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> ResourceSet {
        self.requirements
    }

    fn start(&mut self, ctx: &Context, robot: &mut R) -> Result {
        log::info!("Routine '{}' started", self.name);
        self.action.start(ctx, robot)
    }

    fn step(&mut self, ctx: &Context, robot: &mut R) -> Result {
        self.action.step(ctx, robot)
    }

    fn is_finished(&self, ctx: &Context, robot: &R) -> bool {
        self.action.is_finished(ctx, robot)
    }

    fn end(&mut self, ctx: &Context, robot: &mut R, interrupted: bool) -> Result {
        if interrupted {
            log::info!("Routine '{}' interrupted", self.name);
        } else {
            log::info!("Routine '{}' completed", self.name);
        }

        self.action.end(ctx, robot, interrupted)
    }
}

/// Routine catalog.
///
/// The catalog backs the autonomous chooser. Routines are registered by
/// name and at most one is selected. When nothing was selected the default
/// option is used. Handing the selection to the autonomous period locks the
/// catalog, after which the selection can no longer change.
pub struct Catalog<R> {
    routines: Vec<Routine<R>>,
    default: Option<usize>,
    selected: Option<usize>,
    locked: bool,
}

impl<R> Default for Catalog<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Catalog<R> {
    pub fn new() -> Self {
        Self {
            routines: Vec::new(),
            default: None,
            selected: None,
            locked: false,
        }
    }

    /// Register a routine.
    ///
    /// The routine is built right away. If the build fails the routine is
    /// not registered and the error is returned.
    pub fn register<A: Action<R> + 'static>(
        &mut self,
        name: &str,
        build: impl FnOnce() -> Result<A>,
    ) -> Result {
        self.insert(name, build).map(|_| ())
    }

    /// Register a routine as the default option.
    pub fn register_default<A: Action<R> + 'static>(
        &mut self,
        name: &str,
        build: impl FnOnce() -> Result<A>,
    ) -> Result {
        let index = self.insert(name, build)?;
        self.default = Some(index);

        log::debug!("Routine '{}' is the default option", name);

        Ok(())
    }

    fn insert<A: Action<R> + 'static>(
        &mut self,
        name: &str,
        build: impl FnOnce() -> Result<A>,
    ) -> Result<usize> {
        if self.locked {
            return Err(Error::SelectionLocked);
        }
        if self.position(name).is_some() {
            return Err(Error::DuplicateRoutine(name.to_owned()));
        }

        let action = build()?;

        log::info!("Registered routine '{}' on {}", name, action.requirements());

        self.routines.push(Routine {
            name: name.to_owned(),
            requirements: action.requirements(),
            action: Box::new(action),
        });

        Ok(self.routines.len() - 1)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.routines.iter().position(|routine| routine.name == name)
    }

    /// Routine names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routines.iter().map(|routine| routine.name.as_str())
    }

    /// Name of the default option.
    pub fn default_name(&self) -> Option<&str> {
        self.default.map(|index| self.routines[index].name.as_str())
    }

    /// Check if the selection was handed to the autonomous period.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Select a routine by name.
    ///
    /// Selecting the routine that is already selected has no effect. A
    /// different selection replaces the earlier one until the catalog is
    /// locked.
    pub fn select(&mut self, name: &str) -> Result {
        if self.locked {
            return Err(Error::SelectionLocked);
        }

        let index = self
            .position(name)
            .ok_or_else(|| Error::UnknownRoutine(name.to_owned()))?;

        if self.selected == Some(index) {
            log::debug!("Routine '{}' already selected", name);
            return Ok(());
        }

        self.selected = Some(index);

        log::info!("Selected routine '{}'", name);

        Ok(())
    }

    /// Retrieve the selected routine, or the default option.
    pub fn selected(&self) -> Result<&Routine<R>> {
        if self.locked {
            return Err(Error::SelectionLocked);
        }

        self.selected
            .or(self.default)
            .map(|index| &self.routines[index])
            .ok_or(Error::NoRoutineSelected)
    }

    /// Hand the selected routine to the autonomous period.
    ///
    /// Locks the catalog.
    pub fn take_selected(&mut self) -> Result<Routine<R>> {
        if self.locked {
            return Err(Error::SelectionLocked);
        }

        let index = self
            .selected
            .or(self.default)
            .ok_or(Error::NoRoutineSelected)?;

        self.locked = true;

        Ok(self.routines.swap_remove(index))
    }
}
