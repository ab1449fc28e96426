use super::{ActionId, BoxedAction, Error, Resource, ResourceSet, Result};

/// Default action factory.
///
/// A fresh default action is built every time the resource becomes idle.
pub struct DefaultFactory<R>(Box<dyn Fn() -> BoxedAction<R>>);

impl<R> DefaultFactory<R> {
    pub fn new(factory: impl Fn() -> BoxedAction<R> + 'static) -> Self {
        Self(Box::new(factory))
    }

    /// Build a new default action.
    #[inline]
    pub fn build(&self) -> BoxedAction<R> {
        (self.0)()
    }
}

struct Slot<R> {
    /// Action currently holding the resource.
    active: Option<ActionId>,
    /// Action to run when the resource is idle.
    default: Option<DefaultFactory<R>>,
}

/// Resource registry.
///
/// Tracks which resources exist, which action holds each resource and the
/// default action of each resource. Resources are registered once, before
/// the first tick.
pub struct Registry<R> {
    slots: [Option<Slot<R>>; Resource::COUNT],
}

impl<R> Default for Registry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Registry<R> {
    /// Construct an empty registry.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Register a resource.
    pub fn register(&mut self, resource: Resource) -> Result {
        let slot = &mut self.slots[resource.index()];
        if slot.is_some() {
            return Err(Error::DuplicateResource(resource));
        }

        *slot = Some(Slot {
            active: None,
            default: None,
        });

        Ok(())
    }

    /// Check if the resource was registered.
    #[inline]
    pub fn is_registered(&self, resource: Resource) -> bool {
        self.slots[resource.index()].is_some()
    }

    /// Retrieve the set of registered resources.
    pub fn registered(&self) -> ResourceSet {
        Resource::ALL
            .into_iter()
            .filter(|resource| self.is_registered(*resource))
            .collect()
    }

    /// Verify every required resource was registered.
    pub fn validate(&self, requirements: ResourceSet) -> Result {
        match requirements.iter().find(|r| !self.is_registered(*r)) {
            Some(resource) => Err(Error::UnregisteredResource(resource)),
            None => Ok(()),
        }
    }

    /// Set the default action of a resource.
    ///
    /// The factory is probed once. The action it builds must require exactly
    /// the resource it is the default of. Replaces any earlier default; the
    /// new default takes effect the next time the resource is idle.
    pub fn set_default(
        &mut self,
        resource: Resource,
        factory: impl Fn() -> BoxedAction<R> + 'static,
    ) -> Result {
        if !self.is_registered(resource) {
            return Err(Error::UnregisteredResource(resource));
        }

        let requirements = factory().requirements();
        if requirements != ResourceSet::from(resource) {
            return Err(Error::InvalidDefault {
                resource,
                requirements,
            });
        }

        let slot = self.slot_mut(resource)?;
        slot.default = Some(DefaultFactory::new(factory));

        Ok(())
    }

    /// Check if the resource has a default action.
    pub fn has_default(&self, resource: Resource) -> bool {
        self.slots[resource.index()]
            .as_ref()
            .is_some_and(|slot| slot.default.is_some())
    }

    /// Retrieve the action holding the resource.
    #[inline]
    pub fn active(&self, resource: Resource) -> Option<ActionId> {
        self.slots[resource.index()]
            .as_ref()
            .and_then(|slot| slot.active)
    }

    /// Retrieve the distinct holders of any of the resources.
    pub(super) fn holders(&self, requirements: ResourceSet) -> Vec<ActionId> {
        let mut holders: Vec<_> = requirements
            .iter()
            .filter_map(|resource| self.active(resource))
            .collect();

        holders.sort();
        holders.dedup();
        holders
    }

    /// Make the action the holder of every required resource.
    pub(super) fn claim(&mut self, requirements: ResourceSet, id: ActionId) {
        for resource in requirements.iter() {
            if let Some(slot) = self.slots[resource.index()].as_mut() {
                debug_assert!(slot.active.is_none());
                slot.active = Some(id);
            }
        }
    }

    /// Release every resource held by the action.
    pub(super) fn release(&mut self, id: ActionId) -> ResourceSet {
        let mut released = ResourceSet::empty();

        for resource in Resource::ALL {
            if let Some(slot) = self.slots[resource.index()].as_mut() {
                if slot.active == Some(id) {
                    slot.active = None;
                    released.insert(resource);
                }
            }
        }

        released
    }

    /// Resources that are idle and have a default action.
    pub(super) fn idle_with_default(&self) -> Vec<Resource> {
        Resource::ALL
            .into_iter()
            .filter(|resource| {
                self.slots[resource.index()]
                    .as_ref()
                    .is_some_and(|slot| slot.active.is_none() && slot.default.is_some())
            })
            .collect()
    }

    /// Build the default action of a resource.
    pub(super) fn build_default(&self, resource: Resource) -> Option<BoxedAction<R>> {
        self.slots[resource.index()]
            .as_ref()
            .and_then(|slot| slot.default.as_ref())
            .map(DefaultFactory::build)
    }

    fn slot_mut(&mut self, resource: Resource) -> Result<&mut Slot<R>> {
        self.slots[resource.index()]
            .as_mut()
            .ok_or(Error::UnregisteredResource(resource))
    }
}
