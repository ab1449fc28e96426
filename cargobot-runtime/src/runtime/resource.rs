/// Exclusive hardware resource.
///
/// A resource is owned by at most one running action at a time. The set of
/// resources is fixed for the lifetime of the process.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    /// Swerve drivetrain.
    Drivetrain = 0,
    /// Flywheel and hood.
    Shooter = 1,
    /// Cargo magazine.
    Magazine = 2,
    /// Cargo intake.
    Intake = 3,
    /// Climber arms and winch.
    Climber = 4,
    /// Vision camera.
    Vision = 5,
}

impl Resource {
    /// Number of resources.
    pub const COUNT: usize = 6;

    /// All resources in index order.
    pub const ALL: [Resource; Self::COUNT] = [
        Resource::Drivetrain,
        Resource::Shooter,
        Resource::Magazine,
        Resource::Intake,
        Resource::Climber,
        Resource::Vision,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    #[inline]
    fn mask(self) -> u8 {
        1 << self as u8
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Drivetrain => write!(f, "drivetrain"),
            Resource::Shooter => write!(f, "shooter"),
            Resource::Magazine => write!(f, "magazine"),
            Resource::Intake => write!(f, "intake"),
            Resource::Climber => write!(f, "climber"),
            Resource::Vision => write!(f, "vision"),
        }
    }
}

/// Set of resources.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourceSet(u8);

impl ResourceSet {
    /// Construct an empty set.
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Construct a set from a list of resources.
    pub fn of(resources: &[Resource]) -> Self {
        resources.iter().copied().collect()
    }

    /// Add a resource to the set.
    #[inline]
    pub fn insert(&mut self, resource: Resource) {
        self.0 |= resource.mask();
    }

    #[inline]
    pub fn contains(&self, resource: Resource) -> bool {
        self.0 & resource.mask() != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Check if both sets share at least one resource.
    #[inline]
    pub fn intersects(&self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Iterate the resources in index order.
    pub fn iter(&self) -> impl Iterator<Item = Resource> + '_ {
        Resource::ALL.into_iter().filter(|r| self.contains(*r))
    }
}

impl From<Resource> for ResourceSet {
    fn from(value: Resource) -> Self {
        Self(value.mask())
    }
}

impl FromIterator<Resource> for ResourceSet {
    fn from_iter<T: IntoIterator<Item = Resource>>(iter: T) -> Self {
        let mut set = ResourceSet::empty();
        for resource in iter {
            set.insert(resource);
        }
        set
    }
}

impl std::fmt::Debug for ResourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl std::fmt::Display for ResourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (idx, resource) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", resource)?;
        }
        write!(f, "}}")
    }
}
