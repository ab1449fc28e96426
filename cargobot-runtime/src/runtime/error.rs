use std::{error, fmt};

use crate::device::DeviceError;

use super::{Resource, ResourceSet};

#[derive(Debug)]
pub enum Error {
    /// Resource was registered more than once.
    DuplicateResource(Resource),
    /// Action requires a resource that was never registered.
    UnregisteredResource(Resource),
    /// Default action must require exactly its own resource.
    InvalidDefault {
        resource: Resource,
        requirements: ResourceSet,
    },
    /// Children of a parallel group share one or more resources.
    RequirementConflict(ResourceSet),
    /// Group requires at least one child.
    EmptyGroup,
    /// Routine name was registered more than once.
    DuplicateRoutine(String),
    /// Routine name is not in the catalog.
    UnknownRoutine(String),
    /// No routine was selected and there is no default option.
    NoRoutineSelected,
    /// The autonomous period has claimed the selection.
    SelectionLocked,
    /// Trajectory data could not be found.
    MissingTrajectory(String),
    /// Trajectory data is malformed.
    InvalidTrajectory { name: String, reason: String },
    /// Device fault raised from an action hook.
    Device(DeviceError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateResource(resource) => {
                write!(f, "resource {} registered more than once", resource)
            }
            Error::UnregisteredResource(resource) => {
                write!(f, "resource {} is not registered", resource)
            }
            Error::InvalidDefault {
                resource,
                requirements,
            } => write!(
                f,
                "default action for {} must require only {}, requires {}",
                resource, resource, requirements
            ),
            Error::RequirementConflict(resources) => {
                write!(f, "parallel actions share resources {}", resources)
            }
            Error::EmptyGroup => write!(f, "group requires at least one action"),
            Error::DuplicateRoutine(name) => {
                write!(f, "routine '{}' registered more than once", name)
            }
            Error::UnknownRoutine(name) => write!(f, "unknown routine '{}'", name),
            Error::NoRoutineSelected => write!(f, "no routine selected"),
            Error::SelectionLocked => write!(f, "routine selection is locked"),
            Error::MissingTrajectory(name) => write!(f, "trajectory '{}' not found", name),
            Error::InvalidTrajectory { name, reason } => {
                write!(f, "trajectory '{}' is invalid: {}", name, reason)
            }
            Error::Device(e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Device(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeviceError> for Error {
    fn from(value: DeviceError) -> Self {
        Error::Device(value)
    }
}
