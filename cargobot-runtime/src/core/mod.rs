pub use self::trajectory::{
    CsvTrajectorySource, MemoryTrajectorySource, Sample, Trajectory, TrajectorySource,
};

mod trajectory;

/// Robot pose on the field.
///
/// Translation in meters, rotation counter-clockwise from the field X axis.
pub type Pose = nalgebra::Isometry2<f64>;

/// Construct a pose from field coordinates and a heading in radians.
#[inline]
pub fn pose(x: f64, y: f64, heading: f64) -> Pose {
    Pose::new(nalgebra::Vector2::new(x, y), heading)
}

/// Heading of a pose in radians.
#[inline]
pub fn heading(pose: &Pose) -> f64 {
    pose.rotation.angle()
}

/// Chassis velocity.
///
/// Translation in meters per second, rotation in radians per second.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ChassisSpeeds {
    /// Forward velocity.
    pub vx: f64,
    /// Sideways velocity, positive to the left.
    pub vy: f64,
    /// Angular velocity, counter-clockwise positive.
    pub omega: f64,
}

impl ChassisSpeeds {
    pub const fn new(vx: f64, vy: f64, omega: f64) -> Self {
        Self { vx, vy, omega }
    }

    /// Convert field relative speeds to robot relative speeds.
    pub fn from_field_relative(vx: f64, vy: f64, omega: f64, heading: f64) -> Self {
        let velocity = nalgebra::Rotation2::new(-heading) * nalgebra::Vector2::new(vx, vy);

        Self {
            vx: velocity.x,
            vy: velocity.y,
            omega,
        }
    }

    /// Convert robot relative speeds to field relative speeds.
    pub fn to_field_relative(&self, heading: f64) -> Self {
        let velocity = nalgebra::Rotation2::new(heading) * nalgebra::Vector2::new(self.vx, self.vy);

        Self {
            vx: velocity.x,
            vy: velocity.y,
            omega: self.omega,
        }
    }

    /// Check if all components are zero.
    pub fn is_zero(&self) -> bool {
        self.vx == 0.0 && self.vy == 0.0 && self.omega == 0.0
    }
}
