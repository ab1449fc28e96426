use std::time::Duration;

use crate::device::{self, Climber, Drivetrain, Intake, Magazine, Shooter, Vision};

/// Robot mechanisms.
///
/// The robot is the state every action operates on. Actions only touch the
/// mechanisms matching the resources they require.
pub struct Robot {
    pub drivetrain: Box<dyn Drivetrain>,
    pub shooter: Box<dyn Shooter>,
    pub magazine: Box<dyn Magazine>,
    pub intake: Box<dyn Intake>,
    pub climber: Box<dyn Climber>,
    pub vision: Box<dyn Vision>,
}

impl Robot {
    /// Run the periodic hook of every mechanism.
    pub fn periodic(&mut self, dt: Duration) -> device::Result {
        self.drivetrain.periodic(dt)?;
        self.intake.periodic(dt)?;
        self.shooter.periodic(dt)?;
        self.magazine.periodic(dt)?;
        self.climber.periodic(dt)?;
        self.vision.periodic(dt)?;

        Ok(())
    }

    /// Command every mechanism to a safe state.
    pub fn stop(&mut self) -> device::Result {
        self.drivetrain.stop()?;
        self.shooter.set_velocity(0.0)?;
        self.shooter.set_hood_speed(0.0)?;
        self.magazine.stop()?;
        self.intake.set_speed(0.0)?;
        self.climber.set_speed(0.0)?;

        Ok(())
    }
}
