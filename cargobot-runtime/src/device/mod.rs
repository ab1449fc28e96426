//! Mechanism interfaces.
//!
//! Every mechanism on the robot is reached through one of these traits.
//! Calls are synchronous and must not block; the effect of a command is
//! visible no later than the next tick. The `periodic` hook runs once per
//! tick before the scheduler, so devices can refresh their readings.

use std::time::Duration;

use crate::core::{ChassisSpeeds, Pose};

pub use self::error::{DeviceError, ErrorKind};

mod error;
pub mod sim;

pub type Result<T = ()> = std::result::Result<T, DeviceError>;

/// Swerve drivetrain.
pub trait Drivetrain {
    /// Estimated pose on the field.
    fn pose(&self) -> Pose;

    /// Reset the odometry to a known pose.
    fn reset_odometry(&mut self, pose: Pose) -> Result;

    /// Gyroscope heading in degrees.
    fn gyroscope(&self) -> f64;

    /// Set the gyroscope heading in degrees.
    fn set_gyroscope(&mut self, degrees: f64) -> Result;

    /// Current robot relative velocity.
    fn speeds(&self) -> ChassisSpeeds;

    /// Drive with robot relative speeds.
    fn drive(&mut self, speeds: ChassisSpeeds) -> Result;

    /// Stop all modules.
    fn stop(&mut self) -> Result {
        self.drive(ChassisSpeeds::default())
    }

    fn periodic(&mut self, _dt: Duration) -> Result {
        Ok(())
    }
}

/// Flywheel shooter with adjustable hood.
pub trait Shooter {
    /// Run the flywheel at a velocity setpoint.
    fn set_velocity(&mut self, velocity: f64) -> Result;

    /// Flywheel closed loop error.
    fn velocity_error(&self) -> f64;

    /// Hood encoder position.
    fn hood_position(&self) -> f64;

    /// Move the hood to an angle in closed loop.
    fn set_hood_angle(&mut self, angle: f64) -> Result;

    /// Run the hood motor in open loop.
    fn set_hood_speed(&mut self, speed: f64) -> Result;

    /// Check if the hood rests against the back limit switch.
    fn is_hood_back_switch(&self) -> bool;

    /// Check if the hood reached the angle setpoint.
    fn is_hood_at_angle(&self) -> bool;

    /// Zero the hood encoder.
    fn zero_hood(&mut self) -> Result;

    fn periodic(&mut self, _dt: Duration) -> Result {
        Ok(())
    }
}

/// Two stage cargo magazine.
pub trait Magazine {
    /// Run the lower stage.
    fn set_lower_speed(&mut self, speed: f64) -> Result;

    /// Run the upper stage.
    fn set_upper_speed(&mut self, speed: f64) -> Result;

    /// Lower stage proximity sensor reading.
    fn lower_sensor(&self) -> f64;

    /// Upper stage proximity sensor reading.
    fn upper_sensor(&self) -> f64;

    /// Stop both stages.
    fn stop(&mut self) -> Result {
        self.set_lower_speed(0.0)?;
        self.set_upper_speed(0.0)
    }

    fn periodic(&mut self, _dt: Duration) -> Result {
        Ok(())
    }
}

/// Cargo intake.
pub trait Intake {
    /// Run the rollers.
    fn set_speed(&mut self, speed: f64) -> Result;

    /// Deploy or retract the intake.
    fn set_deployed(&mut self, deployed: bool) -> Result;

    fn is_deployed(&self) -> bool;

    fn periodic(&mut self, _dt: Duration) -> Result {
        Ok(())
    }
}

/// Climber winch and arms.
pub trait Climber {
    /// Winch encoder position.
    fn position(&self) -> f64;

    /// Move the winch to a position in closed loop.
    fn set_position(&mut self, position: f64) -> Result;

    /// Run the winch in open loop.
    fn set_speed(&mut self, speed: f64) -> Result;

    /// Check if the winch reached the bottom limit switch.
    fn is_bottom_switch(&self) -> bool;

    /// Extend or retract the arms.
    fn set_arms_out(&mut self, out: bool) -> Result;

    fn are_arms_out(&self) -> bool;

    /// Zero the winch encoder.
    fn zero_encoder(&mut self) -> Result;

    fn periodic(&mut self, _dt: Duration) -> Result {
        Ok(())
    }
}

/// Vision camera.
///
/// The camera is a black box reporting the hub target, when in view.
pub trait Vision {
    /// Horizontal angle to the target in degrees, counter-clockwise positive.
    fn target_angle(&self) -> Option<f64>;

    /// Distance to the target in meters.
    fn target_distance(&self) -> Option<f64>;

    /// Switch the camera LEDs.
    fn set_leds(&mut self, on: bool) -> Result;

    fn periodic(&mut self, _dt: Duration) -> Result {
        Ok(())
    }
}
