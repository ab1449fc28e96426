use crate::config::VisionConfig;
use crate::core::ChassisSpeeds;
use crate::math::Pid;
use crate::robot::Robot;
use crate::runtime::{Action, Context, Resource, ResourceSet, Result};

/// Turn the robot towards the hub.
///
/// Rotates in place until the vision target is within tolerance. Without a
/// target in view the drivetrain holds still and the action keeps waiting,
/// so it is usually bounded with a timeout.
pub struct LimelightAim {
    controller: Pid,
    tolerance: f64,
    aimed: bool,
}

impl LimelightAim {
    pub fn new(config: &VisionConfig) -> Self {
        Self {
            controller: config.aim.into(),
            tolerance: config.tolerance,
            aimed: false,
        }
    }
}

impl Action<Robot> for LimelightAim {
    fn name(&self) -> &str {
        "limelight aim"
    }

    fn requirements(&self) -> ResourceSet {
        ResourceSet::of(&[Resource::Drivetrain, Resource::Vision])
    }

    fn start(&mut self, _ctx: &Context, robot: &mut Robot) -> Result {
        self.aimed = false;
        self.controller.reset();

        robot.vision.set_leds(true)?;

        Ok(())
    }

    fn step(&mut self, ctx: &Context, robot: &mut Robot) -> Result {
        let Some(angle) = robot.vision.target_angle() else {
            robot.drivetrain.stop()?;
            return Ok(());
        };

        if angle.abs() < self.tolerance {
            log::trace!("Aimed at {:.2} degrees", angle);

            self.aimed = true;
            robot.drivetrain.stop()?;
        } else {
            let omega = self
                .controller
                .update(angle.to_radians(), ctx.period().as_secs_f64());

            robot.drivetrain.drive(ChassisSpeeds::new(0.0, 0.0, omega))?;
        }

        Ok(())
    }

    fn is_finished(&self, _ctx: &Context, _robot: &Robot) -> bool {
        self.aimed
    }

    fn end(&mut self, _ctx: &Context, robot: &mut Robot, _interrupted: bool) -> Result {
        robot.drivetrain.stop()?;
        robot.vision.set_leds(false)?;

        Ok(())
    }
}
