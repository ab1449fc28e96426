use crate::config::ClimberConfig;
use crate::robot::Robot;
use crate::runtime::{Action, Context, Resource, ResourceSet, Result};

/// Run the winch to a position.
///
/// Finishes once the winch is within tolerance of the target.
pub struct ClimberToPosition {
    name: &'static str,
    target: f64,
    tolerance: f64,
}

impl ClimberToPosition {
    pub fn new(name: &'static str, target: f64, config: &ClimberConfig) -> Self {
        Self {
            name,
            target,
            tolerance: config.tolerance,
        }
    }

    /// Raise the hooks above the bar.
    pub fn above_bar(config: &ClimberConfig) -> Self {
        Self::new("climber above bar", config.above_bar_position, config)
    }

    /// Pull the robot up, or lower the empty hooks.
    pub fn bottom(config: &ClimberConfig) -> Self {
        Self::new("climber to bottom", config.bottom_position, config)
    }
}

impl Action<Robot> for ClimberToPosition {
    fn name(&self) -> &str {
        self.name
    }

    fn requirements(&self) -> ResourceSet {
        Resource::Climber.into()
    }

    fn start(&mut self, _ctx: &Context, robot: &mut Robot) -> Result {
        robot.climber.set_position(self.target)?;
        Ok(())
    }

    fn is_finished(&self, _ctx: &Context, robot: &Robot) -> bool {
        (robot.climber.position() - self.target).abs() < self.tolerance
    }

    fn end(&mut self, _ctx: &Context, robot: &mut Robot, interrupted: bool) -> Result {
        // Holding position is left to the winch controller, unless cut short.
        if interrupted {
            robot.climber.set_speed(0.0)?;
        }

        Ok(())
    }
}

/// Move the climber arms in or out.
///
/// Arms in also lock the turret forward.
pub struct ClimberArms {
    out: bool,
}

impl ClimberArms {
    pub fn arms_in() -> Self {
        Self { out: false }
    }

    pub fn arms_out() -> Self {
        Self { out: true }
    }
}

impl Action<Robot> for ClimberArms {
    fn name(&self) -> &str {
        if self.out {
            "climber arms out"
        } else {
            "climber arms in"
        }
    }

    fn requirements(&self) -> ResourceSet {
        Resource::Climber.into()
    }

    fn start(&mut self, _ctx: &Context, robot: &mut Robot) -> Result {
        robot.climber.set_arms_out(self.out)?;
        Ok(())
    }

    fn is_finished(&self, _ctx: &Context, _robot: &Robot) -> bool {
        true
    }
}

/// Lower the winch onto the bottom switch and zero the encoder.
pub struct CalibrateClimber {
    speed: f64,
    calibrated: bool,
}

impl CalibrateClimber {
    pub fn new(config: &ClimberConfig) -> Self {
        Self {
            speed: config.calibrate_speed,
            calibrated: false,
        }
    }
}

impl Action<Robot> for CalibrateClimber {
    fn name(&self) -> &str {
        "calibrate climber"
    }

    fn requirements(&self) -> ResourceSet {
        Resource::Climber.into()
    }

    fn start(&mut self, _ctx: &Context, _robot: &mut Robot) -> Result {
        self.calibrated = false;
        Ok(())
    }

    fn step(&mut self, _ctx: &Context, robot: &mut Robot) -> Result {
        if robot.climber.is_bottom_switch() {
            robot.climber.set_speed(0.0)?;
            robot.climber.zero_encoder()?;

            log::info!("Climber calibrated");

            self.calibrated = true;
        } else {
            robot.climber.set_speed(self.speed)?;
        }

        Ok(())
    }

    fn is_finished(&self, _ctx: &Context, _robot: &Robot) -> bool {
        self.calibrated
    }

    fn end(&mut self, _ctx: &Context, robot: &mut Robot, _interrupted: bool) -> Result {
        robot.climber.set_speed(0.0)?;
        Ok(())
    }
}
