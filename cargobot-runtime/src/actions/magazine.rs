use crate::config::MagazineConfig;
use crate::robot::Robot;
use crate::runtime::{Action, Context, Resource, ResourceSet, Result};

/// Both magazine stages hold cargo.
pub fn is_magazine_full(config: &MagazineConfig, robot: &Robot) -> bool {
    config.has_lower_cargo(robot.magazine.lower_sensor())
        && config.has_upper_cargo(robot.magazine.upper_sensor())
}

/// Neither magazine stage holds cargo.
pub fn is_magazine_empty(config: &MagazineConfig, robot: &Robot) -> bool {
    !config.has_lower_cargo(robot.magazine.lower_sensor())
        && !config.has_upper_cargo(robot.magazine.upper_sensor())
}

/// Index cargo from the lower into the upper stage.
///
/// The default action of the magazine. Runs the magazine only while the
/// lower stage holds cargo and the upper stage is free. Never finishes.
pub struct MagazineAutoBump {
    config: MagazineConfig,
    bumping: bool,
}

impl MagazineAutoBump {
    pub fn new(config: &MagazineConfig) -> Self {
        Self {
            config: config.clone(),
            bumping: false,
        }
    }
}

impl Action<Robot> for MagazineAutoBump {
    fn name(&self) -> &str {
        "magazine auto bump"
    }

    fn requirements(&self) -> ResourceSet {
        Resource::Magazine.into()
    }

    fn step(&mut self, _ctx: &Context, robot: &mut Robot) -> Result {
        let bump = self.config.has_lower_cargo(robot.magazine.lower_sensor())
            && !self.config.has_upper_cargo(robot.magazine.upper_sensor());

        if bump {
            robot.magazine.set_lower_speed(self.config.bump_speed)?;
            robot.magazine.set_upper_speed(self.config.bump_speed)?;
        } else {
            robot.magazine.stop()?;
        }

        if bump != self.bumping {
            log::trace!("Magazine {}", if bump { "bumping" } else { "idle" });
            self.bumping = bump;
        }

        Ok(())
    }

    fn end(&mut self, _ctx: &Context, robot: &mut Robot, _interrupted: bool) -> Result {
        self.bumping = false;
        robot.magazine.stop()?;
        Ok(())
    }
}

/// Eject all cargo back through the intake.
///
/// Runs both stages in reverse until interrupted.
pub struct MagazineSpitCargo {
    speed: f64,
}

impl MagazineSpitCargo {
    pub fn new(config: &MagazineConfig) -> Self {
        Self {
            speed: config.spit_speed,
        }
    }
}

impl Action<Robot> for MagazineSpitCargo {
    fn name(&self) -> &str {
        "magazine spit cargo"
    }

    fn requirements(&self) -> ResourceSet {
        Resource::Magazine.into()
    }

    fn step(&mut self, _ctx: &Context, robot: &mut Robot) -> Result {
        robot.magazine.set_lower_speed(self.speed)?;
        robot.magazine.set_upper_speed(self.speed)?;
        Ok(())
    }

    fn end(&mut self, _ctx: &Context, robot: &mut Robot, _interrupted: bool) -> Result {
        robot.magazine.stop()?;
        Ok(())
    }
}
