use crate::config::{IntakeConfig, MagazineConfig};
use crate::robot::Robot;
use crate::runtime::{Action, Context, Resource, ResourceSet, Result};

use super::magazine;

/// Deploy the intake and collect cargo until the magazine is full.
///
/// Only the intake is required. The magazine sensors are read but the
/// magazine is left to its own action, usually the auto bump.
pub struct IntakeCargo {
    speed: f64,
    magazine: MagazineConfig,
}

impl IntakeCargo {
    pub fn new(config: &IntakeConfig, magazine: &MagazineConfig) -> Self {
        Self {
            speed: config.speed,
            magazine: magazine.clone(),
        }
    }
}

impl Action<Robot> for IntakeCargo {
    fn name(&self) -> &str {
        "intake cargo"
    }

    fn requirements(&self) -> ResourceSet {
        Resource::Intake.into()
    }

    fn start(&mut self, _ctx: &Context, robot: &mut Robot) -> Result {
        robot.intake.set_deployed(true)?;
        Ok(())
    }

    fn step(&mut self, _ctx: &Context, robot: &mut Robot) -> Result {
        robot.intake.set_speed(self.speed)?;
        Ok(())
    }

    fn is_finished(&self, _ctx: &Context, robot: &Robot) -> bool {
        magazine::is_magazine_full(&self.magazine, robot)
    }

    fn end(&mut self, _ctx: &Context, robot: &mut Robot, interrupted: bool) -> Result {
        if !interrupted {
            log::debug!("Magazine full");
        }

        robot.intake.set_speed(0.0)?;
        robot.intake.set_deployed(false)?;

        Ok(())
    }
}
