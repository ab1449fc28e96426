use crate::config::{MagazineConfig, ShooterConfig};
use crate::math::InterpolationTable;
use crate::robot::Robot;
use crate::runtime::{Action, Context, Resource, ResourceSet, Result};

/// Distance the cargo effectively travels to the hub.
///
/// While the robot closes in on the hub during the time of flight the shot
/// needs less range, and more when it moves away.
pub fn effective_distance(distance: f64, closing_speed: f64, time_of_flight: &InterpolationTable) -> f64 {
    (distance - closing_speed * time_of_flight.get(distance)).max(0.0)
}

/// Shoot all cargo at the hub.
///
/// Spins up the flywheel and sets the hood from the shot table using the
/// vision distance. The magazine feeds only while the flywheel and hood are
/// on target. Finishes when the magazine is empty.
pub struct LimelightShoot {
    config: ShooterConfig,
    magazine: MagazineConfig,
    velocity: InterpolationTable,
    hood: InterpolationTable,
    time_of_flight: InterpolationTable,
    feeding: bool,
}

impl LimelightShoot {
    pub fn new(config: &ShooterConfig, magazine: &MagazineConfig) -> Self {
        Self {
            config: config.clone(),
            magazine: magazine.clone(),
            velocity: config.velocity_table(),
            hood: config.hood_table(),
            time_of_flight: config.time_of_flight_table(),
            feeding: false,
        }
    }

    fn is_ready(&self, robot: &Robot) -> bool {
        robot.shooter.velocity_error().abs() < self.config.ready_tolerance
            && robot.shooter.is_hood_at_angle()
    }
}

impl Action<Robot> for LimelightShoot {
    fn name(&self) -> &str {
        "limelight shoot"
    }

    fn requirements(&self) -> ResourceSet {
        ResourceSet::of(&[Resource::Shooter, Resource::Magazine, Resource::Vision])
    }

    fn start(&mut self, _ctx: &Context, robot: &mut Robot) -> Result {
        self.feeding = false;
        robot.vision.set_leds(true)?;

        Ok(())
    }

    fn step(&mut self, _ctx: &Context, robot: &mut Robot) -> Result {
        let target = robot
            .vision
            .target_distance()
            .zip(robot.vision.target_angle());

        if let Some((distance, angle)) = target {
            let speeds = robot.drivetrain.speeds();
            let angle = angle.to_radians();
            let closing_speed = speeds.vx * angle.cos() + speeds.vy * angle.sin();

            let distance = effective_distance(distance, closing_speed, &self.time_of_flight);

            robot.shooter.set_velocity(self.velocity.get(distance))?;
            robot.shooter.set_hood_angle(self.hood.get(distance))?;
        }

        let ready = target.is_some() && self.is_ready(robot);
        if ready != self.feeding {
            log::debug!("Shooter {}", if ready { "feeding" } else { "holding" });
            self.feeding = ready;
        }

        if self.feeding {
            robot.magazine.set_upper_speed(self.magazine.feed_speed)?;
            robot.magazine.set_lower_speed(self.magazine.feed_speed)?;
        } else {
            robot.magazine.stop()?;
        }

        Ok(())
    }

    fn is_finished(&self, _ctx: &Context, robot: &Robot) -> bool {
        super::magazine::is_magazine_empty(&self.magazine, robot)
    }

    fn end(&mut self, _ctx: &Context, robot: &mut Robot, _interrupted: bool) -> Result {
        robot.shooter.set_velocity(0.0)?;
        robot.magazine.stop()?;
        robot.vision.set_leds(false)?;

        Ok(())
    }
}

/// Home the hood against the back limit switch.
///
/// The default action of the shooter. Drives the hood back until the switch
/// closes, zeroes the hood encoder and holds the flywheel idle. Never
/// finishes.
pub struct ResetHoodAngle {
    speed: f64,
    homed: bool,
}

impl ResetHoodAngle {
    pub fn new(config: &ShooterConfig) -> Self {
        Self {
            speed: config.hood_reset_speed,
            homed: false,
        }
    }
}

impl Action<Robot> for ResetHoodAngle {
    fn name(&self) -> &str {
        "reset hood angle"
    }

    fn requirements(&self) -> ResourceSet {
        Resource::Shooter.into()
    }

    fn start(&mut self, _ctx: &Context, robot: &mut Robot) -> Result {
        self.homed = false;
        robot.shooter.set_velocity(0.0)?;

        Ok(())
    }

    fn step(&mut self, _ctx: &Context, robot: &mut Robot) -> Result {
        if self.homed {
            return Ok(());
        }

        if robot.shooter.is_hood_back_switch() {
            robot.shooter.set_hood_speed(0.0)?;
            robot.shooter.zero_hood()?;

            log::trace!("Hood homed");

            self.homed = true;
        } else {
            robot.shooter.set_hood_speed(-self.speed)?;
        }

        Ok(())
    }

    fn end(&mut self, _ctx: &Context, robot: &mut Robot, _interrupted: bool) -> Result {
        robot.shooter.set_hood_speed(0.0)?;
        Ok(())
    }
}
