//! Autonomous routines.
//!
//! Each routine is a single action tree built from the leaf actions and the
//! runtime combinators. Routines are registered with the catalog, which
//! builds them once at startup.

use std::time::Duration;

use crate::actions::{
    FollowTrajectory, Instant, IntakeCargo, LimelightAim, LimelightShoot, MagazineAutoBump, Print,
};
use crate::config::Config;
use crate::core::{heading, Pose, TrajectorySource};
use crate::robot::Robot;
use crate::runtime::{
    ActionExt, Alongside, BoxedAction, Catalog, Resource, Result, Timeout,
};

mod five_ball_right;
mod system_check;
mod two_ball_middle;

pub const SYSTEM_CHECK: &str = "System Check";
pub const TWO_BALL_MIDDLE: &str = "Two Ball Middle";
pub const FIVE_BALL_RIGHT: &str = "Five Ball Right";

/// Register every routine with the catalog.
///
/// Two Ball Middle is the default option.
pub fn register_all(
    catalog: &mut Catalog<Robot>,
    config: &Config,
    source: &dyn TrajectorySource,
) -> Result {
    catalog.register(SYSTEM_CHECK, || system_check::build(config))?;
    catalog.register_default(TWO_BALL_MIDDLE, || two_ball_middle::build(config, source))?;
    catalog.register(FIVE_BALL_RIGHT, || five_ball_right::build(config, source))?;

    Ok(())
}

fn print(message: &str) -> BoxedAction<Robot> {
    Box::new(Print::new(message))
}

/// Place the robot on the field.
fn reset_pose(pose: Pose) -> Instant<Robot> {
    Instant::new("reset pose", move |robot: &mut Robot| {
        robot.drivetrain.reset_odometry(pose)?;
        robot.drivetrain.set_gyroscope(heading(&pose).to_degrees())?;
        Ok(())
    })
    .requires(&[Resource::Drivetrain])
}

fn stop_drivetrain() -> Instant<Robot> {
    Instant::new("stop drivetrain", |robot: &mut Robot| {
        robot.drivetrain.stop()?;
        Ok(())
    })
    .requires(&[Resource::Drivetrain])
}

fn follow(config: &Config, source: &dyn TrajectorySource, name: &str) -> Result<FollowTrajectory> {
    Ok(FollowTrajectory::new(source.load(name)?, &config.autonomous))
}

/// Collect cargo while indexing it.
///
/// Keeps indexing after the magazine is full, so it only ends when it is
/// interrupted or bounded.
fn collect(config: &Config) -> Result<Alongside<Robot>> {
    MagazineAutoBump::new(&config.magazine)
        .along_with(IntakeCargo::new(&config.intake, &config.magazine))
}

fn aim(config: &Config, seconds: f64) -> Timeout<Robot> {
    LimelightAim::new(&config.vision).with_timeout(Duration::from_secs_f64(seconds))
}

fn shoot(config: &Config) -> LimelightShoot {
    LimelightShoot::new(&config.shooter, &config.magazine)
}
