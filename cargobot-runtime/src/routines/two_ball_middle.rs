use std::time::Duration;

use crate::config::Config;
use crate::core::TrajectorySource;
use crate::robot::Robot;
use crate::runtime::{ActionExt, ParallelRace, Result, Sequential};

use super::TWO_BALL_MIDDLE;

/// Pick up the cargo behind the robot and shoot both.
///
/// Starts at the first pose of the trajectory, facing the hub.
pub(super) fn build(config: &Config, source: &dyn TrajectorySource) -> Result<Sequential<Robot>> {
    let path = super::follow(config, source, TWO_BALL_MIDDLE)?;
    let start = path.trajectory().initial_pose();

    let drive = Sequential::new(vec![
        path.boxed(),
        super::stop_drivetrain().boxed(),
        super::print("Made it to the cargo"),
    ]);

    let pickup = ParallelRace::new(vec![drive.boxed(), super::collect(config)?.boxed()])?;

    Ok(Sequential::new(vec![
        super::reset_pose(start).boxed(),
        pickup.named("pickup").boxed(),
        super::aim(config, 1.5).boxed(),
        super::print("Shooting!"),
        super::shoot(config)
            .with_timeout(Duration::from_secs(3))
            .boxed(),
    ])
    .named(TWO_BALL_MIDDLE))
}
