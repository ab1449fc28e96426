use std::time::Duration;

use crate::config::Config;
use crate::core::{pose, TrajectorySource};
use crate::robot::Robot;
use crate::runtime::{ActionExt, ParallelRace, Result, Sequential};

/// Starting pose, facing the driver station wall.
const START: (f64, f64, f64) = (7.59, 1.75, 90.0);

/// Collect the two cargo on the right, shoot, collect from the terminal and
/// shoot again.
pub(super) fn build(config: &Config, source: &dyn TrajectorySource) -> Result<Sequential<Robot>> {
    let first_cargo = super::follow(config, source, "Five Ball A")?;
    let last_cargo = super::follow(config, source, "Five Ball B")?;

    let to_location_a = Sequential::new(vec![
        first_cargo.boxed(),
        super::print("Made it to location A"),
        super::stop_drivetrain().boxed(),
        super::print("Aiming!"),
        super::aim(config, 1.5).boxed(),
        super::print("Aimed!"),
    ]);

    let first_three = Sequential::new(vec![
        super::print("Shooting 1!"),
        super::shoot(config).boxed(),
        super::collect(config)?
            .with_timeout(Duration::from_secs_f64(1.5))
            .boxed(),
        super::print("Shooting 2!"),
        super::shoot(config)
            .with_timeout(Duration::from_secs_f64(1.5))
            .boxed(),
        super::print("Shooting 3!"),
        super::shoot(config)
            .with_timeout(Duration::from_secs_f64(1.5))
            .boxed(),
    ]);

    let last_two = Sequential::new(vec![
        last_cargo.along_with(super::collect(config)?)?.boxed(),
        super::aim(config, 1.5).boxed(),
        super::print("Shooting 1!"),
        super::shoot(config)
            .with_timeout(Duration::from_secs(2))
            .boxed(),
        super::print("Shooting 2!"),
        super::shoot(config)
            .with_timeout(Duration::from_secs(2))
            .boxed(),
    ]);

    let (x, y, heading) = START;

    Ok(Sequential::new(vec![
        super::reset_pose(pose(x, y, heading.to_radians())).boxed(),
        ParallelRace::new(vec![to_location_a.boxed(), super::collect(config)?.boxed()])?
            .named("first cargo")
            .boxed(),
        first_three.named("first three").boxed(),
        last_two.named("last two").boxed(),
    ])
    .named(super::FIVE_BALL_RIGHT))
}
