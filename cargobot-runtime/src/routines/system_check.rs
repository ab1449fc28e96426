use std::time::Duration;

use crate::actions::{
    CalibrateClimber, ClimberArms, Instant, IntakeCargo, MagazineAutoBump, ResetHoodAngle, Wait,
};
use crate::config::Config;
use crate::core::ChassisSpeeds;
use crate::robot::Robot;
use crate::runtime::{ActionExt, Resource, Result, Sequential};

/// Pit check exercising every mechanism once.
pub(super) fn build(config: &Config) -> Result<Sequential<Robot>> {
    let creep = Instant::new("creep forward", |robot: &mut Robot| {
        robot.drivetrain.drive(ChassisSpeeds::new(0.5, 0.0, 0.0))?;
        Ok(())
    })
    .requires(&[Resource::Drivetrain]);

    Ok(Sequential::new(vec![
        super::print("Checking intake"),
        IntakeCargo::new(&config.intake, &config.magazine)
            .with_timeout(Duration::from_secs(1))
            .boxed(),
        super::print("Checking magazine"),
        MagazineAutoBump::new(&config.magazine)
            .with_timeout(Duration::from_millis(500))
            .boxed(),
        super::print("Checking climber"),
        ClimberArms::arms_out().boxed(),
        Wait::new(Duration::from_millis(500)).boxed(),
        ClimberArms::arms_in().boxed(),
        CalibrateClimber::new(&config.climber)
            .with_timeout(Duration::from_secs(3))
            .boxed(),
        super::print("Checking shooter"),
        ResetHoodAngle::new(&config.shooter)
            .with_timeout(Duration::from_secs(2))
            .boxed(),
        super::print("Checking vision"),
        super::aim(config, 1.0).boxed(),
        super::print("Checking drivetrain"),
        creep.boxed(),
        Wait::new(Duration::from_millis(500)).boxed(),
        super::stop_drivetrain().boxed(),
        super::print("System check complete"),
    ])
    .named(super::SYSTEM_CHECK))
}
