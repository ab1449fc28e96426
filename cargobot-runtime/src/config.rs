use std::time::Duration;

use crate::math::InterpolationTable;

/// PID controller gains.
#[derive(Copy, Clone, Debug, PartialEq, serde_derive::Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    #[serde(default)]
    pub ki: f64,
    /// Derivative gain.
    #[serde(default)]
    pub kd: f64,
}

impl PidGains {
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

#[derive(Clone, Debug, PartialEq, serde_derive::Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Control loop period in milliseconds.
    pub tick_period: u64,
}

impl RobotConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period)
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            tick_period: crate::consts::DEFAULT_TICK_PERIOD.as_millis() as u64,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde_derive::Deserialize)]
#[serde(default)]
pub struct AutonomousConfig {
    /// Routine to select, the chooser default when unset.
    pub routine: Option<String>,
    /// Length of the autonomous period in seconds.
    pub duration: f64,
    /// Directory holding the trajectory files.
    pub trajectory_dir: std::path::PathBuf,
    /// Field X axis controller.
    pub translation: PidGains,
    /// Field Y axis controller.
    pub strafe: PidGains,
    /// Heading controller.
    pub rotation: PidGains,
}

impl AutonomousConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration.max(0.0))
    }
}

impl Default for AutonomousConfig {
    fn default() -> Self {
        Self {
            routine: None,
            duration: crate::consts::AUTONOMOUS_DURATION.as_secs_f64(),
            trajectory_dir: "paths".into(),
            translation: PidGains::new(5.0, 0.0, 0.0),
            strafe: PidGains::new(5.0, 0.0, 0.0),
            rotation: PidGains::new(3.0, 0.0, 0.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde_derive::Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Joystick deadband.
    pub deadband: f64,
    /// Maximum translation velocity in meters per second.
    pub max_velocity: f64,
    /// Maximum angular velocity in radians per second.
    pub max_angular_velocity: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            deadband: 0.05,
            max_velocity: 4.5,
            max_angular_velocity: 8.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde_derive::Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Aim controller, target angle in radians to angular velocity.
    pub aim: PidGains,
    /// Aim tolerance in degrees.
    pub tolerance: f64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            aim: PidGains::new(4.0, 0.0, 0.0),
            tolerance: 2.0,
        }
    }
}

/// Shot table entry.
#[derive(Copy, Clone, Debug, PartialEq, serde_derive::Deserialize)]
pub struct ShotPoint {
    /// Distance to the hub in meters.
    pub distance: f64,
    /// Flywheel velocity setpoint.
    pub velocity: f64,
    /// Hood angle setpoint.
    pub hood: f64,
}

#[derive(Clone, Debug, PartialEq, serde_derive::Deserialize)]
#[serde(default)]
pub struct ShooterConfig {
    /// Flywheel velocity error at which the shooter is ready.
    pub ready_tolerance: f64,
    /// Hood homing speed.
    pub hood_reset_speed: f64,
    /// Shot table by distance.
    pub shot_table: Vec<ShotPoint>,
    /// Time of flight in seconds by distance in meters.
    pub time_of_flight: Vec<(f64, f64)>,
}

impl ShooterConfig {
    /// Flywheel velocity by distance.
    pub fn velocity_table(&self) -> InterpolationTable {
        self.shot_table
            .iter()
            .map(|point| (point.distance, point.velocity))
            .collect()
    }

    /// Hood angle by distance.
    pub fn hood_table(&self) -> InterpolationTable {
        self.shot_table
            .iter()
            .map(|point| (point.distance, point.hood))
            .collect()
    }

    /// Time of flight by distance.
    pub fn time_of_flight_table(&self) -> InterpolationTable {
        self.time_of_flight.iter().copied().collect()
    }
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            ready_tolerance: 150.0,
            hood_reset_speed: 0.2,
            shot_table: vec![
                ShotPoint {
                    distance: 2.5,
                    velocity: 7_200.0,
                    hood: 2.0,
                },
                ShotPoint {
                    distance: 3.5,
                    velocity: 7_900.0,
                    hood: 5.5,
                },
                ShotPoint {
                    distance: 4.5,
                    velocity: 8_700.0,
                    hood: 8.0,
                },
                ShotPoint {
                    distance: 5.5,
                    velocity: 9_600.0,
                    hood: 10.5,
                },
            ],
            time_of_flight: vec![
                (2.5, 1.0),
                (3.0, 1.05),
                (3.5, 1.10),
                (4.0, 1.15),
                (4.5, 1.32),
                (5.0, 1.4),
                (5.5, 1.52),
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde_derive::Deserialize)]
#[serde(default)]
pub struct MagazineConfig {
    /// Lower sensor reading at which cargo is present.
    pub lower_threshold: f64,
    /// Upper sensor reading at which cargo is present.
    pub upper_threshold: f64,
    /// Motor speed while indexing cargo.
    pub bump_speed: f64,
    /// Motor speed while feeding the shooter.
    pub feed_speed: f64,
    /// Motor speed while ejecting cargo.
    pub spit_speed: f64,
}

impl MagazineConfig {
    #[inline]
    pub fn has_lower_cargo(&self, reading: f64) -> bool {
        reading > self.lower_threshold
    }

    #[inline]
    pub fn has_upper_cargo(&self, reading: f64) -> bool {
        reading > self.upper_threshold
    }
}

impl Default for MagazineConfig {
    fn default() -> Self {
        Self {
            lower_threshold: 1_000.0,
            upper_threshold: 1_000.0,
            bump_speed: 0.4,
            feed_speed: 0.6,
            spit_speed: -0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde_derive::Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Roller speed.
    pub speed: f64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self { speed: 0.7 }
    }
}

#[derive(Clone, Debug, PartialEq, serde_derive::Deserialize)]
#[serde(default)]
pub struct ClimberConfig {
    /// Winch position above the bar.
    pub above_bar_position: f64,
    /// Winch position at the bottom.
    pub bottom_position: f64,
    /// Position tolerance.
    pub tolerance: f64,
    /// Winch speed while calibrating.
    pub calibrate_speed: f64,
}

impl Default for ClimberConfig {
    fn default() -> Self {
        Self {
            above_bar_position: 150.0,
            bottom_position: 0.0,
            tolerance: 1.0,
            calibrate_speed: -0.25,
        }
    }
}

/// Robot configuration.
///
/// Constructed once at startup and handed to the components that need it.
#[derive(Clone, Debug, Default, PartialEq, serde_derive::Deserialize)]
#[serde(default)]
pub struct Config {
    pub robot: RobotConfig,
    pub autonomous: AutonomousConfig,
    pub drive: DriveConfig,
    pub vision: VisionConfig,
    pub shooter: ShooterConfig,
    pub magazine: MagazineConfig,
    pub intake: IntakeConfig,
    pub climber: ClimberConfig,
}
