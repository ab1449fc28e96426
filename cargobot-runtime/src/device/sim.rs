//! Simulated devices.
//!
//! The simulated devices share one `World` holding the true robot pose, the
//! cargo on the field and in the magazine. Dynamics are simple and fully
//! deterministic so the same inputs always produce the same match.

use std::{cell::RefCell, rc::Rc, time::Duration};

use nalgebra::Vector2;

use crate::core::{ChassisSpeeds, Pose};
use crate::math::shortest_rotation;
use crate::robot::Robot;

use super::{Climber, Drivetrain, Intake, Magazine, Result, Shooter, Vision};

/// Flywheel spin up time constant in seconds.
const FLYWHEEL_TIME_CONSTANT: f64 = 0.2;
/// Hood travel rate in encoder units per second.
const HOOD_RATE: f64 = 10.0;
/// Hood travel.
const HOOD_MAX: f64 = 20.0;
/// Winch travel rate in encoder units per second.
const WINCH_RATE: f64 = 120.0;
/// Winch travel.
const WINCH_MAX: f64 = 200.0;
/// Cargo pickup radius in meters.
const PICKUP_RADIUS: f64 = 0.5;
/// Camera horizontal field of view half angle in radians.
const CAMERA_FOV: f64 = 0.52;
/// Camera range in meters.
const CAMERA_RANGE: f64 = 9.0;
/// Proximity reading with cargo in front of the sensor.
const SENSOR_CARGO: f64 = 1_800.0;
/// Proximity reading of an empty magazine stage.
const SENSOR_EMPTY: f64 = 150.0;

pub type SharedWorld = Rc<RefCell<World>>;

/// Simulated field and robot state.
#[derive(Clone, Debug)]
pub struct World {
    /// True robot pose.
    pub pose: Pose,
    /// Robot relative velocity.
    pub speeds: ChassisSpeeds,
    /// Hub location.
    pub hub: Vector2<f64>,
    /// Cargo lying on the field.
    pub cargo: Vec<Vector2<f64>>,
    /// Cargo in the lower magazine stage.
    pub lower_cargo: bool,
    /// Cargo in the upper magazine stage.
    pub upper_cargo: bool,
    /// Flywheel velocity.
    pub flywheel_velocity: f64,
    /// Cargo fired by the shooter.
    pub shots: usize,
    /// Cargo ejected through the intake.
    pub ejected: usize,
}

impl Default for World {
    fn default() -> Self {
        let (hub_x, hub_y) = crate::consts::HUB_LOCATION;

        Self {
            pose: Pose::identity(),
            speeds: ChassisSpeeds::default(),
            hub: Vector2::new(hub_x, hub_y),
            cargo: Vec::new(),
            lower_cargo: false,
            upper_cargo: true,
            flywheel_velocity: 0.0,
            shots: 0,
            ejected: 0,
        }
    }
}

impl World {
    /// Construct a shared world.
    pub fn shared(self) -> SharedWorld {
        Rc::new(RefCell::new(self))
    }

    /// Place cargo on the field.
    pub fn with_cargo(mut self, x: f64, y: f64) -> Self {
        self.cargo.push(Vector2::new(x, y));
        self
    }

    /// Place the robot on the field.
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Number of cargo in the magazine.
    pub fn magazine_count(&self) -> usize {
        self.lower_cargo as usize + self.upper_cargo as usize
    }

    fn heading(&self) -> f64 {
        crate::core::heading(&self.pose)
    }
}

/// Construct a robot from simulated devices.
pub fn robot(world: &SharedWorld) -> Robot {
    Robot {
        drivetrain: Box::new(SimDrivetrain::new(world.clone())),
        shooter: Box::new(SimShooter::new(world.clone())),
        magazine: Box::new(SimMagazine::new(world.clone())),
        intake: Box::new(SimIntake::new(world.clone())),
        climber: Box::new(SimClimber::new()),
        vision: Box::new(SimVision::new(world.clone())),
    }
}

pub struct SimDrivetrain {
    world: SharedWorld,
    gyro_offset: f64,
}

impl SimDrivetrain {
    pub fn new(world: SharedWorld) -> Self {
        Self {
            world,
            gyro_offset: 0.0,
        }
    }
}

impl Drivetrain for SimDrivetrain {
    fn pose(&self) -> Pose {
        self.world.borrow().pose
    }

    fn reset_odometry(&mut self, pose: Pose) -> Result {
        self.world.borrow_mut().pose = pose;
        Ok(())
    }

    fn gyroscope(&self) -> f64 {
        self.world.borrow().heading().to_degrees() + self.gyro_offset
    }

    fn set_gyroscope(&mut self, degrees: f64) -> Result {
        self.gyro_offset = degrees - self.world.borrow().heading().to_degrees();
        Ok(())
    }

    fn speeds(&self) -> ChassisSpeeds {
        self.world.borrow().speeds
    }

    fn drive(&mut self, speeds: ChassisSpeeds) -> Result {
        self.world.borrow_mut().speeds = speeds;
        Ok(())
    }

    fn periodic(&mut self, dt: Duration) -> Result {
        let mut world = self.world.borrow_mut();

        let dt = dt.as_secs_f64();
        let heading = world.heading();
        let field = world.speeds.to_field_relative(heading);

        world.pose = crate::core::pose(
            world.pose.translation.x + field.vx * dt,
            world.pose.translation.y + field.vy * dt,
            heading + field.omega * dt,
        );

        Ok(())
    }
}

pub struct SimShooter {
    world: SharedWorld,
    target_velocity: f64,
    hood_angle: f64,
    hood_zero: f64,
    hood_target: Option<f64>,
    hood_speed: f64,
}

impl SimShooter {
    pub fn new(world: SharedWorld) -> Self {
        Self {
            world,
            target_velocity: 0.0,
            hood_angle: 3.0,
            hood_zero: 0.0,
            hood_target: None,
            hood_speed: 0.0,
        }
    }
}

impl Shooter for SimShooter {
    fn set_velocity(&mut self, velocity: f64) -> Result {
        self.target_velocity = velocity;
        Ok(())
    }

    fn velocity_error(&self) -> f64 {
        self.target_velocity - self.world.borrow().flywheel_velocity
    }

    fn hood_position(&self) -> f64 {
        self.hood_angle - self.hood_zero
    }

    fn set_hood_angle(&mut self, angle: f64) -> Result {
        self.hood_target = Some((angle + self.hood_zero).clamp(0.0, HOOD_MAX));
        Ok(())
    }

    fn set_hood_speed(&mut self, speed: f64) -> Result {
        self.hood_target = None;
        self.hood_speed = speed.clamp(-1.0, 1.0);
        Ok(())
    }

    fn is_hood_back_switch(&self) -> bool {
        self.hood_angle <= 0.0
    }

    fn is_hood_at_angle(&self) -> bool {
        self.hood_target
            .is_some_and(|target| (self.hood_angle - target).abs() < 0.2)
    }

    fn zero_hood(&mut self) -> Result {
        self.hood_zero = self.hood_angle;
        Ok(())
    }

    fn periodic(&mut self, dt: Duration) -> Result {
        let dt = dt.as_secs_f64();

        let mut world = self.world.borrow_mut();
        let error = self.target_velocity - world.flywheel_velocity;
        if error.abs() < 1.0 {
            world.flywheel_velocity = self.target_velocity;
        } else {
            world.flywheel_velocity += error * (dt / FLYWHEEL_TIME_CONSTANT).min(1.0);
        }

        self.hood_angle = match self.hood_target {
            Some(target) => {
                let step = HOOD_RATE * dt;
                self.hood_angle + (target - self.hood_angle).clamp(-step, step)
            }
            None => self.hood_angle + self.hood_speed * HOOD_RATE * dt,
        }
        .clamp(0.0, HOOD_MAX);

        Ok(())
    }
}

pub struct SimMagazine {
    world: SharedWorld,
    lower_speed: f64,
    upper_speed: f64,
}

impl SimMagazine {
    pub fn new(world: SharedWorld) -> Self {
        Self {
            world,
            lower_speed: 0.0,
            upper_speed: 0.0,
        }
    }
}

impl Magazine for SimMagazine {
    fn set_lower_speed(&mut self, speed: f64) -> Result {
        self.lower_speed = speed;
        Ok(())
    }

    fn set_upper_speed(&mut self, speed: f64) -> Result {
        self.upper_speed = speed;
        Ok(())
    }

    fn lower_sensor(&self) -> f64 {
        if self.world.borrow().lower_cargo {
            SENSOR_CARGO
        } else {
            SENSOR_EMPTY
        }
    }

    fn upper_sensor(&self) -> f64 {
        if self.world.borrow().upper_cargo {
            SENSOR_CARGO
        } else {
            SENSOR_EMPTY
        }
    }

    fn periodic(&mut self, _dt: Duration) -> Result {
        let mut world = self.world.borrow_mut();

        // Upper stage feeds the shooter.
        if self.upper_speed > 0.0 && world.upper_cargo {
            world.upper_cargo = false;
            world.shots += 1;
        } else if self.upper_speed < 0.0 && world.upper_cargo && !world.lower_cargo {
            world.upper_cargo = false;
            world.lower_cargo = true;
        }

        if self.lower_speed > 0.0 && world.lower_cargo && !world.upper_cargo {
            world.lower_cargo = false;
            world.upper_cargo = true;
        } else if self.lower_speed < 0.0 && world.lower_cargo {
            world.lower_cargo = false;
            world.ejected += 1;
        }

        Ok(())
    }
}

pub struct SimIntake {
    world: SharedWorld,
    speed: f64,
    deployed: bool,
}

impl SimIntake {
    pub fn new(world: SharedWorld) -> Self {
        Self {
            world,
            speed: 0.0,
            deployed: false,
        }
    }
}

impl Intake for SimIntake {
    fn set_speed(&mut self, speed: f64) -> Result {
        self.speed = speed;
        Ok(())
    }

    fn set_deployed(&mut self, deployed: bool) -> Result {
        self.deployed = deployed;
        Ok(())
    }

    fn is_deployed(&self) -> bool {
        self.deployed
    }

    fn periodic(&mut self, _dt: Duration) -> Result {
        if !self.deployed || self.speed <= 0.0 {
            return Ok(());
        }

        let mut world = self.world.borrow_mut();
        if world.lower_cargo {
            return Ok(());
        }

        let robot = world.pose.translation.vector;
        if let Some(index) = world
            .cargo
            .iter()
            .position(|cargo| (cargo - robot).norm() < PICKUP_RADIUS)
        {
            world.cargo.swap_remove(index);
            world.lower_cargo = true;

            log::trace!("Simulated intake picked up cargo");
        }

        Ok(())
    }
}

pub struct SimClimber {
    height: f64,
    zero: f64,
    target: Option<f64>,
    speed: f64,
    arms_out: bool,
}

impl Default for SimClimber {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClimber {
    pub fn new() -> Self {
        Self {
            height: 4.0,
            zero: 0.0,
            target: None,
            speed: 0.0,
            arms_out: false,
        }
    }
}

impl Climber for SimClimber {
    fn position(&self) -> f64 {
        self.height - self.zero
    }

    fn set_position(&mut self, position: f64) -> Result {
        self.target = Some((position + self.zero).clamp(0.0, WINCH_MAX));
        Ok(())
    }

    fn set_speed(&mut self, speed: f64) -> Result {
        self.target = None;
        self.speed = speed.clamp(-1.0, 1.0);
        Ok(())
    }

    fn is_bottom_switch(&self) -> bool {
        self.height <= 0.0
    }

    fn set_arms_out(&mut self, out: bool) -> Result {
        self.arms_out = out;
        Ok(())
    }

    fn are_arms_out(&self) -> bool {
        self.arms_out
    }

    fn zero_encoder(&mut self) -> Result {
        self.zero = self.height;
        Ok(())
    }

    fn periodic(&mut self, dt: Duration) -> Result {
        let dt = dt.as_secs_f64();

        self.height = match self.target {
            Some(target) => {
                let step = WINCH_RATE * dt;
                self.height + (target - self.height).clamp(-step, step)
            }
            None => self.height + self.speed * WINCH_RATE * dt,
        }
        .clamp(0.0, WINCH_MAX);

        Ok(())
    }
}

pub struct SimVision {
    world: SharedWorld,
    leds: bool,
}

impl SimVision {
    pub fn new(world: SharedWorld) -> Self {
        Self { world, leds: false }
    }

    /// Angle and distance to the hub, when in view.
    fn target(&self) -> Option<(f64, f64)> {
        if !self.leds {
            return None;
        }

        let world = self.world.borrow();
        let offset = world.hub - world.pose.translation.vector;
        let distance = offset.norm();
        let angle = shortest_rotation(offset.y.atan2(offset.x) - world.heading());

        if distance > CAMERA_RANGE || angle.abs() > CAMERA_FOV {
            return None;
        }

        Some((angle.to_degrees(), distance))
    }
}

impl Vision for SimVision {
    fn target_angle(&self) -> Option<f64> {
        self.target().map(|(angle, _)| angle)
    }

    fn target_distance(&self) -> Option<f64> {
        self.target().map(|(_, distance)| distance)
    }

    fn set_leds(&mut self, on: bool) -> Result {
        self.leds = on;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    const DT: Duration = Duration::from_millis(20);

    #[test]
    fn test_drivetrain_integrates() {
        let world = World::default().with_pose(crate::core::pose(1.0, 1.0, FRAC_PI_2)).shared();
        let mut drivetrain = SimDrivetrain::new(world.clone());

        drivetrain.drive(ChassisSpeeds::new(1.0, 0.0, 0.0)).unwrap();
        for _ in 0..50 {
            drivetrain.periodic(DT).unwrap();
        }

        let pose = drivetrain.pose();
        assert!((pose.translation.x - 1.0).abs() < 1e-6);
        assert!((pose.translation.y - 2.0).abs() < 1e-6);

        drivetrain.set_gyroscope(0.0).unwrap();
        assert!(drivetrain.gyroscope().abs() < 1e-9);
    }

    #[test]
    fn test_intake_to_shot() {
        let world = World::default().with_cargo(0.2, 0.0).shared();
        world.borrow_mut().upper_cargo = false;

        let mut robot = robot(&world);

        robot.intake.set_deployed(true).unwrap();
        robot.intake.set_speed(0.7).unwrap();
        robot.periodic(DT).unwrap();
        assert!(world.borrow().lower_cargo);
        assert!(world.borrow().cargo.is_empty());
        assert!(robot.magazine.lower_sensor() > 1_000.0);

        robot.magazine.set_lower_speed(0.4).unwrap();
        robot.periodic(DT).unwrap();
        assert!(world.borrow().upper_cargo);
        assert!(!world.borrow().lower_cargo);

        robot.magazine.set_lower_speed(0.0).unwrap();
        robot.magazine.set_upper_speed(0.6).unwrap();
        robot.periodic(DT).unwrap();
        assert_eq!(world.borrow().shots, 1);
        assert_eq!(world.borrow().magazine_count(), 0);
    }

    #[test]
    fn test_hood_homing() {
        let world = World::default().shared();
        let mut shooter = SimShooter::new(world);

        assert!(!shooter.is_hood_back_switch());
        shooter.set_hood_speed(-1.0).unwrap();
        for _ in 0..20 {
            shooter.periodic(DT).unwrap();
        }
        assert!(shooter.is_hood_back_switch());

        shooter.zero_hood().unwrap();
        shooter.set_hood_angle(2.0).unwrap();
        for _ in 0..20 {
            shooter.periodic(DT).unwrap();
        }
        assert!(shooter.is_hood_at_angle());
        assert!((shooter.hood_position() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_flywheel_spin_up() {
        let world = World::default().shared();
        let mut shooter = SimShooter::new(world);

        shooter.set_velocity(8_000.0).unwrap();
        assert_eq!(shooter.velocity_error(), 8_000.0);

        for _ in 0..100 {
            shooter.periodic(DT).unwrap();
        }
        assert!(shooter.velocity_error().abs() < 1.0);
    }

    #[test]
    fn test_climber_calibration() {
        let mut climber = SimClimber::new();
        assert_eq!(climber.position(), 4.0);

        climber.set_speed(-0.25).unwrap();
        while !climber.is_bottom_switch() {
            climber.periodic(DT).unwrap();
        }
        climber.zero_encoder().unwrap();
        assert_eq!(climber.position(), 0.0);

        climber.set_position(150.0).unwrap();
        for _ in 0..100 {
            climber.periodic(DT).unwrap();
        }
        assert!((climber.position() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_vision_target() {
        let world = World::default()
            .with_pose(crate::core::pose(4.2296, 4.1148, 0.1))
            .shared();
        let mut vision = SimVision::new(world.clone());

        assert_eq!(vision.target_angle(), None);

        vision.set_leds(true).unwrap();
        let angle = vision.target_angle().unwrap();
        assert!((angle + 0.1_f64.to_degrees()).abs() < 1e-6);
        assert!((vision.target_distance().unwrap() - 4.0).abs() < 1e-6);

        world.borrow_mut().pose = crate::core::pose(4.2296, 4.1148, std::f64::consts::PI);
        assert_eq!(vision.target_angle(), None);
    }
}
