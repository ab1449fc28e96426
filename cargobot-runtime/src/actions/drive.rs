use std::rc::Rc;

use crate::config::{AutonomousConfig, DriveConfig};
use crate::core::{heading, ChassisSpeeds, Trajectory};
use crate::math::{modify_axis, shortest_rotation, Pid};
use crate::robot::Robot;
use crate::runtime::{Action, Context, Resource, ResourceSet, Result};

/// Follow a trajectory with the swerve drivetrain.
///
/// The desired state is sampled by the time since the action started. The
/// sampled velocity is used as feedforward, with a PID controller per field
/// axis and one on heading correcting the pose error. Finishes once the
/// trajectory duration has elapsed.
pub struct FollowTrajectory {
    name: String,
    trajectory: Trajectory,
    x_controller: Pid,
    y_controller: Pid,
    heading_controller: Pid,
    started: u64,
}

impl FollowTrajectory {
    pub fn new(trajectory: Trajectory, config: &AutonomousConfig) -> Self {
        Self {
            name: format!("follow '{}'", trajectory.name()),
            trajectory,
            x_controller: config.translation.into(),
            y_controller: config.strafe.into(),
            heading_controller: config.rotation.into(),
            started: 0,
        }
    }

    /// The trajectory being followed.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    fn elapsed(&self, ctx: &Context) -> f64 {
        ctx.elapsed_since(self.started).as_secs_f64()
    }
}

impl Action<Robot> for FollowTrajectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirements(&self) -> ResourceSet {
        Resource::Drivetrain.into()
    }

    fn start(&mut self, ctx: &Context, _robot: &mut Robot) -> Result {
        self.started = ctx.iteration();

        self.x_controller.reset();
        self.y_controller.reset();
        self.heading_controller.reset();

        Ok(())
    }

    fn step(&mut self, ctx: &Context, robot: &mut Robot) -> Result {
        let dt = ctx.period().as_secs_f64();
        let desired = self.trajectory.sample(self.elapsed(ctx));
        let pose = robot.drivetrain.pose();

        let vx = desired.velocity.vx
            + self
                .x_controller
                .update(desired.pose.translation.x - pose.translation.x, dt);
        let vy = desired.velocity.vy
            + self
                .y_controller
                .update(desired.pose.translation.y - pose.translation.y, dt);
        let omega = desired.velocity.omega
            + self.heading_controller.update(
                shortest_rotation(heading(&desired.pose) - heading(&pose)),
                dt,
            );

        robot
            .drivetrain
            .drive(ChassisSpeeds::from_field_relative(vx, vy, omega, heading(&pose)))?;

        Ok(())
    }

    fn is_finished(&self, ctx: &Context, _robot: &Robot) -> bool {
        self.elapsed(ctx) >= self.trajectory.duration()
    }

    fn end(&mut self, _ctx: &Context, robot: &mut Robot, _interrupted: bool) -> Result {
        robot.drivetrain.stop()?;
        Ok(())
    }
}

/// Driver stick input, each axis in the range -1 to 1.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Axes {
    /// Forward, away from the driver station.
    pub forward: f64,
    /// Strafe, to the left.
    pub strafe: f64,
    /// Rotation, counter-clockwise.
    pub rotation: f64,
}

pub type AxisSource = Rc<dyn Fn() -> Axes>;

/// Field oriented teleop drive.
///
/// The default action of the drivetrain. Stick input is shaped with a
/// deadband and squared, scaled to the maximum velocities and applied
/// relative to the field using the gyroscope. Never finishes.
pub struct FieldDrive {
    axes: AxisSource,
    config: DriveConfig,
}

impl FieldDrive {
    pub fn new(axes: AxisSource, config: &DriveConfig) -> Self {
        Self {
            axes,
            config: config.clone(),
        }
    }
}

impl Action<Robot> for FieldDrive {
    fn name(&self) -> &str {
        "field drive"
    }

    fn requirements(&self) -> ResourceSet {
        Resource::Drivetrain.into()
    }

    fn step(&mut self, _ctx: &Context, robot: &mut Robot) -> Result {
        let axes = (self.axes)();
        let band = self.config.deadband;

        let vx = modify_axis(axes.forward, band) * self.config.max_velocity;
        let vy = modify_axis(axes.strafe, band) * self.config.max_velocity;
        let omega = modify_axis(axes.rotation, band) * self.config.max_angular_velocity;

        let heading = robot.drivetrain.gyroscope().to_radians();

        robot
            .drivetrain
            .drive(ChassisSpeeds::from_field_relative(vx, vy, omega, heading))?;

        Ok(())
    }

    fn end(&mut self, _ctx: &Context, robot: &mut Robot, _interrupted: bool) -> Result {
        robot.drivetrain.stop()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::{pose, Sample};
    use crate::device::sim::{self, World};
    use crate::runtime::Scheduler;

    fn straight() -> Trajectory {
        Trajectory::new(
            "straight",
            vec![
                Sample {
                    time: 0.0,
                    pose: pose(1.0, 1.0, 0.0),
                    velocity: ChassisSpeeds::new(1.0, 0.0, 0.0),
                },
                Sample {
                    time: 1.0,
                    pose: pose(2.0, 1.0, 0.0),
                    velocity: ChassisSpeeds::new(1.0, 0.0, 0.0),
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_follow_trajectory() {
        let world = World::default().with_pose(pose(1.0, 1.0, 0.0)).shared();
        let mut robot = sim::robot(&world);

        let period = Duration::from_millis(20);
        let mut scheduler = Scheduler::new(period);
        scheduler.register(Resource::Drivetrain).unwrap();

        let id = scheduler
            .schedule(FollowTrajectory::new(straight(), &AutonomousConfig::default()))
            .unwrap();

        let mut ticks = 0;
        while scheduler.is_scheduled(id) && ticks < 200 {
            robot.periodic(period).unwrap();
            scheduler.tick(&mut robot).unwrap();
            ticks += 1;
        }

        assert!(ticks < 60);

        let end = world.borrow().pose;
        assert!((end.translation.x - 2.0).abs() < 0.05);
        assert!((end.translation.y - 1.0).abs() < 0.01);
        assert!(world.borrow().speeds.is_zero());
    }

    #[test]
    fn test_field_drive() {
        let world = World::default()
            .with_pose(pose(0.0, 0.0, std::f64::consts::FRAC_PI_2))
            .shared();
        let mut robot = sim::robot(&world);

        let axes: AxisSource = Rc::new(|| Axes {
            forward: 1.0,
            strafe: 0.02,
            rotation: 0.0,
        });
        let config = DriveConfig::default();
        let mut drive = FieldDrive::new(axes, &config);

        let ctx = Context::new(Duration::from_millis(20));
        drive.start(&ctx, &mut robot).unwrap();
        drive.step(&ctx, &mut robot).unwrap();

        // Facing field +Y, full forward stick still drives along field X.
        let field = world
            .borrow()
            .speeds
            .to_field_relative(std::f64::consts::FRAC_PI_2);
        assert!((field.vx - config.max_velocity).abs() < 1e-9);
        assert!(field.vy.abs() < 1e-9);
        assert!(!drive.is_finished(&ctx, &robot));

        drive.end(&ctx, &mut robot, true).unwrap();
        assert!(world.borrow().speeds.is_zero());
    }
}
