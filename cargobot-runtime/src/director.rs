use crate::actions::{AxisSource, FieldDrive, MagazineAutoBump, ResetHoodAngle};
use crate::config::Config;
use crate::robot::Robot;
use crate::runtime::{ActionExt, ActionId, Catalog, Resource, Result, Scheduler};

/// Robot mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Robot is disabled, no action runs.
    #[default]
    Disabled,
    /// The selected routine runs.
    Autonomous,
    /// The operators are in control.
    Teleop,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Disabled => write!(f, "disabled"),
            Mode::Autonomous => write!(f, "autonomous"),
            Mode::Teleop => write!(f, "teleop"),
        }
    }
}

/// Robot director.
///
/// The director owns the robot, the scheduler and the routine catalog and
/// sequences the robot modes. Every mechanism is registered as a resource
/// and the idle mechanisms run their default action:
///
/// - Drivetrain: field oriented teleop drive.
/// - Shooter: hood homing.
/// - Magazine: cargo indexing.
pub struct Director {
    robot: Robot,
    scheduler: Scheduler<Robot>,
    catalog: Catalog<Robot>,
    mode: Mode,
    routine: Option<ActionId>,
}

impl Director {
    /// Construct a new director.
    ///
    /// The director starts disabled.
    pub fn new(robot: Robot, config: &Config, catalog: Catalog<Robot>, axes: AxisSource) -> Result<Self> {
        let mut scheduler = Scheduler::new(config.robot.tick_period());

        for resource in Resource::ALL {
            scheduler.register(resource)?;
        }

        let drive = config.drive.clone();
        scheduler.set_default(Resource::Drivetrain, move || {
            FieldDrive::new(axes.clone(), &drive).boxed()
        })?;

        let shooter = config.shooter.clone();
        scheduler.set_default(Resource::Shooter, move || {
            ResetHoodAngle::new(&shooter).boxed()
        })?;

        let magazine = config.magazine.clone();
        scheduler.set_default(Resource::Magazine, move || {
            MagazineAutoBump::new(&magazine).boxed()
        })?;

        Ok(Self {
            robot,
            scheduler,
            catalog,
            mode: Mode::Disabled,
            routine: None,
        })
    }

    /// Switch the robot mode.
    ///
    /// Entering autonomous claims the selected routine from the catalog and
    /// schedules it. Entering teleop cancels the routine if it is still
    /// running. Disabling ends every action and stops all mechanisms.
    pub fn set_mode(&mut self, mode: Mode) -> Result {
        if mode == self.mode {
            return Ok(());
        }

        log::info!("Mode {} -> {}", self.mode, mode);

        match mode {
            Mode::Autonomous => {
                self.scheduler.cancel_all(&mut self.robot)?;

                let routine = self.catalog.take_selected()?;

                log::info!("Running routine '{}'", routine.name());

                self.routine = Some(self.scheduler.schedule(routine)?);
            }
            Mode::Teleop => {
                if let Some(id) = self.routine.take() {
                    self.scheduler.cancel(id);
                }
            }
            Mode::Disabled => {
                self.routine = None;

                self.scheduler.cancel_all(&mut self.robot)?;
                self.robot.stop()?;
            }
        }

        self.mode = mode;

        Ok(())
    }

    /// Run one control loop iteration.
    ///
    /// Runs the periodic hook of every mechanism and, unless disabled, one
    /// scheduler tick.
    pub fn tick(&mut self) -> Result {
        self.robot.periodic(self.scheduler.context().period())?;

        if self.mode != Mode::Disabled {
            self.scheduler.tick(&mut self.robot)?;
        }

        Ok(())
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    #[inline]
    pub fn robot_mut(&mut self) -> &mut Robot {
        &mut self.robot
    }

    #[inline]
    pub fn scheduler(&self) -> &Scheduler<Robot> {
        &self.scheduler
    }

    /// Mutable access to the scheduler, for operator bindings.
    #[inline]
    pub fn scheduler_mut(&mut self) -> &mut Scheduler<Robot> {
        &mut self.scheduler
    }

    #[inline]
    pub fn catalog(&self) -> &Catalog<Robot> {
        &self.catalog
    }

    #[inline]
    pub fn catalog_mut(&mut self) -> &mut Catalog<Robot> {
        &mut self.catalog
    }

    /// Check if the autonomous routine is still running.
    pub fn is_routine_running(&self) -> bool {
        self.routine
            .is_some_and(|id| self.scheduler.is_scheduled(id))
    }
}
