//! Leaf actions.
//!
//! Every action here talks to the robot mechanisms through the device
//! interfaces and requires exactly the resources it commands.

pub use self::climber::{CalibrateClimber, ClimberArms, ClimberToPosition};
pub use self::drive::{Axes, AxisSource, FieldDrive, FollowTrajectory};
pub use self::intake::IntakeCargo;
pub use self::magazine::{
    is_magazine_empty, is_magazine_full, MagazineAutoBump, MagazineSpitCargo,
};
pub use self::shooter::{effective_distance, LimelightShoot, ResetHoodAngle};
pub use self::util::{Instant, Print, Wait, WaitUntil};
pub use self::vision::LimelightAim;

mod climber;
mod drive;
mod intake;
mod magazine;
mod shooter;
mod util;
mod vision;
