// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

/// The `cargobot` library provides the control software for a swerve drive
/// competition robot.
///
/// At its center is the `runtime` module, a cooperative action scheduler.
/// Actions declare the resources (mechanisms) they require and are driven
/// through their lifecycle once per tick. Actions compose into larger
/// actions with sequential, parallel, race, timeout and alongside groups.
/// Named action trees form the autonomous routines, which are selected
/// from a catalog before the match starts.
///
/// The `device` module defines the mechanism interfaces the leaf actions in
/// `actions` talk to, plus simulated devices so the entire stack runs
/// without hardware. The `director` ties the robot, the scheduler and the
/// catalog together and sequences the robot modes.
pub mod actions;
pub mod core;
pub mod device;
pub mod director;
pub mod math;
pub mod robot;
pub mod routines;
pub mod runtime;

mod config;

pub use self::config::*;
pub use self::director::{Director, Mode};
pub use self::robot::Robot;
pub use self::runtime::Error;

/// Cargobot runtime module containing various constants.
pub mod consts {
    use std::time::Duration;

    /// Cargobot runtime version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Cargobot default tick period.
    ///
    /// # Remarks
    ///
    /// The period of the robot control loop. Every device and every running
    /// action is serviced once per period.
    pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(20);

    /// Cargobot action delay threshold.
    ///
    /// # Remarks
    ///
    /// An action step taking longer than this threshold is reported as
    /// delaying execution.
    pub const ACTION_DELAY_THRESHOLD: Duration = Duration::from_millis(2);

    /// Cargobot autonomous period duration.
    pub const AUTONOMOUS_DURATION: Duration = Duration::from_secs(15);

    /// Cargobot match duration, autonomous included.
    pub const MATCH_DURATION: Duration = Duration::from_secs(150);

    /// Hub location on the field in meters.
    pub const HUB_LOCATION: (f64, f64) = (8.2296, 4.1148);

    /// Field size in meters.
    pub const FIELD_SIZE: (f64, f64) = (16.4592, 8.2296);
}

/// Log system information.
///
/// This function logs system information including the system name, kernel version,
/// OS version, and host name.
pub fn log_system() {
    use sysinfo::System;

    log::debug!("System name: {}", System::name().unwrap_or_default());
    log::debug!(
        "System kernel version: {}",
        System::kernel_version().unwrap_or_default()
    );
    log::debug!(
        "System OS version: {}",
        System::os_version().unwrap_or_default()
    );
    log::debug!(
        "System architecture: {}",
        System::cpu_arch().unwrap_or_default()
    );
    log::debug!(
        "System host name: {}",
        System::host_name().unwrap_or_default()
    );
}

/// Load a configuration file.
///
/// The file is parsed as TOML into the requested type.
pub fn from_file<T: serde::de::DeserializeOwned>(
    path: impl AsRef<std::path::Path>,
) -> std::io::Result<T> {
    let contents = std::fs::read_to_string(path)?;

    toml::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
