// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Parser;

use cargobot::actions::{Axes, AxisSource};
use cargobot::core::CsvTrajectorySource;
use cargobot::device::sim;
use cargobot::runtime::Catalog;
use cargobot::{Director, Mode};

mod field;

#[derive(Parser)]
#[command(author = "Copyright (C) 2024 Laixer Equipment B.V.")]
#[command(version, propagate_version = true)]
#[command(about = "Cargobot robot control daemon", long_about = None)]
struct Args {
    /// Configuration file.
    #[arg(
        short = 'c',
        long = "config",
        alias = "conf",
        default_value = "/etc/cargobot.toml",
        value_name = "FILE"
    )]
    config: std::path::PathBuf,
    /// Autonomous routine to run.
    #[arg(short, long, value_name = "NAME")]
    routine: Option<String>,
    /// List the autonomous routines and exit.
    #[arg(long, default_value_t = false)]
    list: bool,
    /// Skip the autonomous period.
    #[arg(long, default_value_t = false)]
    teleop_only: bool,
    /// Match length in seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = cargobot::consts::MATCH_DURATION.as_secs())]
    match_time: u64,
    /// Quiet output (no logging).
    #[arg(long)]
    quiet: bool,
    /// Daemonize the service.
    #[arg(short = 'D', long)]
    daemon: bool,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use log::LevelFilter;

    let args = Args::parse();

    let config_found = args.config.is_file();
    let mut config: cargobot::Config = if config_found {
        cargobot::from_file(&args.config)?
    } else {
        cargobot::Config::default()
    };

    if let Some(routine) = &args.routine {
        config.autonomous.routine = Some(routine.clone());
    }

    let mut log_config = simplelog::ConfigBuilder::new();
    if args.daemon {
        log_config.set_time_level(LevelFilter::Off);
        log_config.set_thread_level(LevelFilter::Off);
    }

    log_config.set_target_level(LevelFilter::Off);
    log_config.set_location_level(LevelFilter::Off);
    log_config.add_filter_ignore_str("mio");

    let log_level = if args.daemon {
        LevelFilter::Info
    } else if args.quiet {
        LevelFilter::Off
    } else {
        match args.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let color_choice = if args.daemon {
        simplelog::ColorChoice::Never
    } else {
        simplelog::ColorChoice::Auto
    };

    simplelog::TermLogger::init(
        log_level,
        log_config.build(),
        simplelog::TerminalMode::Mixed,
        color_choice,
    )?;

    if args.daemon {
        log::debug!("Running service as daemon");
    }

    if !config_found {
        log::warn!(
            "Configuration file {} not found, using defaults",
            args.config.display()
        );
    }

    log::trace!("{:#?}", config);

    cargobot::log_system();

    ////////////////////

    let source = CsvTrajectorySource::new(&config.autonomous.trajectory_dir);

    let mut catalog = Catalog::new();
    cargobot::routines::register_all(&mut catalog, &config, &source)?;

    if args.list {
        for name in catalog.names() {
            if catalog.default_name() == Some(name) {
                println!("{} (default)", name);
            } else {
                println!("{}", name);
            }
        }
        return Ok(());
    }

    if let Some(routine) = &config.autonomous.routine {
        catalog.select(routine)?;
    }

    let world = field::world().shared();

    // Without a driver station the sticks stay centered.
    let axes: AxisSource = Rc::new(Axes::default);

    let mut director = Director::new(sim::robot(&world), &config, catalog, axes)?;

    let period = config.robot.tick_period();
    let match_time = Duration::from_secs(args.match_time);
    let autonomous_time = config.autonomous.duration();

    log::info!("Cargobot {}", cargobot::consts::VERSION);
    log::info!("Control loop period: {}ms", period.as_millis());
    log::info!("Match length: {}s", match_time.as_secs());

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let match_start = Instant::now();

    director.set_mode(if args.teleop_only {
        Mode::Teleop
    } else {
        Mode::Autonomous
    })?;

    let mut routine_running = director.is_routine_running();

    let result = loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("Termination requested");
                break Ok(());
            }
            _ = interval.tick() => {}
        }

        let elapsed = match_start.elapsed();
        if elapsed >= match_time {
            log::info!("Match ended");
            break Ok(());
        }

        if director.mode() == Mode::Autonomous && elapsed >= autonomous_time {
            if let Err(e) = director.set_mode(Mode::Teleop) {
                break Err(e);
            }
        }

        let tick_start = Instant::now();

        if let Err(e) = director.tick() {
            break Err(e);
        }

        if tick_start.elapsed() > period {
            log::warn!("Control loop is delaying execution");
        }

        if routine_running && !director.is_routine_running() {
            log::info!(
                "Routine finished after {:.2}s",
                match_start.elapsed().as_secs_f64()
            );
        }
        routine_running = director.is_routine_running();
    };

    director.set_mode(Mode::Disabled)?;

    {
        let world = world.borrow();
        log::info!(
            "Cargo scored: {}, ejected: {}, left on field: {}",
            world.shots,
            world.ejected,
            world.cargo.len()
        );
    }

    if let Err(e) = result {
        log::error!("Control loop failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}
