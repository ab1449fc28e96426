use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::math::{lerp, shortest_rotation};
use crate::runtime::{Error, Result};

use super::{ChassisSpeeds, Pose};

/// Trajectory sample.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sample {
    /// Time since the start of the trajectory in seconds.
    pub time: f64,
    /// Desired pose.
    pub pose: Pose,
    /// Desired field relative velocity.
    pub velocity: ChassisSpeeds,
}

/// Pre-computed path.
///
/// An ordered list of samples with strictly increasing time, starting at
/// time zero.
#[derive(Clone, Debug)]
pub struct Trajectory {
    name: String,
    samples: Vec<Sample>,
}

impl Trajectory {
    /// Construct a trajectory from samples.
    ///
    /// Fails when there are no samples, the first sample is not at time zero
    /// or time does not strictly increase.
    pub fn new(name: &str, samples: Vec<Sample>) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidTrajectory {
            name: name.to_owned(),
            reason: reason.to_owned(),
        };

        let first = samples.first().ok_or_else(|| invalid("no samples"))?;
        if first.time != 0.0 {
            return Err(invalid("first sample must be at time zero"));
        }
        if samples.windows(2).any(|pair| pair[1].time <= pair[0].time) {
            return Err(invalid("sample time must strictly increase"));
        }

        Ok(Self {
            name: name.to_owned(),
            samples,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.last().map_or(0.0, |sample| sample.time)
    }

    /// Pose at the start of the trajectory.
    pub fn initial_pose(&self) -> Pose {
        self.samples[0].pose
    }

    /// Sample the trajectory at a point in time.
    ///
    /// Time before the start or past the end is clamped.
    pub fn sample(&self, time: f64) -> Sample {
        let upper = self.samples.partition_point(|sample| sample.time <= time);

        if upper == 0 {
            return self.samples[0];
        }
        if upper >= self.samples.len() {
            return self.samples[self.samples.len() - 1];
        }

        let a = &self.samples[upper - 1];
        let b = &self.samples[upper];
        let t = (time - a.time) / (b.time - a.time);

        let heading_a = super::heading(&a.pose);
        let heading_b = super::heading(&b.pose);

        Sample {
            time,
            pose: super::pose(
                lerp(a.pose.translation.x, b.pose.translation.x, t),
                lerp(a.pose.translation.y, b.pose.translation.y, t),
                heading_a + shortest_rotation(heading_b - heading_a) * t,
            ),
            velocity: ChassisSpeeds::new(
                lerp(a.velocity.vx, b.velocity.vx, t),
                lerp(a.velocity.vy, b.velocity.vy, t),
                lerp(a.velocity.omega, b.velocity.omega, t),
            ),
        }
    }
}

/// Trajectory provider.
pub trait TrajectorySource {
    /// Load a trajectory by name.
    ///
    /// Fails with `MissingTrajectory` when the source has no trajectory by
    /// that name.
    fn load(&self, name: &str) -> Result<Trajectory>;
}

#[derive(Debug, serde_derive::Deserialize)]
struct Record {
    time: f64,
    x: f64,
    y: f64,
    /// Heading in degrees.
    heading: f64,
    vx: f64,
    vy: f64,
    omega: f64,
}

impl From<Record> for Sample {
    fn from(record: Record) -> Self {
        Self {
            time: record.time,
            pose: super::pose(record.x, record.y, record.heading.to_radians()),
            velocity: ChassisSpeeds::new(record.vx, record.vy, record.omega),
        }
    }
}

/// Trajectory files on disk.
///
/// Each trajectory is a CSV file named after the trajectory with the header
/// `time,x,y,heading,vx,vy,omega`. Heading is in degrees.
pub struct CsvTrajectorySource {
    path: PathBuf,
}

impl CsvTrajectorySource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.path.join(format!("{}.csv", name))
    }
}

impl TrajectorySource for CsvTrajectorySource {
    fn load(&self, name: &str) -> Result<Trajectory> {
        let path = self.file_path(name);
        if !path.is_file() {
            return Err(Error::MissingTrajectory(name.to_owned()));
        }

        log::debug!("Loading trajectory '{}' from {}", name, path.display());

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| Error::InvalidTrajectory {
                name: name.to_owned(),
                reason: e.to_string(),
            })?;

        let samples = reader
            .deserialize::<Record>()
            .map(|record| record.map(Sample::from))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::InvalidTrajectory {
                name: name.to_owned(),
                reason: e.to_string(),
            })?;

        Trajectory::new(name, samples)
    }
}

/// Trajectories held in memory.
#[derive(Default)]
pub struct MemoryTrajectorySource {
    trajectories: HashMap<String, Trajectory>,
}

impl MemoryTrajectorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trajectory, keyed by its name.
    pub fn insert(&mut self, trajectory: Trajectory) {
        self.trajectories
            .insert(trajectory.name().to_owned(), trajectory);
    }

    pub fn with(mut self, trajectory: Trajectory) -> Self {
        self.insert(trajectory);
        self
    }
}

impl TrajectorySource for MemoryTrajectorySource {
    fn load(&self, name: &str) -> Result<Trajectory> {
        self.trajectories
            .get(name)
            .cloned()
            .ok_or_else(|| Error::MissingTrajectory(name.to_owned()))
    }
}
