// src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub radar: RadarConfig,
    pub tracking: TrackingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarConfig {
    pub port: String,
    pub baud_rate: u32,
    pub units: SpeedUnits,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_string(),
            baud_rate: 57600,
            units: SpeedUnits::KmPerHour,
        }
    }
}

/// Units the sensor reports speed in. cm/s is handy on the bench: a hand
/// wave lands inside the default tracking band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnits {
    KmPerHour,
    CmPerSecond,
}

impl SpeedUnits {
    /// The OPS24x units-preference command for this setting.
    pub fn command(self) -> &'static str {
        match self {
            SpeedUnits::KmPerHour => "UK",
            SpeedUnits::CmPerSecond => "UC",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Exclusive lower bound on |velocity|; slower readings are ignored.
    pub min_speed: f64,
    /// Exclusive upper bound on |velocity|; faster readings are ignored.
    pub max_speed: f64,
    /// Seconds of continuous no-target before an idle notice fires while
    /// not tracking. Zero or negative disables idle notices.
    pub idle_notice_interval_secs: f64,
    /// Grace period for out-of-range readings while tracking (hysteresis).
    /// A change in direction does not get this grace.
    pub targetless_grace_secs: f64,
    /// Minimum consistent-direction time before a track counts as acquired.
    pub min_track_to_acquired_secs: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            min_speed: 10.0,
            max_speed: 75.0,
            idle_notice_interval_secs: 10.0,
            targetless_grace_secs: 0.75,
            min_track_to_acquired_secs: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Discrete events produced by the tracking engine, at most one per sample.
///
/// Positive velocity means the object is approaching the sensor, negative
/// means it is moving away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackEvent {
    /// A consistent-direction in-range track persisted past the lock time.
    TargetAcquired { velocity: f64 },
    /// Speed magnitude increased while a target was acquired.
    TargetAccelerating { velocity: f64 },
    /// The targetless grace period expired while a target was acquired.
    TargetLost,
    /// Periodic liveness signal while nothing is being tracked.
    IdleNotice,
}
