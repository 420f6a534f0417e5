// src/config.rs

use crate::types::Config;
use anyhow::{ensure, Context, Result};
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read config {path}"))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse config {path}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the tracker cannot run with. The idle notice
    /// interval is allowed to be zero or negative (that disables notices).
    pub fn validate(&self) -> Result<()> {
        let t = &self.tracking;
        ensure!(t.min_speed >= 0.0, "tracking.min_speed must not be negative");
        ensure!(
            t.min_speed < t.max_speed,
            "tracking.min_speed ({}) must be below tracking.max_speed ({})",
            t.min_speed,
            t.max_speed
        );
        ensure!(
            t.targetless_grace_secs >= 0.0,
            "tracking.targetless_grace_secs must not be negative"
        );
        ensure!(
            t.min_track_to_acquired_secs >= 0.0,
            "tracking.min_track_to_acquired_secs must not be negative"
        );
        ensure!(self.radar.baud_rate > 0, "radar.baud_rate must be positive");
        Ok(())
    }
}
