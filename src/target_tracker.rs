// src/target_tracker.rs
//
// Velocity tracking state machine: raw signed speed readings in,
// de-bounced target events out.

use crate::types::{TrackEvent, TrackingConfig};
use std::time::{Duration, Instant};
use tracing::debug;

/// Top-level phase of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    NotTracking,
    Tracking,
}

/// Turns the sensor's velocity stream into discrete track events.
///
/// The tracker is a pure function of (config, sample sequence, clock): it
/// reads no wall clock of its own. The host passes `now` into every
/// [`step`](TargetTracker::step), so tests drive a synthetic timeline.
pub struct TargetTracker {
    min_speed: f64,
    max_speed: f64,
    /// `None` disables idle notices (configured interval <= 0).
    idle_notice_interval: Option<Duration>,
    targetless_grace: Duration,
    min_track_duration: Duration,

    phase: Phase,
    target_acquired: bool,
    recent_velocity: f64,
    prior_velocity: f64,
    /// Start of the current consistent-direction run.
    tracking_start: Instant,
    /// Running hysteresis clock; `None` means we most definitely have a
    /// target and the clock is stopped.
    targetless_start: Option<Instant>,
    /// Anchors the idle-notice timer. Only meaningful while NotTracking.
    idle_start: Instant,
}

impl TargetTracker {
    pub fn new(config: &TrackingConfig, now: Instant) -> Self {
        let idle_notice_interval = (config.idle_notice_interval_secs > 0.0)
            .then(|| Duration::from_secs_f64(config.idle_notice_interval_secs));

        Self {
            min_speed: config.min_speed,
            max_speed: config.max_speed,
            idle_notice_interval,
            targetless_grace: Duration::from_secs_f64(config.targetless_grace_secs),
            min_track_duration: Duration::from_secs_f64(config.min_track_to_acquired_secs),
            phase: Phase::NotTracking,
            target_acquired: false,
            recent_velocity: 0.0,
            prior_velocity: 0.0,
            tracking_start: now,
            targetless_start: None,
            idle_start: now,
        }
    }

    /// Feed one sample (or an empty tick) into the state machine.
    ///
    /// Emits at most one event per sample. `now` is the arrival time of
    /// the sample as observed by the host.
    pub fn step(&mut self, sample: Option<f64>, now: Instant) -> Option<TrackEvent> {
        match self.phase {
            Phase::NotTracking => self.step_not_tracking(sample, now),
            Phase::Tracking => self.step_tracking(sample, now),
        }
    }

    #[allow(dead_code)]
    pub fn is_tracking(&self) -> bool {
        self.phase == Phase::Tracking
    }

    #[allow(dead_code)]
    pub fn target_acquired(&self) -> bool {
        self.target_acquired
    }

    /// Strict on both bounds: a reading exactly at min or max is out of
    /// range, and so is zero.
    fn speed_in_range(&self, velocity: f64) -> bool {
        let speed = velocity.abs();
        self.min_speed < speed && speed < self.max_speed
    }

    fn step_not_tracking(&mut self, sample: Option<f64>, now: Instant) -> Option<TrackEvent> {
        if let Some(velocity) = sample {
            if self.speed_in_range(velocity) {
                debug!("candidate track at {:.1}, begin tracking", velocity);
                self.recent_velocity = velocity;
                self.prior_velocity = 0.0;
                self.phase = Phase::Tracking;
                self.target_acquired = false;
                self.tracking_start = now;
                self.targetless_start = Some(now);
                return None;
            }
        }

        // An absent reading and an out-of-range reading mean the same
        // thing here: still nothing to track. The idle timer restarts
        // after every notice, so notices are periodic.
        if let Some(interval) = self.idle_notice_interval {
            if now.duration_since(self.idle_start) > interval {
                self.idle_start = now;
                return Some(TrackEvent::IdleNotice);
            }
        }
        None
    }

    fn step_tracking(&mut self, sample: Option<f64>, now: Instant) -> Option<TrackEvent> {
        // Empty tick: keep the current track and all timers untouched.
        let Some(velocity) = sample else {
            return None;
        };

        self.prior_velocity = self.recent_velocity;
        self.recent_velocity = velocity;

        if self.speed_in_range(velocity) {
            if same_direction(self.prior_velocity, self.recent_velocity) {
                self.track_continued(now)
            } else {
                self.direction_changed(now)
            }
        } else {
            self.speed_out_of_range(now)
        }
    }

    /// Common case: an in-range reading continuing the current direction.
    fn track_continued(&mut self, now: Instant) -> Option<TrackEvent> {
        // We most definitely have a target; stop the hysteresis clock.
        self.targetless_start = None;

        if now.duration_since(self.tracking_start) > self.min_track_duration {
            if !self.target_acquired {
                self.target_acquired = true;
                return Some(TrackEvent::TargetAcquired {
                    velocity: self.recent_velocity,
                });
            }
            if self.recent_velocity.abs() > self.prior_velocity.abs() {
                return Some(TrackEvent::TargetAccelerating {
                    velocity: self.recent_velocity,
                });
            }
            // Decreasing speed is deliberately not reported.
        }
        None
    }

    /// The sign flipped between consecutive in-range readings (a prior of
    /// exactly 0 counts as a flip). The old object is gone and a new one
    /// begins; this is replacement, not loss, so no event fires.
    fn direction_changed(&mut self, now: Instant) -> Option<TrackEvent> {
        if self.target_acquired {
            debug!(
                "direction changed, now {}; tracking a new object",
                direction_name(self.recent_velocity)
            );
            self.target_acquired = false;
            self.prior_velocity = 0.0;
        } else {
            debug!("direction changed before track lock, restarting");
        }

        // Every reversal restarts both clocks, acquired or not: the new
        // direction gets a fresh acquisition window and a fresh grace
        // window.
        self.tracking_start = now;
        self.targetless_start = Some(now);
        None
    }

    /// Out-of-range reading while tracking: let the grace period absorb
    /// brief dropouts before declaring the target gone.
    fn speed_out_of_range(&mut self, now: Instant) -> Option<TrackEvent> {
        let Some(started) = self.targetless_start else {
            self.targetless_start = Some(now);
            return None;
        };

        if now.duration_since(started) > self.targetless_grace {
            let was_acquired = self.target_acquired;
            debug!(
                "targetless grace expired (acquired: {}), back to idle",
                was_acquired
            );
            self.target_acquired = false;
            self.phase = Phase::NotTracking;
            self.targetless_start = None;
            self.idle_start = now;
            if was_acquired {
                return Some(TrackEvent::TargetLost);
            }
        }
        None
    }
}

/// Zero is neither positive nor negative, so it never matches either
/// direction.
fn same_direction(a: f64, b: f64) -> bool {
    (a > 0.0 && b > 0.0) || (a < 0.0 && b < 0.0)
}

pub fn direction_name(velocity: f64) -> &'static str {
    if velocity > 0.0 {
        "inbound"
    } else {
        "outbound"
    }
}
