// src/event_sink.rs

use crate::target_tracker::direction_name;
use crate::types::TrackEvent;
use tracing::info;

/// Downstream consumer of track events. Display, actuation, or anything
/// else plugs in here; the tracker stays oblivious.
pub trait EventSink {
    fn handle_event(&mut self, event: &TrackEvent);
}

/// Logs every event and keeps running session counters.
#[derive(Default)]
pub struct LogSink {
    targets_acquired: u64,
    targets_lost: u64,
    idle_notices: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for LogSink {
    fn handle_event(&mut self, event: &TrackEvent) {
        match *event {
            TrackEvent::TargetAcquired { velocity } => {
                self.targets_acquired += 1;
                info!(
                    "🎯 target acquired, {} at {:.1} (target #{})",
                    direction_name(velocity),
                    velocity,
                    self.targets_acquired
                );
            }
            TrackEvent::TargetAccelerating { velocity } => {
                info!(
                    "acceleration detected, {} at {:.1}",
                    direction_name(velocity),
                    velocity
                );
            }
            TrackEvent::TargetLost => {
                self.targets_lost += 1;
                info!(
                    "target lost ({} acquired / {} lost this session)",
                    self.targets_acquired, self.targets_lost
                );
            }
            TrackEvent::IdleNotice => {
                self.idle_notices += 1;
                info!("still idle (notice #{})", self.idle_notices);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let mut sink = LogSink::new();
        sink.handle_event(&TrackEvent::TargetAcquired { velocity: 20.0 });
        sink.handle_event(&TrackEvent::TargetAccelerating { velocity: 25.0 });
        sink.handle_event(&TrackEvent::TargetLost);
        sink.handle_event(&TrackEvent::IdleNotice);
        sink.handle_event(&TrackEvent::IdleNotice);

        assert_eq!(sink.targets_acquired, 1);
        assert_eq!(sink.targets_lost, 1);
        assert_eq!(sink.idle_notices, 2);
    }
}
