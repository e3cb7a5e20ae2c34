use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Accumulated per-phase timings of universe turns.
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
pub struct TurnMetrics {
    pub total_turns: u64,
    pub total_time: Duration,
    /// Proper-time advance and snapshot
    pub pre_process_time: Duration,
    pub ai_time: Duration,
    /// Applying submitted and mechanism-produced commands
    pub command_time: Duration,
    pub mechanism_time: Duration,
    /// Dead-player removal and global refresh
    pub cleanup_time: Duration,
    pub commands_applied: u64,
    pub commands_rejected: u64,
}

impl TurnMetrics {
    pub fn turn_avg_ms(&self) -> f64 {
        if self.total_turns == 0 {
            0.0
        } else {
            self.total_time.as_secs_f64() * 1000.0 / self.total_turns as f64
        }
    }

    pub fn turns_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() == 0.0 {
            0.0
        } else {
            self.total_turns as f64 / self.total_time.as_secs_f64()
        }
    }

    /// Share of submitted commands that were applied, 1.0 when none were.
    pub fn acceptance_rate(&self) -> f64 {
        let total = self.commands_applied + self.commands_rejected;
        if total == 0 {
            1.0
        } else {
            self.commands_applied as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let metrics = TurnMetrics::default();
        assert_eq!(metrics.turn_avg_ms(), 0.0);
        assert_eq!(metrics.turns_per_second(), 0.0);
        assert_eq!(metrics.acceptance_rate(), 1.0);
    }

    #[test]
    fn test_averages() {
        let metrics = TurnMetrics {
            total_turns: 4,
            total_time: Duration::from_millis(200),
            commands_applied: 3,
            commands_rejected: 1,
            ..Default::default()
        };
        assert!((metrics.turn_avg_ms() - 50.0).abs() < 1e-9);
        assert!((metrics.turns_per_second() - 20.0).abs() < 1e-9);
        assert_eq!(metrics.acceptance_rate(), 0.75);
    }
}
