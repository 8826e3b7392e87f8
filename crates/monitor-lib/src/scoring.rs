//! Health scoring
//!
//! Maps a bundle of raw service signals to a bounded 0-100 score using an
//! additive-penalty model. Scoring is pure: no I/O, no clock, no failure
//! path. Absent signals must be normalized to zero by the caller before
//! scoring.

use crate::models::ACTIVE_STATUS;

/// How a running-below-desired task count is penalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskDeficitMode {
    /// Flat penalty regardless of how many tasks are missing.
    Flat,
    /// Penalty multiplied by the size of the deficit.
    Scaled,
}

/// Tiered penalties for the windowed error count.
#[derive(Debug, Clone)]
pub struct ErrorThresholds {
    pub high_count: u64,
    pub high_penalty: u32,
    pub elevated_count: u64,
    pub elevated_penalty: u32,
    pub any_penalty: u32,
}

impl Default for ErrorThresholds {
    fn default() -> Self {
        Self {
            high_count: 10,
            high_penalty: 20,
            elevated_count: 5,
            elevated_penalty: 10,
            any_penalty: 5,
        }
    }
}

/// The full penalty table, overridable per deployment.
///
/// Two presets exist because the system historically shipped two divergent
/// tables. [`ScoringPolicy::default`] is the monitoring-report table and the
/// documented default: scaled task-deficit penalty (a deficit of 3 tasks is
/// worse than a deficit of 1) and error-count tiers enabled.
/// [`ScoringPolicy::manager`] is the stricter console table with a flat
/// deficit penalty and no error axis.
#[derive(Debug, Clone)]
pub struct ScoringPolicy {
    pub status_penalty: u32,
    pub task_deficit_mode: TaskDeficitMode,
    pub task_deficit_penalty: u32,
    pub cpu_warning_threshold: f64,
    pub cpu_warning_penalty: u32,
    pub cpu_critical_threshold: f64,
    pub cpu_critical_penalty: u32,
    pub memory_warning_threshold: f64,
    pub memory_warning_penalty: u32,
    pub memory_critical_threshold: f64,
    pub memory_critical_penalty: u32,
    pub error_thresholds: Option<ErrorThresholds>,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            status_penalty: 30,
            task_deficit_mode: TaskDeficitMode::Scaled,
            task_deficit_penalty: 20,
            cpu_warning_threshold: 60.0,
            cpu_warning_penalty: 5,
            cpu_critical_threshold: 80.0,
            cpu_critical_penalty: 15,
            memory_warning_threshold: 60.0,
            memory_warning_penalty: 5,
            memory_critical_threshold: 80.0,
            memory_critical_penalty: 15,
            error_thresholds: Some(ErrorThresholds::default()),
        }
    }
}

impl ScoringPolicy {
    /// The manager-console penalty table.
    pub fn manager() -> Self {
        Self {
            status_penalty: 40,
            task_deficit_mode: TaskDeficitMode::Flat,
            task_deficit_penalty: 20,
            cpu_warning_threshold: 70.0,
            cpu_warning_penalty: 15,
            cpu_critical_threshold: 85.0,
            cpu_critical_penalty: 30,
            memory_warning_threshold: 70.0,
            memory_warning_penalty: 15,
            memory_critical_threshold: 85.0,
            memory_critical_penalty: 30,
            error_thresholds: None,
        }
    }

    /// Compute the health score and issue tags for one set of signals.
    ///
    /// Tiers within an axis are mutually exclusive; penalties across axes
    /// accumulate independently and the final score is floored at zero.
    pub fn score(&self, signals: &RawSignals) -> ScoredHealth {
        let mut penalty: u32 = 0;
        let mut issues: Vec<String> = Vec::new();

        if signals.status != ACTIVE_STATUS {
            penalty += self.status_penalty;
            issues.push("Service inactive".to_string());
        }

        if signals.running_tasks < signals.desired_tasks {
            let deficit = signals.desired_tasks - signals.running_tasks;
            penalty += match self.task_deficit_mode {
                TaskDeficitMode::Flat => self.task_deficit_penalty,
                TaskDeficitMode::Scaled => self.task_deficit_penalty * deficit,
            };
            issues.push("Task deficit".to_string());
        }

        if signals.cpu_utilization > self.cpu_critical_threshold {
            penalty += self.cpu_critical_penalty;
            issues.push("High CPU".to_string());
        } else if signals.cpu_utilization > self.cpu_warning_threshold {
            penalty += self.cpu_warning_penalty;
            issues.push("High CPU".to_string());
        }

        if signals.memory_utilization > self.memory_critical_threshold {
            penalty += self.memory_critical_penalty;
            issues.push("High Memory".to_string());
        } else if signals.memory_utilization > self.memory_warning_threshold {
            penalty += self.memory_warning_penalty;
            issues.push("High Memory".to_string());
        }

        if let Some(tiers) = &self.error_thresholds {
            let error_penalty = if signals.errors_count > tiers.high_count {
                tiers.high_penalty
            } else if signals.errors_count > tiers.elevated_count {
                tiers.elevated_penalty
            } else if signals.errors_count > 0 {
                tiers.any_penalty
            } else {
                0
            };
            if error_penalty > 0 {
                penalty += error_penalty;
                issues.push("High error rate".to_string());
            }
        }

        if issues.is_empty() {
            issues.push("None".to_string());
        }

        ScoredHealth {
            score: 100u32.saturating_sub(penalty) as u8,
            issues,
        }
    }
}

/// Raw signals for one service, already normalized by the caller.
#[derive(Debug, Clone)]
pub struct RawSignals {
    pub status: String,
    pub running_tasks: u32,
    pub desired_tasks: u32,
    pub cpu_utilization: f64,
    pub memory_utilization: f64,
    pub errors_count: u64,
}

impl RawSignals {
    /// Signals for a fully healthy, idle service.
    pub fn nominal() -> Self {
        Self {
            status: ACTIVE_STATUS.to_string(),
            running_tasks: 1,
            desired_tasks: 1,
            cpu_utilization: 0.0,
            memory_utilization: 0.0,
            errors_count: 0,
        }
    }
}

/// Scoring result: bounded score plus human-readable issue tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredHealth {
    pub score: u8,
    pub issues: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(
        status: &str,
        running: u32,
        desired: u32,
        cpu: f64,
        memory: f64,
        errors: u64,
    ) -> RawSignals {
        RawSignals {
            status: status.to_string(),
            running_tasks: running,
            desired_tasks: desired,
            cpu_utilization: cpu,
            memory_utilization: memory,
            errors_count: errors,
        }
    }

    #[test]
    fn healthy_service_scores_full() {
        let policy = ScoringPolicy::default();
        let scored = policy.score(&signals("ACTIVE", 2, 2, 10.0, 10.0, 0));

        assert_eq!(scored.score, 100);
        assert_eq!(scored.issues, vec!["None".to_string()]);
    }

    #[test]
    fn scaled_deficit_penalizes_per_missing_task() {
        let policy = ScoringPolicy::default();

        let one_short = policy.score(&signals("ACTIVE", 1, 2, 50.0, 50.0, 0));
        assert_eq!(one_short.score, 80);
        assert_eq!(one_short.issues, vec!["Task deficit".to_string()]);

        let three_short = policy.score(&signals("ACTIVE", 0, 3, 0.0, 0.0, 0));
        assert_eq!(three_short.score, 40);
    }

    #[test]
    fn flat_deficit_ignores_deficit_size() {
        let policy = ScoringPolicy::manager();

        let one_short = policy.score(&signals("ACTIVE", 1, 2, 0.0, 0.0, 0));
        let three_short = policy.score(&signals("ACTIVE", 0, 3, 0.0, 0.0, 0));
        assert_eq!(one_short.score, three_short.score);
        assert_eq!(one_short.score, 80);
    }

    #[test]
    fn everything_wrong_floors_at_zero() {
        let policy = ScoringPolicy::default();
        let scored = policy.score(&signals("DRAINING", 0, 3, 95.0, 95.0, 15));

        // 30 + 60 + 15 + 15 + 20 exceeds 100; floored.
        assert_eq!(scored.score, 0);
        assert_eq!(
            scored.issues,
            vec![
                "Service inactive".to_string(),
                "Task deficit".to_string(),
                "High CPU".to_string(),
                "High Memory".to_string(),
                "High error rate".to_string(),
            ]
        );
    }

    #[test]
    fn utilization_tiers_are_mutually_exclusive() {
        let policy = ScoringPolicy::default();

        // Critical tier only, not warning + critical.
        let critical = policy.score(&signals("ACTIVE", 1, 1, 85.0, 0.0, 0));
        assert_eq!(critical.score, 85);

        let warning = policy.score(&signals("ACTIVE", 1, 1, 70.0, 0.0, 0));
        assert_eq!(warning.score, 95);
    }

    #[test]
    fn error_tiers() {
        let policy = ScoringPolicy::default();

        assert_eq!(policy.score(&signals("ACTIVE", 1, 1, 0.0, 0.0, 0)).score, 100);
        assert_eq!(policy.score(&signals("ACTIVE", 1, 1, 0.0, 0.0, 3)).score, 95);
        assert_eq!(policy.score(&signals("ACTIVE", 1, 1, 0.0, 0.0, 7)).score, 90);
        assert_eq!(policy.score(&signals("ACTIVE", 1, 1, 0.0, 0.0, 11)).score, 80);
    }

    #[test]
    fn manager_policy_has_no_error_axis() {
        let policy = ScoringPolicy::manager();
        let scored = policy.score(&signals("ACTIVE", 1, 1, 0.0, 0.0, 500));
        assert_eq!(scored.score, 100);
        assert_eq!(scored.issues, vec!["None".to_string()]);
    }

    #[test]
    fn score_stays_in_bounds_for_extreme_inputs() {
        for policy in [ScoringPolicy::default(), ScoringPolicy::manager()] {
            for cpu in (0..=1000).step_by(37) {
                for memory in (0..=1000).step_by(41) {
                    for (running, desired) in [(0, 0), (0, 10), (3, 7), (10, 0)] {
                        for errors in [0u64, 1, 6, 11, 10_000] {
                            let scored = policy.score(&signals(
                                "DRAINING",
                                running,
                                desired,
                                cpu as f64,
                                memory as f64,
                                errors,
                            ));
                            assert!(scored.score <= 100);
                            assert!(!scored.issues.is_empty());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn penalties_are_monotonic() {
        let policy = ScoringPolicy::default();
        let base = signals("ACTIVE", 3, 3, 50.0, 50.0, 2);
        let base_score = policy.score(&base).score;

        // More CPU never raises the score.
        for cpu in [61.0, 81.0, 500.0] {
            let mut worse = base.clone();
            worse.cpu_utilization = cpu;
            assert!(policy.score(&worse).score <= base_score);
        }

        // More memory never raises the score.
        for memory in [61.0, 81.0, 500.0] {
            let mut worse = base.clone();
            worse.memory_utilization = memory;
            assert!(policy.score(&worse).score <= base_score);
        }

        // More errors never raise the score.
        for errors in [6, 11, 1000] {
            let mut worse = base.clone();
            worse.errors_count = errors;
            assert!(policy.score(&worse).score <= base_score);
        }

        // Fewer running tasks never raise the score.
        for running in [2, 1, 0] {
            let mut worse = base.clone();
            worse.running_tasks = running;
            assert!(policy.score(&worse).score <= base_score);
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let policy = ScoringPolicy::default();
        let input = signals("DRAINING", 1, 4, 72.5, 88.1, 7);

        let first = policy.score(&input);
        for _ in 0..10 {
            assert_eq!(policy.score(&input), first);
        }
    }
}
