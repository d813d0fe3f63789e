//! System health projection.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Down,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub status: HealthStatus,
    pub uptime_seconds: i64,
    pub queue_backlog: usize,
    pub auto_settlement_running: bool,
    /// `2 * queue_backlog` seconds if the scheduler is running, else 0.
    pub processing_delay_seconds: u64,
    pub issues: Vec<String>,
}

impl SystemHealth {
    pub fn compute(
        uptime_seconds: i64,
        queue_backlog: usize,
        auto_settlement_enabled: bool,
        scheduler_running: bool,
        completed_batches: u64,
        failed_batches: u64,
    ) -> Self {
        let mut issues = Vec::new();

        if auto_settlement_enabled && !scheduler_running {
            issues.push("scheduler stopped while auto-settlement is enabled".to_string());
        }

        let total_finished = completed_batches + failed_batches;
        if total_finished > 0 {
            let failure_ratio = failed_batches as f64 / total_finished as f64;
            if failure_ratio > 0.1 {
                issues.push(format!("settlement failure ratio {failure_ratio:.2} exceeds 0.1"));
            }
        }

        if queue_backlog > 1000 {
            issues.push(format!("queue backlog {queue_backlog} exceeds 1000"));
        }

        let status = if issues.len() > 3 {
            HealthStatus::Down
        } else if !issues.is_empty() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        let processing_delay_seconds = if scheduler_running {
            2 * queue_backlog as u64
        } else {
            0
        };

        Self {
            status,
            uptime_seconds,
            queue_backlog,
            auto_settlement_running: scheduler_running,
            processing_delay_seconds,
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_by_default() {
        let health = SystemHealth::compute(3600, 5, true, true, 10, 0);
        assert_eq!(health.status, HealthStatus::Healthy);
        assert!(health.issues.is_empty());
        assert_eq!(health.processing_delay_seconds, 10);
    }

    #[test]
    fn test_degraded_when_scheduler_stopped_but_enabled() {
        let health = SystemHealth::compute(3600, 5, true, false, 10, 0);
        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.processing_delay_seconds, 0);
    }

    #[test]
    fn test_degraded_on_high_failure_ratio() {
        let health = SystemHealth::compute(3600, 0, false, false, 8, 2);
        assert_eq!(health.status, HealthStatus::Degraded);
    }

    #[test]
    fn test_degraded_on_large_backlog() {
        let health = SystemHealth::compute(3600, 1001, false, false, 0, 0);
        assert_eq!(health.status, HealthStatus::Degraded);
    }
}
