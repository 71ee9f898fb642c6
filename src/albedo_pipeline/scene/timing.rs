use std::time::{Duration, Instant};
use std::collections::HashMap;

use tracing::debug;

#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: String,
    pub duration: Duration,
}

/// Wall-clock time spent in each stage of one scene
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    steps: Vec<StepTiming>,
    step_map: HashMap<String, Duration>,
}

impl StageTimings {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            step_map: HashMap::new(),
        }
    }

    pub fn add_step(&mut self, name: impl Into<String>, duration: Duration) {
        let name = name.into();
        self.steps.push(StepTiming {
            name: name.clone(),
            duration,
        });
        *self.step_map.entry(name).or_insert(Duration::ZERO) += duration;
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// Accumulated time of every step recorded under `name`
    pub fn get_step(&self, name: &str) -> Option<Duration> {
        self.step_map.get(name).copied()
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    /// Logs the per-stage totals at debug level, slowest first.
    pub fn log_summary(&self, scene: &str) {
        let total = self.total_duration();
        let mut totals: Vec<(&String, &Duration)> = self.step_map.iter().collect();
        totals.sort_by(|a, b| b.1.cmp(a.1));

        for (name, duration) in totals {
            let percentage = if total.as_secs_f64() > 0.0 {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            } else {
                0.0
            };
            debug!(
                "{}: {:<20} {:>12.3}ms ({:>5.1}%)",
                scene,
                name,
                duration.as_secs_f64() * 1000.0,
                percentage
            );
        }
        debug!("{}: {:<20} {:>12.3}ms", scene, "total", total.as_secs_f64() * 1000.0);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    pub fn stop(self) -> (String, Duration) {
        (self.name, self.start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_steps_accumulate() {
        let mut timings = StageTimings::new();
        timings.add_step("decompose", Duration::from_millis(5));
        timings.add_step("fuse", Duration::from_millis(2));
        timings.add_step("decompose", Duration::from_millis(7));

        assert_eq!(timings.steps().len(), 3);
        assert_eq!(timings.get_step("decompose"), Some(Duration::from_millis(12)));
        assert_eq!(timings.get_step("missing"), None);
        assert_eq!(timings.total_duration(), Duration::from_millis(14));
    }

    #[test]
    fn test_timer_reports_name() {
        let (name, duration) = Timer::start("load").stop();
        assert_eq!(name, "load");
        assert!(duration < Duration::from_secs(5));
    }
}
