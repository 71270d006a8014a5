use delve_common::SectionCoord;
use std::collections::VecDeque;
use std::time::Duration;

/// What the last `update` did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamStats {
    pub center: SectionCoord,
    pub generated_this_update: usize,
    pub adopted_this_update: usize,
    pub requested_this_update: usize,
    pub evicted_this_update: usize,
    pub failed_this_update: usize,
    pub resident: usize,
    pub visible: usize,
    pub pending: usize,
    pub total_generated: u64,
    pub total_evicted: u64,
    pub update_time: Duration,
}

/// Rolling window over recent update durations.
#[derive(Debug, Clone)]
pub struct UpdateTimings {
    window: VecDeque<Duration>,
    capacity: usize,
}

impl UpdateTimings {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(dt);
    }

    pub fn count(&self) -> usize {
        self.window.len()
    }

    pub fn average(&self) -> Duration {
        if self.window.is_empty() {
            return Duration::ZERO;
        }
        self.window.iter().sum::<Duration>() / self.window.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.window.iter().copied().max().unwrap_or_default()
    }

    pub fn min(&self) -> Duration {
        self.window.iter().copied().min().unwrap_or_default()
    }
}

impl Default for UpdateTimings {
    fn default() -> Self {
        Self::new(120)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_history() {
        let mut t = UpdateTimings::new(3);
        t.record(Duration::from_millis(10));
        t.record(Duration::from_millis(20));
        t.record(Duration::from_millis(30));
        assert_eq!(t.count(), 3);
        assert_eq!(t.average(), Duration::from_millis(20));
        assert_eq!(t.max(), Duration::from_millis(30));
        assert_eq!(t.min(), Duration::from_millis(10));
    }

    #[test]
    fn oldest_sample_falls_out() {
        let mut t = UpdateTimings::new(2);
        t.record(Duration::from_millis(10));
        t.record(Duration::from_millis(20));
        t.record(Duration::from_millis(30));
        assert_eq!(t.count(), 2);
        assert_eq!(t.average(), Duration::from_millis(25));
    }

    #[test]
    fn empty_window_is_zero() {
        let t = UpdateTimings::new(0);
        assert_eq!(t.average(), Duration::ZERO);
        assert_eq!(t.max(), Duration::ZERO);
    }
}
