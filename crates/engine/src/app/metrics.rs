use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LockResult, RwLock};
use std::time::Duration;

use tracing::warn;

static POISON_REPORTED: AtomicBool = AtomicBool::new(false);

/// Takes the guard out of a poisoned lock, warning only the first time.
fn recover<G>(result: LockResult<G>, operation: &'static str) -> G {
    result.unwrap_or_else(|poisoned| {
        if !POISON_REPORTED.swap(true, Ordering::Relaxed) {
            warn!(operation, "metrics_lock_poisoned");
        }
        poisoned.into_inner()
    })
}

/// Loop health over the last reporting interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub tps: f32,
    pub frame_time_ms: f32,
    pub clamped_frames: u32,
    pub entity_count: usize,
    /// Renderables handed to the renderer on the interval's last frame.
    pub renderables: usize,
}

/// Shared read side of the loop metrics; clones observe the same values.
#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    latest: Arc<RwLock<LoopMetricsSnapshot>>,
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        *recover(self.latest.read(), "read")
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        *recover(self.latest.write(), "write") = snapshot;
    }
}

/// One presented frame as seen by the loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameSample {
    pub(crate) raw_dt: Duration,
    pub(crate) simulated_dt: Duration,
    pub(crate) renderables: usize,
}

/// Folds frame samples into a snapshot once `interval` of simulated time has
/// passed.
#[derive(Debug)]
pub(crate) struct IntervalMetrics {
    interval: Duration,
    simulated: Duration,
    raw: Duration,
    frames: u32,
    clamped: u32,
    last_renderables: usize,
}

impl IntervalMetrics {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            simulated: Duration::ZERO,
            raw: Duration::ZERO,
            frames: 0,
            clamped: 0,
            last_renderables: 0,
        }
    }

    pub(crate) fn record(&mut self, sample: FrameSample) {
        self.frames = self.frames.saturating_add(1);
        self.raw = self.raw.saturating_add(sample.raw_dt);
        self.simulated = self.simulated.saturating_add(sample.simulated_dt);
        if sample.simulated_dt < sample.raw_dt {
            self.clamped = self.clamped.saturating_add(1);
        }
        self.last_renderables = sample.renderables;
    }

    /// Returns the finished interval and starts a new one, or `None` while the
    /// interval is still running.
    pub(crate) fn take_if_due(&mut self, entity_count: usize) -> Option<LoopMetricsSnapshot> {
        if self.simulated < self.interval {
            return None;
        }

        let frames = self.frames.max(1) as f32;
        let snapshot = LoopMetricsSnapshot {
            tps: self.frames as f32 / self.simulated.as_secs_f32().max(f32::EPSILON),
            frame_time_ms: self.raw.as_secs_f32() * 1000.0 / frames,
            clamped_frames: self.clamped,
            entity_count,
            renderables: self.last_renderables,
        };
        *self = Self::new(self.interval);
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn sample(raw_ms: u64, simulated_ms: u64) -> FrameSample {
        FrameSample {
            raw_dt: Duration::from_millis(raw_ms),
            simulated_dt: Duration::from_millis(simulated_ms),
            renderables: 7,
        }
    }

    fn poison(handle: &MetricsHandle) {
        let latest = Arc::clone(&handle.latest);
        let _ = thread::spawn(move || {
            let _guard = latest.write().expect("write guard");
            panic!("poison metrics lock");
        })
        .join();
    }

    #[test]
    fn interval_produces_rates_and_resets() {
        let mut metrics = IntervalMetrics::new(Duration::from_secs(1));
        for _ in 0..4 {
            metrics.record(sample(250, 250));
        }

        let snapshot = metrics.take_if_due(12).expect("interval elapsed");
        assert!((snapshot.tps - 4.0).abs() < 0.05);
        assert!((snapshot.frame_time_ms - 250.0).abs() < 0.001);
        assert_eq!(snapshot.entity_count, 12);
        assert_eq!(snapshot.renderables, 7);
        assert!(metrics.take_if_due(12).is_none());
    }

    #[test]
    fn clamped_frames_are_counted() {
        let mut metrics = IntervalMetrics::new(Duration::from_millis(100));
        metrics.record(sample(600, 100));

        let snapshot = metrics.take_if_due(0).expect("interval elapsed");
        assert_eq!(snapshot.clamped_frames, 1);
        assert!((snapshot.frame_time_ms - 600.0).abs() < 0.001);
    }

    #[test]
    fn nothing_is_reported_mid_interval() {
        let mut metrics = IntervalMetrics::new(Duration::from_secs(1));
        metrics.record(sample(16, 16));
        assert!(metrics.take_if_due(0).is_none());
    }

    #[test]
    fn handle_survives_a_poisoned_lock() {
        let handle = MetricsHandle::default();
        poison(&handle);
        assert_eq!(handle.snapshot(), LoopMetricsSnapshot::default());

        let published = LoopMetricsSnapshot {
            tps: 60.0,
            frame_time_ms: 16.0,
            clamped_frames: 1,
            entity_count: 3,
            renderables: 5,
        };
        handle.publish(published);
        assert_eq!(handle.snapshot(), published);
    }
}
