use std::time::Duration;

use tracing::{debug, info};

use super::metrics::{FrameSample, IntervalMetrics};
use super::render::sort_by_layer;
use super::{InputSnapshot, MetricsHandle, Renderer, SceneCommand, SceneMachine};

const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(100);
const DEFAULT_METRICS_LOG_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub max_frame_delta: Duration,
    pub metrics_log_interval: Duration,
    pub frame_limit: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            metrics_log_interval: DEFAULT_METRICS_LOG_INTERVAL,
            frame_limit: None,
        }
    }
}

/// External frame clock: reports the wall time spent on the previous frame.
pub trait FrameClock {
    fn next_frame_delta(&mut self) -> Duration;
}

/// External input provider. `None` means the input stream has closed.
pub trait InputSource {
    fn snapshot_for_tick(&mut self) -> Option<InputSnapshot>;
}

/// Clock that reports the same delta every frame.
#[derive(Debug, Clone, Copy)]
pub struct FixedFrameClock {
    step: Duration,
}

impl FixedFrameClock {
    pub fn new(step: Duration) -> Self {
        Self { step }
    }

    pub fn from_hz(hz: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / hz.max(1) as f64))
    }
}

impl FrameClock for FixedFrameClock {
    fn next_frame_delta(&mut self) -> Duration {
        self.step
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    QuitRequested,
    InputClosed,
    FrameLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub scene_switches: u64,
    pub exit_reason: ExitReason,
}

/// Runs one simulation tick per frame until input closes, a quit is
/// requested, or the configured frame limit is reached.
///
/// Each tick applies input, lets the active scene update, services any scene
/// switch, then hands the sorted renderables to the renderer.
pub fn run_app<P>(
    config: &LoopConfig,
    scenes: &mut SceneMachine<P>,
    clock: &mut dyn FrameClock,
    input: &mut dyn InputSource,
    renderer: &mut dyn Renderer,
    metrics_handle: &MetricsHandle,
) -> RunSummary {
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, DEFAULT_MAX_FRAME_DELTA);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, DEFAULT_METRICS_LOG_INTERVAL);
    let mut interval_metrics = IntervalMetrics::new(metrics_log_interval);

    scenes.load_active();
    info!(
        scene = ?scenes.active_scene(),
        entity_count = scenes.entity_count_active(),
        "scene_loaded"
    );
    info!(
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        frame_limit = ?config.frame_limit,
        "loop_config"
    );

    let mut frames = 0u64;
    let mut scene_switches = 0u64;
    let exit_reason = loop {
        if config.frame_limit.is_some_and(|limit| frames >= limit) {
            break ExitReason::FrameLimit;
        }
        let Some(input_snapshot) = input.snapshot_for_tick() else {
            info!(reason = "input_closed", "shutdown_requested");
            break ExitReason::InputClosed;
        };
        if input_snapshot.quit_requested() {
            info!(reason = "quit_input", "shutdown_requested");
            break ExitReason::QuitRequested;
        }

        let raw_frame_dt = clock.next_frame_delta();
        let dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
        if dt < raw_frame_dt {
            debug!(
                raw_frame_dt_ms = raw_frame_dt.as_millis() as u64,
                "frame_delta_clamped"
            );
        }

        match scenes.update_active(dt, &input_snapshot) {
            SceneCommand::None => {}
            SceneCommand::SwitchTo { scene, payload } => {
                if scenes.switch_to(scene, payload) {
                    scene_switches = scene_switches.saturating_add(1);
                    info!(
                        scene = ?scenes.active_scene(),
                        entity_count = scenes.entity_count_active(),
                        "scene_switched"
                    );
                }
            }
            SceneCommand::Quit => {
                info!(reason = "scene_quit", "shutdown_requested");
                break ExitReason::QuitRequested;
            }
        }

        let mut renderables = scenes.renderables_active();
        sort_by_layer(&mut renderables);
        renderer.present(&renderables);

        interval_metrics.record(FrameSample {
            raw_dt: raw_frame_dt,
            simulated_dt: dt,
            renderables: renderables.len(),
        });
        if let Some(snapshot) = interval_metrics.take_if_due(scenes.entity_count_active()) {
            metrics_handle.publish(snapshot);
            let title = scenes.debug_title_active().unwrap_or_default();
            info!(
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                clamped_frames = snapshot.clamped_frames,
                entity_count = snapshot.entity_count,
                renderables = snapshot.renderables,
                scene = ?scenes.active_scene(),
                title = %title,
                "loop_metrics"
            );
        }
        frames = frames.saturating_add(1);
    };

    scenes.shutdown_all();
    info!(frames, scene_switches, reason = ?exit_reason, "shutdown");
    RunSummary {
        frames,
        scene_switches,
        exit_reason,
    }
}

pub fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
