use std::process::ExitCode;

use engine::{run_app, FixedFrameClock, MetricsHandle, NullRenderer};
use tracing::info;

use super::bootstrap::AppWiring;

const TICK_RATE_HZ: u32 = 60;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        mut scenes,
        mut input,
    } = app;
    let mut clock = FixedFrameClock::from_hz(TICK_RATE_HZ);
    let mut renderer = NullRenderer::default();
    let metrics = MetricsHandle::default();

    let summary = run_app(
        &config,
        &mut scenes,
        &mut clock,
        &mut input,
        &mut renderer,
        &metrics,
    );

    let last = metrics.snapshot();
    info!(
        frames = summary.frames,
        scene_switches = summary.scene_switches,
        presented = renderer.frames_presented(),
        last_frame_renderables = renderer.last_frame_len(),
        tps = last.tps,
        reason = ?summary.exit_reason,
        "run_finished"
    );
    ExitCode::SUCCESS
}
