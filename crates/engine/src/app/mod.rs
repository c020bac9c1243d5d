mod animation;
mod geometry;
mod input;
mod loop_runner;
mod metrics;
mod render;
mod scene;
mod timer;

pub use animation::{AnimationStep, Animator, FrameHandle, FrameLibrary, FrameSequence};
pub use geometry::{Rect, Vec2};
pub use input::{ButtonState, InputAction, KeyPress, MouseButton};
pub use loop_runner::{
    clamp_frame_delta, run_app, ExitReason, FixedFrameClock, FrameClock, InputSource, LoopConfig,
    RunSummary,
};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use render::{sort_by_layer, DrawLayer, NullRenderer, RenderableDesc, Renderer};
pub use scene::{
    EntityId, EntityIdAllocator, InputSnapshot, Scene, SceneCommand, SceneKey, SceneMachine,
};
pub use timer::Timer;
