//! Runtime plumbing shared by the editor and the platformer: geometry,
//! simulated-time timers, frame sequences, input snapshots, the two-scene
//! machine and the headless frame loop.

pub mod app;
mod frame_keys;

pub use app::{
    clamp_frame_delta, run_app, sort_by_layer, AnimationStep, Animator, ButtonState, DrawLayer,
    EntityId, EntityIdAllocator, ExitReason, FixedFrameClock, FrameClock, FrameHandle,
    FrameLibrary, FrameSequence, InputAction, InputSnapshot, InputSource, KeyPress, LoopConfig,
    LoopMetricsSnapshot, MetricsHandle, MouseButton, NullRenderer, Rect, RenderableDesc, Renderer,
    RunSummary, Scene, SceneCommand, SceneKey, SceneMachine, Timer, Vec2,
};
pub use frame_keys::FrameKeyError;
