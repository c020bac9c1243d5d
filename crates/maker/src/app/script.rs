use std::collections::VecDeque;

use engine::{InputAction, InputSnapshot, InputSource, KeyPress, MouseButton, Vec2};

use super::settings::TILE_SIZE_PX;

const FLOOR_Y_PX: f32 = 600.0;
const FLOOR_FIRST_X_PX: f32 = 64.0;
const FLOOR_CELLS: u16 = 18;
const TERRAIN_PICK: u8 = 2;
const RUN_FRAMES: usize = 120;
const SETTLE_FRAMES: usize = 30;

/// Pre-recorded input stream. Closes once every frame has been handed out.
#[derive(Debug, Default)]
pub(crate) struct ScriptedInput {
    frames: VecDeque<InputSnapshot>,
}

impl ScriptedInput {
    fn push(&mut self, snapshot: InputSnapshot, repeat: usize) {
        self.frames.extend(std::iter::repeat(snapshot).take(repeat));
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    /// Paints a terrain floor, plays it running right with one jump, then
    /// escapes back to the editor.
    pub(crate) fn demo() -> Self {
        let mut script = Self::default();
        let pointer =
            |x: f32| InputSnapshot::empty().with_pointer_px(Some(Vec2::new(x, FLOOR_Y_PX)));

        script.push(InputSnapshot::empty().with_palette_pick(Some(TERRAIN_PICK)), 1);
        script.push(
            pointer(FLOOR_FIRST_X_PX).with_button_pressed(MouseButton::Left),
            1,
        );
        for cell in 1..FLOOR_CELLS {
            let x = FLOOR_FIRST_X_PX + f32::from(cell) * TILE_SIZE_PX;
            script.push(pointer(x).with_button_held(MouseButton::Left), 1);
        }
        let last_x = FLOOR_FIRST_X_PX + f32::from(FLOOR_CELLS - 1) * TILE_SIZE_PX;
        script.push(pointer(last_x).with_button_released(MouseButton::Left), 1);

        script.push(InputSnapshot::empty().with_key_pressed(KeyPress::Commit), 1);
        script.push(InputSnapshot::empty(), SETTLE_FRAMES);

        let run = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        script.push(run, RUN_FRAMES / 2);
        script.push(run.with_action_down(InputAction::Jump, true), 1);
        script.push(run, RUN_FRAMES / 2);
        script.push(InputSnapshot::empty(), SETTLE_FRAMES);

        script.push(InputSnapshot::empty().with_key_pressed(KeyPress::Back), 1);
        script.push(InputSnapshot::empty(), SETTLE_FRAMES);
        script
    }
}

impl InputSource for ScriptedInput {
    fn snapshot_for_tick(&mut self) -> Option<InputSnapshot> {
        self.frames.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use engine::{
        run_app, ExitReason, FixedFrameClock, LoopConfig, MetricsHandle, NullRenderer,
        SceneKey, SceneMachine,
    };

    use super::*;
    use crate::app::assets::build_catalog;
    use crate::app::editor::grid::CompiledGrid;
    use crate::app::editor::EditorScene;
    use crate::app::level::LevelScene;

    #[test]
    fn demo_script_round_trips_through_the_level() {
        let library = Rc::new(build_catalog().expect("catalog"));
        let mut scenes: SceneMachine<CompiledGrid> = SceneMachine::new(
            Box::new(EditorScene::new(Rc::clone(&library))),
            Box::new(LevelScene::new(library)),
            SceneKey::Editor,
        );
        let mut input = ScriptedInput::demo();
        let expected_frames = input.len() as u64;
        let mut renderer = NullRenderer::default();

        let summary = run_app(
            &LoopConfig::default(),
            &mut scenes,
            &mut FixedFrameClock::from_hz(60),
            &mut input,
            &mut renderer,
            &MetricsHandle::default(),
        );

        assert_eq!(summary.exit_reason, ExitReason::InputClosed);
        assert_eq!(summary.frames, expected_frames);
        assert_eq!(summary.scene_switches, 2);
        assert_eq!(renderer.frames_presented(), expected_frames);
        assert!(renderer.last_frame_len() > 0);
    }

    #[test]
    fn script_is_finite() {
        let mut input = ScriptedInput::demo();
        let total = input.len();
        let mut served = 0;
        while input.snapshot_for_tick().is_some() {
            served += 1;
        }
        assert_eq!(served, total);
    }
}
