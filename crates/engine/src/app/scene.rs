use std::time::Duration;

use super::input::{ActionStates, ButtonStates, KeyPressEdges};
use super::{ButtonState, InputAction, KeyPress, MouseButton, RenderableDesc, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Editor,
    Level,
}

/// Request returned by a scene after each tick. `P` is the payload handed to
/// the scene being entered.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand<P> {
    None,
    SwitchTo { scene: SceneKey, payload: Option<P> },
    Quit,
}

/// Discretized intents for one tick, supplied by the input provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    key_presses: KeyPressEdges,
    buttons: ButtonStates,
    pointer_px: Option<Vec2>,
    scroll_steps: f32,
    pointer_over_menu: bool,
    palette_pick: Option<u8>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn key_pressed(&self, key: KeyPress) -> bool {
        self.key_presses.pressed(key)
    }

    pub fn button(&self, button: MouseButton) -> ButtonState {
        self.buttons.get(button)
    }

    pub fn pointer_px(&self) -> Option<Vec2> {
        self.pointer_px
    }

    pub fn scroll_steps(&self) -> f32 {
        self.scroll_steps
    }

    pub fn pointer_over_menu(&self) -> bool {
        self.pointer_over_menu
    }

    pub fn palette_pick(&self) -> Option<u8> {
        self.palette_pick
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_key_pressed(mut self, key: KeyPress) -> Self {
        self.key_presses.set(key, true);
        self
    }

    pub fn with_button(mut self, button: MouseButton, state: ButtonState) -> Self {
        self.buttons.set(button, state);
        self
    }

    /// Button held this tick, reporting a press edge.
    pub fn with_button_pressed(self, button: MouseButton) -> Self {
        self.with_button(
            button,
            ButtonState {
                down: true,
                pressed: true,
                released: false,
            },
        )
    }

    /// Button held since an earlier tick.
    pub fn with_button_held(self, button: MouseButton) -> Self {
        self.with_button(
            button,
            ButtonState {
                down: true,
                pressed: false,
                released: false,
            },
        )
    }

    pub fn with_button_released(self, button: MouseButton) -> Self {
        self.with_button(
            button,
            ButtonState {
                down: false,
                pressed: false,
                released: true,
            },
        )
    }

    pub fn with_pointer_px(mut self, pointer_px: Option<Vec2>) -> Self {
        self.pointer_px = pointer_px;
        self
    }

    pub fn with_scroll_steps(mut self, scroll_steps: f32) -> Self {
        self.scroll_steps = scroll_steps;
        self
    }

    pub fn with_pointer_over_menu(mut self, pointer_over_menu: bool) -> Self {
        self.pointer_over_menu = pointer_over_menu;
        self
    }

    pub fn with_palette_pick(mut self, palette_pick: Option<u8>) -> Self {
        self.palette_pick = palette_pick;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

pub trait Scene<P> {
    /// Called when the scene becomes active. `payload` is whatever the
    /// previous scene handed over with its switch command.
    fn load(&mut self, payload: Option<P>);
    fn update(&mut self, dt: Duration, input: &InputSnapshot) -> SceneCommand<P>;
    fn renderables(&self) -> Vec<RenderableDesc>;
    fn unload(&mut self);
    /// Scenes that return `false` are unloaded whenever another scene takes over.
    fn retain_on_exit(&self) -> bool {
        true
    }
    fn entity_count(&self) -> usize {
        0
    }
    fn debug_title(&self) -> Option<String> {
        None
    }
}

struct SceneRuntime<P> {
    scene: Box<dyn Scene<P>>,
    is_loaded: bool,
}

pub struct SceneMachine<P> {
    editor: SceneRuntime<P>,
    level: SceneRuntime<P>,
    active_scene: SceneKey,
}

impl<P> SceneMachine<P> {
    pub fn new(
        editor: Box<dyn Scene<P>>,
        level: Box<dyn Scene<P>>,
        active_scene: SceneKey,
    ) -> Self {
        Self {
            editor: SceneRuntime {
                scene: editor,
                is_loaded: false,
            },
            level: SceneRuntime {
                scene: level,
                is_loaded: false,
            },
            active_scene,
        }
    }

    pub fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub fn load_active(&mut self) {
        let runtime = self.active_runtime_mut();
        if runtime.is_loaded {
            return;
        }
        runtime.scene.load(None);
        runtime.is_loaded = true;
    }

    pub fn update_active(&mut self, dt: Duration, input: &InputSnapshot) -> SceneCommand<P> {
        self.active_runtime_mut().scene.update(dt, input)
    }

    pub fn renderables_active(&self) -> Vec<RenderableDesc> {
        self.active_runtime_ref().scene.renderables()
    }

    pub fn entity_count_active(&self) -> usize {
        self.active_runtime_ref().scene.entity_count()
    }

    pub fn debug_title_active(&self) -> Option<String> {
        self.active_runtime_ref().scene.debug_title()
    }

    /// Activates `next_scene`. A payload forces a fresh load of the target so
    /// it is rebuilt from the handed-over data; without one the target is only
    /// loaded if it is not loaded yet.
    pub fn switch_to(&mut self, next_scene: SceneKey, payload: Option<P>) -> bool {
        if self.active_scene == next_scene {
            return false;
        }

        let leaving = self.active_runtime_mut();
        if !leaving.scene.retain_on_exit() && leaving.is_loaded {
            leaving.scene.unload();
            leaving.is_loaded = false;
        }

        let entering = self.runtime_mut(next_scene);
        match payload {
            Some(payload) => {
                if entering.is_loaded {
                    entering.scene.unload();
                }
                entering.scene.load(Some(payload));
                entering.is_loaded = true;
            }
            None if !entering.is_loaded => {
                entering.scene.load(None);
                entering.is_loaded = true;
            }
            None => {}
        }
        self.active_scene = next_scene;
        true
    }

    pub fn shutdown_all(&mut self) {
        for runtime in [&mut self.editor, &mut self.level] {
            if runtime.is_loaded {
                runtime.scene.unload();
                runtime.is_loaded = false;
            }
        }
    }

    fn active_runtime_mut(&mut self) -> &mut SceneRuntime<P> {
        self.runtime_mut(self.active_scene)
    }

    fn active_runtime_ref(&self) -> &SceneRuntime<P> {
        self.runtime_ref(self.active_scene)
    }

    fn runtime_mut(&mut self, key: SceneKey) -> &mut SceneRuntime<P> {
        match key {
            SceneKey::Editor => &mut self.editor,
            SceneKey::Level => &mut self.level,
        }
    }

    fn runtime_ref(&self, key: SceneKey) -> &SceneRuntime<P> {
        match key {
            SceneKey::Editor => &self.editor,
            SceneKey::Level => &self.level,
        }
    }
}
