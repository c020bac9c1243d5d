/// Actions sampled as held state every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    PanModifier,
}

const ACTION_COUNT: usize = 4;

/// Keys reported once, on the tick they go down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPress {
    Left,
    Right,
    Commit,
    Back,
}

const KEY_PRESS_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

const BUTTON_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct KeyPressEdges {
    pressed: [bool; KEY_PRESS_COUNT],
}

impl KeyPressEdges {
    pub(crate) fn set(&mut self, key: KeyPress, pressed: bool) {
        self.pressed[key.index()] = pressed;
    }

    pub(crate) fn pressed(&self, key: KeyPress) -> bool {
        self.pressed[key.index()]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub down: bool,
    pub pressed: bool,
    pub released: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ButtonStates {
    buttons: [ButtonState; BUTTON_COUNT],
}

impl ButtonStates {
    pub(crate) fn get(&self, button: MouseButton) -> ButtonState {
        self.buttons[button.index()]
    }

    pub(crate) fn set(&mut self, button: MouseButton, state: ButtonState) {
        self.buttons[button.index()] = state;
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::PanModifier => 3,
        }
    }
}

impl KeyPress {
    const fn index(self) -> usize {
        match self {
            KeyPress::Left => 0,
            KeyPress::Right => 1,
            KeyPress::Commit => 2,
            KeyPress::Back => 3,
        }
    }
}

impl MouseButton {
    const fn index(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
        }
    }
}
