use std::collections::HashMap;
use std::time::Duration;

use engine::{
    Animator, EntityId, FrameHandle, FrameLibrary, FrameSequence, InputAction, InputSnapshot,
    Rect, Timer, Vec2,
};
use serde::Serialize;

use super::world::Collider;
use crate::app::settings::{Facing, ANIMATION_SPEED, TILE_SIZE_PX};

pub(crate) const PLAYER_SPEED: f32 = 300.0;
pub(crate) const PLAYER_GRAVITY: f32 = 4.0;
const JUMP_DIRECTION_Y: f32 = -2.0;
const FALL_THRESHOLD: f32 = 0.5;
const HITBOX_INSET_X: f32 = 50.0;
const FLOOR_PROBE_HEIGHT: f32 = 2.0;
const KNOCKBACK_Y: f32 = 1.5;
const INVULNERABILITY: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PlayerState {
    Idle,
    Run,
    Jump,
    Fall,
}

impl PlayerState {
    pub(crate) const ALL: [PlayerState; 4] = [
        PlayerState::Idle,
        PlayerState::Run,
        PlayerState::Jump,
        PlayerState::Fall,
    ];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Run => "run",
            PlayerState::Jump => "jump",
            PlayerState::Fall => "fall",
        }
    }

    /// Derived from velocity alone every step.
    fn from_direction(direction: Vec2) -> Self {
        if direction.y < 0.0 {
            PlayerState::Jump
        } else if direction.y > FALL_THRESHOLD {
            PlayerState::Fall
        } else if direction.x != 0.0 {
            PlayerState::Run
        } else {
            PlayerState::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Player animations keyed by state and facing.
#[derive(Debug, Clone, Default)]
pub(crate) struct PlayerFrames {
    sequences: HashMap<(PlayerState, Facing), FrameSequence>,
}

impl PlayerFrames {
    pub(crate) fn from_library(library: &FrameLibrary) -> Self {
        let mut sequences = HashMap::new();
        for state in PlayerState::ALL {
            for facing in [Facing::Left, Facing::Right] {
                let key = format!("player/{}_{}", state.as_str(), facing.as_str());
                let fallback = Vec2::new(TILE_SIZE_PX, TILE_SIZE_PX);
                sequences.insert((state, facing), library.get_or_placeholder(&key, fallback));
            }
        }
        Self { sequences }
    }

    fn get(&self, state: PlayerState, facing: Facing) -> Option<&FrameSequence> {
        self.sequences.get(&(state, facing))
    }

    fn size(&self) -> Vec2 {
        self.get(PlayerState::Idle, Facing::Right)
            .map_or(Vec2::new(TILE_SIZE_PX, TILE_SIZE_PX), FrameSequence::size)
    }
}

/// The controllable character. `direction` is the velocity in units of
/// [`PLAYER_SPEED`]; positions are resolved against static colliders one axis
/// at a time.
#[derive(Debug, Clone)]
pub(crate) struct Player {
    pub(crate) id: EntityId,
    pub(crate) visual_box: Rect,
    pub(crate) hitbox: Rect,
    /// Unrounded centre the hitbox is snapped from.
    position: Vec2,
    pub(crate) direction: Vec2,
    pub(crate) facing: Facing,
    pub(crate) state: PlayerState,
    pub(crate) on_floor: bool,
    invulnerable: Timer,
    animator: Animator,
    frames: PlayerFrames,
}

impl Player {
    pub(crate) fn new(id: EntityId, top_left: Vec2, frames: PlayerFrames) -> Self {
        let visual_box = Rect::from_top_left(top_left, frames.size());
        Self {
            id,
            visual_box,
            hitbox: visual_box.inflate(-HITBOX_INSET_X, 0.0),
            position: visual_box.center(),
            direction: Vec2::ZERO,
            facing: Facing::Right,
            state: PlayerState::Idle,
            on_floor: false,
            invulnerable: Timer::new(INVULNERABILITY),
            animator: Animator::new(ANIMATION_SPEED),
            frames,
        }
    }

    pub(crate) fn apply_input(&mut self, input: &InputSnapshot) {
        if input.is_down(InputAction::MoveRight) {
            self.direction.x = 1.0;
            self.facing = Facing::Right;
        } else if input.is_down(InputAction::MoveLeft) {
            self.direction.x = -1.0;
            self.facing = Facing::Left;
        } else {
            self.direction.x = 0.0;
        }

        if input.is_down(InputAction::Jump) && self.on_floor {
            self.direction.y = JUMP_DIRECTION_Y;
        }
    }

    /// Gravity, axis-separated movement, floor probe and state, in that order.
    pub(crate) fn step(&mut self, dt: Duration, colliders: &[Collider]) {
        let dt_seconds = dt.as_secs_f32();
        self.invulnerable.update(dt);
        self.direction.y += PLAYER_GRAVITY * dt_seconds;

        self.position.x += self.direction.x * PLAYER_SPEED * dt_seconds;
        self.hitbox.set_center_x(self.position.x.round());
        self.visual_box.set_center_x(self.hitbox.center().x);
        self.resolve(Axis::Horizontal, colliders);

        self.position.y += self.direction.y * PLAYER_SPEED * dt_seconds;
        self.hitbox.set_center_y(self.position.y.round());
        self.visual_box.set_center_y(self.hitbox.center().y);
        self.resolve(Axis::Vertical, colliders);

        self.check_on_floor(colliders);
        self.state = PlayerState::from_direction(self.direction);
        self.animate(dt_seconds);
    }

    fn resolve(&mut self, axis: Axis, colliders: &[Collider]) {
        for collider in colliders {
            if !collider.rect.overlaps(&self.hitbox) {
                continue;
            }
            match axis {
                Axis::Horizontal => {
                    if self.direction.x > 0.0 {
                        self.hitbox.set_right(collider.rect.left());
                    }
                    if self.direction.x < 0.0 {
                        self.hitbox.set_left(collider.rect.right());
                    }
                    let centre_x = self.hitbox.center().x;
                    self.visual_box.set_center_x(centre_x);
                    self.position.x = centre_x;
                }
                Axis::Vertical => {
                    if self.direction.y < 0.0 {
                        self.hitbox.set_top(collider.rect.bottom());
                    }
                    if self.direction.y > 0.0 {
                        self.hitbox.set_bottom(collider.rect.top());
                    }
                    let centre_y = self.hitbox.center().y;
                    self.visual_box.set_center_y(centre_y);
                    self.position.y = centre_y;
                    self.direction.y = 0.0;
                }
            }
        }
    }

    fn check_on_floor(&mut self, colliders: &[Collider]) {
        let probe = Rect::new(
            self.hitbox.left(),
            self.hitbox.bottom(),
            self.hitbox.width,
            FLOOR_PROBE_HEIGHT,
        );
        self.on_floor = colliders
            .iter()
            .any(|collider| collider.rect.overlaps(&probe));
    }

    fn animate(&mut self, dt_seconds: f32) {
        let frame_count = self
            .frames
            .get(self.state, self.facing)
            .map_or(1, FrameSequence::len);
        self.animator.advance(dt_seconds, frame_count);
    }

    /// Knocks the player upward unless a previous hit is still being absorbed.
    /// Returns whether the hit landed.
    pub(crate) fn damage(&mut self) -> bool {
        if self.invulnerable.is_active() {
            return false;
        }
        self.invulnerable.activate();
        self.direction.y -= KNOCKBACK_Y;
        true
    }

    #[cfg(test)]
    pub(crate) fn is_invulnerable(&self) -> bool {
        self.invulnerable.is_active()
    }

    pub(crate) fn frame(&self) -> FrameHandle {
        self.frames
            .get(self.state, self.facing)
            .map_or(FrameHandle::PLACEHOLDER, |sequence| {
                sequence.frame(self.animator.index())
            })
    }
}
