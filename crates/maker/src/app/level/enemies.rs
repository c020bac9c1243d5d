use std::time::Duration;

use engine::{
    AnimationStep, Animator, EntityId, FrameHandle, FrameLibrary, FrameSequence, Rect, Timer,
    Vec2,
};

use super::world::Collider;
use crate::app::settings::{Facing, ANIMATION_SPEED, TILE_SIZE_PX};

const SHELL_SIGHT_RANGE: f32 = 500.0;
const SHELL_SIGHT_HEIGHT: f32 = 30.0;
const SHELL_COOLDOWN: Duration = Duration::from_millis(2000);
/// Attack frame on which the pearl leaves the shell.
const SHELL_FIRE_FRAME: usize = 2;

const PEARL_SPEED: f32 = 150.0;
const PEARL_LIFETIME: Duration = Duration::from_millis(6000);
const PEARL_MUZZLE: Vec2 = Vec2::new(45.0, 6.0);

const TOOTH_SPEED: f32 = 120.0;

fn tile() -> Vec2 {
    Vec2::new(TILE_SIZE_PX, TILE_SIZE_PX)
}

/// Sprite box placed at `top_left` then dropped so it stands on the cell floor.
fn grounded_box(top_left: Vec2, size: Vec2) -> Rect {
    let mut visual_box = Rect::from_top_left(top_left, size);
    visual_box.set_bottom(top_left.y + TILE_SIZE_PX);
    visual_box
}

#[derive(Debug, Clone)]
pub(crate) struct Spikes {
    pub(crate) id: EntityId,
    pub(crate) visual_box: Rect,
    pub(crate) frame: FrameHandle,
}

impl Spikes {
    pub(crate) fn new(id: EntityId, top_left: Vec2, library: &FrameLibrary) -> Self {
        let sequence = library.get_or_placeholder("spikes", tile());
        Self {
            id,
            visual_box: Rect::from_top_left(top_left, sequence.size()),
            frame: sequence.frame(0),
        }
    }
}

/// Walks along its platform and turns around at walls and ledges.
#[derive(Debug, Clone)]
pub(crate) struct Tooth {
    pub(crate) id: EntityId,
    pub(crate) visual_box: Rect,
    pub(crate) heading: Facing,
    animator: Animator,
    run_left: FrameSequence,
    run_right: FrameSequence,
}

impl Tooth {
    pub(crate) fn new(id: EntityId, top_left: Vec2, library: &FrameLibrary) -> Self {
        let run_left = library.get_or_placeholder("tooth/run_left", tile());
        let run_right = library.get_or_placeholder("tooth/run_right", tile());
        Self {
            id,
            visual_box: grounded_box(top_left, run_left.size()),
            heading: Facing::Left,
            animator: Animator::new(ANIMATION_SPEED),
            run_left,
            run_right,
        }
    }

    pub(crate) fn walk(&mut self, dt: Duration, colliders: &[Collider]) {
        let body = self.visual_box;
        let ahead_x = match self.heading {
            Facing::Right => body.right(),
            Facing::Left => body.left() - 1.0,
        };
        let wall_probe = Rect::new(ahead_x, body.top(), 1.0, body.height);
        let ledge_probe = Rect::new(ahead_x, body.bottom(), 1.0, 1.0);
        let feet_probe = Rect::new(body.left(), body.bottom(), body.width, 1.0);

        let hits = |probe: &Rect| colliders.iter().any(|c| c.rect.overlaps(probe));
        let grounded = hits(&feet_probe);
        if hits(&wall_probe) || (grounded && !hits(&ledge_probe)) {
            self.heading = self.heading.flipped();
        }

        self.visual_box.x += self.heading.sign() * TOOTH_SPEED * dt.as_secs_f32();
        let frames = self.sequence().len();
        self.animator.advance(dt.as_secs_f32(), frames);
    }

    fn sequence(&self) -> &FrameSequence {
        match self.heading {
            Facing::Left => &self.run_left,
            Facing::Right => &self.run_right,
        }
    }

    pub(crate) fn frame(&self) -> FrameHandle {
        self.sequence().frame(self.animator.index())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShellState {
    Idle,
    Attack,
}

/// Request to spawn a pearl, raised on the shell's firing frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PearlSpawn {
    pub(crate) muzzle: Vec2,
    pub(crate) facing: Facing,
}

/// Stationary turret. Fires at most one pearl per attack cycle, then rests
/// for the cooldown.
#[derive(Debug, Clone)]
pub(crate) struct Shell {
    pub(crate) id: EntityId,
    pub(crate) visual_box: Rect,
    pub(crate) facing: Facing,
    pub(crate) state: ShellState,
    /// Entity the shell watches; linked once every entity exists.
    pub(crate) target: Option<EntityId>,
    has_shot: bool,
    cooldown: Timer,
    animator: Animator,
    idle: FrameSequence,
    attack: FrameSequence,
}

impl Shell {
    pub(crate) fn new(
        id: EntityId,
        top_left: Vec2,
        facing: Facing,
        library: &FrameLibrary,
    ) -> Self {
        let prefix = format!("shell_{}", facing.as_str());
        let idle = library.get_or_placeholder(&format!("{prefix}/idle"), tile());
        let attack = library.get_or_placeholder(&format!("{prefix}/attack"), tile());
        Self {
            id,
            visual_box: grounded_box(top_left, idle.size()),
            facing,
            state: ShellState::Idle,
            target: None,
            has_shot: false,
            cooldown: Timer::new(SHELL_COOLDOWN),
            animator: Animator::new(ANIMATION_SPEED),
            idle,
            attack,
        }
    }

    #[cfg(test)]
    fn cooldown_active(&self) -> bool {
        self.cooldown.is_active()
    }

    fn sees(&self, target_centre: Vec2) -> bool {
        let centre = self.visual_box.center();
        let in_front = match self.facing {
            Facing::Left => target_centre.x < centre.x,
            Facing::Right => target_centre.x > centre.x,
        };
        centre.distance(target_centre) < SHELL_SIGHT_RANGE
            && (centre.y - target_centre.y).abs() < SHELL_SIGHT_HEIGHT
            && in_front
    }

    /// Advances one step. `target_centre` is the linked target's position, if
    /// it still exists.
    pub(crate) fn update(
        &mut self,
        dt: Duration,
        target_centre: Option<Vec2>,
    ) -> Option<PearlSpawn> {
        self.cooldown.update(dt);

        let next = match target_centre {
            Some(centre) if self.sees(centre) && !self.cooldown.is_active() => {
                ShellState::Attack
            }
            _ => ShellState::Idle,
        };
        if next != self.state {
            self.state = next;
            self.animator.reset();
        }

        let frame_count = self.sequence().len();
        if self.animator.advance(dt.as_secs_f32(), frame_count) == AnimationStep::Wrapped
            && self.has_shot
        {
            self.cooldown.activate();
            self.has_shot = false;
        }

        if self.state == ShellState::Attack
            && self.animator.index() == SHELL_FIRE_FRAME
            && !self.has_shot
        {
            self.has_shot = true;
            return Some(PearlSpawn {
                muzzle: self.visual_box.center(),
                facing: self.facing,
            });
        }
        None
    }

    fn sequence(&self) -> &FrameSequence {
        match self.state {
            ShellState::Idle => &self.idle,
            ShellState::Attack => &self.attack,
        }
    }

    pub(crate) fn frame(&self) -> FrameHandle {
        self.sequence().frame(self.animator.index())
    }
}

/// Projectile fired by a shell. Dies when its lifetime runs out or once a hit
/// has been recorded.
#[derive(Debug, Clone)]
pub(crate) struct Pearl {
    pub(crate) id: EntityId,
    pub(crate) visual_box: Rect,
    facing: Facing,
    lifetime: Timer,
    collided: bool,
    expired: bool,
    frame: FrameHandle,
}

impl Pearl {
    pub(crate) fn new(id: EntityId, spawn: PearlSpawn, sequence: &FrameSequence) -> Self {
        let centre = Vec2::new(
            spawn.muzzle.x + PEARL_MUZZLE.x * spawn.facing.sign(),
            spawn.muzzle.y + PEARL_MUZZLE.y,
        );
        let mut lifetime = Timer::new(PEARL_LIFETIME);
        lifetime.activate();
        Self {
            id,
            visual_box: Rect::from_center(centre, sequence.size()),
            facing: spawn.facing,
            lifetime,
            collided: false,
            expired: false,
            frame: sequence.frame(0),
        }
    }

    pub(crate) fn mark_collided(&mut self) {
        self.collided = true;
    }

    pub(crate) fn is_alive(&self) -> bool {
        !self.expired && !self.collided
    }

    pub(crate) fn update(&mut self, dt: Duration) {
        if self.lifetime.update(dt) {
            self.expired = true;
        }
        if !self.is_alive() {
            return;
        }
        self.visual_box.x += PEARL_SPEED * self.facing.sign() * dt.as_secs_f32();
    }

    pub(crate) fn frame(&self) -> FrameHandle {
        self.frame
    }
}
