use std::time::Duration;

use engine::{Animator, DrawLayer, EntityId, FrameHandle, FrameSequence, Rect, Vec2};

use crate::app::settings::{CoinKind, ANIMATION_SPEED};

/// Pick-up placed by the centre of its sprite.
#[derive(Debug, Clone)]
pub(crate) struct Coin {
    pub(crate) id: EntityId,
    pub(crate) kind: CoinKind,
    pub(crate) visual_box: Rect,
    animator: Animator,
    frames: FrameSequence,
}

impl Coin {
    pub(crate) fn new(id: EntityId, kind: CoinKind, centre: Vec2, frames: FrameSequence) -> Self {
        Self {
            id,
            kind,
            visual_box: Rect::from_center(centre, frames.size()),
            animator: Animator::new(ANIMATION_SPEED),
            frames,
        }
    }

    pub(crate) fn animate(&mut self, dt: Duration) {
        self.animator.advance(dt.as_secs_f32(), self.frames.len());
    }

    pub(crate) fn frame(&self) -> FrameHandle {
        self.frames.frame(self.animator.index())
    }
}

/// One-shot effect left behind by a collected coin.
#[derive(Debug, Clone)]
pub(crate) struct Particle {
    pub(crate) visual_box: Rect,
    finished: bool,
    animator: Animator,
    frames: FrameSequence,
}

impl Particle {
    pub(crate) fn new(centre: Vec2, frames: FrameSequence) -> Self {
        Self {
            visual_box: Rect::from_center(centre, frames.size()),
            finished: false,
            animator: Animator::new(ANIMATION_SPEED),
            frames,
        }
    }

    pub(crate) fn animate(&mut self, dt: Duration) {
        if self.animator.advance_once(dt.as_secs_f32(), self.frames.len()) {
            self.finished = true;
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn frame(&self) -> FrameHandle {
        self.frames.frame(self.animator.index())
    }
}

/// Non-interactive sprite: terrain art, water, palms. Single-frame sequences
/// simply never change.
#[derive(Debug, Clone)]
pub(crate) struct Decor {
    pub(crate) visual_box: Rect,
    pub(crate) layer: DrawLayer,
    animator: Animator,
    frames: FrameSequence,
}

impl Decor {
    pub(crate) fn new(top_left: Vec2, layer: DrawLayer, frames: FrameSequence) -> Self {
        Self {
            visual_box: Rect::from_top_left(top_left, frames.size()),
            layer,
            animator: Animator::new(ANIMATION_SPEED),
            frames,
        }
    }

    pub(crate) fn animate(&mut self, dt: Duration) {
        if self.frames.len() > 1 {
            self.animator.advance(dt.as_secs_f32(), self.frames.len());
        }
    }

    pub(crate) fn frame(&self) -> FrameHandle {
        self.frames.frame(self.animator.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(count: u32) -> FrameSequence {
        FrameSequence::new(
            (0..count).map(FrameHandle::new).collect(),
            Vec2::new(32.0, 32.0),
        )
    }

    #[test]
    fn coin_is_centred_on_its_point() {
        let coin = Coin::new(EntityId(0), CoinKind::Gold, Vec2::new(96.0, 32.0), frames(4));
        assert_eq!(coin.visual_box, Rect::new(80.0, 16.0, 32.0, 32.0));
    }

    #[test]
    fn particle_finishes_after_one_pass() {
        let mut particle = Particle::new(Vec2::ZERO, frames(4));
        particle.animate(Duration::from_millis(250));
        assert!(!particle.is_finished());
        assert_eq!(particle.frame(), FrameHandle::new(2));
        particle.animate(Duration::from_millis(250));
        assert!(particle.is_finished());
    }

    #[test]
    fn static_decor_keeps_its_frame() {
        let mut decor = Decor::new(Vec2::ZERO, DrawLayer::Main, frames(1));
        decor.animate(Duration::from_secs(3));
        assert_eq!(decor.frame(), FrameHandle::new(0));
    }
}
