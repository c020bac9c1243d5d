use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use super::Vec2;
use crate::frame_keys::{validate_frame_key, FrameKeyError};

/// Opaque reference to a pre-loaded image, resolved by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FrameHandle {
    pub image: u32,
    pub flip_x: bool,
}

impl FrameHandle {
    pub const PLACEHOLDER: Self = Self {
        image: u32::MAX,
        flip_x: false,
    };

    pub const fn new(image: u32) -> Self {
        Self {
            image,
            flip_x: false,
        }
    }

    pub fn mirrored(self) -> Self {
        Self {
            image: self.image,
            flip_x: !self.flip_x,
        }
    }
}

/// Ordered animation frames sharing one pixel size. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    frames: Vec<FrameHandle>,
    size: Vec2,
}

impl FrameSequence {
    pub fn new(frames: Vec<FrameHandle>, size: Vec2) -> Self {
        let frames = if frames.is_empty() {
            vec![FrameHandle::PLACEHOLDER]
        } else {
            frames
        };
        Self { frames, size }
    }

    pub fn single(frame: FrameHandle, size: Vec2) -> Self {
        Self::new(vec![frame], size)
    }

    pub fn placeholder(size: Vec2) -> Self {
        Self::single(FrameHandle::PLACEHOLDER, size)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Frame at `index`, clamped to the last frame.
    pub fn frame(&self, index: usize) -> FrameHandle {
        let last = self.frames.len().saturating_sub(1);
        self.frames
            .get(index.min(last))
            .copied()
            .unwrap_or(FrameHandle::PLACEHOLDER)
    }

    /// Horizontally flipped copy; the source sequence is left untouched.
    pub fn mirrored(&self) -> Self {
        Self {
            frames: self.frames.iter().map(|frame| frame.mirrored()).collect(),
            size: self.size,
        }
    }
}

/// Pre-loaded frame sequences keyed by kind, orientation and animation name.
#[derive(Debug, Clone, Default)]
pub struct FrameLibrary {
    sequences: HashMap<String, FrameSequence>,
}

impl FrameLibrary {
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        sequence: FrameSequence,
    ) -> Result<(), FrameKeyError> {
        let key = key.into();
        validate_frame_key(&key)?;
        self.sequences.insert(key, sequence);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&FrameSequence> {
        self.sequences.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sequences.contains_key(key)
    }

    /// Looks up `key`, substituting a tile-sized placeholder when it is missing.
    pub fn get_or_placeholder(&self, key: &str, fallback_size: Vec2) -> FrameSequence {
        match self.sequences.get(key) {
            Some(sequence) => sequence.clone(),
            None => {
                warn!(key, "frame_sequence_missing");
                FrameSequence::placeholder(fallback_size)
            }
        }
    }

    /// Key suffixes registered under `prefix/`, e.g. every auto-tile art name.
    pub fn names_under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.sequences.keys().filter_map(move |key| {
            key.strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('/'))
        })
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStep {
    Continuing,
    Wrapped,
}

/// Fractional frame cursor advanced by `speed` frames per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animator {
    frame_index: f32,
    speed: f32,
}

impl Animator {
    pub const fn new(speed: f32) -> Self {
        Self {
            frame_index: 0.0,
            speed,
        }
    }

    pub fn index(&self) -> usize {
        self.frame_index.max(0.0) as usize
    }

    pub fn reset(&mut self) {
        self.frame_index = 0.0;
    }

    /// Looping playback: the cursor snaps back to frame zero once it runs past
    /// the last frame.
    pub fn advance(&mut self, dt_seconds: f32, frame_count: usize) -> AnimationStep {
        self.frame_index += self.speed * dt_seconds;
        if self.frame_index >= frame_count as f32 {
            self.frame_index = 0.0;
            return AnimationStep::Wrapped;
        }
        AnimationStep::Continuing
    }

    /// One-shot playback. Returns `true` once the cursor has run past the last
    /// frame; the cursor is not wrapped.
    pub fn advance_once(&mut self, dt_seconds: f32, frame_count: usize) -> bool {
        self.frame_index += self.speed * dt_seconds;
        self.frame_index >= frame_count as f32
    }
}
