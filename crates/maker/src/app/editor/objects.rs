use engine::{Animator, EntityId, EntityIdAllocator, Rect, Vec2};
use thiserror::Error;

use crate::app::settings::{style_of, KindId, ANIMATION_SPEED};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum PlaceError {
    #[error("kind {kind} is not a placeable object")]
    NotAnObject { kind: KindId },
    #[error("kind {kind} is a singleton and is already on the canvas")]
    SingletonExists { kind: KindId },
    #[error("kind {kind} is protected and cannot be deleted")]
    Protected { kind: KindId },
}

/// Free-floating object on the canvas. Its ground truth is the offset from
/// the pannable origin; the screen box is derived from it.
#[derive(Debug, Clone)]
pub(crate) struct CanvasObject {
    pub(crate) id: EntityId,
    pub(crate) kind: KindId,
    pub(crate) visual_box: Rect,
    pub(crate) offset_from_origin: Vec2,
    /// Pointer minus top-left, captured when a drag begins.
    drag_grip: Option<Vec2>,
    pub(crate) animator: Animator,
}

impl CanvasObject {
    pub(crate) fn position(&self) -> Vec2 {
        self.visual_box.top_left()
    }

    pub(crate) fn is_selected_for_drag(&self) -> bool {
        self.drag_grip.is_some()
    }

    pub(crate) fn is_protected(&self) -> bool {
        style_of(self.kind).is_some_and(|style| style.is_protected())
    }
}

#[derive(Debug, Default)]
pub(crate) struct ObjectRegistry {
    objects: Vec<CanvasObject>,
    ids: EntityIdAllocator,
}

impl ObjectRegistry {
    pub(crate) fn len(&self) -> usize {
        self.objects.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &CanvasObject> + '_ {
        self.objects.iter()
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&CanvasObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    /// Places `kind` with its top-left at `position`.
    pub(crate) fn place(
        &mut self,
        kind: KindId,
        position: Vec2,
        size: Vec2,
        origin: Vec2,
    ) -> Result<EntityId, PlaceError> {
        let style = style_of(kind)
            .filter(|style| !style.is_tile())
            .ok_or(PlaceError::NotAnObject { kind })?;
        if style.is_protected() && self.objects.iter().any(|object| object.kind == kind) {
            return Err(PlaceError::SingletonExists { kind });
        }

        let id = self.ids.allocate();
        self.objects.push(CanvasObject {
            id,
            kind,
            visual_box: Rect::from_top_left(position, size),
            offset_from_origin: position - origin,
            drag_grip: None,
            animator: Animator::new(ANIMATION_SPEED),
        });
        Ok(id)
    }

    pub(crate) fn delete(&mut self, id: EntityId) -> Result<Option<CanvasObject>, PlaceError> {
        let Some(slot) = self.objects.iter().position(|object| object.id == id) else {
            return Ok(None);
        };
        if self.objects[slot].is_protected() {
            return Err(PlaceError::Protected {
                kind: self.objects[slot].kind,
            });
        }
        Ok(Some(self.objects.remove(slot)))
    }

    /// Topmost object whose box contains `point`; later placements draw on top.
    pub(crate) fn object_at(&self, point: Vec2) -> Option<EntityId> {
        self.objects
            .iter()
            .rev()
            .find(|object| object.visual_box.contains_point(point))
            .map(|object| object.id)
    }

    pub(crate) fn dragging(&self) -> Option<EntityId> {
        self.objects
            .iter()
            .find(|object| object.is_selected_for_drag())
            .map(|object| object.id)
    }

    pub(crate) fn begin_drag(&mut self, id: EntityId, pointer: Vec2) -> bool {
        let Some(object) = self.objects.iter_mut().find(|object| object.id == id) else {
            return false;
        };
        object.drag_grip = Some(pointer - object.position());
        true
    }

    pub(crate) fn drag_to(&mut self, pointer: Vec2) {
        for object in &mut self.objects {
            if let Some(grip) = object.drag_grip {
                object.visual_box.set_top_left(pointer - grip);
            }
        }
    }

    /// Drops the dragged object and re-anchors it against `origin`.
    pub(crate) fn end_drag(&mut self, origin: Vec2) -> Option<EntityId> {
        let object = self
            .objects
            .iter_mut()
            .find(|object| object.is_selected_for_drag())?;
        object.drag_grip = None;
        object.offset_from_origin = object.position() - origin;
        Some(object.id)
    }

    /// Moves every object that is not being dragged so it keeps its offset
    /// from the new `origin`.
    pub(crate) fn pan(&mut self, origin: Vec2) {
        for object in &mut self.objects {
            if !object.is_selected_for_drag() {
                object.visual_box.set_top_left(origin + object.offset_from_origin);
            }
        }
    }

    pub(crate) fn animate(&mut self, dt_seconds: f32, frame_count: impl Fn(KindId) -> usize) {
        for object in &mut self.objects {
            let count = frame_count(object.kind);
            object.animator.advance(dt_seconds, count);
        }
    }
}
