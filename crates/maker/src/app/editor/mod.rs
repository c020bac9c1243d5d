pub(crate) mod autotile;
pub(crate) mod cell;
pub(crate) mod compiler;
pub(crate) mod grid;
pub(crate) mod objects;
pub(crate) mod tile_index;

use std::rc::Rc;
use std::time::Duration;

use engine::{
    Animator, DrawLayer, FrameHandle, FrameLibrary, InputAction, InputSnapshot, KeyPress,
    MouseButton, Rect, RenderableDesc, Scene, SceneCommand, SceneKey, Timer, Vec2,
};
use tracing::{debug, info, warn};

use self::autotile::{recompute_cluster, TerrainArt, FALLBACK_TERRAIN_KEY};
use self::cell::CellCoord;
use self::compiler::{bake, CompileError};
use self::grid::CompiledGrid;
use self::objects::ObjectRegistry;
use self::tile_index::{CanvasTile, TileIndex};
use super::assets::preview_size;
use super::settings::{
    descriptor, style_of, KindId, KindStyle, ANIMATION_SPEED, KIND_TABLE,
    OBJECT_PLACE_DEBOUNCE, PALETTE_FIRST, PALETTE_LAST, PLAYER_SPAWN_CENTER,
    SCENE_SWITCH_DEBOUNCE, SCROLL_STEP_PX, SKY_ANCHOR_CENTER, TILE_SIZE_PX,
};

const WATER_TOP_KEY: &str = "water/top";
const WATER_BOTTOM_KEY: &str = "water/bottom";
const WATER: KindId = KindId(3);

/// Canvas editing scene: paints tiles, places objects, pans, and bakes the
/// canvas into a [`CompiledGrid`] on commit.
pub(crate) struct EditorScene {
    library: Rc<FrameLibrary>,
    terrain_art: TerrainArt,
    index: TileIndex,
    objects: ObjectRegistry,
    origin: Vec2,
    /// Pointer minus origin, captured when a middle-button pan starts.
    pan_grip: Option<Vec2>,
    selection: KindId,
    last_painted_cell: Option<CellCoord>,
    object_timer: Timer,
    switch_timer: Timer,
    /// One shared animation cursor per kind, indexed by kind id.
    kind_animators: Vec<Animator>,
}

impl EditorScene {
    pub(crate) fn new(library: Rc<FrameLibrary>) -> Self {
        let terrain_art = TerrainArt::from_library(&library);
        let mut scene = Self {
            library,
            terrain_art,
            index: TileIndex::default(),
            objects: ObjectRegistry::default(),
            origin: Vec2::ZERO,
            pan_grip: None,
            selection: PALETTE_FIRST,
            last_painted_cell: None,
            object_timer: Timer::new(OBJECT_PLACE_DEBOUNCE),
            switch_timer: Timer::new(SCENE_SWITCH_DEBOUNCE),
            kind_animators: vec![Animator::new(ANIMATION_SPEED); KIND_TABLE.len()],
        };
        scene.place_centered(KindId(0), PLAYER_SPAWN_CENTER);
        scene.place_centered(KindId(1), SKY_ANCHOR_CENTER);
        scene
    }

    fn place_centered(&mut self, kind: KindId, center: Vec2) {
        let size = self.kind_size(kind);
        let top_left = center - size * 0.5;
        match self.objects.place(kind, top_left, size, self.origin) {
            Ok(id) => debug!(kind = %kind, object = id.0, "object_placed"),
            Err(err) => debug!(error = %err, "object_place_refused"),
        }
    }

    fn kind_size(&self, kind: KindId) -> Vec2 {
        descriptor(kind)
            .map(|entry| preview_size(&self.library, entry.preview))
            .unwrap_or(Vec2::new(TILE_SIZE_PX, TILE_SIZE_PX))
    }

    fn compile(&mut self) -> Result<CompiledGrid, CompileError> {
        let grid = bake(&self.index, &self.objects, &self.terrain_art)?;
        info!(
            cells = self.index.len(),
            objects = self.objects.len(),
            entries = grid.entry_count(),
            "level_committed"
        );
        Ok(grid)
    }

    fn apply_pan(&mut self, input: &InputSnapshot) {
        let middle = input.button(MouseButton::Middle);
        if middle.pressed {
            if let Some(pointer) = input.pointer_px() {
                self.pan_grip = Some(pointer - self.origin);
            }
        }
        if !middle.down {
            self.pan_grip = None;
        }

        let scroll = input.scroll_steps();
        if scroll != 0.0 {
            if input.is_down(InputAction::PanModifier) {
                self.origin.y -= scroll * SCROLL_STEP_PX;
            } else {
                self.origin.x -= scroll * SCROLL_STEP_PX;
            }
            self.objects.pan(self.origin);
        }

        if let (Some(grip), Some(pointer)) = (self.pan_grip, input.pointer_px()) {
            self.origin = pointer - grip;
            self.objects.pan(self.origin);
        }
    }

    fn apply_selection(&mut self, input: &InputSnapshot) {
        let mut next = self.selection.0;
        if input.key_pressed(KeyPress::Right) {
            next = next.saturating_add(1);
        }
        if input.key_pressed(KeyPress::Left) {
            next = next.saturating_sub(1);
        }
        if let Some(pick) = input.palette_pick() {
            next = pick;
        }
        let next = KindId(next.clamp(PALETTE_FIRST.0, PALETTE_LAST.0));
        if next != self.selection {
            self.selection = next;
            self.last_painted_cell = None;
            debug!(selection = %next, "selection_changed");
        }
    }

    fn apply_drag(&mut self, input: &InputSnapshot, pointer: Vec2) {
        let left = input.button(MouseButton::Left);
        if left.pressed && !input.pointer_over_menu() {
            if let Some(id) = self.objects.object_at(pointer) {
                self.objects.begin_drag(id, pointer);
            }
        }
        if left.released {
            if let Some(id) = self.objects.end_drag(self.origin) {
                debug!(object = id.0, "object_dropped");
            }
        }
        self.objects.drag_to(pointer);
    }

    fn paint(&mut self, input: &InputSnapshot, pointer: Vec2) {
        if !input.button(MouseButton::Left).down
            || input.pointer_over_menu()
            || self.objects.dragging().is_some()
        {
            return;
        }
        let Some(style) = style_of(self.selection) else {
            return;
        };

        if style.is_tile() {
            let cell = CellCoord::from_pixel(pointer, self.origin);
            if self.last_painted_cell == Some(cell) {
                return;
            }
            match self.index.upsert(cell, self.selection, Vec2::ZERO) {
                Ok(()) => recompute_cluster(&mut self.index, cell),
                Err(err) => warn!(error = %err, "tile_paint_skipped"),
            }
            self.last_painted_cell = Some(cell);
        } else if !self.object_timer.is_active() {
            self.place_centered(self.selection, pointer);
            self.object_timer.activate();
        }
    }

    fn erase(&mut self, input: &InputSnapshot, pointer: Vec2) {
        if !input.button(MouseButton::Right).down || input.pointer_over_menu() {
            return;
        }

        if let Some(id) = self.objects.object_at(pointer) {
            match self.objects.delete(id) {
                Ok(Some(removed)) => debug!(kind = %removed.kind, "object_deleted"),
                Ok(None) => {}
                Err(err) => debug!(error = %err, "object_delete_refused"),
            }
        }

        let cell = CellCoord::from_pixel(pointer, self.origin);
        if !self.index.contains(cell) {
            return;
        }
        match self.index.remove(cell, self.selection) {
            Ok(evicted) => {
                recompute_cluster(&mut self.index, cell);
                if evicted {
                    debug!(x = cell.x, y = cell.y, "tile_evicted");
                }
            }
            Err(err) => debug!(error = %err, "tile_erase_skipped"),
        }
    }

    fn animate(&mut self, dt_seconds: f32) {
        for (entry, animator) in KIND_TABLE.iter().zip(self.kind_animators.iter_mut()) {
            animator.advance(dt_seconds, frame_count(&self.library, entry.preview));
        }
        let library = &self.library;
        self.objects.animate(dt_seconds, |kind| {
            descriptor(kind).map_or(1, |entry| frame_count(library, entry.preview))
        });
    }

    fn frame(&self, key: &str, index: usize) -> (FrameHandle, Vec2) {
        match self.library.get(key) {
            Some(sequence) => (sequence.frame(index), sequence.size()),
            None => (
                FrameHandle::PLACEHOLDER,
                Vec2::new(TILE_SIZE_PX, TILE_SIZE_PX),
            ),
        }
    }

    fn kind_frame_index(&self, kind: KindId) -> usize {
        self.kind_animators
            .get(usize::from(kind.0))
            .map_or(0, Animator::index)
    }

    fn tile_renderables(&self, cell: CellCoord, tile: &CanvasTile, out: &mut Vec<RenderableDesc>) {
        let top_left = cell.to_pixel(self.origin);
        let tile_box = Rect::from_top_left(top_left, Vec2::new(TILE_SIZE_PX, TILE_SIZE_PX));

        if tile.has_water {
            let (frame, _) = if tile.water_above {
                self.frame(WATER_BOTTOM_KEY, 0)
            } else {
                self.frame(WATER_TOP_KEY, self.kind_frame_index(WATER))
            };
            out.push(RenderableDesc::new(frame, tile_box, DrawLayer::Water));
        }
        if tile.has_terrain {
            let art = self
                .terrain_art
                .lookup(tile.terrain_mask)
                .unwrap_or_else(|| FALLBACK_TERRAIN_KEY.to_string());
            let (frame, _) = self.frame(&TerrainArt::frame_key(&art), 0);
            out.push(RenderableDesc::new(frame, tile_box, DrawLayer::Main));
        }
        if let Some(coin) = tile.coin {
            let kind = coin.kind_id();
            if let Some(entry) = descriptor(kind) {
                let (frame, size) = self.frame(entry.preview, self.kind_frame_index(kind));
                let centre = tile_box.center();
                out.push(RenderableDesc::new(
                    frame,
                    Rect::from_center(centre, size),
                    DrawLayer::Main,
                ));
            }
        }
        if let Some(enemy) = tile.enemy {
            let kind = enemy.kind_id();
            if let Some(entry) = descriptor(kind) {
                let (frame, size) = self.frame(entry.preview, self.kind_frame_index(kind));
                let mid_bottom = Vec2::new(tile_box.center().x, tile_box.bottom());
                out.push(RenderableDesc::new(
                    frame,
                    Rect::from_mid_bottom(mid_bottom, size),
                    DrawLayer::Main,
                ));
            }
        }
    }
}

fn frame_count(library: &FrameLibrary, key: &str) -> usize {
    library.get(key).map_or(1, |sequence| sequence.len())
}

impl Scene<CompiledGrid> for EditorScene {
    fn load(&mut self, payload: Option<CompiledGrid>) {
        if payload.is_some() {
            debug!("editor_ignores_payload");
        }
        info!(
            terrain_art = self.terrain_art.len(),
            cells = self.index.len(),
            objects = self.objects.len(),
            "editor_ready"
        );
    }

    fn update(&mut self, dt: Duration, input: &InputSnapshot) -> SceneCommand<CompiledGrid> {
        self.object_timer.update(dt);
        self.switch_timer.update(dt);

        if input.key_pressed(KeyPress::Commit) && !self.switch_timer.is_active() {
            self.switch_timer.activate();
            match self.compile() {
                Ok(grid) => {
                    return SceneCommand::SwitchTo {
                        scene: SceneKey::Level,
                        payload: Some(grid),
                    };
                }
                Err(err) => warn!(error = %err, "level_commit_rejected"),
            }
        }

        self.apply_pan(input);
        self.apply_selection(input);
        if let Some(pointer) = input.pointer_px() {
            self.apply_drag(input, pointer);
            self.paint(input, pointer);
            self.erase(input, pointer);
        }
        if input.button(MouseButton::Left).released {
            self.last_painted_cell = None;
        }

        self.animate(dt.as_secs_f32());
        SceneCommand::None
    }

    fn renderables(&self) -> Vec<RenderableDesc> {
        let mut out = Vec::with_capacity(self.index.len() + self.objects.len());
        for (cell, tile) in self.index.iter() {
            self.tile_renderables(cell, tile, &mut out);
        }
        for object in self.objects.iter() {
            let Some(entry) = descriptor(object.kind) else {
                continue;
            };
            let layer = match entry.style {
                KindStyle::Sky | KindStyle::Palm { background: true } => DrawLayer::Background,
                _ => DrawLayer::Main,
            };
            let (frame, _) = self.frame(entry.preview, object.animator.index());
            out.push(RenderableDesc::new(frame, object.visual_box, layer));
        }
        out
    }

    fn unload(&mut self) {
        debug!(
            cells = self.index.len(),
            objects = self.objects.len(),
            "editor_unloaded"
        );
    }

    fn entity_count(&self) -> usize {
        self.index.len() + self.objects.len()
    }

    fn debug_title(&self) -> Option<String> {
        let name = descriptor(self.selection).map_or("?", |entry| entry.name);
        Some(format!(
            "editor | {name} | origin ({:.0}, {:.0}) | cells {} | objects {}",
            self.origin.x,
            self.origin.y,
            self.index.len(),
            self.objects.len()
        ))
    }
}
