pub(crate) mod enemies;
pub(crate) mod factory;
pub(crate) mod player;
pub(crate) mod props;
pub(crate) mod world;

use std::rc::Rc;
use std::time::Duration;

use engine::{
    FrameLibrary, InputSnapshot, KeyPress, RenderableDesc, Scene, SceneCommand, SceneKey, Timer,
    Vec2,
};
use serde::Serialize;
use tracing::{error, info, warn};

use self::factory::LevelBuilder;
use self::world::EntityWorld;
use super::editor::grid::CompiledGrid;
use super::settings::{CoinKind, SCENE_SWITCH_DEBOUNCE, WINDOW_HEIGHT, WINDOW_WIDTH};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub(crate) struct CoinTally {
    pub(crate) gold: u32,
    pub(crate) silver: u32,
    pub(crate) diamond: u32,
}

impl CoinTally {
    fn add(&mut self, kind: CoinKind) {
        let slot = match kind {
            CoinKind::Gold => &mut self.gold,
            CoinKind::Silver => &mut self.silver,
            CoinKind::Diamond => &mut self.diamond,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Snapshot logged when a play session ends.
#[derive(Debug, Clone, Serialize)]
struct PlaySummary {
    elapsed_ms: u64,
    coins: CoinTally,
    hits_taken: u32,
    pearls_fired: u32,
    player_state: Option<player::PlayerState>,
}

/// Platformer scene built from the grid the editor hands over. Rebuilt from
/// scratch on every entry.
pub(crate) struct LevelScene {
    library: Rc<FrameLibrary>,
    world: Option<EntityWorld>,
    switch_timer: Timer,
    coins: CoinTally,
    hits_taken: u32,
    pearls_fired: u32,
    elapsed: Duration,
}

impl LevelScene {
    pub(crate) fn new(library: Rc<FrameLibrary>) -> Self {
        Self {
            library,
            world: None,
            switch_timer: Timer::new(SCENE_SWITCH_DEBOUNCE),
            coins: CoinTally::default(),
            hits_taken: 0,
            pearls_fired: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Screen-space shift that keeps the player centred in the window.
    fn camera_offset(&self) -> Vec2 {
        self.world.as_ref().map_or(Vec2::ZERO, |world| {
            world.player.visual_box.center()
                - Vec2::new(WINDOW_WIDTH / 2.0, WINDOW_HEIGHT / 2.0)
        })
    }

    fn summary(&self) -> PlaySummary {
        PlaySummary {
            elapsed_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
            coins: self.coins,
            hits_taken: self.hits_taken,
            pearls_fired: self.pearls_fired,
            player_state: self.world.as_ref().map(|world| world.player.state),
        }
    }

    fn back_to_editor() -> SceneCommand<CompiledGrid> {
        SceneCommand::SwitchTo {
            scene: SceneKey::Editor,
            payload: None,
        }
    }
}

impl Scene<CompiledGrid> for LevelScene {
    fn load(&mut self, payload: Option<CompiledGrid>) {
        self.switch_timer.deactivate();
        self.coins = CoinTally::default();
        self.hits_taken = 0;
        self.pearls_fired = 0;
        self.elapsed = Duration::ZERO;

        let Some(grid) = payload else {
            warn!("level_loaded_without_grid");
            return;
        };
        match LevelBuilder::new(&self.library).build(&grid) {
            Ok(world) => {
                info!(
                    entities = world.entity_count(),
                    grid_entries = grid.entry_count(),
                    "level_ready"
                );
                self.world = Some(world);
            }
            Err(err) => error!(error = %err, "level_build_failed"),
        }
    }

    fn update(&mut self, dt: Duration, input: &InputSnapshot) -> SceneCommand<CompiledGrid> {
        self.switch_timer.update(dt);
        let Some(world) = self.world.as_mut() else {
            return Self::back_to_editor();
        };

        if input.key_pressed(KeyPress::Back) && !self.switch_timer.is_active() {
            self.switch_timer.activate();
            return Self::back_to_editor();
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        let report = world.tick(dt, input);
        for kind in &report.coins_collected {
            self.coins.add(*kind);
        }
        self.hits_taken = self.hits_taken.saturating_add(report.hits_taken);
        self.pearls_fired = self.pearls_fired.saturating_add(report.pearls_fired);
        SceneCommand::None
    }

    fn renderables(&self) -> Vec<RenderableDesc> {
        self.world
            .as_ref()
            .map(|world| world.renderables(self.camera_offset()))
            .unwrap_or_default()
    }

    fn unload(&mut self) {
        match serde_json::to_string(&self.summary()) {
            Ok(summary) => info!(summary = %summary, "level_session_ended"),
            Err(err) => warn!(error = %err, "level_summary_failed"),
        }
        self.world = None;
    }

    fn retain_on_exit(&self) -> bool {
        false
    }

    fn entity_count(&self) -> usize {
        self.world.as_ref().map_or(0, EntityWorld::entity_count)
    }

    fn debug_title(&self) -> Option<String> {
        let world = self.world.as_ref()?;
        Some(format!(
            "level | {} | coins {}/{}/{} | hits {}",
            world.player.state.as_str(),
            self.coins.gold,
            self.coins.silver,
            self.coins.diamond,
            self.hits_taken
        ))
    }
}

#[cfg(test)]
mod tests {
    use engine::InputAction;
    use serde_json::json;

    use super::*;
    use crate::app::assets::build_catalog;
    use crate::app::editor::grid::GridPoint;
    use crate::app::settings::KindId;

    const TICK: Duration = Duration::from_nanos(16_666_667);

    fn sample_grid() -> CompiledGrid {
        let mut grid = CompiledGrid::default();
        grid.fg_objects.insert(GridPoint::new(32, 8), KindId(0));
        for x in 0..12 {
            grid.terrain.insert(GridPoint::new(x * 64, 128), "X".to_string());
        }
        grid.coins.insert(GridPoint::new(352, 96), KindId(5));
        grid
    }

    fn loaded_scene() -> LevelScene {
        let library = Rc::new(build_catalog().expect("catalog"));
        let mut scene = LevelScene::new(library);
        scene.load(Some(sample_grid()));
        scene
    }

    #[test]
    fn loads_a_world_from_the_grid() {
        let scene = loaded_scene();
        assert_eq!(scene.entity_count(), 1 + 12 + 1);
        assert!(!scene.retain_on_exit());
        assert_eq!(
            scene.debug_title().as_deref(),
            Some("level | idle | coins 0/0/0 | hits 0")
        );
    }

    #[test]
    fn grid_without_player_bounces_back_to_the_editor() {
        let library = Rc::new(build_catalog().expect("catalog"));
        let mut scene = LevelScene::new(library);
        let mut grid = sample_grid();
        grid.fg_objects.clear();
        scene.load(Some(grid));
        assert_eq!(scene.entity_count(), 0);
        assert_eq!(
            scene.update(TICK, &InputSnapshot::empty()),
            SceneCommand::SwitchTo {
                scene: SceneKey::Editor,
                payload: None
            }
        );
    }

    #[test]
    fn escape_returns_to_the_editor() {
        let mut scene = loaded_scene();
        let back = InputSnapshot::empty().with_key_pressed(KeyPress::Back);
        let command = scene.update(TICK, &back);
        assert_eq!(
            command,
            SceneCommand::SwitchTo {
                scene: SceneKey::Editor,
                payload: None
            }
        );
    }

    #[test]
    fn running_right_collects_the_coin() {
        let mut scene = loaded_scene();
        let run = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        for _ in 0..90 {
            assert_eq!(scene.update(TICK, &run), SceneCommand::None);
        }
        assert_eq!(
            scene.coins,
            CoinTally {
                gold: 0,
                silver: 1,
                diamond: 0
            }
        );
    }

    #[test]
    fn camera_centres_the_player() {
        let scene = loaded_scene();
        let renderables = scene.renderables();
        let player = renderables.last().expect("player");
        assert_eq!(player.visual_box.center(), Vec2::new(640.0, 360.0));
    }

    #[test]
    fn summary_serializes_the_session() {
        let mut scene = loaded_scene();
        scene.update(TICK, &InputSnapshot::empty());
        let value = serde_json::to_value(scene.summary()).expect("summary");
        assert_eq!(value["coins"], json!({ "gold": 0, "silver": 0, "diamond": 0 }));
        assert_eq!(value["hits_taken"], json!(0));
        assert_eq!(value["player_state"], json!("idle"));
    }

    #[test]
    fn unload_drops_the_world() {
        let mut scene = loaded_scene();
        scene.unload();
        assert_eq!(scene.entity_count(), 0);
        assert!(scene.renderables().is_empty());
    }
}
