use engine::{DrawLayer, EntityIdAllocator, FrameLibrary, FrameSequence, Rect, Vec2};
use thiserror::Error;
use tracing::{debug, warn};

use super::enemies::{Shell, Spikes, Tooth};
use super::player::{Player, PlayerFrames};
use super::props::{Coin, Decor};
use super::world::{Collider, ColliderSource, EntityWorld};
use crate::app::editor::autotile::TerrainArt;
use crate::app::editor::grid::{CompiledGrid, GridLayer, GridPoint, WaterOrientation};
use crate::app::editor::tile_index::TileKindError;
use crate::app::settings::{descriptor, KindId, SpawnRule, TILE_SIZE_PX};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum LevelBuildError {
    #[error("the grid has no player spawn")]
    MissingPlayerSpawn,
}

/// Entities collected while walking the grid, before the player is known.
#[derive(Default)]
struct WorldDraft {
    ids: EntityIdAllocator,
    player: Option<Player>,
    colliders: Vec<Collider>,
    decor: Vec<Decor>,
    coins: Vec<Coin>,
    spikes: Vec<Spikes>,
    teeth: Vec<Tooth>,
    shells: Vec<Shell>,
}

/// Turns a baked grid into a live entity world.
pub(crate) struct LevelBuilder<'a> {
    library: &'a FrameLibrary,
}

impl<'a> LevelBuilder<'a> {
    pub(crate) fn new(library: &'a FrameLibrary) -> Self {
        Self { library }
    }

    fn frames(&self, key: &str) -> FrameSequence {
        self.library
            .get_or_placeholder(key, Vec2::new(TILE_SIZE_PX, TILE_SIZE_PX))
    }

    pub(crate) fn build(&self, grid: &CompiledGrid) -> Result<EntityWorld, LevelBuildError> {
        let mut draft = WorldDraft::default();

        for (point, art) in &grid.terrain {
            let frames = self.frames(&TerrainArt::frame_key(art));
            let decor = Decor::new(point.to_vec2(), DrawLayer::Main, frames);
            draft.colliders.push(Collider {
                rect: decor.visual_box,
                source: ColliderSource::Terrain,
            });
            draft.decor.push(decor);
        }
        for (point, orientation) in &grid.water {
            let key = match orientation {
                WaterOrientation::Top => "water/top",
                WaterOrientation::Bottom => "water/bottom",
            };
            draft
                .decor
                .push(Decor::new(point.to_vec2(), DrawLayer::Water, self.frames(key)));
        }
        for (layer, entries) in grid.tagged_layers() {
            for (point, kind) in entries {
                self.spawn(&mut draft, layer, *point, *kind);
            }
        }

        let player = draft.player.ok_or(LevelBuildError::MissingPlayerSpawn)?;
        let mut world = EntityWorld::new(
            player,
            draft.colliders,
            draft.decor,
            draft.coins,
            draft.spikes,
            draft.teeth,
            draft.shells,
            draft.ids,
            self.frames("pearl"),
            self.frames("particle"),
        );
        link_targets(&mut world);

        debug!(
            entities = world.entity_count(),
            colliders = world.colliders.len(),
            shells = world.shells.len(),
            "level_built"
        );
        Ok(world)
    }

    fn spawn(&self, draft: &mut WorldDraft, layer: GridLayer, point: GridPoint, kind: KindId) {
        let Some(entry) = descriptor(kind) else {
            let err = TileKindError::InvalidTileKind { kind };
            warn!(
                error = %err,
                layer = layer.name(),
                x = point.x,
                y = point.y,
                "grid_tag_skipped"
            );
            return;
        };
        let position = point.to_vec2();

        match entry.spawn {
            SpawnRule::Player => {
                if draft.player.is_some() {
                    warn!(x = point.x, y = point.y, "duplicate_player_spawn_ignored");
                    return;
                }
                let frames = PlayerFrames::from_library(self.library);
                draft.player = Some(Player::new(draft.ids.allocate(), position, frames));
            }
            // The horizon only anchors the editor's sky; nothing to spawn.
            SpawnRule::Horizon => {}
            SpawnRule::Coin(coin) => {
                let frames = self.frames(entry.preview);
                draft
                    .coins
                    .push(Coin::new(draft.ids.allocate(), coin, position, frames));
            }
            SpawnRule::Spikes => {
                let id = draft.ids.allocate();
                draft.spikes.push(Spikes::new(id, position, self.library));
            }
            SpawnRule::Tooth => {
                let id = draft.ids.allocate();
                draft.teeth.push(Tooth::new(id, position, self.library));
            }
            SpawnRule::Shell(facing) => {
                let shell = Shell::new(draft.ids.allocate(), position, facing, self.library);
                draft.colliders.push(Collider {
                    rect: shell.visual_box,
                    source: ColliderSource::Shell,
                });
                draft.shells.push(shell);
            }
            SpawnRule::Palm { layer, block } => {
                draft
                    .decor
                    .push(Decor::new(position, layer, self.frames(entry.preview)));
                if let Some(block) = block {
                    draft.colliders.push(Collider {
                        rect: Rect::from_top_left(position + block.offset, block.size),
                        source: ColliderSource::Block,
                    });
                }
            }
            SpawnRule::Terrain | SpawnRule::Water => {
                warn!(
                    kind = entry.name,
                    layer = layer.name(),
                    "tile_kind_in_object_layer"
                );
            }
        }
    }
}

/// Second pass: shells track the player, which may have been built after them.
fn link_targets(world: &mut EntityWorld) {
    let player_id = world.player.id;
    for shell in &mut world.shells {
        shell.target = Some(player_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::assets::build_catalog;

    fn grid_with_player() -> CompiledGrid {
        let mut grid = CompiledGrid::default();
        grid.fg_objects.insert(GridPoint::new(10, 0), KindId(0));
        grid.fg_objects.insert(GridPoint::new(500, 20), KindId(1));
        grid.terrain.insert(GridPoint::new(0, 128), "CG".to_string());
        grid.terrain.insert(GridPoint::new(64, 128), "G".to_string());
        grid
    }

    #[test]
    fn missing_player_is_rejected() {
        let library = build_catalog().expect("catalog");
        let mut grid = grid_with_player();
        grid.fg_objects.clear();
        let result = LevelBuilder::new(&library).build(&grid);
        assert_eq!(result.err(), Some(LevelBuildError::MissingPlayerSpawn));
    }

    #[test]
    fn terrain_becomes_sprites_and_colliders() {
        let library = build_catalog().expect("catalog");
        let world = LevelBuilder::new(&library)
            .build(&grid_with_player())
            .expect("build");
        assert_eq!(world.colliders.len(), 2);
        assert_eq!(world.colliders[0].rect, Rect::new(0.0, 128.0, 64.0, 64.0));
        assert_eq!(world.decor.len(), 2);
        assert_eq!(world.player.visual_box.top_left(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn water_uses_the_water_layer() {
        let library = build_catalog().expect("catalog");
        let mut grid = grid_with_player();
        grid.water.insert(GridPoint::new(128, 64), WaterOrientation::Top);
        grid.water.insert(GridPoint::new(128, 128), WaterOrientation::Bottom);
        let world = LevelBuilder::new(&library).build(&grid).expect("build");
        let water: Vec<_> = world
            .decor
            .iter()
            .filter(|decor| decor.layer == DrawLayer::Water)
            .collect();
        assert_eq!(water.len(), 2);
        assert_ne!(water[0].frame(), water[1].frame());
    }

    #[test]
    fn shells_are_solid_and_linked_to_the_player() {
        let library = build_catalog().expect("catalog");
        let mut grid = grid_with_player();
        grid.enemies.insert(GridPoint::new(256, 64), KindId(9));
        grid.enemies.insert(GridPoint::new(320, 64), KindId(10));
        let world = LevelBuilder::new(&library).build(&grid).expect("build");

        assert_eq!(world.shells.len(), 2);
        assert!(world
            .shells
            .iter()
            .all(|shell| shell.target == Some(world.player.id)));
        let shell_colliders = world
            .colliders
            .iter()
            .filter(|c| c.source == ColliderSource::Shell)
            .count();
        assert_eq!(shell_colliders, 2);
    }

    #[test]
    fn palms_add_blocks_and_respect_their_plane() {
        let library = build_catalog().expect("catalog");
        let mut grid = grid_with_player();
        grid.fg_objects.insert(GridPoint::new(300, 30), KindId(14));
        grid.fg_objects.insert(GridPoint::new(400, 30), KindId(11));
        grid.bg_palms.insert(GridPoint::new(600, 30), KindId(15));
        let world = LevelBuilder::new(&library).build(&grid).expect("build");

        let blocks: Vec<Rect> = world
            .colliders
            .iter()
            .filter(|c| c.source == ColliderSource::Block)
            .map(|c| c.rect)
            .collect();
        assert_eq!(
            blocks,
            vec![
                Rect::new(350.0, 30.0, 76.0, 50.0),
                Rect::new(400.0, 30.0, 76.0, 50.0),
            ]
        );
        assert_eq!(
            world
                .decor
                .iter()
                .filter(|decor| decor.layer == DrawLayer::Background)
                .count(),
            1
        );
    }

    #[test]
    fn coins_are_centred_and_unknown_tags_skipped() {
        let library = build_catalog().expect("catalog");
        let mut grid = grid_with_player();
        grid.coins.insert(GridPoint::new(96, 32), KindId(4));
        grid.coins.insert(GridPoint::new(160, 32), KindId(99));
        let world = LevelBuilder::new(&library).build(&grid).expect("build");

        assert_eq!(world.coins.len(), 1);
        assert_eq!(world.coins[0].visual_box.center(), Vec2::new(96.0, 32.0));
    }
}
