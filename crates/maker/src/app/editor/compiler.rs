use thiserror::Error;
use tracing::{debug, enabled, warn, Level};

use super::autotile::TerrainArt;
use super::cell::CellCoord;
use super::grid::{CompiledGrid, GridLayer, GridPoint, WaterOrientation};
use super::objects::ObjectRegistry;
use super::tile_index::TileIndex;
use crate::app::settings::{style_of, KindStyle, TILE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum CompileError {
    #[error("the canvas has no occupied cells")]
    EmptyLevel,
}

/// Bakes the canvas into a level grid shifted so the top-left occupied cell
/// sits at (0, 0).
///
/// Objects are attached to the cells they currently sit in on a copy of the
/// canvas; the canvas itself is left as painted.
pub(crate) fn bake(
    canvas: &TileIndex,
    objects: &ObjectRegistry,
    terrain_art: &TerrainArt,
) -> Result<CompiledGrid, CompileError> {
    let mut index = canvas.clone();
    attach_objects(&mut index, objects);
    if index.is_empty() {
        return Err(CompileError::EmptyLevel);
    }

    let (left, top) = index
        .iter()
        .fold(None, |bounds: Option<(i32, i32)>, (cell, _)| {
            Some(match bounds {
                Some((left, top)) => (left.min(cell.x), top.min(cell.y)),
                None => (cell.x, cell.y),
            })
        })
        .ok_or(CompileError::EmptyLevel)?;

    let mut grid = CompiledGrid::default();
    let half_tile = TILE_SIZE / 2;
    for (cell, tile) in index.iter() {
        let x = (cell.x - left) * TILE_SIZE;
        let y = (cell.y - top) * TILE_SIZE;
        let point = GridPoint::new(x, y);

        if tile.has_water {
            let orientation = if tile.water_above {
                WaterOrientation::Bottom
            } else {
                WaterOrientation::Top
            };
            grid.water.insert(point, orientation);
        }
        if tile.has_terrain {
            grid.terrain
                .insert(point, terrain_art.resolve(tile.terrain_mask));
        }
        if let Some(coin) = tile.coin {
            grid.coins
                .insert(GridPoint::new(x + half_tile, y + half_tile), coin.kind_id());
        }
        if let Some(enemy) = tile.enemy {
            grid.enemies.insert(point, enemy.kind_id());
        }
        for (kind, offset) in &tile.attached_objects {
            let placed = GridPoint::new(
                x + offset.x.floor() as i32,
                y + offset.y.floor() as i32,
            );
            match style_of(*kind) {
                Some(KindStyle::Palm { background: true }) => {
                    grid.bg_palms.insert(placed, *kind);
                }
                _ => {
                    grid.fg_objects.insert(placed, *kind);
                }
            }
        }
    }

    debug!(
        cells = index.len(),
        terrain = grid.layer_len(GridLayer::Terrain),
        water = grid.layer_len(GridLayer::Water),
        enemies = grid.layer_len(GridLayer::Enemies),
        coins = grid.layer_len(GridLayer::Coins),
        fg_objects = grid.layer_len(GridLayer::FgObjects),
        bg_palms = grid.layer_len(GridLayer::BgPalms),
        "grid_baked"
    );
    if enabled!(Level::DEBUG) {
        match grid.to_debug_json() {
            Ok(dump) => debug!(grid = %dump, "grid_dump"),
            Err(err) => warn!(error = %err, "grid_dump_failed"),
        }
    }
    Ok(grid)
}

fn attach_objects(index: &mut TileIndex, objects: &ObjectRegistry) {
    for object in objects.iter() {
        let cell = CellCoord::containing(object.offset_from_origin);
        let in_cell = object.offset_from_origin - cell.top_left_offset();
        if let Err(err) = index.upsert(cell, object.kind, in_cell) {
            warn!(error = %err, object = object.id.0, "object_attach_skipped");
        }
    }
}
