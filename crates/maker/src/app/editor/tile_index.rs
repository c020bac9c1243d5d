use std::collections::HashMap;

use engine::Vec2;
use thiserror::Error;

use super::autotile::NeighbourMask;
use super::cell::CellCoord;
use crate::app::settings::{style_of, CoinKind, EnemyKind, KindId, KindStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum TileKindError {
    #[error("kind {kind} cannot be stored on or removed from a canvas tile")]
    InvalidTileKind { kind: KindId },
}

/// Everything painted into one canvas cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CanvasTile {
    pub(crate) has_terrain: bool,
    pub(crate) terrain_mask: NeighbourMask,
    pub(crate) has_water: bool,
    pub(crate) water_above: bool,
    pub(crate) coin: Option<CoinKind>,
    pub(crate) enemy: Option<EnemyKind>,
    /// Objects hosted by this cell with their pixel offset inside it, in
    /// paint order.
    pub(crate) attached_objects: Vec<(KindId, Vec2)>,
}

impl CanvasTile {
    pub(crate) fn is_empty(&self) -> bool {
        !self.has_terrain
            && !self.has_water
            && self.coin.is_none()
            && self.enemy.is_none()
            && self.attached_objects.is_empty()
    }

    fn add(&mut self, kind: KindId, offset: Vec2) -> Result<(), TileKindError> {
        match style_of(kind) {
            Some(KindStyle::Terrain) => self.has_terrain = true,
            Some(KindStyle::Water) => self.has_water = true,
            Some(KindStyle::Coin(coin)) => self.coin = Some(coin),
            Some(KindStyle::Enemy(enemy)) => self.enemy = Some(enemy),
            Some(KindStyle::Player | KindStyle::Sky | KindStyle::Palm { .. }) => {
                if !self.attached_objects.contains(&(kind, offset)) {
                    self.attached_objects.push((kind, offset));
                }
            }
            None => return Err(TileKindError::InvalidTileKind { kind }),
        }
        Ok(())
    }

    fn clear(&mut self, kind: KindId) -> Result<(), TileKindError> {
        match style_of(kind) {
            Some(KindStyle::Terrain) => self.has_terrain = false,
            Some(KindStyle::Water) => self.has_water = false,
            Some(KindStyle::Coin(_)) => self.coin = None,
            Some(KindStyle::Enemy(_)) => self.enemy = None,
            _ => return Err(TileKindError::InvalidTileKind { kind }),
        }
        Ok(())
    }
}

/// Sparse canvas storage: tiles live in an arena and a coordinate map points
/// into it, so neighbour lookups are single hash probes.
#[derive(Debug, Clone, Default)]
pub(crate) struct TileIndex {
    slots: Vec<Option<CanvasTile>>,
    free_slots: Vec<usize>,
    by_cell: HashMap<CellCoord, usize>,
}

impl TileIndex {
    pub(crate) fn len(&self) -> usize {
        self.by_cell.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_cell.is_empty()
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.by_cell.contains_key(&cell)
    }

    pub(crate) fn get(&self, cell: CellCoord) -> Option<&CanvasTile> {
        let slot = *self.by_cell.get(&cell)?;
        self.slots.get(slot)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, cell: CellCoord) -> Option<&mut CanvasTile> {
        let slot = *self.by_cell.get(&cell)?;
        self.slots.get_mut(slot)?.as_mut()
    }

    /// Adds `kind` to the tile at `cell`, creating the tile if needed. Object
    /// kinds are attached with their in-cell `offset`; tile kinds ignore it.
    pub(crate) fn upsert(
        &mut self,
        cell: CellCoord,
        kind: KindId,
        offset: Vec2,
    ) -> Result<(), TileKindError> {
        if let Some(tile) = self.get_mut(cell) {
            return tile.add(kind, offset);
        }
        let mut tile = CanvasTile::default();
        tile.add(kind, offset)?;
        self.insert_new(cell, tile);
        Ok(())
    }

    /// Clears `kind` from the tile at `cell` and evicts the tile once nothing
    /// is left in it. Returns whether the tile was evicted.
    pub(crate) fn remove(&mut self, cell: CellCoord, kind: KindId) -> Result<bool, TileKindError> {
        let Some(tile) = self.get_mut(cell) else {
            return Ok(false);
        };
        tile.clear(kind)?;
        if tile.is_empty() {
            self.evict(cell);
            return Ok(true);
        }
        Ok(false)
    }

    /// Occupied cells in the square window of `radius` around `cell`,
    /// including `cell` itself.
    pub(crate) fn neighbours_of(
        &self,
        cell: CellCoord,
        radius: i32,
    ) -> Vec<(CellCoord, &CanvasTile)> {
        let mut found = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let neighbour = cell.offset(dx, dy);
                if let Some(tile) = self.get(neighbour) {
                    found.push((neighbour, tile));
                }
            }
        }
        found
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (CellCoord, &CanvasTile)> + '_ {
        self.by_cell.iter().filter_map(|(cell, slot)| {
            self.slots
                .get(*slot)
                .and_then(Option::as_ref)
                .map(|tile| (*cell, tile))
        })
    }

    fn insert_new(&mut self, cell: CellCoord, tile: CanvasTile) {
        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.slots[slot] = Some(tile);
                slot
            }
            None => {
                self.slots.push(Some(tile));
                self.slots.len() - 1
            }
        };
        self.by_cell.insert(cell, slot);
    }

    fn evict(&mut self, cell: CellCoord) {
        if let Some(slot) = self.by_cell.remove(&cell) {
            if let Some(entry) = self.slots.get_mut(slot) {
                *entry = None;
                self.free_slots.push(slot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERRAIN: KindId = KindId(2);
    const WATER: KindId = KindId(3);
    const GOLD: KindId = KindId(4);
    const DIAMOND: KindId = KindId(6);
    const PALM: KindId = KindId(11);

    #[test]
    fn removing_last_field_evicts_the_tile() {
        let mut index = TileIndex::default();
        let cell = CellCoord::new(3, -2);
        index.upsert(cell, TERRAIN, Vec2::ZERO).expect("terrain");
        index.upsert(cell, WATER, Vec2::ZERO).expect("water");

        assert_eq!(index.remove(cell, TERRAIN), Ok(false));
        assert!(index.get(cell).is_some());
        assert_eq!(index.remove(cell, WATER), Ok(true));
        assert!(index.get(cell).is_none());
        assert!(index.is_empty());
    }

    #[test]
    fn coin_upsert_replaces_previous_coin() {
        let mut index = TileIndex::default();
        let cell = CellCoord::new(0, 0);
        index.upsert(cell, GOLD, Vec2::ZERO).expect("gold");
        index.upsert(cell, DIAMOND, Vec2::ZERO).expect("diamond");
        assert_eq!(
            index.get(cell).expect("tile").coin,
            Some(CoinKind::Diamond)
        );
    }

    #[test]
    fn attached_objects_keep_paint_order_and_skip_duplicates() {
        let mut index = TileIndex::default();
        let cell = CellCoord::new(1, 1);
        index.upsert(cell, PALM, Vec2::new(4.0, 8.0)).expect("palm");
        index.upsert(cell, KindId(0), Vec2::new(1.0, 2.0)).expect("player");
        index.upsert(cell, PALM, Vec2::new(4.0, 8.0)).expect("palm again");

        let tile = index.get(cell).expect("tile");
        assert_eq!(
            tile.attached_objects,
            vec![(PALM, Vec2::new(4.0, 8.0)), (KindId(0), Vec2::new(1.0, 2.0))]
        );
    }

    #[test]
    fn unknown_and_object_kinds_cannot_be_removed() {
        let mut index = TileIndex::default();
        let cell = CellCoord::new(0, 0);
        assert_eq!(
            index.upsert(cell, KindId(42), Vec2::ZERO),
            Err(TileKindError::InvalidTileKind { kind: KindId(42) })
        );
        assert!(index.is_empty());

        index.upsert(cell, TERRAIN, Vec2::ZERO).expect("terrain");
        assert_eq!(
            index.remove(cell, PALM),
            Err(TileKindError::InvalidTileKind { kind: PALM })
        );
        assert!(index.get(cell).expect("tile").has_terrain);
    }

    #[test]
    fn neighbour_window_reports_only_occupied_cells() {
        let mut index = TileIndex::default();
        for cell in [
            CellCoord::new(0, 0),
            CellCoord::new(1, 1),
            CellCoord::new(-1, 0),
            CellCoord::new(2, 0),
        ] {
            index.upsert(cell, TERRAIN, Vec2::ZERO).expect("terrain");
        }

        let mut cells: Vec<_> = index
            .neighbours_of(CellCoord::new(0, 0), 1)
            .into_iter()
            .map(|(cell, _)| cell)
            .collect();
        cells.sort();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(-1, 0),
                CellCoord::new(0, 0),
                CellCoord::new(1, 1)
            ]
        );
    }

    #[test]
    fn evicted_slots_are_reused() {
        let mut index = TileIndex::default();
        index.upsert(CellCoord::new(0, 0), TERRAIN, Vec2::ZERO).expect("a");
        index.remove(CellCoord::new(0, 0), TERRAIN).expect("remove");
        index.upsert(CellCoord::new(5, 5), WATER, Vec2::ZERO).expect("b");
        assert_eq!(index.slots.len(), 1);
        assert!(index.get(CellCoord::new(5, 5)).expect("tile").has_water);
    }
}
