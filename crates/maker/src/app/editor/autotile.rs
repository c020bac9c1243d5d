use std::collections::BTreeSet;

use bitflags::bitflags;
use engine::FrameLibrary;
use tracing::debug;

use super::cell::CellCoord;
use super::tile_index::TileIndex;

/// Art key used when a neighbour combination has no authored tile.
pub(crate) const FALLBACK_TERRAIN_KEY: &str = "X";
const TERRAIN_ART_PREFIX: &str = "land";
const CLUSTER_RADIUS: i32 = 1;

bitflags! {
    /// Compass directions holding a terrain neighbour.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub(crate) struct NeighbourMask: u8 {
        const NORTH = 0b0000_0001;
        const NORTH_EAST = 0b0000_0010;
        const EAST = 0b0000_0100;
        const SOUTH_EAST = 0b0000_1000;
        const SOUTH = 0b0001_0000;
        const SOUTH_WEST = 0b0010_0000;
        const WEST = 0b0100_0000;
        const NORTH_WEST = 0b1000_0000;
    }
}

impl Default for NeighbourMask {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Canonical order; art keys list their letters in this order.
    pub(crate) const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub(crate) const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    pub(crate) const fn letter(self) -> char {
        match self {
            Direction::North => 'A',
            Direction::NorthEast => 'B',
            Direction::East => 'C',
            Direction::SouthEast => 'D',
            Direction::South => 'E',
            Direction::SouthWest => 'F',
            Direction::West => 'G',
            Direction::NorthWest => 'H',
        }
    }

    pub(crate) const fn flag(self) -> NeighbourMask {
        match self {
            Direction::North => NeighbourMask::NORTH,
            Direction::NorthEast => NeighbourMask::NORTH_EAST,
            Direction::East => NeighbourMask::EAST,
            Direction::SouthEast => NeighbourMask::SOUTH_EAST,
            Direction::South => NeighbourMask::SOUTH,
            Direction::SouthWest => NeighbourMask::SOUTH_WEST,
            Direction::West => NeighbourMask::WEST,
            Direction::NorthWest => NeighbourMask::NORTH_WEST,
        }
    }

    pub(crate) fn step(self, cell: CellCoord) -> CellCoord {
        let (dx, dy) = self.delta();
        cell.offset(dx, dy)
    }
}

/// Letters of every set direction, in canonical order (`"ACE"`, `"BDFH"`, ...).
pub(crate) fn terrain_key(mask: NeighbourMask) -> String {
    Direction::ALL
        .iter()
        .filter(|direction| mask.contains(direction.flag()))
        .map(|direction| direction.letter())
        .collect()
}

/// Recomputes neighbour masks and water stacking for every occupied cell in
/// the 3x3 cluster around `center`.
pub(crate) fn recompute_cluster(index: &mut TileIndex, center: CellCoord) {
    let cluster: Vec<CellCoord> = index
        .neighbours_of(center, CLUSTER_RADIUS)
        .into_iter()
        .map(|(cell, _)| cell)
        .collect();

    for cell in cluster {
        let mut mask = NeighbourMask::empty();
        for direction in Direction::ALL {
            if index
                .get(direction.step(cell))
                .is_some_and(|neighbour| neighbour.has_terrain)
            {
                mask.insert(direction.flag());
            }
        }
        let water_above = index
            .get(Direction::North.step(cell))
            .is_some_and(|above| above.has_water);

        if let Some(tile) = index.get_mut(cell) {
            tile.terrain_mask = mask;
            tile.water_above = tile.has_water && water_above;
        }
    }
}

/// Terrain art keys with authored tiles.
#[derive(Debug, Clone, Default)]
pub(crate) struct TerrainArt {
    keys: BTreeSet<String>,
}

impl TerrainArt {
    pub(crate) fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn from_library(library: &FrameLibrary) -> Self {
        Self::new(library.names_under(TERRAIN_ART_PREFIX))
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn lookup(&self, mask: NeighbourMask) -> Option<String> {
        let key = terrain_key(mask);
        self.keys.contains(&key).then_some(key)
    }

    /// Art key for `mask`, or the fallback tile when nothing is authored for it.
    pub(crate) fn resolve(&self, mask: NeighbourMask) -> String {
        self.lookup(mask).unwrap_or_else(|| {
            debug!(key = %terrain_key(mask), "terrain_art_unmapped");
            FALLBACK_TERRAIN_KEY.to_string()
        })
    }

    pub(crate) fn frame_key(art: &str) -> String {
        format!("{TERRAIN_ART_PREFIX}/{art}")
    }
}

/// Whether `mask` is a shape with authored art: a corner only counts when
/// both edges next to it are also filled.
pub(crate) fn is_blob_shape(mask: NeighbourMask) -> bool {
    let corners = [
        (
            NeighbourMask::NORTH_EAST,
            NeighbourMask::NORTH | NeighbourMask::EAST,
        ),
        (
            NeighbourMask::SOUTH_EAST,
            NeighbourMask::SOUTH | NeighbourMask::EAST,
        ),
        (
            NeighbourMask::SOUTH_WEST,
            NeighbourMask::SOUTH | NeighbourMask::WEST,
        ),
        (
            NeighbourMask::NORTH_WEST,
            NeighbourMask::NORTH | NeighbourMask::WEST,
        ),
    ];
    corners
        .iter()
        .all(|(corner, edges)| !mask.contains(*corner) || mask.contains(*edges))
}

#[cfg(test)]
mod tests {
    use engine::Vec2;

    use super::*;
    use crate::app::settings::KindId;

    const TERRAIN: KindId = KindId(2);
    const WATER: KindId = KindId(3);

    fn paint(index: &mut TileIndex, cell: CellCoord, kind: KindId) {
        index.upsert(cell, kind, Vec2::ZERO).expect("paint");
        recompute_cluster(index, cell);
    }

    fn all_masks() -> impl Iterator<Item = NeighbourMask> {
        (0..=u8::MAX).map(NeighbourMask::from_bits_truncate)
    }

    #[test]
    fn horizontal_neighbours_see_each_other() {
        let mut index = TileIndex::default();
        paint(&mut index, CellCoord::new(0, 0), TERRAIN);
        paint(&mut index, CellCoord::new(1, 0), TERRAIN);

        let left = index.get(CellCoord::new(0, 0)).expect("left");
        let right = index.get(CellCoord::new(1, 0)).expect("right");
        assert_eq!(left.terrain_mask, NeighbourMask::EAST);
        assert_eq!(right.terrain_mask, NeighbourMask::WEST);
        assert_eq!(terrain_key(left.terrain_mask), "C");
        assert_eq!(terrain_key(right.terrain_mask), "G");
    }

    #[test]
    fn erasing_terrain_updates_the_cluster() {
        let mut index = TileIndex::default();
        paint(&mut index, CellCoord::new(0, 0), TERRAIN);
        paint(&mut index, CellCoord::new(0, 1), TERRAIN);
        paint(&mut index, CellCoord::new(1, 1), TERRAIN);

        index
            .remove(CellCoord::new(0, 1), TERRAIN)
            .expect("remove");
        recompute_cluster(&mut index, CellCoord::new(0, 1));

        assert_eq!(
            index.get(CellCoord::new(0, 0)).expect("top").terrain_mask,
            NeighbourMask::SOUTH_EAST
        );
        assert_eq!(
            index.get(CellCoord::new(1, 1)).expect("side").terrain_mask,
            NeighbourMask::NORTH_WEST
        );
    }

    #[test]
    fn stacked_water_marks_the_lower_cell() {
        let mut index = TileIndex::default();
        paint(&mut index, CellCoord::new(0, 0), WATER);
        paint(&mut index, CellCoord::new(0, 1), WATER);
        paint(&mut index, CellCoord::new(1, 1), TERRAIN);

        assert!(!index.get(CellCoord::new(0, 0)).expect("top").water_above);
        assert!(index.get(CellCoord::new(0, 1)).expect("lower").water_above);
        assert!(!index.get(CellCoord::new(1, 1)).expect("land").water_above);
    }

    #[test]
    fn keys_follow_canonical_direction_order() {
        let mask = NeighbourMask::WEST | NeighbourMask::NORTH | NeighbourMask::SOUTH_EAST;
        assert_eq!(terrain_key(mask), "ADG");
        assert_eq!(terrain_key(NeighbourMask::all()), "ABCDEFGH");
        assert_eq!(terrain_key(NeighbourMask::empty()), "");
    }

    #[test]
    fn every_mask_resolves_to_authored_art_or_the_fallback() {
        let art = TerrainArt::new(["C", "G", "CG", "X"]);
        for mask in all_masks() {
            let key = art.resolve(mask);
            assert!(key == terrain_key(mask) || key == FALLBACK_TERRAIN_KEY);
        }
        assert_eq!(art.resolve(NeighbourMask::EAST), "C");
        assert_eq!(art.resolve(NeighbourMask::NORTH), FALLBACK_TERRAIN_KEY);
    }

    #[test]
    fn blob_set_has_forty_seven_shapes() {
        assert_eq!(all_masks().filter(|mask| is_blob_shape(*mask)).count(), 47);
        assert!(!is_blob_shape(NeighbourMask::NORTH_EAST));
        assert!(is_blob_shape(
            NeighbourMask::NORTH | NeighbourMask::EAST | NeighbourMask::NORTH_EAST
        ));
    }
}
