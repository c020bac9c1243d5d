use std::collections::BTreeMap;
use std::fmt;

use engine::Vec2;
use serde::{Serialize, Serializer};

use crate::app::settings::KindId;

/// Level-relative pixel coordinate. Never negative in a compiled grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct GridPoint {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl GridPoint {
    pub(crate) const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub(crate) fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

// Grid points are map keys in the debug dump, so they serialize as "x,y".
impl Serialize for GridPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum WaterOrientation {
    /// Surface cell, animated.
    Top,
    /// Cell with water directly above it.
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GridLayer {
    Water,
    BgPalms,
    Terrain,
    Enemies,
    Coins,
    FgObjects,
}

impl GridLayer {
    pub(crate) const ALL: [GridLayer; 6] = [
        GridLayer::Water,
        GridLayer::BgPalms,
        GridLayer::Terrain,
        GridLayer::Enemies,
        GridLayer::Coins,
        GridLayer::FgObjects,
    ];

    pub(crate) fn name(self) -> &'static str {
        match self {
            GridLayer::Water => "water",
            GridLayer::BgPalms => "bg_palms",
            GridLayer::Terrain => "terrain",
            GridLayer::Enemies => "enemies",
            GridLayer::Coins => "coins",
            GridLayer::FgObjects => "fg_objects",
        }
    }
}

/// Baked, origin-independent level handed from the editor to the level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct CompiledGrid {
    pub(crate) water: BTreeMap<GridPoint, WaterOrientation>,
    pub(crate) bg_palms: BTreeMap<GridPoint, KindId>,
    pub(crate) terrain: BTreeMap<GridPoint, String>,
    pub(crate) enemies: BTreeMap<GridPoint, KindId>,
    pub(crate) coins: BTreeMap<GridPoint, KindId>,
    pub(crate) fg_objects: BTreeMap<GridPoint, KindId>,
}

impl CompiledGrid {
    pub(crate) fn layer_len(&self, layer: GridLayer) -> usize {
        match layer {
            GridLayer::Water => self.water.len(),
            GridLayer::BgPalms => self.bg_palms.len(),
            GridLayer::Terrain => self.terrain.len(),
            GridLayer::Enemies => self.enemies.len(),
            GridLayer::Coins => self.coins.len(),
            GridLayer::FgObjects => self.fg_objects.len(),
        }
    }

    pub(crate) fn entry_count(&self) -> usize {
        GridLayer::ALL
            .iter()
            .map(|layer| self.layer_len(*layer))
            .sum()
    }

    /// Kind-tagged layers, in build order.
    pub(crate) fn tagged_layers(&self) -> [(GridLayer, &BTreeMap<GridPoint, KindId>); 4] {
        [
            (GridLayer::BgPalms, &self.bg_palms),
            (GridLayer::Enemies, &self.enemies),
            (GridLayer::Coins, &self.coins),
            (GridLayer::FgObjects, &self.fg_objects),
        ]
    }

    /// Smallest x and y over every emitted coordinate.
    #[cfg(test)]
    pub(crate) fn min_corner(&self) -> Option<GridPoint> {
        let points = self
            .water
            .keys()
            .chain(self.bg_palms.keys())
            .chain(self.terrain.keys())
            .chain(self.enemies.keys())
            .chain(self.coins.keys())
            .chain(self.fg_objects.keys());
        points.fold(None, |corner: Option<GridPoint>, point| {
            Some(match corner {
                Some(corner) => GridPoint::new(corner.x.min(point.x), corner.y.min(point.y)),
                None => *point,
            })
        })
    }

    pub(crate) fn to_debug_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn debug_json_uses_string_coordinates() {
        let mut grid = CompiledGrid::default();
        grid.terrain.insert(GridPoint::new(0, 64), "AC".to_string());
        grid.water.insert(GridPoint::new(64, 64), WaterOrientation::Bottom);
        grid.coins.insert(GridPoint::new(32, 32), KindId(5));

        let value: serde_json::Value =
            serde_json::from_str(&grid.to_debug_json().expect("json")).expect("parse");
        assert_eq!(
            value,
            json!({
                "water": { "64,64": "bottom" },
                "bg_palms": {},
                "terrain": { "0,64": "AC" },
                "enemies": {},
                "coins": { "32,32": 5 },
                "fg_objects": {}
            })
        );
    }

    #[test]
    fn min_corner_spans_all_layers() {
        let mut grid = CompiledGrid::default();
        assert_eq!(grid.min_corner(), None);
        grid.enemies.insert(GridPoint::new(128, 0), KindId(7));
        grid.fg_objects.insert(GridPoint::new(3, 90), KindId(0));
        assert_eq!(grid.min_corner(), Some(GridPoint::new(3, 0)));
        assert_eq!(grid.entry_count(), 2);
    }
}
