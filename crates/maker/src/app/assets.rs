use engine::{FrameHandle, FrameKeyError, FrameLibrary, FrameSequence, Vec2};
use tracing::info;

use super::editor::autotile::{
    is_blob_shape, terrain_key, NeighbourMask, TerrainArt, FALLBACK_TERRAIN_KEY,
};
use super::settings::TILE_SIZE_PX;

const TILE: Vec2 = Vec2::new(TILE_SIZE_PX, TILE_SIZE_PX);
pub(crate) const PLAYER_SIZE: Vec2 = Vec2::new(80.0, 64.0);
const PLAYER_STATES: [(&str, u32); 4] = [("idle", 4), ("run", 6), ("jump", 1), ("fall", 1)];

/// Hands out image ids while registering synthetic sequences.
struct CatalogBuilder {
    library: FrameLibrary,
    next_image: u32,
}

impl CatalogBuilder {
    fn new() -> Self {
        Self {
            library: FrameLibrary::default(),
            next_image: 0,
        }
    }

    fn sequence(&mut self, frames: u32, size: Vec2) -> FrameSequence {
        let first = self.next_image;
        self.next_image = self.next_image.saturating_add(frames);
        FrameSequence::new((first..first + frames).map(FrameHandle::new).collect(), size)
    }

    fn add(&mut self, key: &str, frames: u32, size: Vec2) -> Result<FrameSequence, FrameKeyError> {
        let sequence = self.sequence(frames, size);
        self.library.insert(key, sequence.clone())?;
        Ok(sequence)
    }

    fn add_mirrored(&mut self, key: &str, source: &FrameSequence) -> Result<(), FrameKeyError> {
        self.library.insert(key, source.mirrored())
    }
}

/// Pre-loaded frame catalog the scenes are built from. Stands in for the
/// image loader: every sequence gets fresh image ids and a fixed pixel size.
pub(crate) fn build_catalog() -> Result<FrameLibrary, FrameKeyError> {
    let mut catalog = CatalogBuilder::new();

    for bits in 0..=u8::MAX {
        let mask = NeighbourMask::from_bits_truncate(bits);
        if mask.is_empty() || !is_blob_shape(mask) {
            continue;
        }
        catalog.add(&TerrainArt::frame_key(&terrain_key(mask)), 1, TILE)?;
    }
    catalog.add(&TerrainArt::frame_key(FALLBACK_TERRAIN_KEY), 1, TILE)?;

    catalog.add("water/top", 4, TILE)?;
    catalog.add("water/bottom", 1, TILE)?;
    for coin in ["gold", "silver", "diamond"] {
        catalog.add(&format!("coin/{coin}"), 4, Vec2::new(32.0, 32.0))?;
    }
    catalog.add("particle", 4, Vec2::new(48.0, 48.0))?;
    catalog.add("pearl", 1, Vec2::new(16.0, 16.0))?;
    catalog.add("spikes", 1, TILE)?;
    catalog.add("sky/handle", 1, Vec2::new(32.0, 32.0))?;

    let tooth_run = catalog.add("tooth/run_left", 6, Vec2::new(72.0, 48.0))?;
    catalog.add_mirrored("tooth/run_right", &tooth_run)?;

    let shell_size = Vec2::new(80.0, 64.0);
    let shell_idle = catalog.add("shell_left/idle", 4, shell_size)?;
    let shell_attack = catalog.add("shell_left/attack", 6, shell_size)?;
    catalog.add_mirrored("shell_right/idle", &shell_idle)?;
    catalog.add_mirrored("shell_right/attack", &shell_attack)?;

    for (state, frames) in PLAYER_STATES {
        let right = catalog.add(&format!("player/{state}_right"), frames, PLAYER_SIZE)?;
        catalog.add_mirrored(&format!("player/{state}_left"), &right)?;
    }

    for (shape, size) in [
        ("small", Vec2::new(76.0, 96.0)),
        ("large", Vec2::new(76.0, 160.0)),
        ("left", Vec2::new(128.0, 96.0)),
        ("right", Vec2::new(128.0, 96.0)),
    ] {
        for plane in ["fg", "bg"] {
            catalog.add(&format!("palm/{shape}_{plane}"), 4, size)?;
        }
    }

    info!(
        sequences = catalog.library.len(),
        images = catalog.next_image,
        "asset_catalog_ready"
    );
    Ok(catalog.library)
}

/// Size of the canvas preview for `preview_key`, tile-sized when unknown.
pub(crate) fn preview_size(library: &FrameLibrary, preview_key: &str) -> Vec2 {
    library
        .get(preview_key)
        .map(FrameSequence::size)
        .unwrap_or(TILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::settings::KIND_TABLE;

    #[test]
    fn catalog_covers_every_kind_preview() {
        let library = build_catalog().expect("catalog");
        for entry in &KIND_TABLE {
            assert!(library.contains(entry.preview), "{}", entry.preview);
        }
    }

    #[test]
    fn terrain_art_has_blob_set_plus_fallback() {
        let library = build_catalog().expect("catalog");
        let art = TerrainArt::from_library(&library);
        assert_eq!(art.len(), 47);
        assert_eq!(
            art.resolve(NeighbourMask::EAST | NeighbourMask::WEST),
            "CG"
        );
        assert_eq!(art.resolve(NeighbourMask::NORTH_EAST), FALLBACK_TERRAIN_KEY);
    }

    #[test]
    fn mirrored_sequences_share_images() {
        let library = build_catalog().expect("catalog");
        let left = library.get("shell_left/attack").expect("left");
        let right = library.get("shell_right/attack").expect("right");
        assert_eq!(left.len(), 6);
        assert_eq!(right.frame(2).image, left.frame(2).image);
        assert!(right.frame(2).flip_x);
    }
}
