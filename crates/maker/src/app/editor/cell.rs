use engine::Vec2;

use crate::app::settings::{TILE_SIZE, TILE_SIZE_PX};

/// Address of one tile in the unbounded canvas grid, in tile units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct CellCoord {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl CellCoord {
    pub(crate) const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell under the pixel `position` when the canvas origin sits at `origin`.
    pub(crate) fn from_pixel(position: Vec2, origin: Vec2) -> Self {
        Self::containing(position - origin)
    }

    /// Cell containing an origin-relative pixel offset. Negative offsets floor,
    /// so `(-1, -1)` lands in cell `(-1, -1)`.
    pub(crate) fn containing(offset: Vec2) -> Self {
        Self::new(
            (offset.x / TILE_SIZE_PX).floor() as i32,
            (offset.y / TILE_SIZE_PX).floor() as i32,
        )
    }

    /// Origin-relative pixel offset of the cell's top-left corner.
    pub(crate) fn top_left_offset(self) -> Vec2 {
        Vec2::new((self.x * TILE_SIZE) as f32, (self.y * TILE_SIZE) as f32)
    }

    /// Screen position of the cell's top-left corner.
    pub(crate) fn to_pixel(self, origin: Vec2) -> Vec2 {
        origin + self.top_left_offset()
    }

    pub(crate) fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_offsets_floor_instead_of_truncating() {
        assert_eq!(
            CellCoord::from_pixel(Vec2::new(-1.0, -1.0), Vec2::ZERO),
            CellCoord::new(-1, -1)
        );
        assert_eq!(
            CellCoord::from_pixel(Vec2::new(99.0, 99.0), Vec2::new(100.0, 100.0)),
            CellCoord::new(-1, -1)
        );
        assert_eq!(
            CellCoord::from_pixel(Vec2::new(-64.0, -65.0), Vec2::ZERO),
            CellCoord::new(-1, -2)
        );
    }

    #[test]
    fn cell_edges_belong_to_the_cell_they_start() {
        assert_eq!(CellCoord::containing(Vec2::ZERO), CellCoord::new(0, 0));
        assert_eq!(
            CellCoord::containing(Vec2::new(63.9, 64.0)),
            CellCoord::new(0, 1)
        );
    }

    #[test]
    fn quantization_is_idempotent() {
        let origins = [Vec2::ZERO, Vec2::new(37.5, -210.25), Vec2::new(-640.0, 12.0)];
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(-1.0, -1.0),
            Vec2::new(63.99, -0.01),
            Vec2::new(-513.7, 842.2),
            Vec2::new(1279.0, 719.0),
        ];
        for origin in origins {
            for point in points {
                let cell = CellCoord::from_pixel(point, origin);
                let back = cell.to_pixel(origin);
                assert_eq!(CellCoord::from_pixel(back, origin), cell);
                let centre = back + Vec2::new(TILE_SIZE_PX / 2.0, TILE_SIZE_PX / 2.0);
                assert_eq!(CellCoord::from_pixel(centre, origin), cell);
            }
        }
    }
}
