//! Which tiles the viewport can see.

/// Extra tiles drawn around the viewport on every side.
pub const CULL_MARGIN_TILES: i32 = 1;

/// Half-open window of tile coordinates `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileRegion {
    /// First visible column.
    pub start_x: usize,
    /// First visible row.
    pub start_y: usize,
    /// One past the last visible column.
    pub end_x: usize,
    /// One past the last visible row.
    pub end_y: usize,
}

impl TileRegion {
    /// Columns in the region.
    pub fn width(&self) -> usize {
        self.end_x.saturating_sub(self.start_x)
    }

    /// Rows in the region.
    pub fn height(&self) -> usize {
        self.end_y.saturating_sub(self.start_y)
    }

    /// Whether the region has no cells.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Every `(x, y)` in the region, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let (sx, ex) = (self.start_x, self.end_x);
        (self.start_y..self.end_y).flat_map(move |y| (sx..ex).map(move |x| (x, y)))
    }
}

/// Tiles of a `map_w x map_h` grid overlapping the viewport whose top-left
/// world pixel is `view_min`, padded by [`CULL_MARGIN_TILES`].
pub fn visible_tile_region(
    view_min: (i32, i32),
    view_size: (i32, i32),
    tile_size: i32,
    map_w: usize,
    map_h: usize,
) -> TileRegion {
    let tile_size = tile_size.max(1);
    let mut tx_min = view_min.0.div_euclid(tile_size);
    let mut ty_min = view_min.1.div_euclid(tile_size);
    let mut tx_max = (view_min.0 + view_size.0).div_euclid(tile_size);
    let mut ty_max = (view_min.1 + view_size.1).div_euclid(tile_size);

    if tx_min > tx_max {
        std::mem::swap(&mut tx_min, &mut tx_max);
    }
    if ty_min > ty_max {
        std::mem::swap(&mut ty_min, &mut ty_max);
    }

    tx_min -= CULL_MARGIN_TILES;
    ty_min -= CULL_MARGIN_TILES;
    // +1 turns the inclusive max into an exclusive bound
    tx_max += CULL_MARGIN_TILES + 1;
    ty_max += CULL_MARGIN_TILES + 1;

    let clamp = |v: i32, hi: usize| v.clamp(0, hi as i32) as usize;
    TileRegion {
        start_x: clamp(tx_min, map_w),
        start_y: clamp(ty_min, map_h),
        end_x: clamp(tx_max, map_w),
        end_y: clamp(ty_max, map_h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_is_padded_by_one_tile() {
        let r = visible_tile_region((64, 64), (128, 96), 32, 100, 100);
        assert_eq!(
            r,
            TileRegion {
                start_x: 1,
                start_y: 1,
                end_x: 8,
                end_y: 7
            }
        );
    }

    #[test]
    fn region_is_clamped_to_map() {
        let r = visible_tile_region((-500, -500), (1280, 720), 32, 10, 5);
        assert_eq!(r.start_x, 0);
        assert_eq!(r.start_y, 0);
        assert_eq!(r.end_x, 10);
        assert_eq!(r.end_y, 5);

        let off = visible_tile_region((10_000, 0), (320, 240), 32, 10, 5);
        assert!(off.is_empty());
    }

    #[test]
    fn region_cells_stay_small_for_huge_maps() {
        let r = visible_tile_region((3200, 3200), (640, 480), 32, 10_000, 10_000);
        assert_eq!(r.cells().count(), r.width() * r.height());
        assert!(r.width() <= 640 / 32 + 3);
        assert!(r.height() <= 480 / 32 + 3);
    }
}
