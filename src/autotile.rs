//! 47-tile blob autotiling.
//!
//! Each occupied cell gets an 8-bit neighbour mask:
//!
//! ```text
//! NW(1)  N(2)  NE(4)
//!  W(8)   *   E(16)
//! SW(32) S(64) SE(128)
//! ```
//!
//! The mask is looked up in a fixed table yielding a canonical index in
//! `0..=46`. Masks without an entry resolve to index 0.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::config::TilemapConfig;

/// Number of canonical autotile variants.
pub const AUTOTILE_VARIANTS: u8 = 47;

/// Index used for any mask missing from the table.
pub const FALLBACK_INDEX: u8 = 0;

const NEIGHBOURS: [(i32, i32, u8); 8] = [
    (-1, -1, 1),
    (0, -1, 2),
    (1, -1, 4),
    (-1, 0, 8),
    (1, 0, 16),
    (-1, 1, 32),
    (0, 1, 64),
    (1, 1, 128),
];

/// `(mask, index)` pairs, one per variant.
const MASK_TABLE: [(u8, u8); 47] = [
    // isolated
    (0, 46),
    // horizontal runs
    (2, 0),
    (8, 1),
    (10, 2),
    // vertical runs
    (16, 3),
    (64, 4),
    (80, 5),
    // outer corners
    (18, 6),
    (24, 7),
    (72, 8),
    (96, 9),
    // inner corners
    (22, 10),
    (31, 11),
    (104, 12),
    (248, 13),
    // T-junctions
    (26, 14),
    (88, 15),
    (30, 16),
    (120, 17),
    // cross
    (122, 18),
    // edges
    (66, 19),
    (82, 20),
    // fillers
    (90, 21),
    (106, 22),
    (127, 23),
    (255, 24),
    // single-neighbour and sparse variants
    (1, 25),
    (4, 26),
    (32, 27),
    (128, 28),
    (3, 29),
    (6, 30),
    (12, 31),
    (17, 32),
    (33, 33),
    (34, 34),
    (36, 35),
    (48, 36),
    (65, 37),
    (68, 38),
    (129, 39),
    (130, 40),
    (132, 41),
    (136, 42),
    (144, 43),
    (160, 44),
    (192, 45),
];

const fn build_lut() -> [u8; 256] {
    let mut lut = [FALLBACK_INDEX; 256];
    let mut i = 0;
    while i < MASK_TABLE.len() {
        let (mask, index) = MASK_TABLE[i];
        lut[mask as usize] = index;
        i += 1;
    }
    lut
}

static MASK_LUT: [u8; 256] = build_lut();

/// Canonical index for a neighbour mask.
#[inline]
pub fn tile_index_for_bitmask(mask: u8) -> u8 {
    MASK_LUT[mask as usize]
}

/// Whether `mask` has its own entry in the table.
pub fn has_table_entry(mask: u8) -> bool {
    MASK_TABLE.iter().any(|&(m, _)| m == mask)
}

/// Logical tile group, each with its own band of atlas rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutotileType {
    /// Floor tiles.
    Ground,
    /// Wall tiles.
    Walls,
}

impl AutotileType {
    /// Lowercase group name.
    pub fn name(self) -> &'static str {
        match self {
            AutotileType::Ground => "ground_autotile",
            AutotileType::Walls => "wall_autotile",
        }
    }
}

/// Row-major boolean occupancy grid. Reads outside the grid are `false`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// All-unoccupied grid.
    pub fn new(width: usize, height: usize) -> Self {
        OccupancyGrid {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Builds a grid from rows; short rows are padded with `false`.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.as_ref().len()).max().unwrap_or(0);
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.as_ref().iter().enumerate() {
                grid.cells[y * width + x] = v;
            }
        }
        grid
    }

    /// Cells per row.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `true` when the grid has no cells at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Occupancy at `(x, y)`; `false` outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map(|i| self.cells[i]).unwrap_or(false)
    }

    /// Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = value;
        }
    }

    /// Sets every in-bounds cell of the rectangle.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, value: bool) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, value);
            }
        }
    }

    /// Number of occupied cells.
    pub fn count_occupied(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Occupied cells in raster order.
    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let w = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c)
            .map(move |(i, _)| ((i % w) as i32, (i / w) as i32))
    }
}

/// Result of autotiling a grid: `None` marks cells with no tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutotileGrid {
    width: usize,
    height: usize,
    indices: Vec<Option<u8>>,
}

impl AutotileGrid {
    /// Cells per row.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Resolved index, `None` for an unoccupied or out-of-range cell.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            self.indices[y * self.width + x]
        } else {
            None
        }
    }

    /// `(x, y, index)` for every cell that resolved to a tile.
    pub fn resolved(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        let w = self.width;
        self.indices
            .iter()
            .enumerate()
            .filter_map(move |(i, idx)| idx.map(|v| (i % w, i / w, v)))
    }

    /// `true` when no cell resolved to a tile.
    pub fn is_all_empty(&self) -> bool {
        self.indices.iter().all(Option::is_none)
    }

    /// Rows using `-1` for empty cells, the layout external tools expect.
    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        self.indices
            .chunks(self.width.max(1))
            .take(self.height)
            .map(|row| row.iter().map(|i| i.map_or(-1, i32::from)).collect())
            .collect()
    }
}

/// Neighbour mask for `(x, y)`; 0 when the cell itself is empty.
pub fn bitmask(grid: &OccupancyGrid, x: i32, y: i32) -> u8 {
    if !grid.get(x, y) {
        return 0;
    }
    NEIGHBOURS
        .iter()
        .filter(|(dx, dy, _)| grid.get(x + dx, y + dy))
        .fold(0u8, |mask, (_, _, bit)| mask | bit)
}

/// Canonical index for an occupied cell.
#[inline]
pub fn autotile_index(grid: &OccupancyGrid, x: i32, y: i32) -> u8 {
    tile_index_for_bitmask(bitmask(grid, x, y))
}

/// Resolves every cell of `grid`. Each cell depends only on the input grid.
pub fn generate_autotile_grid(grid: &OccupancyGrid) -> AutotileGrid {
    let (width, height) = (grid.width(), grid.height());
    let mut indices = Vec::with_capacity(width * height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            indices.push(grid.get(x, y).then(|| autotile_index(grid, x, y)));
        }
    }
    AutotileGrid {
        width,
        height,
        indices,
    }
}

/// Rectangle with notches, inner corners and a cross, exercising most variants.
pub fn create_test_pattern(width: usize, height: usize) -> OccupancyGrid {
    let mut grid = OccupancyGrid::new(width, height);
    let (w, h) = (width as i32, height as i32);
    grid.fill_rect(2, 2, w - 4, h - 4, true);

    if width > 10 && height > 10 {
        grid.set(4, 4, false);
        grid.set(w - 5, 4, false);
        grid.set(4, h - 5, false);
        grid.set(w - 5, h - 5, false);

        if height > 15 {
            for x in w / 2 - 2..w / 2 + 3 {
                grid.set(x, h / 2, true);
            }
            for y in h / 2 - 2..h / 2 + 3 {
                grid.set(w / 2, y, true);
            }
        }
    }
    grid
}

/// Text dump of resolved indices for the top-left corner of `grid`.
pub fn debug_bitmask_grid(grid: &OccupancyGrid, max_width: usize, max_height: usize) -> String {
    let width = grid.width().min(max_width);
    let height = grid.height().min(max_height);
    let mut out = String::new();
    let _ = writeln!(out, "Bitmask grid (first {}x{} tiles):", width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if grid.get(x, y) {
                let _ = write!(out, "{:2} ", autotile_index(grid, x, y));
            } else {
                out.push_str("   ");
            }
        }
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PaletteEntry {
    base_row: u32,
}

/// Maps `(group, canonical index)` to atlas `(row, col)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutotilePalette {
    tiles_per_row: u32,
    entries: HashMap<AutotileType, PaletteEntry>,
}

impl Default for AutotilePalette {
    fn default() -> Self {
        Self::new(9, 10, 16)
    }
}

impl AutotilePalette {
    /// Palette with explicit base rows.
    pub fn new(ground_row: u32, walls_row: u32, tiles_per_row: u32) -> Self {
        let mut entries = HashMap::new();
        entries.insert(AutotileType::Ground, PaletteEntry { base_row: ground_row });
        entries.insert(AutotileType::Walls, PaletteEntry { base_row: walls_row });
        AutotilePalette {
            tiles_per_row: tiles_per_row.max(1),
            entries,
        }
    }

    /// A palette with no groups registered; every lookup yields `(0, 0)`.
    pub fn empty(tiles_per_row: u32) -> Self {
        AutotilePalette {
            tiles_per_row: tiles_per_row.max(1),
            entries: HashMap::new(),
        }
    }

    /// Palette from `autotile_rows` and `tiles_per_row`.
    pub fn from_config(config: &TilemapConfig) -> Self {
        Self::new(
            config.autotile_rows.ground,
            config.autotile_rows.walls,
            config.tiles_per_row,
        )
    }

    /// Atlas columns used for index wrapping.
    pub fn tiles_per_row(&self) -> u32 {
        self.tiles_per_row
    }

    /// First atlas row of `group`, if configured.
    pub fn base_row(&self, group: AutotileType) -> Option<u32> {
        self.entries.get(&group).map(|e| e.base_row)
    }

    /// Atlas `(row, col)` for a canonical index; `(0, 0)` for an unconfigured group.
    pub fn tile_coords(&self, group: AutotileType, index: u8) -> (u32, u32) {
        let Some(entry) = self.entries.get(&group) else {
            return (0, 0);
        };
        let index = u32::from(index);
        (
            entry.base_row + index / self.tiles_per_row,
            index % self.tiles_per_row,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_variant_exactly_once() {
        let mut seen = [false; AUTOTILE_VARIANTS as usize];
        for &(_, index) in MASK_TABLE.iter() {
            assert!(!seen[index as usize], "index {index} listed twice");
            seen[index as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn lut_agrees_with_table_and_falls_back() {
        for &(mask, index) in MASK_TABLE.iter() {
            assert_eq!(tile_index_for_bitmask(mask), index);
        }
        assert!(!has_table_entry(208));
        assert_eq!(tile_index_for_bitmask(208), FALLBACK_INDEX);
    }

    #[test]
    fn isolated_cell_maps_to_46() {
        let grid = OccupancyGrid::from_rows(&[[true]]);
        assert_eq!(bitmask(&grid, 0, 0), 0);
        assert_eq!(autotile_index(&grid, 0, 0), 46);
    }

    #[test]
    fn palette_wraps_rows() {
        let palette = AutotilePalette::default();
        assert_eq!(palette.tile_coords(AutotileType::Ground, 0), (9, 0));
        assert_eq!(palette.tile_coords(AutotileType::Ground, 17), (10, 1));
        assert_eq!(palette.tile_coords(AutotileType::Walls, 46), (12, 14));
    }

    #[test]
    fn palette_without_group_returns_origin() {
        let palette = AutotilePalette::empty(16);
        assert_eq!(palette.tile_coords(AutotileType::Walls, 30), (0, 0));
    }

    #[test]
    fn debug_dump_has_one_line_per_row() {
        let grid = create_test_pattern(12, 12);
        let dump = debug_bitmask_grid(&grid, 20, 5);
        assert_eq!(dump.lines().count(), 6);
    }
}
