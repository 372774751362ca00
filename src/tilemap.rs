//! The three-layer level grid and its collision/hazard cache.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info, warn};
use macroquad::color::{Color, WHITE};

use crate::atlas::{SpriteAtlas, PLACEHOLDER_COLOR};
use crate::autotile::{generate_autotile_grid, AutotileGrid, AutotilePalette, AutotileType, OccupancyGrid};
use crate::config::{DoorSprite, TilemapConfig};
use crate::error::Result;
use crate::geom::Rect;
use crate::loader::json_loader::{self, DecodedMap};
use crate::render::{visible_tile_region, RectStyle, Surface};
use crate::tile::{DoorType, Tile, TileKind, TileLayer};

const GRID_LINE_COLOR: Color = Color::new(100.0 / 255.0, 100.0 / 255.0, 100.0 / 255.0, 128.0 / 255.0);

/// A fixed-size `width x height` grid per [`TileLayer`].
///
/// Cells are stored row-major (`y * width + x`). Reads and writes outside
/// the grid are absorbed: reads yield `None`, writes are dropped.
///
/// Collision and hazard rectangles are derived lazily. Any write to the
/// SOLID or HAZARD layer marks them stale; the next query rebuilds them
/// once, however many writes came before it.
#[derive(Debug, Clone)]
pub struct Tilemap {
    width: usize,
    height: usize,
    tile_size: u32,
    layers: [Vec<Tile>; 3],
    palette: AutotilePalette,
    door_sprites: BTreeMap<String, DoorSprite>,

    collision_rects: Vec<Rect>,
    hazard_rects: Vec<(Rect, i32)>,
    dirty: bool,
    rebuilds: u64,

    show_grid: bool,
    show_ids: bool,
}

impl Tilemap {
    /// An empty map using the default configuration.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_config(width, height, &TilemapConfig::default())
    }

    /// Empty map using the tile size, palette and doors from `config`.
    pub fn with_config(width: usize, height: usize, config: &TilemapConfig) -> Self {
        info!("Tilemap created: {}x{} tiles", width, height);
        Tilemap {
            width,
            height,
            tile_size: config.tile_size.max(1),
            layers: std::array::from_fn(|_| vec![Tile::EMPTY; width * height]),
            palette: AutotilePalette::from_config(config),
            door_sprites: config.door_types.clone(),
            collision_rects: Vec::new(),
            hazard_rects: Vec::new(),
            dirty: true,
            rebuilds: 0,
            show_grid: false,
            show_ids: false,
        }
    }

    /// Width in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile edge in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Level size in pixels.
    pub fn pixel_size(&self) -> (i32, i32) {
        let ts = self.tile_size as i32;
        (self.width as i32 * ts, self.height as i32 * ts)
    }

    /// Palette used by [`Tilemap::apply_autotiling`].
    pub fn palette(&self) -> &AutotilePalette {
        &self.palette
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Whether `(x, y)` lies inside the map.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    /// `None` outside the map.
    pub fn get_tile(&self, layer: TileLayer, x: i32, y: i32) -> Option<&Tile> {
        let i = self.index(x, y)?;
        self.layers[layer.index()].get(i)
    }

    /// Writes are ignored outside the map. SOLID and HAZARD writes mark the cache dirty.
    pub fn set_tile(&mut self, layer: TileLayer, x: i32, y: i32, tile: Tile) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        self.layers[layer.index()][i] = tile;
        if layer.affects_cache() {
            self.dirty = true;
        }
    }

    /// Writes a tile whose physical flags come from `kind`'s property table.
    pub fn set_tile_by_id(
        &mut self,
        layer: TileLayer,
        x: i32,
        y: i32,
        kind: TileKind,
        sprite_row: u32,
        sprite_col: u32,
    ) {
        self.set_tile(layer, x, y, Tile::new(kind, sprite_row, sprite_col));
    }

    /// Row-major cells of one layer.
    pub fn layer(&self, layer: TileLayer) -> &[Tile] {
        &self.layers[layer.index()]
    }

    /// Non-empty cells on `layer`.
    pub fn count_tiles(&self, layer: TileLayer) -> usize {
        self.layer(layer).iter().filter(|t| !t.is_empty()).count()
    }

    /// Resets every cell of `layer` to empty.
    pub fn clear_layer(&mut self, layer: TileLayer) {
        self.layers[layer.index()].fill(Tile::EMPTY);
        if layer.affects_cache() {
            self.dirty = true;
        }
    }

    /// Empties every layer.
    pub fn clear_all(&mut self) {
        for layer in TileLayer::ALL {
            self.clear_layer(layer);
        }
        info!("Tilemap cleared");
    }

    /// Writes an autotiled tile for every occupied cell of `pattern`.
    ///
    /// Unoccupied cells are left untouched. Ground groups write
    /// [`TileKind::GroundBase`], wall groups [`TileKind::WallBasic`].
    pub fn apply_autotiling(
        &mut self,
        layer: TileLayer,
        group: AutotileType,
        pattern: &OccupancyGrid,
    ) -> AutotileGrid {
        let grid = generate_autotile_grid(pattern);
        let kind = match group {
            AutotileType::Ground => TileKind::GroundBase,
            AutotileType::Walls => TileKind::WallBasic,
        };
        let mut written = 0usize;
        for (x, y, index) in grid.resolved() {
            let (row, col) = self.palette.tile_coords(group, index);
            self.set_tile(layer, x as i32, y as i32, Tile::new(kind, row, col));
            written += 1;
        }
        debug!(
            "Autotiled {} {} tiles on {} layer",
            written,
            group.name(),
            layer.name()
        );
        grid
    }

    /// Places a solid door on the SOLID layer. Returns `false` for an
    /// unknown door type or a position outside the map.
    pub fn place_door(&mut self, x: i32, y: i32, door_type: &str) -> bool {
        let (Some(door), Some(sprite)) = (
            DoorType::from_name(door_type),
            self.door_sprites.get(door_type).copied(),
        ) else {
            warn!("Unknown door type '{}'", door_type);
            return false;
        };
        if !self.in_bounds(x, y) {
            return false;
        }
        self.set_tile_by_id(TileLayer::Solid, x, y, door.tile_kind(), sprite.row, sprite.col);
        true
    }

    /// Pixel rectangle covered by tile `(x, y)`.
    pub fn tile_rect(&self, x: i32, y: i32) -> Rect {
        let ts = self.tile_size as i32;
        Rect::new(x * ts, y * ts, ts, ts)
    }

    /// Tile containing a world pixel position.
    pub fn world_to_tile(&self, world_x: f32, world_y: f32) -> (i32, i32) {
        let ts = self.tile_size as f32;
        ((world_x / ts).floor() as i32, (world_y / ts).floor() as i32)
    }

    /// Top-left pixel of a tile.
    pub fn tile_to_world(&self, tile_x: i32, tile_y: i32) -> (i32, i32) {
        let ts = self.tile_size as i32;
        (tile_x * ts, tile_y * ts)
    }

    /// Whether the collision cache is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of times the rectangle cache has been rebuilt.
    pub fn cache_rebuilds(&self) -> u64 {
        self.rebuilds
    }

    fn refresh_cache(&mut self) {
        if !self.dirty {
            return;
        }
        self.collision_rects.clear();
        self.hazard_rects.clear();

        let solid = &self.layers[TileLayer::Solid.index()];
        let hazard = &self.layers[TileLayer::Hazard.index()];
        let ts = self.tile_size as i32;
        for y in 0..self.height {
            for x in 0..self.width {
                let i = y * self.width + x;
                let rect = Rect::new(x as i32 * ts, y as i32 * ts, ts, ts);
                if solid[i].solid {
                    self.collision_rects.push(rect);
                }
                if hazard[i].hazard {
                    self.hazard_rects.push((rect, hazard[i].damage));
                }
            }
        }

        self.dirty = false;
        self.rebuilds += 1;
        debug!(
            "Collision cache rebuilt: {} solid, {} hazard",
            self.collision_rects.len(),
            self.hazard_rects.len()
        );
    }

    /// One rectangle per solid tile, rebuilt first if stale.
    pub fn collision_rects(&mut self) -> &[Rect] {
        self.refresh_cache();
        &self.collision_rects
    }

    /// Hazard rectangles with their damage, rebuilt first if stale.
    pub fn hazard_rects(&mut self) -> &[(Rect, i32)] {
        self.refresh_cache();
        &self.hazard_rects
    }

    /// Whether `rect` overlaps any solid tile.
    pub fn check_collision(&mut self, rect: &Rect) -> bool {
        self.collision_rects().iter().any(|r| r.overlaps(rect))
    }

    /// Summed damage of every hazard tile overlapping `rect`.
    pub fn check_hazard_collision(&mut self, rect: &Rect) -> i32 {
        self.hazard_rects()
            .iter()
            .filter(|(r, _)| r.overlaps(rect))
            .map(|(_, damage)| damage)
            .sum()
    }

    /// Whether grid lines are drawn.
    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    /// Whether solid tile ids are drawn.
    pub fn show_ids(&self) -> bool {
        self.show_ids
    }

    /// Turns the grid lines and the id labels on or off.
    pub fn set_debug_overlay(&mut self, grid: bool, ids: bool) {
        self.show_grid = grid;
        self.show_ids = ids;
    }

    /// Flips both overlays together; returns the new state.
    pub fn toggle_debug(&mut self) -> bool {
        let on = !(self.show_grid || self.show_ids);
        self.set_debug_overlay(on, on);
        on
    }

    /// Draws the tiles overlapping the surface's viewport, SOLID then DECOR
    /// then HAZARD. `camera_offset` is the world pixel at the surface's
    /// top-left corner.
    pub fn render<S: Surface>(
        &self,
        surface: &mut S,
        atlas: &SpriteAtlas<S::Image>,
        camera_offset: (i32, i32),
    ) {
        let ts = self.tile_size as i32;
        let region = visible_tile_region(camera_offset, surface.size(), ts, self.width, self.height);
        if region.is_empty() {
            return;
        }

        for layer in TileLayer::RENDER_ORDER {
            let cells = &self.layers[layer.index()];
            for (x, y) in region.cells() {
                let tile = &cells[y * self.width + x];
                if tile.is_empty() {
                    continue;
                }
                let sx = x as i32 * ts - camera_offset.0;
                let sy = y as i32 * ts - camera_offset.1;
                match atlas.get_tile(tile.sprite_row, tile.sprite_col) {
                    Some(image) => surface.blit(image, sx, sy),
                    None => surface.draw_rect(
                        Rect::new(sx, sy, ts, ts),
                        PLACEHOLDER_COLOR,
                        RectStyle::Filled,
                    ),
                }
            }
        }

        if self.show_grid {
            let left = region.start_x as i32 * ts - camera_offset.0;
            let top = region.start_y as i32 * ts - camera_offset.1;
            let span_w = region.width() as i32 * ts;
            let span_h = region.height() as i32 * ts;
            for x in region.start_x..=region.end_x {
                let sx = x as i32 * ts - camera_offset.0;
                surface.draw_rect(Rect::new(sx, top, 1, span_h), GRID_LINE_COLOR, RectStyle::Filled);
            }
            for y in region.start_y..=region.end_y {
                let sy = y as i32 * ts - camera_offset.1;
                surface.draw_rect(Rect::new(left, sy, span_w, 1), GRID_LINE_COLOR, RectStyle::Filled);
            }
        }

        if self.show_ids {
            let solid = &self.layers[TileLayer::Solid.index()];
            for (x, y) in region.cells() {
                let tile = &solid[y * self.width + x];
                if tile.is_empty() {
                    continue;
                }
                let sx = x as i32 * ts - camera_offset.0 + 2;
                let sy = y as i32 * ts - camera_offset.1 + 2;
                surface.draw_label(&tile.kind.id().to_string(), sx, sy, WHITE);
            }
        }
    }

    /// Numeric id grid of one layer, one line per row.
    pub fn to_csv(&self, layer: TileLayer) -> String {
        json_loader::encode_csv(self.width, self.height, self.layer(layer))
    }

    /// The map in its JSON save format.
    pub fn to_json_string(&self) -> Result<String> {
        json_loader::encode_map(self.width, self.height, &self.layers)
    }

    /// Writes the map as JSON. The path must end in `.json`.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        json_loader::encode_map_file(path, self.width, self.height, &self.layers)?;
        info!("Tilemap saved: {}", path.display());
        Ok(())
    }

    /// Writes the ids of one layer as CSV.
    pub fn save_csv<P: AsRef<Path>>(&self, path: P, layer: TileLayer) -> Result<()> {
        json_loader::write_text(path.as_ref(), &self.to_csv(layer))
    }

    /// Replaces the map with the contents of `path`. On error the map is
    /// left exactly as it was.
    pub fn load_json<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let decoded = json_loader::decode_map_file(path)?;
        self.replace_contents(decoded);
        info!("Tilemap loaded: {} ({}x{})", path.display(), self.width, self.height);
        Ok(())
    }

    /// Replaces the map with a JSON document; the map is untouched on error.
    pub fn load_json_str(&mut self, json: &str) -> Result<()> {
        let decoded = json_loader::decode_map_str(json)?;
        self.replace_contents(decoded);
        Ok(())
    }

    fn replace_contents(&mut self, decoded: DecodedMap) {
        self.width = decoded.width;
        self.height = decoded.height;
        self.layers = decoded.layers;
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_access_is_absorbed() {
        let mut map = Tilemap::new(4, 3);
        assert!(map.get_tile(TileLayer::Solid, -1, 0).is_none());
        assert!(map.get_tile(TileLayer::Solid, 4, 0).is_none());
        assert!(map.get_tile(TileLayer::Solid, 0, 3).is_none());

        map.set_tile(TileLayer::Solid, 10, 10, Tile::of_kind(TileKind::WallBasic));
        assert!(map.collision_rects().is_empty());
        assert_eq!(map.get_tile(TileLayer::Decor, 3, 2), Some(&Tile::EMPTY));
    }

    #[test]
    fn set_tile_by_id_derives_flags() {
        let mut map = Tilemap::new(3, 3);
        map.set_tile_by_id(TileLayer::Hazard, 1, 1, TileKind::LaserTrap, 7, 0);
        let t = map.get_tile(TileLayer::Hazard, 1, 1).unwrap();
        assert!(t.hazard);
        assert_eq!(t.damage, 15);
        assert_eq!((t.sprite_row, t.sprite_col), (7, 0));
    }

    #[test]
    fn cache_rebuilds_once_per_batch() {
        let mut map = Tilemap::new(8, 8);
        assert_eq!(map.collision_rects().len(), 0);
        let before = map.cache_rebuilds();

        for x in 0..8 {
            map.set_tile_by_id(TileLayer::Solid, x, 7, TileKind::GroundBase, 0, 0);
        }
        assert!(map.is_dirty());
        assert_eq!(map.collision_rects().len(), 8);
        assert_eq!(map.hazard_rects().len(), 0);
        assert_eq!(map.cache_rebuilds(), before + 1);
    }

    #[test]
    fn decor_writes_leave_cache_clean() {
        let mut map = Tilemap::new(4, 4);
        map.collision_rects();
        let before = map.cache_rebuilds();
        map.set_tile(TileLayer::Decor, 1, 1, Tile::of_kind(TileKind::Terminal));
        assert!(!map.is_dirty());
        map.collision_rects();
        assert_eq!(map.cache_rebuilds(), before);
    }

    #[test]
    fn hazard_damage_is_summed() {
        let mut map = Tilemap::new(6, 6);
        map.set_tile_by_id(TileLayer::Hazard, 1, 1, TileKind::SpikeTrap, 7, 1);
        map.set_tile_by_id(TileLayer::Hazard, 2, 1, TileKind::LaserTrap, 7, 0);
        map.set_tile_by_id(TileLayer::Hazard, 4, 4, TileKind::SpikeTrap, 7, 1);

        // spans tiles (1,1) and (2,1)
        let probe = Rect::new(40, 40, 40, 10);
        assert_eq!(map.check_hazard_collision(&probe), 25);
        assert_eq!(map.check_hazard_collision(&Rect::new(0, 0, 8, 8)), 0);
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let mut map = Tilemap::new(4, 4);
        map.set_tile_by_id(TileLayer::Solid, 1, 1, TileKind::WallBasic, 2, 0);
        assert!(!map.check_collision(&Rect::new(0, 0, 32, 32)));
        assert!(map.check_collision(&Rect::new(31, 31, 2, 2)));
    }

    #[test]
    fn autotiling_an_empty_pattern_writes_nothing() {
        let mut map = Tilemap::new(5, 5);
        map.set_tile_by_id(TileLayer::Solid, 2, 2, TileKind::WallReinforced, 3, 0);
        let grid = map.apply_autotiling(TileLayer::Solid, AutotileType::Ground, &OccupancyGrid::new(5, 5));
        assert!(grid.is_all_empty());
        assert_eq!(map.count_tiles(TileLayer::Solid), 1);
        assert_eq!(map.get_tile(TileLayer::Solid, 2, 2).unwrap().kind, TileKind::WallReinforced);
    }

    #[test]
    fn autotiling_uses_palette_rows() {
        let mut map = Tilemap::new(5, 5);
        let pattern = OccupancyGrid::from_rows(&[[true; 5]; 5]);
        map.apply_autotiling(TileLayer::Solid, AutotileType::Walls, &pattern);
        let centre = map.get_tile(TileLayer::Solid, 2, 2).unwrap();
        assert_eq!(centre.kind, TileKind::WallBasic);
        assert!(centre.solid);
        // index 24 on a 16-wide sheet starting at row 10
        assert_eq!((centre.sprite_row, centre.sprite_col), (11, 8));
    }

    #[test]
    fn doors_are_solid_and_unknown_types_ignored() {
        let mut map = Tilemap::new(4, 4);
        assert!(map.place_door(1, 3, "electronic"));
        let door = map.get_tile(TileLayer::Solid, 1, 3).unwrap();
        assert_eq!(door.kind, TileKind::DoorElectronic);
        assert_eq!((door.sprite_row, door.sprite_col), (5, 2));
        assert!(door.solid);

        assert!(!map.place_door(2, 3, "portal"));
        assert!(!map.place_door(9, 9, "standard"));
        assert_eq!(map.count_tiles(TileLayer::Solid), 1);
    }

    #[test]
    fn coordinate_conversions_floor_negative_positions() {
        let map = Tilemap::new(4, 4);
        assert_eq!(map.world_to_tile(33.0, 95.9), (1, 2));
        assert_eq!(map.world_to_tile(-1.0, 0.0), (-1, 0));
        assert_eq!(map.tile_to_world(3, 2), (96, 64));
    }

    #[test]
    fn failed_load_keeps_previous_map() {
        let mut map = Tilemap::new(3, 3);
        map.set_tile_by_id(TileLayer::Solid, 0, 0, TileKind::WallBasic, 2, 0);
        let bad = r#"{"width":2,"height":2,"layers":{"solid":[[{"id":1}]]}}"#;
        assert!(map.load_json_str(bad).is_err());
        assert_eq!((map.width(), map.height()), (3, 3));
        assert_eq!(map.get_tile(TileLayer::Solid, 0, 0).unwrap().kind, TileKind::WallBasic);
    }

    #[test]
    fn load_marks_cache_dirty() {
        let mut map = Tilemap::new(2, 1);
        map.set_tile_by_id(TileLayer::Solid, 0, 0, TileKind::WallBasic, 2, 0);
        let json = map.to_json_string().unwrap();

        let mut other = Tilemap::new(2, 1);
        assert!(other.collision_rects().is_empty());
        other.load_json_str(&json).unwrap();
        assert!(other.is_dirty());
        assert_eq!(other.collision_rects(), &[Rect::new(0, 0, 32, 32)]);
    }
}
