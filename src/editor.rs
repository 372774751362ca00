//! In-game paint/erase overlay working directly on a [`Tilemap`].

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use macroquad::color::{Color, GREEN, RED, WHITE, YELLOW};

use crate::config::EditorConfig;
use crate::error::{Result, WorldError};
use crate::geom::Rect;
use crate::render::{RectStyle, Surface};
use crate::tile::{TileKind, TileLayer};
use crate::tilemap::Tilemap;

/// Brush selection slots, addressed by number keys.
pub const TILE_SLOTS: [TileKind; 9] = [
    TileKind::Empty,
    TileKind::GroundBase,
    TileKind::GroundWorn,
    TileKind::WallBasic,
    TileKind::WallReinforced,
    TileKind::DoorStandard,
    TileKind::Terminal,
    TileKind::LaserTrap,
    TileKind::SpikeTrap,
];

/// Largest brush edge in tiles.
pub const MAX_BRUSH: i32 = 5;

const PANEL_SIZE: (i32, i32) = (250, 150);
const PANEL_COLOR: Color = Color::new(40.0 / 255.0, 40.0 / 255.0, 40.0 / 255.0, 200.0 / 255.0);
const INFO_COLOR: Color = Color::new(0.0, 0.0, 0.0, 220.0 / 255.0);
const INFO_WIDTH: i32 = 200;
const LINE_HEIGHT: i32 = 16;

/// Mouse buttons the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Paints with the current tile.
    Paint,
    /// Erases on the current layer.
    Erase,
}

/// Input understood by the editor. Pointer positions are in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// Shows or hides the editor.
    ToggleEditor,
    /// Grid and id overlay on the map.
    ToggleDebugDisplay,
    /// JSON plus one CSV per layer.
    Save,
    /// Replaces the map with the saved file.
    Load,
    /// SOLID, DECOR, HAZARD, then back.
    CycleLayer,
    /// Index into [`TILE_SLOTS`].
    SelectSlot(usize),
    /// Brush edge in tiles, clamped.
    SetBrushSize(i32),
    /// Screen position in pixels.
    PointerMoved {
        /// Horizontal pixel.
        x: i32,
        /// Vertical pixel.
        y: i32,
    },
    /// Starts painting or erasing.
    PointerPressed(PointerButton),
    /// Stops painting or erasing.
    PointerReleased(PointerButton),
    /// Empties every layer.
    ClearMap,
}

/// Editor state. Inactive editors ignore pointer input.
#[derive(Debug, Clone)]
pub struct TilemapEditor {
    active: bool,
    layer: TileLayer,
    tile: TileKind,
    brush_size: i32,
    pointer: (i32, i32),
    hovered: (i32, i32),
    painting: bool,
    erasing: bool,
    maps_directory: PathBuf,
    map_file: String,
}

impl TilemapEditor {
    /// Inactive editor painting slot 1 on the SOLID layer.
    pub fn new(config: &EditorConfig) -> Self {
        TilemapEditor {
            active: false,
            layer: TileLayer::Solid,
            tile: TileKind::GroundBase,
            brush_size: 1,
            pointer: (0, 0),
            hovered: (0, 0),
            painting: false,
            erasing: false,
            maps_directory: PathBuf::from(&config.maps_directory),
            map_file: config.map_file.clone(),
        }
    }

    /// Whether the editor takes input.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Shows or hides the editor.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.painting = false;
            self.erasing = false;
        }
        info!("Editor mode: {}", if active { "ON" } else { "OFF" });
    }

    /// Layer being painted.
    pub fn current_layer(&self) -> TileLayer {
        self.layer
    }

    /// Kind stamped by [`TilemapEditor::paint`].
    pub fn current_tile(&self) -> TileKind {
        self.tile
    }

    /// Brush edge in tiles.
    pub fn brush_size(&self) -> i32 {
        self.brush_size
    }

    /// Clamped to `1..=MAX_BRUSH`.
    pub fn set_brush_size(&mut self, size: i32) {
        self.brush_size = size.clamp(1, MAX_BRUSH);
        debug!("Brush size: {}", self.brush_size);
    }

    /// Tile under the pointer.
    pub fn hovered_tile(&self) -> (i32, i32) {
        self.hovered
    }

    /// Whether a paint drag is in progress.
    pub fn is_painting(&self) -> bool {
        self.painting
    }

    /// Whether an erase drag is in progress.
    pub fn is_erasing(&self) -> bool {
        self.erasing
    }

    /// Changes the file used by save and load.
    pub fn set_map_file(&mut self, file: &str) {
        self.map_file = file.to_owned();
        info!("Editor map file: {}", file);
    }

    /// JSON file used by save and load.
    pub fn map_path(&self) -> PathBuf {
        self.maps_directory.join(&self.map_file)
    }

    /// `<map stem>_<layer>.csv` next to the map file.
    pub fn csv_path(&self, layer: TileLayer) -> PathBuf {
        let stem = Path::new(&self.map_file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.map_file.clone());
        self.maps_directory.join(format!("{}_{}.csv", stem, layer.name()))
    }

    /// Moves to the next layer.
    pub fn cycle_layer(&mut self) {
        self.layer = self.layer.next();
        debug!("Editor layer: {}", self.layer.name());
    }

    /// Selects `TILE_SLOTS[slot]`; out-of-range slots are ignored.
    pub fn select_slot(&mut self, slot: usize) -> bool {
        match TILE_SLOTS.get(slot) {
            Some(&kind) => {
                self.tile = kind;
                debug!("Editor tile: {} (slot {})", kind.name(), slot);
                true
            }
            None => false,
        }
    }

    /// Tracks the pointer and the tile under it, camera offset included.
    pub fn update_pointer(&mut self, x: i32, y: i32, map: &Tilemap, camera_offset: (i32, i32)) {
        let ts = map.tile_size() as i32;
        self.pointer = (x, y);
        self.hovered = (
            (x + camera_offset.0).div_euclid(ts),
            (y + camera_offset.1).div_euclid(ts),
        );
    }

    /// Tiles covered by a brush centred on the hovered tile.
    pub fn brush_cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let lo = -(self.brush_size - 1) / 2;
        let hi = self.brush_size / 2;
        let (cx, cy) = self.hovered;
        (lo..=hi).flat_map(move |dy| (lo..=hi).map(move |dx| (cx + dx, cy + dy)))
    }

    fn stamp(&self, map: &mut Tilemap, kind: TileKind) {
        if !self.active || !map.in_bounds(self.hovered.0, self.hovered.1) {
            return;
        }
        let (row, col) = kind.default_sprite();
        for (x, y) in self.brush_cells() {
            map.set_tile_by_id(self.layer, x, y, kind, row, col);
        }
    }

    /// Stamps the current tile under the brush.
    pub fn paint(&self, map: &mut Tilemap) {
        self.stamp(map, self.tile);
    }

    /// Empties the brush cells on the current layer.
    pub fn erase(&self, map: &mut Tilemap) {
        self.stamp(map, TileKind::Empty);
    }

    /// Empties every layer.
    pub fn clear_map(&self, map: &mut Tilemap) {
        map.clear_all();
    }

    /// Writes the map as JSON plus one CSV per layer.
    pub fn save_map(&self, map: &Tilemap) -> Result<PathBuf> {
        let path = self.map_path();
        map.save_json(&path)?;
        for layer in TileLayer::ALL {
            map.save_csv(self.csv_path(layer), layer)?;
        }
        Ok(path)
    }

    /// Replaces `map` with the saved file; `map` is untouched on error.
    pub fn load_map(&self, map: &mut Tilemap) -> Result<PathBuf> {
        let path = self.map_path();
        map.load_json(&path)?;
        Ok(path)
    }

    /// Applies one input. Save and load failures are logged and returned;
    /// the map is never left half-loaded.
    pub fn apply(
        &mut self,
        action: EditorAction,
        map: &mut Tilemap,
        camera_offset: (i32, i32),
    ) -> Result<()> {
        match action {
            EditorAction::ToggleEditor => self.set_active(!self.active),
            EditorAction::ToggleDebugDisplay => {
                let on = map.toggle_debug();
                info!("Debug display: {}", if on { "ON" } else { "OFF" });
            }
            EditorAction::Save => {
                if let Err(e) = self.save_map(map) {
                    error!("Saving map failed: {}", e);
                    return Err(e);
                }
            }
            EditorAction::Load => match self.load_map(map) {
                Ok(_) => {}
                Err(e @ WorldError::MapNotFound(_)) => {
                    warn!("{}", e);
                    return Err(e);
                }
                Err(e) => {
                    error!("Loading map failed: {}", e);
                    return Err(e);
                }
            },
            EditorAction::CycleLayer => self.cycle_layer(),
            EditorAction::SelectSlot(slot) => {
                self.select_slot(slot);
            }
            EditorAction::SetBrushSize(size) => self.set_brush_size(size),
            EditorAction::PointerMoved { x, y } => {
                if self.active {
                    self.update_pointer(x, y, map, camera_offset);
                    if self.painting {
                        self.paint(map);
                    } else if self.erasing {
                        self.erase(map);
                    }
                }
            }
            EditorAction::PointerPressed(button) => {
                if self.active {
                    match button {
                        PointerButton::Paint => {
                            self.painting = true;
                            self.paint(map);
                        }
                        PointerButton::Erase => {
                            self.erasing = true;
                            self.erase(map);
                        }
                    }
                }
            }
            EditorAction::PointerReleased(PointerButton::Paint) => self.painting = false,
            EditorAction::PointerReleased(PointerButton::Erase) => self.erasing = false,
            EditorAction::ClearMap => self.clear_map(map),
        }
        Ok(())
    }

    /// Panel, hover info and brush cursor. Draws nothing unless the editor
    /// or the map's debug overlay is on.
    pub fn render_ui<S: Surface>(&self, surface: &mut S, map: &Tilemap, camera_offset: (i32, i32)) {
        let debug = map.show_grid() || map.show_ids();
        if !self.active && !debug {
            return;
        }
        if self.active {
            self.render_panel(surface);
        }
        if debug {
            self.render_hover_info(surface, map);
        }
        if self.active {
            self.render_cursor(surface, map, camera_offset);
        }
    }

    fn render_panel<S: Surface>(&self, surface: &mut S) {
        let (sw, _) = surface.size();
        let (px, py) = (sw - PANEL_SIZE.0 - 10, 10);
        surface.draw_rect(Rect::new(px, py, PANEL_SIZE.0, PANEL_SIZE.1), PANEL_COLOR, RectStyle::Filled);

        let x = px + 10;
        surface.draw_label("TILEMAP EDITOR", x, py + 10, YELLOW);
        let lines = [
            format!("Layer: {}", self.layer.name()),
            format!("Tile: {}", self.tile.name()),
            format!("Mouse: ({}, {})", self.hovered.0, self.hovered.1),
            format!("Brush: {}x{}", self.brush_size, self.brush_size),
        ];
        for (i, line) in lines.iter().enumerate() {
            surface.draw_label(line, x, py + 35 + i as i32 * 18, WHITE);
        }
    }

    fn render_hover_info<S: Surface>(&self, surface: &mut S, map: &Tilemap) {
        let (tx, ty) = self.hovered;
        if !map.in_bounds(tx, ty) {
            return;
        }
        let mut lines = vec![format!("Tile: ({}, {})", tx, ty)];
        for layer in TileLayer::ALL {
            let Some(tile) = map.get_tile(layer, tx, ty).filter(|t| !t.is_empty()) else {
                continue;
            };
            lines.push(format!("{}: {}", layer.name(), tile.kind.name()));
            if tile.solid {
                lines.push("  [SOLID]".to_owned());
            }
            if tile.hazard {
                lines.push(format!("  [HAZARD: {}]", tile.damage));
            }
        }

        let (sw, _) = surface.size();
        let (mx, my) = self.pointer;
        let h = lines.len() as i32 * LINE_HEIGHT + 10;
        let mut bx = mx + 15;
        let mut by = my - h - 10;
        if bx + INFO_WIDTH > sw {
            bx = mx - INFO_WIDTH - 15;
        }
        if by < 0 {
            by = my + 15;
        }
        surface.draw_rect(Rect::new(bx, by, INFO_WIDTH, h), INFO_COLOR, RectStyle::Filled);
        for (i, line) in lines.iter().enumerate() {
            surface.draw_label(line, bx + 5, by + 5 + i as i32 * LINE_HEIGHT, WHITE);
        }
    }

    fn render_cursor<S: Surface>(&self, surface: &mut S, map: &Tilemap, camera_offset: (i32, i32)) {
        let ts = map.tile_size() as i32;
        let color = if self.painting {
            GREEN
        } else if self.erasing {
            RED
        } else {
            YELLOW
        };
        let lo = -(self.brush_size - 1) / 2;
        let size = self.brush_size * ts;
        let sx = (self.hovered.0 + lo) * ts - camera_offset.0;
        let sy = (self.hovered.1 + lo) * ts - camera_offset.1;
        surface.draw_rect(Rect::new(sx, sy, size, size), color, RectStyle::Outline(2.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> TilemapEditor {
        let mut e = TilemapEditor::new(&EditorConfig::default());
        e.set_active(true);
        e
    }

    #[test]
    fn brush_is_centred_and_exactly_sized() {
        let map = Tilemap::new(20, 20);
        let mut e = editor();
        e.update_pointer(5 * 32, 5 * 32, &map, (0, 0));
        for size in 1..=MAX_BRUSH {
            e.set_brush_size(size);
            let cells: Vec<_> = e.brush_cells().collect();
            assert_eq!(cells.len(), (size * size) as usize);
            assert!(cells.contains(&(5, 5)));
        }
        e.set_brush_size(9);
        assert_eq!(e.brush_size(), MAX_BRUSH);
        e.set_brush_size(0);
        assert_eq!(e.brush_size(), 1);
    }

    #[test]
    fn pointer_accounts_for_camera() {
        let map = Tilemap::new(50, 50);
        let mut e = editor();
        e.update_pointer(10, 10, &map, (64, 96));
        assert_eq!(e.hovered_tile(), (2, 3));
    }

    #[test]
    fn painting_uses_layer_and_slot() {
        let mut map = Tilemap::new(10, 10);
        let mut e = editor();
        let off = (0, 0);
        e.apply(EditorAction::CycleLayer, &mut map, off).unwrap();
        e.apply(EditorAction::CycleLayer, &mut map, off).unwrap();
        assert_eq!(e.current_layer(), TileLayer::Hazard);
        e.apply(EditorAction::SelectSlot(8), &mut map, off).unwrap();
        e.apply(EditorAction::PointerMoved { x: 70, y: 70 }, &mut map, off).unwrap();
        e.apply(EditorAction::PointerPressed(PointerButton::Paint), &mut map, off).unwrap();

        let t = map.get_tile(TileLayer::Hazard, 2, 2).unwrap();
        assert_eq!(t.kind, TileKind::SpikeTrap);
        assert_eq!(t.damage, 10);
        assert_eq!(map.check_hazard_collision(&Rect::new(64, 64, 4, 4)), 10);

        e.apply(EditorAction::PointerPressed(PointerButton::Erase), &mut map, off).unwrap();
        assert!(map.get_tile(TileLayer::Hazard, 2, 2).unwrap().is_empty());
    }

    #[test]
    fn inactive_editor_does_not_paint() {
        let mut map = Tilemap::new(4, 4);
        let mut e = TilemapEditor::new(&EditorConfig::default());
        e.apply(EditorAction::PointerMoved { x: 0, y: 0 }, &mut map, (0, 0)).unwrap();
        e.apply(EditorAction::PointerPressed(PointerButton::Paint), &mut map, (0, 0)).unwrap();
        assert_eq!(map.count_tiles(TileLayer::Solid), 0);
        assert!(!e.is_painting());
    }

    #[test]
    fn slot_out_of_range_keeps_selection() {
        let mut e = editor();
        assert!(!e.select_slot(9));
        assert_eq!(e.current_tile(), TileKind::GroundBase);
        assert!(e.select_slot(0));
        assert_eq!(e.current_tile(), TileKind::Empty);
    }

    #[test]
    fn csv_paths_follow_map_name() {
        let mut e = editor();
        e.set_map_file("level_1.json");
        assert_eq!(e.csv_path(TileLayer::Decor), Path::new("assets/maps/level_1_decor.csv"));
    }
}
