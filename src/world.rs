//! Per-level facade tying the map, camera, backdrop, generator and editor
//! together for gameplay code.

use std::path::Path;

use log::{error, info, warn};
use macroquad::color::{Color, WHITE};
use macroquad::math::{vec2, Vec2};
use macroquad::texture::{Image, Texture2D};

use crate::atlas::SpriteAtlas;
use crate::camera::Camera;
use crate::config::TilemapConfig;
use crate::editor::{EditorAction, TilemapEditor};
use crate::error::Result;
use crate::generator::{MapGenerator, RoomReport};
use crate::geom::Rect;
use crate::parallax::{ParallaxBackground, ParallaxLayer, ParallaxManager};
use crate::render::{RectStyle, Surface};
use crate::tile::TileLayer;
use crate::tilemap::Tilemap;

const DEFAULT_BACKGROUND: &str = "default";
const DEBUG_PANEL_COLOR: Color = Color::new(0.0, 0.0, 0.0, 0.6);

/// Input accepted by [`WorldManager::handle_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldAction {
    /// Forwarded to the editor.
    Editor(EditorAction),
    /// Shows or hides the info panel.
    ToggleDebugInfo,
    /// Turns the backdrop on or off.
    ToggleParallax,
    /// Clears the map and builds a fresh test room.
    Regenerate,
}

impl From<EditorAction> for WorldAction {
    fn from(action: EditorAction) -> Self {
        WorldAction::Editor(action)
    }
}

/// Snapshot of the world for HUDs and logs.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldInfo {
    /// In tiles.
    pub map_size: (usize, usize),
    /// Tile edge in pixels.
    pub tile_size: u32,
    /// Level size in pixels.
    pub pixel_size: (i32, i32),
    /// Camera top-left in world pixels.
    pub camera_position: Vec2,
    /// Non-empty SOLID cells.
    pub solid_tiles: usize,
    /// Non-empty DECOR cells.
    pub decor_tiles: usize,
    /// Non-empty HAZARD cells.
    pub hazard_tiles: usize,
    /// Cached collision rectangles.
    pub collision_rects: usize,
    /// Cached hazard rectangles.
    pub hazard_rects: usize,
    /// Whether the editor is shown.
    pub editor_active: bool,
    /// Whether the backdrop draws.
    pub parallax_enabled: bool,
    /// Generator seed, for reproducing the level.
    pub seed: u64,
}

/// One active level. `I` is the image type of the atlas and backdrop:
/// `Image` right after loading, `Texture2D` once [`WorldManager::upload`]ed.
#[derive(Debug, Clone)]
pub struct WorldManager<I = Texture2D> {
    config: TilemapConfig,
    tilemap: Tilemap,
    camera: Camera,
    parallax: ParallaxManager<I>,
    generator: MapGenerator,
    editor: TilemapEditor,
    atlas: SpriteAtlas<I>,
    initialized: bool,
    show_debug: bool,
    last_report: RoomReport,
}

impl WorldManager<Image> {
    /// Loads the spritesheet and configured backdrop. Missing images are
    /// replaced by placeholders.
    pub fn new(
        config: TilemapConfig,
        screen_w: f32,
        screen_h: f32,
        map_w: usize,
        map_h: usize,
    ) -> Self {
        let atlas = SpriteAtlas::load(&config.spritesheet, config.tile_size);
        let mut parallax = ParallaxManager::new();
        parallax.add_background(DEFAULT_BACKGROUND, ParallaxBackground::from_config(&config.parallax));
        Self::with_assets(config, atlas, parallax, (screen_w, screen_h), (map_w, map_h))
    }

    /// Moves the atlas and backdrop images to the GPU.
    pub fn upload(&self) -> WorldManager<Texture2D> {
        WorldManager {
            config: self.config.clone(),
            tilemap: self.tilemap.clone(),
            camera: self.camera.clone(),
            parallax: self.parallax.upload(),
            generator: self.generator.clone(),
            editor: self.editor.clone(),
            atlas: self.atlas.upload(),
            initialized: self.initialized,
            show_debug: self.show_debug,
            last_report: self.last_report,
        }
    }
}

impl<I> WorldManager<I> {
    /// World around already loaded assets. `screen` is the viewport size, `map` the size in tiles.
    pub fn with_assets(
        config: TilemapConfig,
        atlas: SpriteAtlas<I>,
        parallax: ParallaxManager<I>,
        screen: (f32, f32),
        map: (usize, usize),
    ) -> Self {
        let tilemap = Tilemap::with_config(map.0, map.1, &config);
        let camera = Camera::from_config(screen.0, screen.1, &config.camera);
        let generator = MapGenerator::from_config(&config.generator);
        let editor = TilemapEditor::new(&config.editor);
        WorldManager {
            config,
            tilemap,
            camera,
            parallax,
            generator,
            editor,
            atlas,
            initialized: false,
            show_debug: false,
            last_report: RoomReport::default(),
        }
    }

    /// Generates the first room and centres the camera on it. Calling it
    /// again does nothing.
    pub fn initialize(&mut self) -> bool {
        if self.initialized {
            warn!("World already initialized");
            return false;
        }
        self.generate_room();
        let bounds = self.level_bounds();
        self.camera.center_on(bounds / 2.0, Some(bounds));
        self.initialized = true;
        info!(
            "World initialized: {}x{} tiles, seed {}",
            self.tilemap.width(),
            self.tilemap.height(),
            self.generator.seed()
        );
        true
    }

    /// Whether [`WorldManager::initialize`] has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn generate_room(&mut self) -> RoomReport {
        let (w, h) = (self.tilemap.width(), self.tilemap.height());
        self.last_report = self.generator.generate_test_room(&mut self.tilemap, w, h);
        self.last_report
    }

    /// Clears the map and builds a new test room.
    pub fn regenerate(&mut self) -> RoomReport {
        self.tilemap.clear_all();
        self.generate_room()
    }

    /// What the last generation pass placed.
    pub fn last_room_report(&self) -> RoomReport {
        self.last_report
    }

    fn level_bounds(&self) -> Vec2 {
        let (pw, ph) = self.tilemap.pixel_size();
        vec2(pw as f32, ph as f32)
    }

    /// Per-frame step: the camera chases `player` within the level.
    pub fn update(&mut self, dt: f32, player: Vec2) {
        let bounds = self.level_bounds();
        self.camera.update(dt, player, Some(bounds));
    }

    /// Routes one input action. Only editor save and load can fail.
    pub fn handle_action(&mut self, action: WorldAction) -> Result<()> {
        match action {
            WorldAction::Editor(a) => {
                let offset = self.camera.offset();
                self.editor.apply(a, &mut self.tilemap, offset)?;
            }
            WorldAction::ToggleDebugInfo => self.show_debug = !self.show_debug,
            WorldAction::ToggleParallax => {
                if let Some(bg) = self.parallax.current_mut() {
                    let on = !bg.is_enabled();
                    bg.set_enabled(on);
                    info!("Parallax: {}", if on { "ON" } else { "OFF" });
                }
            }
            WorldAction::Regenerate => {
                self.regenerate();
            }
        }
        Ok(())
    }

    /// Backdrop, then tiles, then editor overlay, then debug text.
    pub fn render<S: Surface<Image = I>>(&self, surface: &mut S) {
        let offset = self.camera.offset();
        self.parallax.render(surface, offset);
        self.tilemap.render(surface, &self.atlas, offset);
        self.editor.render_ui(surface, &self.tilemap, offset);
        if self.show_debug {
            self.render_debug_info(surface);
        }
    }

    fn render_debug_info<S: Surface>(&self, surface: &mut S) {
        let p = self.camera.position();
        let lines = [
            format!("Camera: ({:.0}, {:.0})", p.x, p.y),
            format!("Map: {}x{}", self.tilemap.width(), self.tilemap.height()),
            format!(
                "Tiles: {} solid, {} decor, {} hazard",
                self.tilemap.count_tiles(TileLayer::Solid),
                self.tilemap.count_tiles(TileLayer::Decor),
                self.tilemap.count_tiles(TileLayer::Hazard)
            ),
            format!("Cache rebuilds: {}", self.tilemap.cache_rebuilds()),
            format!("Seed: {}", self.generator.seed()),
        ];
        let h = lines.len() as i32 * 18 + 10;
        surface.draw_rect(Rect::new(5, 5, 260, h), DEBUG_PANEL_COLOR, RectStyle::Filled);
        for (i, line) in lines.iter().enumerate() {
            surface.draw_label(line, 10, 10 + i as i32 * 18, WHITE);
        }
    }

    /// Collision rectangles of the level.
    pub fn collision_rects(&mut self) -> &[Rect] {
        self.tilemap.collision_rects()
    }

    /// Hazard rectangles and their damage.
    pub fn hazard_rects(&mut self) -> &[(Rect, i32)] {
        self.tilemap.hazard_rects()
    }

    /// Whether `rect` hits a solid tile.
    pub fn check_collision(&mut self, rect: &Rect) -> bool {
        self.tilemap.check_collision(rect)
    }

    /// Summed damage of every hazard `rect` overlaps.
    pub fn check_hazard_collision(&mut self, rect: &Rect) -> i32 {
        self.tilemap.check_hazard_collision(rect)
    }

    /// Whether the tile under a world point is solid.
    pub fn is_position_solid(&self, world: Vec2) -> bool {
        let (tx, ty) = self.tilemap.world_to_tile(world.x, world.y);
        self.tilemap
            .get_tile(TileLayer::Solid, tx, ty)
            .is_some_and(|t| t.solid)
    }

    /// Whether the tile under a world point is hazardous.
    pub fn is_position_hazard(&self, world: Vec2) -> bool {
        let (tx, ty) = self.tilemap.world_to_tile(world.x, world.y);
        self.tilemap
            .get_tile(TileLayer::Hazard, tx, ty)
            .is_some_and(|t| t.hazard)
    }

    /// World pixels to screen pixels.
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.camera.world_to_screen(world)
    }

    /// Screen pixels to world pixels.
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.camera.screen_to_world(screen)
    }

    /// Tile containing a world point.
    pub fn world_to_tile(&self, world: Vec2) -> (i32, i32) {
        self.tilemap.world_to_tile(world.x, world.y)
    }

    /// Top-left world pixel of a tile.
    pub fn tile_to_world(&self, tile_x: i32, tile_y: i32) -> Vec2 {
        let (x, y) = self.tilemap.tile_to_world(tile_x, tile_y);
        vec2(x as f32, y as f32)
    }

    /// Visible world rectangle.
    pub fn camera_bounds(&self) -> Rect {
        self.camera.viewport_rect()
    }

    /// Moves the camera target to centre on `focus`.
    pub fn set_camera_target(&mut self, focus: Vec2) {
        self.camera.follow_target(focus);
    }

    /// Jumps the camera to `(x, y)`.
    pub fn set_camera_position(&mut self, x: f32, y: f32) {
        self.camera.set_position(x, y);
    }

    /// Saves the map as JSON; failures are also logged.
    pub fn save_world<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.tilemap.save_json(path.as_ref()).map_err(|e| {
            error!("Saving world failed: {}", e);
            e
        })
    }

    /// Replaces the map from `path`; on failure the current map is kept.
    pub fn load_world<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.tilemap.load_json(path.as_ref()).map_err(|e| {
            error!("Loading world failed: {}", e);
            e
        })
    }

    /// Adds `layer` to the current background. Returns `false` when there
    /// is none.
    pub fn add_parallax_layer(&mut self, layer: ParallaxLayer<I>) -> bool {
        match self.parallax.current_mut() {
            Some(bg) => {
                bg.add_layer(layer);
                true
            }
            None => false,
        }
    }

    /// Registers a named backdrop.
    pub fn add_parallax_background(&mut self, name: &str, background: ParallaxBackground<I>) {
        self.parallax.add_background(name, background);
    }

    /// Selects a backdrop by name. `false` if it is unknown.
    pub fn switch_parallax_background(&mut self, name: &str) -> bool {
        self.parallax.switch_to(name)
    }

    /// Snapshot for the debug panel.
    pub fn world_info(&mut self) -> WorldInfo {
        let collision_rects = self.tilemap.collision_rects().len();
        let hazard_rects = self.tilemap.hazard_rects().len();
        WorldInfo {
            map_size: (self.tilemap.width(), self.tilemap.height()),
            tile_size: self.tilemap.tile_size(),
            pixel_size: self.tilemap.pixel_size(),
            camera_position: self.camera.position(),
            solid_tiles: self.tilemap.count_tiles(TileLayer::Solid),
            decor_tiles: self.tilemap.count_tiles(TileLayer::Decor),
            hazard_tiles: self.tilemap.count_tiles(TileLayer::Hazard),
            collision_rects,
            hazard_rects,
            editor_active: self.editor.is_active(),
            parallax_enabled: self.parallax.current().is_some_and(|bg| bg.is_enabled()),
            seed: self.generator.seed(),
        }
    }

    /// Configuration the world was built from.
    pub fn config(&self) -> &TilemapConfig {
        &self.config
    }

    /// The level grid.
    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    /// The level grid, mutably.
    pub fn tilemap_mut(&mut self) -> &mut Tilemap {
        &mut self.tilemap
    }

    /// The camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The camera, mutably.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// The editor state.
    pub fn editor(&self) -> &TilemapEditor {
        &self.editor
    }

    /// The room generator, mutably.
    pub fn generator_mut(&mut self) -> &mut MapGenerator {
        &mut self.generator
    }

    /// The backdrops.
    pub fn parallax(&self) -> &ParallaxManager<I> {
        &self.parallax
    }

    /// Tile images.
    pub fn atlas(&self) -> &SpriteAtlas<I> {
        &self.atlas
    }

    /// Whether the info panel is drawn.
    pub fn is_debug_info_visible(&self) -> bool {
        self.show_debug
    }
}
