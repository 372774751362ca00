#![warn(missing_docs)]

//! Tile world for a 2D side-scroller on Macroquad: a three-layer tilemap
//! with 47-tile autotiling, cached collision/hazard rectangles, a smoothed
//! camera, parallax backdrops, seeded room generation and an in-game
//! editor.

pub mod atlas;
pub mod autotile;
pub mod camera;
pub mod config;
pub mod editor;
mod error;
pub mod generator;
pub mod geom;
mod loader {
    pub mod json_loader;
}
pub mod parallax;
pub mod render;
pub mod tile;
pub mod tilemap;
pub mod world;

pub use atlas::{AtlasInfo, SpriteAtlas};
pub use autotile::{
    bitmask, generate_autotile_grid, tile_index_for_bitmask, AutotileGrid, AutotilePalette,
    AutotileType, OccupancyGrid,
};
pub use camera::{Camera, Smoothing};
pub use config::TilemapConfig;
pub use editor::{EditorAction, PointerButton, TilemapEditor};
pub use error::{Result, WorldError};
pub use generator::{MapGenerator, RoomKind, RoomReport};
pub use geom::Rect;
pub use parallax::{ParallaxBackground, ParallaxLayer, ParallaxManager};
pub use render::{RectStyle, ScreenSurface, Surface};
pub use tile::{DoorType, Tile, TileKind, TileLayer};
pub use tilemap::Tilemap;
pub use world::{WorldAction, WorldInfo, WorldManager};
