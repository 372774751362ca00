//! Tilemap configuration file.
//!
//! Every field has a hard-coded default, so a missing or partial file
//! never prevents the world from starting.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "assets/tilemap_config.json";

fn default_true() -> bool {
    true
}
fn half() -> f32 {
    0.5
}
fn default_tile_size() -> u32 {
    32
}
fn default_tiles_per_row() -> u32 {
    16
}
fn default_spritesheet() -> String {
    "assets/sprites/level.png".to_owned()
}

/// Everything read from `tilemap_config.json`. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilemapConfig {
    /// Tile edge in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Path of the tile spritesheet.
    #[serde(default = "default_spritesheet")]
    pub spritesheet: String,
    /// Columns per autotile band in the sheet.
    #[serde(default = "default_tiles_per_row")]
    pub tiles_per_row: u32,
    /// First sheet row of each autotile group.
    #[serde(default)]
    pub autotile_rows: AutotileRows,
    /// Door type name to sprite.
    #[serde(default = "default_door_types")]
    pub door_types: BTreeMap<String, DoorSprite>,
    /// Default backdrop layers.
    #[serde(default)]
    pub parallax: ParallaxConfig,
    /// Camera smoothing.
    #[serde(default)]
    pub camera: CameraConfig,
    /// Editor save location.
    #[serde(default)]
    pub editor: EditorConfig,
    /// Room generation seed.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Default for TilemapConfig {
    fn default() -> Self {
        TilemapConfig {
            tile_size: default_tile_size(),
            spritesheet: default_spritesheet(),
            tiles_per_row: default_tiles_per_row(),
            autotile_rows: AutotileRows::default(),
            door_types: default_door_types(),
            parallax: ParallaxConfig::default(),
            camera: CameraConfig::default(),
            editor: EditorConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl TilemapConfig {
    /// Parses a config document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads and parses `path`.
    pub fn try_load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path)
            .with_context(|| format!("Reading tilemap config {}", path.display()))?;
        Self::from_json_str(&txt)
            .with_context(|| format!("Parsing tilemap config {}", path.display()))
    }

    /// Loads `path`, falling back to [`TilemapConfig::default`] on any error.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load(path.as_ref()) {
            Ok(config) => {
                info!("Tilemap config loaded: {}", path.as_ref().display());
                config
            }
            Err(e) => {
                warn!("{:#}; using default tilemap config", e);
                Self::default()
            }
        }
    }

    /// Sprite for `door_type`, if configured.
    pub fn door_sprite(&self, door_type: &str) -> Option<DoorSprite> {
        self.door_types.get(door_type).copied()
    }
}

/// Base atlas row of each autotile group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutotileRows {
    /// Ground band row.
    pub ground: u32,
    /// Wall band row.
    pub walls: u32,
}

impl Default for AutotileRows {
    fn default() -> Self {
        AutotileRows {
            ground: 9,
            walls: 10,
        }
    }
}

/// Atlas coordinates of a door sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorSprite {
    /// Sheet row.
    pub row: u32,
    /// Sheet column.
    pub col: u32,
}

fn default_door_types() -> BTreeMap<String, DoorSprite> {
    [
        ("standard", DoorSprite { row: 5, col: 0 }),
        ("reinforced", DoorSprite { row: 5, col: 1 }),
        ("electronic", DoorSprite { row: 5, col: 2 }),
    ]
    .into_iter()
    .map(|(name, sprite)| (name.to_owned(), sprite))
    .collect()
}

/// The default backdrop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallaxConfig {
    /// Draw the backdrop at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Back to front.
    #[serde(default)]
    pub layers: Vec<ParallaxLayerConfig>,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        ParallaxConfig {
            enabled: true,
            layers: vec![
                ParallaxLayerConfig::new("assets/backgrounds/far_bg.png", 0.1, true, true),
                ParallaxLayerConfig::new("assets/backgrounds/mid_bg.png", 0.3, true, false),
                ParallaxLayerConfig::new("assets/backgrounds/near_bg.png", 0.6, true, false),
            ],
        }
    }
}

/// One backdrop image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallaxLayerConfig {
    /// Image path.
    #[serde(default)]
    pub image: String,
    /// Fraction of the camera movement, 0 to 1.
    #[serde(default = "half")]
    pub scroll_speed: f32,
    /// Tile horizontally.
    #[serde(default = "default_true")]
    pub repeat_x: bool,
    /// Tile vertically.
    #[serde(default)]
    pub repeat_y: bool,
}

impl ParallaxLayerConfig {
    /// Layer entry with the given image and scroll settings.
    pub fn new(image: &str, scroll_speed: f32, repeat_x: bool, repeat_y: bool) -> Self {
        ParallaxLayerConfig {
            image: image.to_owned(),
            scroll_speed,
            repeat_x,
            repeat_y,
        }
    }
}

/// Camera smoothing settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Fraction of the remaining distance covered per update.
    pub smoothing: f32,
    /// Use frame-rate independent smoothing instead of the per-frame factor.
    pub time_scaled: bool,
    /// Decay rate per second for time-scaled smoothing.
    pub smoothing_rate: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            smoothing: 0.1,
            time_scaled: false,
            // matches 0.1 per frame at 60 fps
            smoothing_rate: 6.32,
        }
    }
}

/// Where the editor saves maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Directory holding saved maps.
    pub maps_directory: String,
    /// File name inside `maps_directory`.
    pub map_file: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            maps_directory: "assets/maps".to_owned(),
            map_file: "test_map.json".to_owned(),
        }
    }
}

/// Room generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Fixed seed for reproducible levels; `None` draws one from the OS.
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = TilemapConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TilemapConfig::default());
        assert_eq!(config.tile_size, 32);
        assert_eq!(config.autotile_rows.ground, 9);
        assert_eq!(config.door_sprite("electronic"), Some(DoorSprite { row: 5, col: 2 }));
    }

    #[test]
    fn partial_layer_entries_get_field_defaults() {
        let json = r#"{
          "tile_size": 16,
          "autotile_rows": {"ground": 3, "walls": 4},
          "door_types": {"hatch": {"row": 8, "col": 2}},
          "parallax": {"layers": [{"image": "bg.png"}]}
        }"#;
        let config = TilemapConfig::from_json_str(json).unwrap();
        assert_eq!(config.tile_size, 16);
        assert_eq!(config.autotile_rows, AutotileRows { ground: 3, walls: 4 });
        assert!(config.door_sprite("standard").is_none());
        assert!(config.parallax.enabled);
        let layer = &config.parallax.layers[0];
        assert_eq!(layer.scroll_speed, 0.5);
        assert!(layer.repeat_x && !layer.repeat_y);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = TilemapConfig::load("definitely/not/here.json");
        assert_eq!(config, TilemapConfig::default());
    }
}
