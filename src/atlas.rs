//! Spritesheet slicing: one image cut into a `(row, col)` grid of tiles.

use std::path::Path;

use anyhow::Context;
use log::{debug, info, warn};
use macroquad::color::Color;
use macroquad::math::Rect as SourceRect;
use macroquad::texture::{FilterMode, Image, Texture2D};

/// Colour used wherever an image could not be loaded.
pub const PLACEHOLDER_COLOR: Color = Color::new(1.0, 0.0, 1.0, 1.0);

const PLACEHOLDER_SHEET_SIZE: u16 = 320;

/// Reads and decodes an image file into CPU memory.
pub fn read_image(path: &Path) -> anyhow::Result<Image> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Reading image {}", path.display()))?;
    Image::from_file_with_format(&bytes, None)
        .map_err(|e| anyhow::anyhow!("{:?}", e))
        .with_context(|| format!("Decoding image {}", path.display()))
}

/// Summary of an atlas grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasInfo {
    /// Tile rows in the sheet.
    pub rows: u32,
    /// Tile columns in the sheet.
    pub cols: u32,
    /// Edge length of one tile in pixels.
    pub tile_size: u32,
    /// `rows * cols`.
    pub total_tiles: u32,
}

/// Tiles addressable by `(row, col)`. `T` is `Image` on the CPU side and
/// `Texture2D` once uploaded.
#[derive(Debug, Clone)]
pub struct SpriteAtlas<T> {
    tile_size: u32,
    rows: u32,
    cols: u32,
    tiles: Vec<T>,
}

impl SpriteAtlas<Image> {
    /// Cuts `sheet` into `tile_size` squares; partial edge tiles are dropped.
    pub fn from_image(sheet: &Image, tile_size: u32) -> Self {
        let tile_size = tile_size.max(1);
        let cols = sheet.width() as u32 / tile_size;
        let rows = sheet.height() as u32 / tile_size;
        let mut tiles = Vec::with_capacity((rows * cols) as usize);
        for row in 0..rows {
            for col in 0..cols {
                tiles.push(sheet.sub_image(SourceRect::new(
                    (col * tile_size) as f32,
                    (row * tile_size) as f32,
                    tile_size as f32,
                    tile_size as f32,
                )));
            }
        }
        debug!("Atlas: {} rows x {} cols", rows, cols);
        SpriteAtlas {
            tile_size,
            rows,
            cols,
            tiles,
        }
    }

    /// Loads a spritesheet; on failure a magenta sheet stands in for it.
    pub fn load<P: AsRef<Path>>(path: P, tile_size: u32) -> Self {
        let path = path.as_ref();
        let sheet = match read_image(path) {
            Ok(img) => {
                info!(
                    "Spritesheet loaded: {} ({}x{})",
                    path.display(),
                    img.width(),
                    img.height()
                );
                img
            }
            Err(e) => {
                warn!("{:#}; using placeholder spritesheet", e);
                Image::gen_image_color(
                    PLACEHOLDER_SHEET_SIZE,
                    PLACEHOLDER_SHEET_SIZE,
                    PLACEHOLDER_COLOR,
                )
            }
        };
        Self::from_image(&sheet, tile_size)
    }

    /// Moves every tile to the GPU.
    pub fn upload(&self) -> SpriteAtlas<Texture2D> {
        self.map(|img| {
            let tex = Texture2D::from_image(img);
            tex.set_filter(FilterMode::Nearest);
            tex
        })
    }
}

impl<T> SpriteAtlas<T> {
    /// Atlas from pre-sliced tiles in row-major order.
    pub fn from_tiles(tile_size: u32, rows: u32, cols: u32, tiles: Vec<T>) -> Option<Self> {
        (tiles.len() == (rows * cols) as usize).then_some(SpriteAtlas {
            tile_size,
            rows,
            cols,
            tiles,
        })
    }

    /// Tile at `(row, col)`, or `None` outside the sheet.
    pub fn get_tile(&self, row: u32, col: u32) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.tiles.get((row * self.cols + col) as usize)
        } else {
            None
        }
    }

    /// Tiles `col_start..=col_end` of `row`, clipped to the atlas.
    pub fn get_tile_range(&self, row: u32, col_start: u32, col_end: u32) -> Vec<&T> {
        (col_start..=col_end)
            .filter_map(|col| self.get_tile(row, col))
            .collect()
    }

    /// Converts every tile, keeping the layout.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> SpriteAtlas<U> {
        SpriteAtlas {
            tile_size: self.tile_size,
            rows: self.rows,
            cols: self.cols,
            tiles: self.tiles.iter().map(f).collect(),
        }
    }

    /// Edge length of one tile in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Number of tile rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of tile columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Layout summary.
    pub fn info(&self) -> AtlasInfo {
        AtlasInfo {
            rows: self.rows,
            cols: self.cols,
            tile_size: self.tile_size,
            total_tiles: self.rows * self.cols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroquad::color::WHITE;

    #[test]
    fn slices_whole_tiles_only() {
        let sheet = Image::gen_image_color(100, 64, WHITE);
        let atlas = SpriteAtlas::from_image(&sheet, 32);
        assert_eq!(atlas.info(), AtlasInfo { rows: 2, cols: 3, tile_size: 32, total_tiles: 6 });
        let tile = atlas.get_tile(1, 2).expect("tile in range");
        assert_eq!((tile.width(), tile.height()), (32, 32));
        assert!(atlas.get_tile(2, 0).is_none());
        assert!(atlas.get_tile(0, 3).is_none());
    }

    #[test]
    fn missing_sheet_becomes_magenta_placeholder() {
        let atlas = SpriteAtlas::load("no/such/sheet.png", 32);
        assert_eq!((atlas.rows(), atlas.cols()), (10, 10));
        let tile = atlas.get_tile(0, 0).unwrap();
        assert_eq!(tile.get_pixel(0, 0), PLACEHOLDER_COLOR);
    }

    #[test]
    fn tile_range_is_clipped() {
        let atlas = SpriteAtlas::from_tiles(8, 1, 3, vec!['a', 'b', 'c']).unwrap();
        assert_eq!(atlas.get_tile_range(0, 1, 10), vec![&'b', &'c']);
        assert!(SpriteAtlas::from_tiles(8, 2, 2, vec![1]).is_none());
    }
}
