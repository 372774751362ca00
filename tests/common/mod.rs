#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use macroquad::color::Color;
use platformer_world::{Rect, RectStyle, SpriteAtlas, Surface};

#[derive(Debug, Clone, PartialEq)]
pub enum Op<I> {
    Blit(I, i32, i32),
    Rect(Rect, Color, RectStyle),
    Label(String, i32, i32),
}

/// Surface that records every draw call.
pub struct RecordingSurface<I> {
    pub size: (i32, i32),
    pub ops: Vec<Op<I>>,
}

impl<I> RecordingSurface<I> {
    pub fn new(w: i32, h: i32) -> Self {
        RecordingSurface {
            size: (w, h),
            ops: Vec::new(),
        }
    }

    pub fn blits(&self) -> impl Iterator<Item = (&I, i32, i32)> {
        self.ops.iter().filter_map(|op| match op {
            Op::Blit(img, x, y) => Some((img, *x, *y)),
            _ => None,
        })
    }

    pub fn rects(&self) -> impl Iterator<Item = (Rect, Color)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            Op::Rect(r, c, _) => Some((*r, *c)),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            Op::Label(text, _, _) => Some(text.as_str()),
            _ => None,
        })
    }
}

impl<I: Clone> Surface for RecordingSurface<I> {
    type Image = I;

    fn size(&self) -> (i32, i32) {
        self.size
    }

    fn blit(&mut self, image: &I, x: i32, y: i32) {
        self.ops.push(Op::Blit(image.clone(), x, y));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color, style: RectStyle) {
        self.ops.push(Op::Rect(rect, color, style));
    }

    fn draw_label(&mut self, text: &str, x: i32, y: i32, _color: Color) {
        self.ops.push(Op::Label(text.to_owned(), x, y));
    }
}

/// Atlas whose "images" are their own `(row, col)` coordinates.
pub fn coord_atlas(rows: u32, cols: u32) -> SpriteAtlas<(u32, u32)> {
    let tiles = (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (r, c)))
        .collect();
    SpriteAtlas::from_tiles(32, rows, cols, tiles).expect("rows * cols tiles")
}

/// Fresh, unique directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("platformer_world_{}_{}", name, nanos));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}
