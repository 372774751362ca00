use macroquad::prelude::{
    draw_rectangle, draw_rectangle_lines, draw_text, draw_texture, screen_height, screen_width,
    Color, Texture2D, WHITE,
};

use super::{RectStyle, Surface};
use crate::geom::Rect;

const LABEL_FONT_SIZE: f32 = 16.0;

/// The Macroquad window.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScreenSurface;

impl Surface for ScreenSurface {
    type Image = Texture2D;

    fn size(&self) -> (i32, i32) {
        (screen_width() as i32, screen_height() as i32)
    }

    fn blit(&mut self, image: &Texture2D, x: i32, y: i32) {
        draw_texture(image, x as f32, y as f32, WHITE);
    }

    fn draw_rect(&mut self, rect: Rect, color: Color, style: RectStyle) {
        let (x, y, w, h) = (rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32);
        match style {
            RectStyle::Filled => draw_rectangle(x, y, w, h, color),
            RectStyle::Outline(thickness) => draw_rectangle_lines(x, y, w, h, thickness, color),
        }
    }

    fn draw_label(&mut self, text: &str, x: i32, y: i32, color: Color) {
        // draw_text positions the baseline, labels are anchored top-left
        draw_text(text, x as f32, y as f32 + LABEL_FONT_SIZE * 0.75, LABEL_FONT_SIZE, color);
    }
}
