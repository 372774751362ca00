//! Drawing abstraction. The world only ever blits images at integer
//! positions and draws rectangles.

pub mod cull;
mod screen;

pub use cull::{visible_tile_region, TileRegion, CULL_MARGIN_TILES};
pub use screen::ScreenSurface;

use macroquad::color::Color;

use crate::geom::Rect;

/// How [`Surface::draw_rect`] fills a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RectStyle {
    /// Solid fill.
    Filled,
    /// Outline with the given thickness in pixels.
    Outline(f32),
}

/// A 2D drawable target.
pub trait Surface {
    /// Image type accepted by [`Surface::blit`].
    type Image;

    /// Size in pixels.
    fn size(&self) -> (i32, i32);

    /// Draws `image` with its top-left corner at `(x, y)`.
    fn blit(&mut self, image: &Self::Image, x: i32, y: i32);

    /// Fills or outlines `rect`.
    fn draw_rect(&mut self, rect: Rect, color: Color, style: RectStyle);

    /// Optional text overlay; surfaces without text support ignore it.
    fn draw_label(&mut self, _text: &str, _x: i32, _y: i32, _color: Color) {}
}
