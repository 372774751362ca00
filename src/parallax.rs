//! Layered scrolling backdrops driven by the camera offset.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info, warn};
use macroquad::color::Color;
use macroquad::texture::{FilterMode, Image, Texture2D};

use crate::atlas::read_image;
use crate::config::{ParallaxConfig, ParallaxLayerConfig};
use crate::geom::Rect;
use crate::render::{RectStyle, Surface};

const PLACEHOLDER_SIZE: (u16, u16) = (800, 600);
const PLACEHOLDER_COLOR: Color = Color::new(50.0 / 255.0, 50.0 / 255.0, 100.0 / 255.0, 1.0);
const FALLBACK_FILL: Color = Color::new(30.0 / 255.0, 30.0 / 255.0, 60.0 / 255.0, 1.0);
const GRADIENT_TOP: Color = Color::new(20.0 / 255.0, 20.0 / 255.0, 40.0 / 255.0, 1.0);
const GRADIENT_BOTTOM: Color = Color::new(60.0 / 255.0, 40.0 / 255.0, 80.0 / 255.0, 1.0);
const GRADIENT_BAND: i32 = 4;

/// One background image scrolling at a fraction of the camera's speed.
#[derive(Debug, Clone)]
pub struct ParallaxLayer<I> {
    name: String,
    image: I,
    width: i32,
    height: i32,
    scroll_speed: f32,
    repeat_x: bool,
    repeat_y: bool,
}

/// Read-only summary of a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    /// Layer name for logs and info panels.
    pub name: String,
    /// Image size in pixels.
    pub size: (i32, i32),
    /// Fraction of the camera movement applied.
    pub scroll_speed: f32,
    /// Tiled horizontally.
    pub repeat_x: bool,
    /// Tiled vertically.
    pub repeat_y: bool,
}

impl<I> ParallaxLayer<I> {
    /// `scroll_speed` is clamped to `[0, 1]`: 0 is a fixed backdrop,
    /// 1 moves with the foreground.
    pub fn new(
        name: &str,
        image: I,
        size: (i32, i32),
        scroll_speed: f32,
        repeat_x: bool,
        repeat_y: bool,
    ) -> Self {
        ParallaxLayer {
            name: name.to_owned(),
            image,
            width: size.0.max(1),
            height: size.1.max(1),
            scroll_speed: scroll_speed.clamp(0.0, 1.0),
            repeat_x,
            repeat_y,
        }
    }

    /// Fraction of the camera movement applied.
    pub fn scroll_speed(&self) -> f32 {
        self.scroll_speed
    }

    /// Clamped to `0..=1`.
    pub fn set_scroll_speed(&mut self, speed: f32) {
        self.scroll_speed = speed.clamp(0.0, 1.0);
    }

    /// Summary for info panels.
    pub fn info(&self) -> LayerInfo {
        LayerInfo {
            name: self.name.clone(),
            size: (self.width, self.height),
            scroll_speed: self.scroll_speed,
            repeat_x: self.repeat_x,
            repeat_y: self.repeat_y,
        }
    }

    /// Scroll offset for a given camera offset.
    pub fn offset(&self, camera_offset: (i32, i32)) -> (i32, i32) {
        (
            (camera_offset.0 as f32 * self.scroll_speed) as i32,
            (camera_offset.1 as f32 * self.scroll_speed) as i32,
        )
    }

    fn span(offset: i32, extent: i32, screen: i32, repeat: bool) -> (i32, i32) {
        if repeat {
            ((-offset).rem_euclid(extent) - extent, screen / extent + 3)
        } else {
            (-offset, 1)
        }
    }

    /// Blits the image, tiled along each axis whose repeat flag is set.
    pub fn render<S: Surface<Image = I>>(&self, surface: &mut S, camera_offset: (i32, i32)) {
        let (ox, oy) = self.offset(camera_offset);
        let (sw, sh) = surface.size();
        let (start_x, count_x) = Self::span(ox, self.width, sw, self.repeat_x);
        let (start_y, count_y) = Self::span(oy, self.height, sh, self.repeat_y);
        for j in 0..count_y {
            for i in 0..count_x {
                surface.blit(&self.image, start_x + i * self.width, start_y + j * self.height);
            }
        }
    }

    /// Same layer with a converted image.
    pub fn map_image<J, F: FnMut(&I) -> J>(&self, mut f: F) -> ParallaxLayer<J> {
        ParallaxLayer {
            name: self.name.clone(),
            image: f(&self.image),
            width: self.width,
            height: self.height,
            scroll_speed: self.scroll_speed,
            repeat_x: self.repeat_x,
            repeat_y: self.repeat_y,
        }
    }
}

impl ParallaxLayer<Image> {
    /// Loads the configured image; a flat placeholder stands in on failure.
    pub fn load(config: &ParallaxLayerConfig) -> Self {
        let image = match read_image(Path::new(&config.image)) {
            Ok(img) => img,
            Err(e) => {
                warn!("{:#}; using placeholder background", e);
                Image::gen_image_color(PLACEHOLDER_SIZE.0, PLACEHOLDER_SIZE.1, PLACEHOLDER_COLOR)
            }
        };
        let size = (image.width() as i32, image.height() as i32);
        ParallaxLayer::new(
            &config.image,
            image,
            size,
            config.scroll_speed,
            config.repeat_x,
            config.repeat_y,
        )
    }
}

fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    Color::new(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
        a.a + (b.a - a.a) * t,
    )
}

/// An ordered stack of layers, drawn back to front.
#[derive(Debug, Clone)]
pub struct ParallaxBackground<I> {
    layers: Vec<ParallaxLayer<I>>,
    enabled: bool,
}

impl<I> Default for ParallaxBackground<I> {
    fn default() -> Self {
        ParallaxBackground {
            layers: Vec::new(),
            enabled: true,
        }
    }
}

impl<I> ParallaxBackground<I> {
    /// Enabled background without layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer in front of the existing ones.
    pub fn add_layer(&mut self, layer: ParallaxLayer<I>) {
        debug!("Parallax layer added: {} (speed {})", layer.name, layer.scroll_speed);
        self.layers.push(layer);
    }

    /// Removes and returns the layer at `index`.
    pub fn remove_layer(&mut self, index: usize) -> Option<ParallaxLayer<I>> {
        (index < self.layers.len()).then(|| self.layers.remove(index))
    }

    /// Removes every layer.
    pub fn clear_layers(&mut self) {
        self.layers.clear();
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Whether the background draws.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turns drawing on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// `false` if there is no layer at `index`.
    pub fn set_layer_speed(&mut self, index: usize, speed: f32) -> bool {
        match self.layers.get_mut(index) {
            Some(layer) => {
                layer.set_scroll_speed(speed);
                true
            }
            None => false,
        }
    }

    /// Summaries of every layer, back to front.
    pub fn layer_info(&self) -> Vec<LayerInfo> {
        self.layers.iter().map(ParallaxLayer::info).collect()
    }

    /// Draws every layer back to front, or the gradient when there are none.
    pub fn render<S: Surface<Image = I>>(&self, surface: &mut S, camera_offset: (i32, i32)) {
        if !self.enabled {
            return;
        }
        if self.layers.is_empty() {
            Self::render_gradient(surface);
            return;
        }
        for layer in &self.layers {
            layer.render(surface, camera_offset);
        }
    }

    fn render_gradient<S: Surface>(surface: &mut S) {
        let (w, h) = surface.size();
        let h = h.max(1);
        let mut y = 0;
        while y < h {
            let t = y as f32 / h as f32;
            surface.draw_rect(
                Rect::new(0, y, w, GRADIENT_BAND),
                lerp_color(GRADIENT_TOP, GRADIENT_BOTTOM, t),
                RectStyle::Filled,
            );
            y += GRADIENT_BAND;
        }
    }

    /// Same background with converted images.
    pub fn map_images<J, F: FnMut(&I) -> J>(&self, mut f: F) -> ParallaxBackground<J> {
        ParallaxBackground {
            layers: self.layers.iter().map(|l| l.map_image(&mut f)).collect(),
            enabled: self.enabled,
        }
    }
}

impl ParallaxBackground<Image> {
    /// Loads every configured layer, substituting placeholders for missing images.
    pub fn from_config(config: &ParallaxConfig) -> Self {
        let mut bg = ParallaxBackground::new();
        bg.set_enabled(config.enabled);
        for layer in &config.layers {
            bg.add_layer(ParallaxLayer::load(layer));
        }
        bg
    }
}

/// Named backgrounds with one current selection.
#[derive(Debug, Clone)]
pub struct ParallaxManager<I> {
    backgrounds: BTreeMap<String, ParallaxBackground<I>>,
    current: Option<String>,
}

impl<I> Default for ParallaxManager<I> {
    fn default() -> Self {
        ParallaxManager {
            backgrounds: BTreeMap::new(),
            current: None,
        }
    }
}

impl<I> ParallaxManager<I> {
    /// Manager with no backgrounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a background; the first one added becomes current.
    pub fn add_background(&mut self, name: &str, background: ParallaxBackground<I>) {
        self.backgrounds.insert(name.to_owned(), background);
        if self.current.is_none() {
            self.current = Some(name.to_owned());
        }
    }

    /// Makes `name` current. `false` if no such background exists.
    pub fn switch_to(&mut self, name: &str) -> bool {
        if self.backgrounds.contains_key(name) {
            self.current = Some(name.to_owned());
            info!("Parallax background: {}", name);
            true
        } else {
            warn!("Unknown parallax background '{}'", name);
            false
        }
    }

    /// Name of the selected background.
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Selected background.
    pub fn current(&self) -> Option<&ParallaxBackground<I>> {
        self.backgrounds.get(self.current.as_deref()?)
    }

    /// Selected background, mutably.
    pub fn current_mut(&mut self) -> Option<&mut ParallaxBackground<I>> {
        let name = self.current.as_deref()?;
        self.backgrounds.get_mut(name)
    }

    /// Names of every registered background.
    pub fn background_names(&self) -> impl Iterator<Item = &str> {
        self.backgrounds.keys().map(String::as_str)
    }

    /// Draws the current background, or a flat fill when nothing is shown.
    pub fn render<S: Surface<Image = I>>(&self, surface: &mut S, camera_offset: (i32, i32)) {
        match self.current() {
            Some(bg) if bg.is_enabled() => bg.render(surface, camera_offset),
            _ => {
                let (w, h) = surface.size();
                surface.draw_rect(Rect::new(0, 0, w, h), FALLBACK_FILL, RectStyle::Filled);
            }
        }
    }

    /// Same manager with converted images.
    pub fn map_images<J, F: FnMut(&I) -> J>(&self, mut f: F) -> ParallaxManager<J> {
        ParallaxManager {
            backgrounds: self
                .backgrounds
                .iter()
                .map(|(name, bg)| (name.clone(), bg.map_images(&mut f)))
                .collect(),
            current: self.current.clone(),
        }
    }
}

impl ParallaxManager<Image> {
    /// Moves every backdrop image to the GPU.
    pub fn upload(&self) -> ParallaxManager<Texture2D> {
        self.map_images(|img| {
            let tex = Texture2D::from_image(img);
            tex.set_filter(FilterMode::Nearest);
            tex
        })
    }
}
