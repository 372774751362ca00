//! Seeded procedural room composition on top of a [`Tilemap`].
//!
//! Placement passes are best-effort: every random pass has a fixed attempt
//! budget and reports how many items it actually placed.

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::autotile::{AutotileType, OccupancyGrid};
use crate::config::GeneratorConfig;
use crate::tile::{Tile, TileKind, TileLayer};
use crate::tilemap::Tilemap;

const MAX_DECORATIONS: usize = 8;
const DECOR_ATTEMPTS: usize = 20;
const MAX_SPIKES: usize = 6;
const SPIKE_ATTEMPTS: usize = 30;
const SCATTERED_WALLS: usize = 3;
/// Chebyshev radius kept clear around every hazard.
const HAZARD_SPACING: i32 = 2;

/// Items placed by one generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoomReport {
    /// Decor tiles placed.
    pub decorations: usize,
    /// Traps placed.
    pub hazards: usize,
    /// Doors placed.
    pub doors: usize,
}

/// Room flavours for [`MapGenerator::add_room`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomKind {
    /// Floor and perimeter walls.
    Basic,
    /// Basic room with a terminal in the middle.
    Treasure,
    /// Basic room seeded with traps.
    Danger,
}

impl RoomKind {
    /// Parses `basic`, `treasure` or `danger`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "basic" => Some(RoomKind::Basic),
            "treasure" => Some(RoomKind::Treasure),
            "danger" => Some(RoomKind::Danger),
            _ => None,
        }
    }
}

/// Draws from `lo..=hi`, or `None` when the range is empty.
fn pick(rng: &mut ChaCha8Rng, lo: i32, hi: i32) -> Option<i32> {
    (lo <= hi).then(|| rng.gen_range(lo..=hi))
}

/// Room builder with its own seeded random stream.
#[derive(Debug, Clone)]
pub struct MapGenerator {
    seed: u64,
    rng: ChaCha8Rng,
}

impl MapGenerator {
    /// Generator seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        MapGenerator {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generator with a random seed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Uses the configured seed, or a random one.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        match config.seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }

    /// Seed the current stream started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restarts the random stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Interior of a `width x height` room, one empty tile around it.
    pub fn floor_pattern(width: usize, height: usize) -> OccupancyGrid {
        let mut pattern = OccupancyGrid::new(width, height);
        pattern.fill_rect(1, 1, width as i32 - 2, height as i32 - 2, true);
        pattern
    }

    /// Perimeter walls, a 2x2 centre pillar and a few short wall segments.
    pub fn wall_pattern(&mut self, width: usize, height: usize) -> OccupancyGrid {
        let (w, h) = (width as i32, height as i32);
        let mut pattern = OccupancyGrid::new(width, height);
        pattern.fill_rect(0, 0, w, 1, true);
        pattern.fill_rect(0, h - 1, w, 1, true);
        pattern.fill_rect(0, 0, 1, h, true);
        pattern.fill_rect(w - 1, 0, 1, h, true);

        let (cx, cy) = (w / 2, h / 2);
        if cx > 2 && cy > 2 {
            pattern.fill_rect(cx, cy, 2, 2, true);
        }

        for _ in 0..SCATTERED_WALLS {
            let (Some(x), Some(y)) = (pick(&mut self.rng, 5, w - 6), pick(&mut self.rng, 3, h - 4))
            else {
                break;
            };
            pattern.fill_rect(x, y, 2, 1, true);
        }
        pattern
    }

    /// Builds a complete room in the top-left `width x height` area of
    /// `map`, replacing whatever was there.
    pub fn generate_test_room(
        &mut self,
        map: &mut Tilemap,
        width: usize,
        height: usize,
    ) -> RoomReport {
        let width = width.min(map.width());
        let height = height.min(map.height());
        info!("Generating test room {}x{} (seed {})", width, height, self.seed);

        Self::clear_area(map, 0, 0, width as i32, height as i32);

        let floor = Self::floor_pattern(width, height);
        let walls = self.wall_pattern(width, height);
        map.apply_autotiling(TileLayer::Solid, AutotileType::Ground, &floor);
        Self::apply_walls_over_floor(map, &walls);

        let report = RoomReport {
            decorations: self.place_decorations(map, width, height),
            hazards: self.place_hazards(map, width, height),
            doors: Self::place_doors(map, width, height),
        };
        info!(
            "Test room ready: {} decorations, {} hazards, {} doors",
            report.decorations, report.hazards, report.doors
        );
        report
    }

    /// Autotiles `walls` onto the SOLID layer, then forces every wall cell
    /// to a solid wall tile whatever the floor pass left there.
    fn apply_walls_over_floor(map: &mut Tilemap, walls: &OccupancyGrid) {
        map.apply_autotiling(TileLayer::Solid, AutotileType::Walls, walls);
        for (x, y) in walls.occupied() {
            if let Some(current) = map.get_tile(TileLayer::Solid, x, y).copied() {
                map.set_tile(
                    TileLayer::Solid,
                    x,
                    y,
                    Tile {
                        kind: TileKind::WallBasic,
                        solid: true,
                        ..current
                    },
                );
            }
        }
    }

    /// Terminals at fixed spots along the walls, then neon signs.
    pub fn place_decorations(&mut self, map: &mut Tilemap, width: usize, height: usize) -> usize {
        let (w, h) = (width as i32, height as i32);
        let mut placed = 0;

        let terminals = [(5, 1), (w - 6, 1), (1, h / 2), (w - 2, h / 2), (w / 2, h - 2)];
        for (x, y) in terminals {
            if Self::is_valid_decor_position(map, x, y) {
                map.set_tile_by_id(TileLayer::Decor, x, y, TileKind::Terminal, 5, 0);
                placed += 1;
            }
        }

        let mut attempts = 0;
        while placed < MAX_DECORATIONS && attempts < DECOR_ATTEMPTS {
            attempts += 1;
            let (Some(x), Some(y)) = (pick(&mut self.rng, 3, w - 4), pick(&mut self.rng, 2, h - 3))
            else {
                break;
            };
            if Self::is_valid_decor_position(map, x, y) {
                let col = self.rng.gen_range(0..=3);
                map.set_tile_by_id(TileLayer::Decor, x, y, TileKind::NeonSign, 6, col);
                placed += 1;
            }
        }
        debug!("Placed {} decorations in {} attempts", placed, attempts);
        placed
    }

    /// Four lasers at fixed spots, then up to six spikes.
    pub fn place_hazards(&mut self, map: &mut Tilemap, width: usize, height: usize) -> usize {
        let (w, h) = (width as i32, height as i32);
        let mut lasers = 0;

        for (x, y) in [(10, h / 2), (w - 11, h / 2), (w / 2, 5), (w / 2, h - 6)] {
            if Self::is_valid_hazard_position(map, x, y) {
                map.set_tile_by_id(TileLayer::Hazard, x, y, TileKind::LaserTrap, 7, 0);
                lasers += 1;
            }
        }

        let mut spikes = 0;
        let mut attempts = 0;
        while spikes < MAX_SPIKES && attempts < SPIKE_ATTEMPTS {
            attempts += 1;
            let (Some(x), Some(y)) = (pick(&mut self.rng, 4, w - 5), pick(&mut self.rng, 4, h - 5))
            else {
                break;
            };
            if Self::is_valid_hazard_position(map, x, y) {
                map.set_tile_by_id(TileLayer::Hazard, x, y, TileKind::SpikeTrap, 7, 1);
                spikes += 1;
            }
        }
        debug!("Placed {} lasers and {} spikes", lasers, spikes);
        lasers + spikes
    }

    /// A standard door mid-floor and, in wide rooms, an electronic door on
    /// the right wall.
    pub fn place_doors(map: &mut Tilemap, width: usize, height: usize) -> usize {
        let (w, h) = (width as i32, height as i32);
        let mut placed = usize::from(map.place_door(w / 2, h - 1, "standard"));
        if w > 20 && map.place_door(w - 1, h / 2, "electronic") {
            placed += 1;
        }
        placed
    }

    /// Free of solids and decorations, with a wall directly beside it.
    pub fn is_valid_decor_position(map: &Tilemap, x: i32, y: i32) -> bool {
        if !map.in_bounds(x, y) {
            return false;
        }
        if map.get_tile(TileLayer::Solid, x, y).is_some_and(|t| t.solid) {
            return false;
        }
        if map.get_tile(TileLayer::Decor, x, y).is_some_and(|t| !t.is_empty()) {
            return false;
        }
        [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
            .into_iter()
            .any(|(ax, ay)| {
                map.get_tile(TileLayer::Solid, ax, ay)
                    .is_some_and(|t| t.solid && t.kind.is_wall())
            })
    }

    /// Free of solids and with no other hazard within [`HAZARD_SPACING`]
    /// tiles in either axis.
    pub fn is_valid_hazard_position(map: &Tilemap, x: i32, y: i32) -> bool {
        if !map.in_bounds(x, y) {
            return false;
        }
        if map.get_tile(TileLayer::Solid, x, y).is_some_and(|t| t.solid) {
            return false;
        }
        for cy in y - HAZARD_SPACING..=y + HAZARD_SPACING {
            for cx in x - HAZARD_SPACING..=x + HAZARD_SPACING {
                if map.get_tile(TileLayer::Hazard, cx, cy).is_some_and(|t| t.hazard) {
                    return false;
                }
            }
        }
        true
    }

    /// Straight corridor `width` tiles across: walls on both edges, floor
    /// between. Returns `false` for diagonal endpoints.
    pub fn generate_corridor(
        map: &mut Tilemap,
        start: (i32, i32),
        end: (i32, i32),
        width: i32,
    ) -> bool {
        let half = width.max(1) / 2;
        let tile_for = |offset: i32| {
            if offset == -half || offset == half {
                Tile::new(TileKind::WallBasic, 3, 0)
            } else {
                Tile::new(TileKind::GroundBase, 0, 0)
            }
        };

        if start.0 == end.0 {
            for y in start.1.min(end.1)..=start.1.max(end.1) {
                for offset in -half..=half {
                    map.set_tile(TileLayer::Solid, start.0 + offset, y, tile_for(offset));
                }
            }
        } else if start.1 == end.1 {
            for x in start.0.min(end.0)..=start.0.max(end.0) {
                for offset in -half..=half {
                    map.set_tile(TileLayer::Solid, x, start.1 + offset, tile_for(offset));
                }
            }
        } else {
            debug!("Corridor {:?} -> {:?} is not axis aligned; skipped", start, end);
            return false;
        }
        true
    }

    /// Empties every layer inside the rectangle; the part outside the map is
    /// ignored.
    pub fn clear_area(map: &mut Tilemap, x: i32, y: i32, width: i32, height: i32) {
        for cy in y..y + height {
            for cx in x..x + width {
                for layer in TileLayer::ALL {
                    map.set_tile(layer, cx, cy, Tile::EMPTY);
                }
            }
        }
        debug!("Cleared area ({},{}) {}x{}", x, y, width, height);
    }

    /// Walled room with a ground interior at `(x, y)`, then the extras `kind` calls for.
    pub fn add_room(
        &mut self,
        map: &mut Tilemap,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        kind: RoomKind,
    ) -> RoomReport {
        Self::add_basic_room(map, x, y, width, height);
        let mut report = RoomReport::default();
        match kind {
            RoomKind::Basic => {}
            RoomKind::Treasure => {
                let (cx, cy) = (x + width / 2, y + height / 2);
                if map.in_bounds(cx, cy) {
                    map.set_tile_by_id(TileLayer::Decor, cx, cy, TileKind::Terminal, 5, 1);
                    report.decorations = 1;
                }
            }
            RoomKind::Danger => {
                let attempts = (width.max(0) * height.max(0)) / 20;
                for _ in 0..attempts {
                    let (Some(hx), Some(hy)) = (
                        pick(&mut self.rng, x + 2, x + width - 3),
                        pick(&mut self.rng, y + 2, y + height - 3),
                    ) else {
                        break;
                    };
                    if Self::is_valid_hazard_position(map, hx, hy) {
                        let (trap, col) = if self.rng.gen_bool(0.5) {
                            (TileKind::LaserTrap, 0)
                        } else {
                            (TileKind::SpikeTrap, 1)
                        };
                        map.set_tile_by_id(TileLayer::Hazard, hx, hy, trap, 7, col);
                        report.hazards += 1;
                    }
                }
            }
        }
        debug!("Added {:?} room at ({},{}) {}x{}", kind, x, y, width, height);
        report
    }

    fn add_basic_room(map: &mut Tilemap, x: i32, y: i32, width: i32, height: i32) {
        for ry in y + 1..y + height - 1 {
            for rx in x + 1..x + width - 1 {
                map.set_tile_by_id(TileLayer::Solid, rx, ry, TileKind::GroundBase, 0, 0);
            }
        }
        for rx in x..x + width {
            map.set_tile_by_id(TileLayer::Solid, rx, y, TileKind::WallBasic, 3, 0);
            map.set_tile_by_id(TileLayer::Solid, rx, y + height - 1, TileKind::WallBasic, 3, 0);
        }
        for ry in y..y + height {
            map.set_tile_by_id(TileLayer::Solid, x, ry, TileKind::WallBasic, 3, 0);
            map.set_tile_by_id(TileLayer::Solid, x + width - 1, ry, TileKind::WallBasic, 3, 0);
        }
    }
}
