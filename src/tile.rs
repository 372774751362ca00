//! Tile records and the id → physical-properties table.

/// Every tile id the world knows about.
///
/// The numeric value is the id written to save files and CSV exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(u8)]
pub enum TileKind {
    #[default]
    /// No tile.
    Empty = 0,
    /// Floor.
    GroundBase = 1,
    /// Cracked floor.
    GroundWorn = 2,
    /// Plain wall.
    WallBasic = 3,
    /// Armoured wall.
    WallReinforced = 4,
    /// Staircase decoration.
    Stairs = 5,
    /// Background pipework.
    Pipes = 6,
    /// Door for [`DoorType::Standard`].
    DoorStandard = 7,
    /// Door for [`DoorType::Reinforced`].
    DoorReinforced = 8,
    /// Door for [`DoorType::Electronic`].
    DoorElectronic = 9,
    /// Computer terminal decoration.
    Terminal = 10,
    /// Floor or wall marking.
    Decal = 11,
    /// 15 damage.
    LaserTrap = 12,
    /// 10 damage.
    SpikeTrap = 13,
    /// Glowing sign decoration.
    NeonSign = 14,
}

/// Physical flags derived from a [`TileKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileProperties {
    /// Blocks movement.
    pub solid: bool,
    /// Deals damage on contact.
    pub hazard: bool,
    /// Damage per hit, 0 unless `hazard`.
    pub damage: i32,
}

impl TileProperties {
    const INERT: TileProperties = TileProperties {
        solid: false,
        hazard: false,
        damage: 0,
    };
    const SOLID: TileProperties = TileProperties {
        solid: true,
        hazard: false,
        damage: 0,
    };

    const fn trap(damage: i32) -> Self {
        TileProperties {
            solid: false,
            hazard: true,
            damage,
        }
    }
}

impl TileKind {
    /// Every kind, in id order.
    pub const ALL: [TileKind; 15] = [
        TileKind::Empty,
        TileKind::GroundBase,
        TileKind::GroundWorn,
        TileKind::WallBasic,
        TileKind::WallReinforced,
        TileKind::Stairs,
        TileKind::Pipes,
        TileKind::DoorStandard,
        TileKind::DoorReinforced,
        TileKind::DoorElectronic,
        TileKind::Terminal,
        TileKind::Decal,
        TileKind::LaserTrap,
        TileKind::SpikeTrap,
        TileKind::NeonSign,
    ];

    /// Id stored in save files.
    #[inline]
    pub fn id(self) -> u32 {
        self as u32
    }

    /// `None` for ids outside the table.
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// The single source of truth for solidity and damage.
    pub fn properties(self) -> TileProperties {
        match self {
            TileKind::GroundBase
            | TileKind::GroundWorn
            | TileKind::WallBasic
            | TileKind::WallReinforced
            | TileKind::DoorStandard
            | TileKind::DoorReinforced
            | TileKind::DoorElectronic => TileProperties::SOLID,
            TileKind::LaserTrap => TileProperties::trap(15),
            TileKind::SpikeTrap => TileProperties::trap(10),
            TileKind::Empty
            | TileKind::Stairs
            | TileKind::Pipes
            | TileKind::Terminal
            | TileKind::Decal
            | TileKind::NeonSign => TileProperties::INERT,
        }
    }

    /// Atlas `(row, col)` used when a tile of this kind is painted by hand.
    pub fn default_sprite(self) -> (u32, u32) {
        match self {
            TileKind::Empty | TileKind::GroundBase => (0, 0),
            TileKind::GroundWorn => (1, 0),
            TileKind::WallBasic => (2, 0),
            TileKind::WallReinforced => (3, 0),
            TileKind::Stairs => (4, 0),
            TileKind::Pipes => (4, 1),
            TileKind::DoorStandard => (5, 0),
            TileKind::DoorReinforced => (5, 1),
            TileKind::DoorElectronic => (5, 2),
            TileKind::Terminal => (5, 3),
            TileKind::Decal => (6, 0),
            TileKind::NeonSign => (6, 1),
            TileKind::LaserTrap => (7, 0),
            TileKind::SpikeTrap => (7, 1),
        }
    }

    /// Basic or reinforced wall.
    #[inline]
    pub fn is_wall(self) -> bool {
        matches!(self, TileKind::WallBasic | TileKind::WallReinforced)
    }

    /// Lowercase name for logs and the editor panel.
    pub fn name(self) -> &'static str {
        match self {
            TileKind::Empty => "empty",
            TileKind::GroundBase => "ground_base",
            TileKind::GroundWorn => "ground_worn",
            TileKind::WallBasic => "wall_basic",
            TileKind::WallReinforced => "wall_reinforced",
            TileKind::Stairs => "stairs",
            TileKind::Pipes => "pipes",
            TileKind::DoorStandard => "door_standard",
            TileKind::DoorReinforced => "door_reinforced",
            TileKind::DoorElectronic => "door_electronic",
            TileKind::Terminal => "terminal",
            TileKind::Decal => "decal",
            TileKind::LaserTrap => "laser_trap",
            TileKind::SpikeTrap => "spike_trap",
            TileKind::NeonSign => "neon_sign",
        }
    }
}

/// Door variants that [`crate::Tilemap::place_door`] understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorType {
    /// Plain door.
    Standard,
    /// Armoured door.
    Reinforced,
    /// Powered door.
    Electronic,
}

impl DoorType {
    /// Parses a config door name such as `standard`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(DoorType::Standard),
            "reinforced" => Some(DoorType::Reinforced),
            "electronic" => Some(DoorType::Electronic),
            _ => None,
        }
    }

    /// Config name of the door type.
    pub fn name(self) -> &'static str {
        match self {
            DoorType::Standard => "standard",
            DoorType::Reinforced => "reinforced",
            DoorType::Electronic => "electronic",
        }
    }

    /// Tile kind placed for this door.
    pub fn tile_kind(self) -> TileKind {
        match self {
            DoorType::Standard => TileKind::DoorStandard,
            DoorType::Reinforced => TileKind::DoorReinforced,
            DoorType::Electronic => TileKind::DoorElectronic,
        }
    }
}

/// One cell of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tile {
    /// What the tile is.
    pub kind: TileKind,
    /// Atlas row.
    pub sprite_row: u32,
    /// Atlas column.
    pub sprite_col: u32,
    /// Blocks movement.
    pub solid: bool,
    /// Deals damage on contact.
    pub hazard: bool,
    /// Damage per hit.
    pub damage: i32,
}

impl Tile {
    /// No tile.
    pub const EMPTY: Tile = Tile {
        kind: TileKind::Empty,
        sprite_row: 0,
        sprite_col: 0,
        solid: false,
        hazard: false,
        damage: 0,
    };

    /// Builds a tile whose flags come from the kind's property table.
    pub fn new(kind: TileKind, sprite_row: u32, sprite_col: u32) -> Self {
        let props = kind.properties();
        Tile {
            kind,
            sprite_row,
            sprite_col,
            solid: props.solid,
            hazard: props.hazard,
            damage: props.damage,
        }
    }

    /// Tile of `kind` using its hand-painting sprite.
    pub fn of_kind(kind: TileKind) -> Self {
        let (row, col) = kind.default_sprite();
        Tile::new(kind, row, col)
    }

    /// Whether the cell holds no tile.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kind == TileKind::Empty
    }
}

/// The three planes of a tilemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileLayer {
    /// Collision-bearing.
    Solid,
    /// Visual only.
    Decor,
    /// Damage-bearing.
    Hazard,
}

impl TileLayer {
    /// Every layer, in storage order.
    pub const ALL: [TileLayer; 3] = [TileLayer::Solid, TileLayer::Decor, TileLayer::Hazard];

    /// Hazards draw last so danger is never hidden.
    pub const RENDER_ORDER: [TileLayer; 3] = Self::ALL;

    /// Storage index, 0 to 2.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name, used as the JSON key.
    pub fn name(self) -> &'static str {
        match self {
            TileLayer::Solid => "solid",
            TileLayer::Decor => "decor",
            TileLayer::Hazard => "hazard",
        }
    }

    /// Parses a layer name such as `solid`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.name() == name)
    }

    /// Whether writes to this layer invalidate the collision/hazard cache.
    #[inline]
    pub fn affects_cache(self) -> bool {
        matches!(self, TileLayer::Solid | TileLayer::Hazard)
    }

    /// Next layer in cycling order.
    pub fn next(self) -> Self {
        match self {
            TileLayer::Solid => TileLayer::Decor,
            TileLayer::Decor => TileLayer::Hazard,
            TileLayer::Hazard => TileLayer::Solid,
        }
    }
}
