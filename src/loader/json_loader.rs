// Level persistence: JSON round-trip and CSV export.
use crate::error::{Result, WorldError};
use crate::tile::{Tile, TileKind, TileLayer};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
struct JsonTile {
    id: u32,
    #[serde(default)]
    sprite_row: u32,
    #[serde(default)]
    sprite_col: u32,
    #[serde(default)]
    solid: bool,
    #[serde(default)]
    hazard: bool,
    #[serde(default)]
    damage: i32,
}

impl From<&Tile> for JsonTile {
    fn from(t: &Tile) -> Self {
        JsonTile {
            id: t.kind.id(),
            sprite_row: t.sprite_row,
            sprite_col: t.sprite_col,
            solid: t.solid,
            hazard: t.hazard,
            damage: t.damage,
        }
    }
}

type JsonGrid = Vec<Vec<JsonTile>>;

/// Largest `width * height` accepted from a file (e.g. 1024x1024).
pub const MAX_MAP_CELLS: usize = 1 << 20;

#[derive(Serialize, Deserialize, Default)]
struct JsonLayers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    solid: Option<JsonGrid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    decor: Option<JsonGrid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hazard: Option<JsonGrid>,
}

impl JsonLayers {
    fn take(&mut self, layer: TileLayer) -> Option<JsonGrid> {
        match layer {
            TileLayer::Solid => self.solid.take(),
            TileLayer::Decor => self.decor.take(),
            TileLayer::Hazard => self.hazard.take(),
        }
    }

    fn slot(&mut self, layer: TileLayer) -> &mut Option<JsonGrid> {
        match layer {
            TileLayer::Solid => &mut self.solid,
            TileLayer::Decor => &mut self.decor,
            TileLayer::Hazard => &mut self.hazard,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct JsonMap {
    width: usize,
    height: usize,
    #[serde(default)]
    layers: JsonLayers,
}

/// Fully decoded and validated level contents, ready to swap into a map.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMap {
    /// Width in tiles.
    pub width: usize,
    /// Height in tiles.
    pub height: usize,
    /// Row-major cells, indexed by [`TileLayer::index`].
    pub layers: [Vec<Tile>; 3],
}

/// Splits row-major `cells` into exactly `height` rows, empty ones when
/// `width` is 0.
fn rows(cells: &[Tile], width: usize, height: usize) -> impl Iterator<Item = &[Tile]> {
    (0..height).map(move |y| cells.get(y * width..(y + 1) * width).unwrap_or(&[]))
}

/// Encodes `layers` (row-major, `width * height` each) as pretty JSON.
pub fn encode_map(width: usize, height: usize, layers: &[Vec<Tile>; 3]) -> Result<String> {
    let mut json_layers = JsonLayers::default();
    for layer in TileLayer::ALL {
        let cells = &layers[layer.index()];
        let grid: JsonGrid = rows(cells, width, height)
            .map(|row| row.iter().map(JsonTile::from).collect())
            .collect();
        *json_layers.slot(layer) = Some(grid);
    }
    let map = JsonMap {
        width,
        height,
        layers: json_layers,
    };
    Ok(serde_json::to_string_pretty(&map)?)
}

fn decode_grid(
    layer: TileLayer,
    grid: JsonGrid,
    width: usize,
    height: usize,
) -> Result<Vec<Tile>> {
    let size_error = |found: (usize, usize)| WorldError::InvalidLayerSize {
        layer: layer.name().to_owned(),
        expected: (width, height),
        found,
    };
    if grid.len() != height {
        let row_len = grid.first().map_or(0, Vec::len);
        return Err(size_error((row_len, grid.len())));
    }

    let mut cells = Vec::with_capacity(width * height);
    for (y, row) in grid.into_iter().enumerate() {
        if row.len() != width {
            return Err(size_error((row.len(), height)));
        }
        for (x, t) in row.into_iter().enumerate() {
            let kind = TileKind::from_id(t.id).ok_or_else(|| WorldError::UnknownTileId {
                layer: layer.name().to_owned(),
                x,
                y,
                id: t.id,
            })?;
            // stored flags win over the id table so edited maps survive intact
            cells.push(Tile {
                kind,
                sprite_row: t.sprite_row,
                sprite_col: t.sprite_col,
                solid: t.solid,
                hazard: t.hazard,
                damage: t.damage,
            });
        }
    }
    Ok(cells)
}

/// Parses and validates a level. Absent layers decode as all-empty.
pub fn decode_map_str(json: &str) -> Result<DecodedMap> {
    let mut j: JsonMap = serde_json::from_str(json)?;
    let (width, height) = (j.width, j.height);
    match width.checked_mul(height) {
        Some(cells) if cells <= MAX_MAP_CELLS => {}
        _ => {
            return Err(WorldError::MapTooLarge {
                width,
                height,
                limit: MAX_MAP_CELLS,
            })
        }
    }

    let mut decode = |layer: TileLayer| -> Result<Vec<Tile>> {
        match j.layers.take(layer) {
            Some(grid) => decode_grid(layer, grid, width, height),
            None => Ok(vec![Tile::EMPTY; width * height]),
        }
    };
    let solid = decode(TileLayer::Solid)?;
    let decor = decode(TileLayer::Decor)?;
    let hazard = decode(TileLayer::Hazard)?;

    Ok(DecodedMap {
        width,
        height,
        layers: [solid, decor, hazard],
    })
}

fn require_json(path: &Path) -> Result<()> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(WorldError::UnsupportedFormat(path.display().to_string()));
    }
    Ok(())
}

/// Reads and decodes a `.json` level file.
pub fn decode_map_file(path: &Path) -> Result<DecodedMap> {
    require_json(path)?;
    if !path.exists() {
        return Err(WorldError::MapNotFound(path.to_path_buf()));
    }
    let txt = std::fs::read_to_string(path).map_err(|source| WorldError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_map_str(&txt).map_err(|e| match e {
        WorldError::Parse(source) => WorldError::Json {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Writes `contents`, creating parent directories.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| WorldError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| WorldError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Encodes and writes a level. The path must end in `.json`.
pub fn encode_map_file(
    path: &Path,
    width: usize,
    height: usize,
    layers: &[Vec<Tile>; 3],
) -> Result<()> {
    require_json(path)?;
    let txt = encode_map(width, height, layers)?;
    write_text(path, &txt)
}

/// One line per row of numeric tile ids.
pub fn encode_csv(width: usize, height: usize, cells: &[Tile]) -> String {
    let mut out = String::with_capacity(width * height * 3);
    for row in rows(cells, width, height) {
        for (i, tile) in row.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}", tile.kind.id());
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers_2x2() -> [Vec<Tile>; 3] {
        let mut solid = vec![Tile::EMPTY; 4];
        solid[1] = Tile::new(TileKind::WallBasic, 10, 3);
        let decor = vec![Tile::EMPTY; 4];
        let mut hazard = vec![Tile::EMPTY; 4];
        hazard[2] = Tile::new(TileKind::SpikeTrap, 7, 1);
        [solid, decor, hazard]
    }

    #[test]
    fn encodes_layers_by_name_and_cell_fields() {
        let txt = encode_map(2, 2, &layers_2x2()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&txt).unwrap();
        assert_eq!(v["width"], 2);
        assert_eq!(v["layers"]["solid"][0][1]["id"], 3);
        assert_eq!(v["layers"]["solid"][0][1]["sprite_row"], 10);
        assert_eq!(v["layers"]["hazard"][1][0]["damage"], 10);
        assert_eq!(v["layers"]["decor"][1][1]["solid"], false);
    }

    #[test]
    fn decodes_what_it_encodes() {
        let layers = layers_2x2();
        let txt = encode_map(2, 2, &layers).unwrap();
        let decoded = decode_map_str(&txt).unwrap();
        assert_eq!(decoded.layers, layers);
    }

    #[test]
    fn absent_layers_are_empty_and_missing_flags_default() {
        let json = r#"{"width":1,"height":1,"layers":{"solid":[[{"id":1,"sprite_row":9,"sprite_col":0}]]}}"#;
        let decoded = decode_map_str(json).unwrap();
        let t = decoded.layers[TileLayer::Solid.index()][0];
        assert_eq!(t.kind, TileKind::GroundBase);
        assert!(!t.solid);
        assert!(decoded.layers[TileLayer::Hazard.index()][0].is_empty());
    }

    #[test]
    fn rejects_short_rows() {
        let json = r#"{"width":2,"height":1,"layers":{"decor":[[{"id":0}]]}}"#;
        let err = decode_map_str(json).unwrap_err();
        assert!(matches!(err, WorldError::InvalidLayerSize { ref layer, .. } if layer == "decor"));
    }

    #[test]
    fn rejects_unknown_ids() {
        let json = r#"{"width":1,"height":1,"layers":{"hazard":[[{"id":99}]]}}"#;
        let err = decode_map_str(json).unwrap_err();
        assert!(matches!(err, WorldError::UnknownTileId { id: 99, x: 0, y: 0, .. }));
    }

    #[test]
    fn returns_typed_error_for_malformed_json() {
        assert!(matches!(decode_map_str("{ not json").unwrap_err(), WorldError::Parse(_)));
    }

    #[test]
    fn oversized_dimensions_are_rejected_before_allocating() {
        for json in [
            r#"{"width":4294967296,"height":4294967296}"#,
            r#"{"width":100000,"height":100000}"#,
            r#"{"width":18446744073709551615,"height":2,"layers":{}}"#,
        ] {
            let err = decode_map_str(json).unwrap_err();
            assert!(matches!(err, WorldError::MapTooLarge { limit: MAX_MAP_CELLS, .. }), "{err:?}");
        }
        let at_limit = format!(r#"{{"width":{},"height":1}}"#, MAX_MAP_CELLS);
        assert!(decode_map_str(&at_limit).is_ok());
    }

    #[test]
    fn zero_width_maps_keep_their_rows() {
        let layers: [Vec<Tile>; 3] = Default::default();
        let txt = encode_map(0, 3, &layers).unwrap();
        let decoded = decode_map_str(&txt).unwrap();
        assert_eq!((decoded.width, decoded.height), (0, 3));
        assert_eq!(encode_csv(0, 3, &[]), "\n\n\n");
    }

    #[test]
    fn csv_has_one_line_per_row() {
        let layers = layers_2x2();
        assert_eq!(encode_csv(2, 2, &layers[0]), "0,3\n0,0\n");
        assert_eq!(encode_csv(2, 2, &layers[2]), "0,0\n13,0\n");
    }
}
