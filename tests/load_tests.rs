// tests/load_tests.rs

mod common;

use std::fs;

use common::scratch_dir;
use platformer_world::config::EditorConfig;
use platformer_world::{
    EditorAction, MapGenerator, Rect, TileKind, TileLayer, Tilemap, TilemapConfig, TilemapEditor,
    WorldError,
};

fn sample_map() -> Tilemap {
    let mut map = Tilemap::new(30, 14);
    MapGenerator::new(2024).generate_test_room(&mut map, 30, 14);
    map.set_tile_by_id(TileLayer::Hazard, 0, 0, TileKind::SpikeTrap, 7, 1);
    map.set_tile_by_id(TileLayer::Decor, 29, 13, TileKind::Decal, 6, 0);
    map
}

#[test]
fn save_then_load_reproduces_every_cell() {
    let dir = scratch_dir("round_trip");
    let path = dir.join("room.json");
    let mut original = sample_map();
    original.save_json(&path).unwrap();

    let mut loaded = Tilemap::new(1, 1);
    loaded.load_json(&path).unwrap();
    assert_eq!((loaded.width(), loaded.height()), (30, 14));
    for layer in TileLayer::ALL {
        assert_eq!(loaded.layer(layer), original.layer(layer), "{}", layer.name());
    }
    assert_eq!(loaded.collision_rects(), original.collision_rects());
    assert_eq!(loaded.hazard_rects(), original.hazard_rects());
    let probe = Rect::new(0, 0, 48, 48);
    assert_eq!(loaded.check_hazard_collision(&probe), original.check_hazard_collision(&probe));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn saved_file_uses_layer_names() {
    let dir = scratch_dir("format");
    let path = dir.join("map.json");
    sample_map().save_json(&path).unwrap();

    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(v["width"], 30);
    assert_eq!(v["height"], 14);
    for name in ["solid", "decor", "hazard"] {
        assert_eq!(v["layers"][name].as_array().map(Vec::len), Some(14));
    }
    assert_eq!(v["layers"]["hazard"][0][0]["id"], TileKind::SpikeTrap.id());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unsupported_extension_is_rejected() {
    let map = Tilemap::new(2, 2);
    match map.save_json("level.tmx").unwrap_err() {
        WorldError::UnsupportedFormat(p) => assert_eq!(p, "level.tmx"),
        other => panic!("expected UnsupportedFormat, got {:?}", other),
    }
}

#[test]
fn missing_file_leaves_map_alone() {
    let dir = scratch_dir("missing");
    let mut map = sample_map();
    let before = map.layer(TileLayer::Solid).to_vec();

    let err = map.load_json(dir.join("nope.json")).unwrap_err();
    assert!(matches!(err, WorldError::MapNotFound(_)));
    assert_eq!(map.layer(TileLayer::Solid), before.as_slice());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn corrupt_file_leaves_map_alone() {
    let dir = scratch_dir("corrupt");
    let path = dir.join("bad.json");
    fs::write(&path, "{ \"width\": 3, \"height\": ").unwrap();

    let mut map = sample_map();
    let err = map.load_json(&path).unwrap_err();
    assert!(matches!(err, WorldError::Json { .. }), "{err:?}");
    assert_eq!((map.width(), map.height()), (30, 14));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn oversized_map_file_leaves_map_alone() {
    let dir = scratch_dir("oversized");
    let mut map = sample_map();
    let before = map.layer(TileLayer::Solid).to_vec();
    let collisions = map.collision_rects().to_vec();

    for (name, body) in [
        ("overflow.json", r#"{ "width": 4294967296, "height": 4294967296 }"#),
        ("huge.json", r#"{ "width": 100000, "height": 100000 }"#),
    ] {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        let err = map.load_json(&path).unwrap_err();
        assert!(matches!(err, WorldError::MapTooLarge { .. }), "{err:?}");
    }
    assert_eq!((map.width(), map.height()), (30, 14));
    assert_eq!(map.layer(TileLayer::Solid), before.as_slice());
    assert_eq!(map.collision_rects(), collisions.as_slice());
    map.set_tile_by_id(TileLayer::Solid, 29, 13, TileKind::WallBasic, 3, 0);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn editor_save_writes_json_and_layer_csvs() {
    let dir = scratch_dir("editor");
    let config = EditorConfig {
        maps_directory: dir.join("maps").to_string_lossy().into_owned(),
        map_file: "arena.json".to_owned(),
    };
    let mut editor = TilemapEditor::new(&config);
    let mut map = sample_map();

    editor.apply(EditorAction::Save, &mut map, (0, 0)).unwrap();
    let maps = dir.join("maps");
    assert!(maps.join("arena.json").is_file());
    for layer in ["solid", "decor", "hazard"] {
        let csv = fs::read_to_string(maps.join(format!("arena_{}.csv", layer))).unwrap();
        assert_eq!(csv.lines().count(), 14);
        assert!(csv.lines().all(|l| l.split(',').count() == 30));
    }

    let mut other = Tilemap::new(5, 5);
    editor.apply(EditorAction::Load, &mut other, (0, 0)).unwrap();
    assert_eq!(other.layer(TileLayer::Hazard), map.layer(TileLayer::Hazard));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn config_file_fills_missing_fields() {
    let dir = scratch_dir("config");
    let path = dir.join("tilemap_config.json");
    fs::write(&path, r#"{ "tile_size": 16, "door_types": { "standard": { "row": 1, "col": 2 } } }"#)
        .unwrap();

    let config = TilemapConfig::load(&path);
    assert_eq!(config.tile_size, 16);
    assert_eq!(config.autotile_rows.walls, 10);
    assert!(config.door_sprite("electronic").is_none());

    let mut map = Tilemap::with_config(4, 4, &config);
    assert!(map.place_door(0, 0, "standard"));
    assert!(!map.place_door(1, 0, "electronic"));
    let door = map.get_tile(TileLayer::Solid, 0, 0).unwrap();
    assert_eq!((door.sprite_row, door.sprite_col), (1, 2));
    assert_eq!(map.collision_rects(), &[Rect::new(0, 0, 16, 16)]);

    assert_eq!(TilemapConfig::load(dir.join("absent.json")), TilemapConfig::default());

    fs::remove_dir_all(&dir).unwrap();
}
