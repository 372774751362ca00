use macroquad::prelude::*;
use platformer_world::config::DEFAULT_CONFIG_PATH;
use platformer_world::{
    EditorAction, PointerButton, Rect as TileRect, ScreenSurface, TilemapConfig, WorldAction,
    WorldManager,
};

const MAP_SIZE: (usize, usize) = (60, 20);
const PLAYER_SIZE: f32 = 24.0;
const PLAYER_SPEED: f32 = 240.0;

fn window_conf() -> Conf {
    Conf {
        window_title: "World Demo".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

const SLOT_KEYS: [KeyCode; 9] = [
    KeyCode::Key0,
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
    KeyCode::Key7,
    KeyCode::Key8,
];

fn collect_actions() -> Vec<WorldAction> {
    let mut actions = Vec::new();
    let ctrl = is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl);

    let keyed = [
        (KeyCode::F1, WorldAction::Editor(EditorAction::ToggleDebugDisplay)),
        (KeyCode::F2, WorldAction::Editor(EditorAction::Save)),
        (KeyCode::F3, WorldAction::Editor(EditorAction::Load)),
        (KeyCode::F4, WorldAction::Editor(EditorAction::ToggleEditor)),
        (KeyCode::F5, WorldAction::Regenerate),
        (KeyCode::F6, WorldAction::ToggleParallax),
        (KeyCode::F12, WorldAction::ToggleDebugInfo),
        (KeyCode::Tab, WorldAction::Editor(EditorAction::CycleLayer)),
    ];
    for (key, action) in keyed {
        if is_key_pressed(key) {
            actions.push(action);
        }
    }
    for (slot, key) in SLOT_KEYS.iter().enumerate() {
        if is_key_pressed(*key) {
            actions.push(EditorAction::SelectSlot(slot).into());
        }
    }
    if ctrl && is_key_pressed(KeyCode::C) {
        actions.push(EditorAction::ClearMap.into());
    }

    let (mx, my) = mouse_position();
    actions.push(EditorAction::PointerMoved { x: mx as i32, y: my as i32 }.into());
    for (button, pointer) in [
        (MouseButton::Left, PointerButton::Paint),
        (MouseButton::Right, PointerButton::Erase),
    ] {
        if is_mouse_button_pressed(button) {
            actions.push(EditorAction::PointerPressed(pointer).into());
        }
        if is_mouse_button_released(button) {
            actions.push(EditorAction::PointerReleased(pointer).into());
        }
    }
    actions
}

fn player_input() -> Vec2 {
    let mut dir = Vec2::ZERO;
    if is_key_down(KeyCode::Left) || is_key_down(KeyCode::A) {
        dir.x -= 1.0;
    }
    if is_key_down(KeyCode::Right) || is_key_down(KeyCode::D) {
        dir.x += 1.0;
    }
    if is_key_down(KeyCode::Up) || is_key_down(KeyCode::W) {
        dir.y -= 1.0;
    }
    if is_key_down(KeyCode::Down) || is_key_down(KeyCode::S) {
        dir.y += 1.0;
    }
    dir.normalize_or_zero()
}

fn player_rect(p: Vec2) -> TileRect {
    TileRect::new(p.x as i32, p.y as i32, PLAYER_SIZE as i32, PLAYER_SIZE as i32)
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let config = TilemapConfig::load(DEFAULT_CONFIG_PATH);
    let mut world = WorldManager::new(
        config,
        screen_width(),
        screen_height(),
        MAP_SIZE.0,
        MAP_SIZE.1,
    );
    world.initialize();
    let mut world = world.upload();

    let ts = world.tilemap().tile_size() as f32;
    let mut player = vec2(2.0 * ts, 2.0 * ts);
    let mut health = 100;
    let mut surface = ScreenSurface;

    loop {
        let dt = get_frame_time();

        for action in collect_actions() {
            // failures are already logged by the world
            let _ = world.handle_action(action);
        }

        player += player_input() * PLAYER_SPEED * dt;
        let blocked = world.check_collision(&player_rect(player));
        let damage = world.check_hazard_collision(&player_rect(player));
        if damage > 0 {
            health = (health - damage).max(0);
        }

        world.update(dt, player + Vec2::splat(PLAYER_SIZE / 2.0));

        clear_background(BLACK);
        world.render(&mut surface);

        let screen = world.world_to_screen(player);
        draw_rectangle(screen.x, screen.y, PLAYER_SIZE, PLAYER_SIZE, SKYBLUE);
        let status = format!("HP: {}{}", health, if blocked { " (in solid)" } else { "" });
        draw_text(&status, 20.0, screen_height() - 20.0, 30.0, WHITE);
        draw_text(
            &format!("FPS: {}", get_fps()),
            screen_width() - 135.0,
            screen_height() - 20.0,
            30.0,
            RED,
        );

        next_frame().await;
    }
}
