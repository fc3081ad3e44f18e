pub mod runner;

use std::cell::RefCell;

use billiards::{default_world, DefaultWorld, InputEvent, TableConfig};
use wasm_bindgen::prelude::*;

pub use runner::{FrameClock, SessionRunner};

type Runner = SessionRunner<DefaultWorld>;

thread_local! {
    static RUNNER: RefCell<Option<Runner>> = const { RefCell::new(None) };
}

/// Run `f` against the live runner. `None` before `game_init()` succeeds.
fn with_runner<T>(f: impl FnOnce(&mut Runner) -> T) -> Option<T> {
    RUNNER.with(|cell| {
        let result = cell.borrow_mut().as_mut().map(f);
        if result.is_none() {
            log::warn!("billiards: not initialized, call game_init() first");
        }
        result
    })
}

fn push(event: InputEvent) {
    with_runner(|r| r.push_input(event));
}

/// Create the session. `config_json` may be empty for the default table.
#[wasm_bindgen]
pub fn game_init(config_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&JsValue::from_str("billiards: logger already installed"));
    }

    let config = if config_json.trim().is_empty() {
        TableConfig::default()
    } else {
        TableConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    let seed = config
        .seed
        .unwrap_or_else(|| (js_sys::Math::random() * u32::MAX as f64) as u64);

    let world = default_world(&config);
    let runner = Runner::new(config, world, seed).map_err(|e| JsValue::from_str(&e.to_string()))?;
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });

    log::info!("billiards: initialized (seed {})", seed);
    Ok(())
}

#[wasm_bindgen]
pub fn game_tick(dt: f32) {
    if let Some(Err(e)) = with_runner(|r| r.tick(dt)) {
        log::error!("billiards: frame failed: {}", e);
    }
}

// ---- Input ----

#[wasm_bindgen]
pub fn begin_aim(x: f32, y: f32) {
    push(InputEvent::BeginAim { x, y });
}

#[wasm_bindgen]
pub fn update_aim(x: f32, y: f32) {
    push(InputEvent::UpdateAim { x, y });
}

#[wasm_bindgen]
pub fn release_shot() {
    push(InputEvent::ReleaseShot);
}

#[wasm_bindgen]
pub fn cancel_aim() {
    push(InputEvent::CancelAim);
}

#[wasm_bindgen]
pub fn request_special_action() {
    push(InputEvent::SpecialAction);
}

#[wasm_bindgen]
pub fn reset_game() {
    push(InputEvent::Reset);
}

#[wasm_bindgen]
pub fn game_key_down(key_code: u32) {
    push(InputEvent::KeyDown { key_code });
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_header_ptr() -> *const f32 {
    with_runner(|r| r.header_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_header_len() -> u32 {
    with_runner(|r| r.header_len()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_balls_ptr() -> *const f32 {
    with_runner(|r| r.balls_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_ball_count() -> u32 {
    with_runner(|r| r.ball_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_sounds_ptr() -> *const f32 {
    with_runner(|r| r.sounds_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_sound_count() -> u32 {
    with_runner(|r| r.sound_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_events_ptr() -> *const f32 {
    with_runner(|r| r.events_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_event_count() -> u32 {
    with_runner(|r| r.event_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_score() -> i32 {
    with_runner(|r| r.score()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_turn() -> u32 {
    with_runner(|r| r.turn()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn is_in_motion() -> bool {
    with_runner(|r| r.in_motion()).unwrap_or(false)
}

/// Full state as JSON, including the last frame's events.
#[wasm_bindgen]
pub fn get_snapshot_json() -> Result<String, JsValue> {
    with_runner(|r| r.snapshot_json())
        .ok_or_else(|| JsValue::from_str("billiards: not initialized"))?
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
