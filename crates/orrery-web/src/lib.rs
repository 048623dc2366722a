pub mod runner;

pub use runner::GameRunner;
pub use orrery_engine;

/// Seed for the engine RNG, taken from the host clock.
pub fn seed_from_clock() -> u64 {
    let now = js_sys::Date::now();
    if now.is_finite() && now > 0.0 {
        now as u64
    } else {
        42
    }
}

/// Generate all `#[wasm_bindgen]` exports for a game.
///
/// Generates:
/// - `thread_local!` storage for the GameRunner
/// - `with_runner()` helper function
/// - All wasm-bindgen exports (game_init, game_tick, input handlers,
///   control-panel commands, asset callbacks, data accessors)
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// mod game;
/// use game::MyGame;
///
/// orrery_web::export_game!(MyGame, "my-game");
/// ```
///
/// # Arguments
///
/// - `$game_type`: The game struct type that implements `orrery_engine::Game`
///   and provides `new()`
/// - `$game_name`: A string literal used in the initialization log message
#[macro_export]
macro_rules! export_game {
    ($game_type:ty, $game_name:literal) => {
        use std::cell::RefCell;
        use $crate::orrery_engine::InputEvent;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::GameRunner<$game_type>>> = RefCell::new(None);
        }

        /// Runs `f` against the runner; before `game_init` this is a no-op returning `R::default()`.
        fn with_runner<R: Default>(f: impl FnOnce(&mut $crate::GameRunner<$game_type>) -> R) -> R {
            RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
                Some(runner) => f(runner),
                None => {
                    log::warn!("{}: called before game_init()", $game_name);
                    R::default()
                }
            })
        }

        #[wasm_bindgen]
        pub fn game_init() {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let game = <$game_type>::new();
            let runner = $crate::GameRunner::with_seed(game, $crate::seed_from_clock());

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });

            with_runner(|r| r.init());
            log::info!("{}: initialized", $game_name);
        }

        #[wasm_bindgen]
        pub fn game_tick(dt: f32) {
            with_runner(|r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn game_key_down(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyDown { key_code }));
        }

        #[wasm_bindgen]
        pub fn game_key_up(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyUp { key_code }));
        }

        #[wasm_bindgen]
        pub fn game_mouse_delta(dx: f32, dy: f32) {
            with_runner(|r| r.push_input(InputEvent::MouseDelta { dx, dy }));
        }

        #[wasm_bindgen]
        pub fn game_pointer_lock(locked: bool) {
            with_runner(|r| r.push_input(InputEvent::PointerLock { locked }));
        }

        #[wasm_bindgen]
        pub fn game_command(json: &str) {
            with_runner(|r| r.command(json));
        }

        #[wasm_bindgen]
        pub fn game_load_manifest(json: &str) {
            with_runner(|r| r.load_manifest(json));
        }

        #[wasm_bindgen]
        pub fn game_asset_loaded(request_id: u32, slot: u32) {
            with_runner(|r| r.asset_loaded(request_id, slot));
        }

        #[wasm_bindgen]
        pub fn game_asset_failed(request_id: u32, message: String) {
            with_runner(|r| r.asset_failed(request_id, message));
        }

        // ---- JSON side channels ----

        #[wasm_bindgen]
        pub fn take_notices() -> String {
            with_runner(|r| r.take_notices_json())
        }

        #[wasm_bindgen]
        pub fn take_asset_requests() -> String {
            with_runner(|r| r.take_asset_requests_json())
        }

        #[wasm_bindgen]
        pub fn get_snapshot() -> String {
            with_runner(|r| r.snapshot_json())
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_header_ptr() -> *const f32 {
            RUNNER.with(|cell| cell.borrow().as_ref().map_or(std::ptr::null(), |r| r.header_ptr()))
        }

        #[wasm_bindgen]
        pub fn get_instances_ptr() -> *const f32 {
            RUNNER.with(|cell| cell.borrow().as_ref().map_or(std::ptr::null(), |r| r.instances_ptr()))
        }

        #[wasm_bindgen]
        pub fn get_instance_count() -> u32 {
            with_runner(|r| r.instance_count())
        }

        #[wasm_bindgen]
        pub fn get_translucent_split() -> u32 {
            with_runner(|r| r.translucent_split())
        }

        #[wasm_bindgen]
        pub fn get_camera_ptr() -> *const f32 {
            RUNNER.with(|cell| cell.borrow().as_ref().map_or(std::ptr::null(), |r| r.camera_ptr()))
        }

        #[wasm_bindgen]
        pub fn get_sound_events_ptr() -> *const u8 {
            RUNNER.with(|cell| cell.borrow().as_ref().map_or(std::ptr::null(), |r| r.sound_events_ptr()))
        }

        #[wasm_bindgen]
        pub fn get_sound_events_len() -> u32 {
            with_runner(|r| r.sound_events_len())
        }

        #[wasm_bindgen]
        pub fn get_game_events_ptr() -> *const f32 {
            RUNNER.with(|cell| cell.borrow().as_ref().map_or(std::ptr::null(), |r| r.game_events_ptr()))
        }

        #[wasm_bindgen]
        pub fn get_game_events_len() -> u32 {
            with_runner(|r| r.game_events_len())
        }

        #[wasm_bindgen]
        pub fn get_viewport_size() -> f32 {
            with_runner(|r| r.viewport_size())
        }

        // ---- Capacity accessors ----

        #[wasm_bindgen]
        pub fn get_max_instances() -> u32 {
            with_runner(|r| r.max_instances())
        }

        #[wasm_bindgen]
        pub fn get_max_sounds() -> u32 {
            with_runner(|r| r.max_sounds())
        }

        #[wasm_bindgen]
        pub fn get_max_events() -> u32 {
            with_runner(|r| r.max_events())
        }

        #[wasm_bindgen]
        pub fn get_buffer_total_floats() -> u32 {
            with_runner(|r| r.buffer_total_floats())
        }

        // ---- Lighting accessors ----

        #[wasm_bindgen]
        pub fn get_lights_ptr() -> *const f32 {
            RUNNER.with(|cell| cell.borrow().as_ref().map_or(std::ptr::null(), |r| r.lights_ptr()))
        }

        #[wasm_bindgen]
        pub fn get_light_count() -> u32 {
            with_runner(|r| r.light_count())
        }

        #[wasm_bindgen]
        pub fn get_max_lights() -> u32 {
            with_runner(|r| r.max_lights())
        }

        #[wasm_bindgen]
        pub fn get_ambient_r() -> f32 {
            with_runner(|r| r.ambient()[0])
        }

        #[wasm_bindgen]
        pub fn get_ambient_g() -> f32 {
            with_runner(|r| r.ambient()[1])
        }

        #[wasm_bindgen]
        pub fn get_ambient_b() -> f32 {
            with_runner(|r| r.ambient()[2])
        }
    };
}
