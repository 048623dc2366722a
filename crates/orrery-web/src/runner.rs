use orrery_engine::{
    Command, Game, GameConfig, EngineContext, CameraUniform,
    InputEvent, InputQueue, RenderBuffer, RequestId,
    AssetManifest, FixedTimestep, ProtocolLayout,
};
use orrery_engine::bridge::protocol::HEADER_FLOATS;
use orrery_engine::systems::render::build_render_buffer;

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export generic
/// structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    render_buffer: RenderBuffer,
    timestep: FixedTimestep,
    config: GameConfig,
    layout: ProtocolLayout,
    initialized: bool,
    camera_uniform: CameraUniform,
    /// Flat buffer of sound event IDs for SharedArrayBuffer reads.
    sound_buffer: Vec<u8>,
    header: [f32; HEADER_FLOATS],
    frame_counter: u32,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        Self::with_seed(game, 42)
    }

    /// Build a runner whose engine RNG starts from `seed`.
    pub fn with_seed(game: G, seed: u64) -> Self {
        let config = game.config();
        let timestep = FixedTimestep::with_max_steps(config.fixed_dt, config.max_steps_per_frame);
        let layout = ProtocolLayout::from_config(&config);
        let header = layout.header(config.viewport_size);

        let mut ctx = EngineContext::with_seed(seed);
        ctx.lights = orrery_engine::LightState::with_capacity(config.max_lights);
        ctx.set_dt(config.fixed_dt);

        Self {
            game,
            ctx,
            input: InputQueue::new(),
            render_buffer: RenderBuffer::with_capacity(config.max_instances),
            timestep,
            camera_uniform: CameraUniform::default(),
            sound_buffer: Vec::with_capacity(config.max_sounds),
            layout,
            config,
            initialized: false,
            header,
            frame_counter: 0,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.timestep.reset();
        self.game.init(&mut self.ctx);
        self.ctx.transforms.propagate(&mut self.ctx.scene);
        self.publish();
        self.initialized = true;
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one display frame: zero or more fixed updates, then rebuild the
    /// buffers the host reads.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        self.ctx.clear_frame_data();

        // Each queued event is delivered to exactly one update.
        let steps = self.timestep.accumulate(dt);
        let idle = InputQueue::new();
        for step in 0..steps {
            let input = if step == 0 { &self.input } else { &idle };
            self.game.update(&mut self.ctx, input);
            self.ctx.transforms.propagate(&mut self.ctx.scene);
        }

        // Events stay queued until at least one update has seen them.
        if steps > 0 {
            self.input.drain();
        }

        self.publish();
    }

    fn publish(&mut self) {
        build_render_buffer(self.ctx.scene.iter(), &mut self.render_buffer);
        self.camera_uniform = self.ctx.camera.uniform();

        self.sound_buffer.clear();
        for sound in self.ctx.sounds.iter().take(self.layout.max_sounds) {
            self.sound_buffer.push(sound.0 as u8);
        }
        if self.ctx.events.len() > self.layout.max_events {
            log::warn!("dropping {} game events over capacity", self.ctx.events.len() - self.layout.max_events);
            self.ctx.events.truncate(self.layout.max_events);
        }

        use orrery_engine::bridge::protocol::*;
        self.frame_counter = self.frame_counter.wrapping_add(1);
        self.header[HEADER_FRAME_COUNTER] = self.frame_counter as f32;
        self.header[HEADER_INSTANCE_COUNT] = self.render_buffer.instance_count() as f32;
        self.header[HEADER_TRANSLUCENT_SPLIT] = self.render_buffer.translucent_split as f32;
        self.header[HEADER_LIGHT_COUNT] = self.ctx.lights.count() as f32;
        self.header[HEADER_SOUND_COUNT] = self.sound_buffer.len() as f32;
        self.header[HEADER_EVENT_COUNT] = self.ctx.events.len() as f32;
    }

    /// Dispatch a control-panel command (`{"kind":..,"target":..,"args":[..]}`).
    pub fn command(&mut self, json: &str) {
        if !self.initialized {
            return;
        }
        match Command::from_json(json) {
            Ok(command) => {
                self.game.command(&mut self.ctx, &command);
                self.ctx.transforms.propagate(&mut self.ctx.scene);
                self.publish();
            }
            Err(e) => log::warn!("ignoring malformed command: {e}"),
        }
    }

    /// Parse the host's asset manifest and hand it to the game.
    pub fn load_manifest(&mut self, json: &str) {
        match AssetManifest::from_json(json) {
            Ok(manifest) => {
                log::info!(
                    "manifest: {} textures, {} models, {} sounds",
                    manifest.textures.len(),
                    manifest.models.len(),
                    manifest.sounds.len()
                );
                self.game.manifest_loaded(&mut self.ctx, &manifest);
            }
            Err(e) => log::warn!("failed to parse asset manifest: {e}"),
        }
    }

    /// The host finished loading request `id` into `slot`.
    pub fn asset_loaded(&mut self, id: u32, slot: u32) {
        self.finish_asset(id, Ok(slot));
    }

    /// The host failed to load request `id`.
    pub fn asset_failed(&mut self, id: u32, message: String) {
        self.finish_asset(id, Err(message));
    }

    fn finish_asset(&mut self, id: u32, outcome: Result<u32, String>) {
        match self.ctx.assets.complete(RequestId(id), outcome) {
            Some(completion) => {
                self.game.asset_loaded(&mut self.ctx, completion);
                self.publish();
            }
            None => log::debug!("discarding completion for cancelled request {id}"),
        }
    }

    // ---- JSON side channels ----

    /// Pending notices (alerts, confirmations) as a JSON array. Empties the queue.
    pub fn take_notices_json(&mut self) -> String {
        let notices = self.ctx.take_notices();
        serde_json::to_string(&notices).unwrap_or_else(|_| "[]".to_string())
    }

    /// Pending asset requests as a JSON array. Empties the outbox.
    pub fn take_asset_requests_json(&mut self) -> String {
        self.ctx.assets.take_outbox_json()
    }

    /// Current UI state as JSON.
    pub fn snapshot_json(&self) -> String {
        self.game.snapshot().to_string()
    }

    // ---- Pointer accessors for SharedArrayBuffer reads ----

    pub fn header_ptr(&self) -> *const f32 {
        self.header.as_ptr()
    }

    pub fn instances_ptr(&self) -> *const f32 {
        self.render_buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.render_buffer.instance_count()
    }

    pub fn translucent_split(&self) -> u32 {
        self.render_buffer.translucent_split
    }

    pub fn camera_ptr(&self) -> *const f32 {
        &self.camera_uniform as *const CameraUniform as *const f32
    }

    pub fn lights_ptr(&self) -> *const f32 {
        self.ctx.lights.buffer_ptr()
    }

    pub fn light_count(&self) -> u32 {
        self.ctx.lights.count() as u32
    }

    pub fn ambient(&self) -> [f32; 3] {
        self.ctx.lights.ambient()
    }

    pub fn sound_events_ptr(&self) -> *const u8 {
        self.sound_buffer.as_ptr()
    }

    pub fn sound_events_len(&self) -> u32 {
        self.sound_buffer.len() as u32
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len() as u32
    }

    pub fn viewport_size(&self) -> f32 {
        self.config.viewport_size
    }

    // ---- Capacity accessors (read by TypeScript via wasm_bindgen exports) ----

    pub fn max_instances(&self) -> u32 {
        self.layout.max_instances as u32
    }

    pub fn max_lights(&self) -> u32 {
        self.layout.max_lights as u32
    }

    pub fn max_sounds(&self) -> u32 {
        self.layout.max_sounds as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }

    /// Borrow the game (tests and host tooling).
    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }
}
