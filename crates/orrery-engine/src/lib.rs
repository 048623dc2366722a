pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod assets;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext};
pub use api::types::{Command, EntityId, GameEvent, Notice, NoticeLevel, SoundEvent};
pub use components::entity::Entity;
pub use components::mesh::{Color, MeshComponent, ModelSlot, Shape, TextureSlot};
pub use core::rng::Rng;
pub use core::scene::Scene;
pub use core::time::FixedTimestep;
pub use renderer::camera::{Camera3D, CameraUniform};
pub use renderer::instance::{RenderInstance, RenderBuffer};
pub use input::keyboard::{codes as key_codes, KeyboardState};
pub use input::queue::{InputEvent, InputQueue};
pub use assets::loader::{AssetKind, AssetLoader, LoadCompletion, LoadRequest, OwnerToken, RequestId};
pub use assets::manifest::AssetManifest;
pub use bridge::protocol::{ProtocolLayout, LIGHT_FLOATS, DEFAULT_MAX_LIGHTS};
pub use systems::lighting::{LightId, LightState, PointLight};
pub use systems::render::build_render_buffer;
pub use extensions::{TransformGraph, LocalTransform};
