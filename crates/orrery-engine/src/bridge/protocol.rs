/// Shared-buffer layout.
/// Must stay in sync with the host's `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 16 floats]
/// [Instances: max_instances × 20 floats]
/// [Camera: 20 floats (view-projection 4×4 + position xyzw)]
/// [Lights: max_lights × 8 floats]
/// [Sounds: max_sounds × 1 float]
/// [Events: max_events × 4 floats]
/// ```
///
/// Capacities are written once into the header at init.
/// The host reads them from the header to compute offsets dynamically.

use crate::api::game::GameConfig;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_LOCK: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_MAX_INSTANCES: usize = 2;
pub const HEADER_INSTANCE_COUNT: usize = 3;
pub const HEADER_TRANSLUCENT_SPLIT: usize = 4;
pub const HEADER_VIEWPORT_SIZE: usize = 5;
pub const HEADER_MAX_LIGHTS: usize = 6;
pub const HEADER_LIGHT_COUNT: usize = 7;
pub const HEADER_MAX_SOUNDS: usize = 8;
pub const HEADER_SOUND_COUNT: usize = 9;
pub const HEADER_MAX_EVENTS: usize = 10;
pub const HEADER_EVENT_COUNT: usize = 11;
pub const HEADER_PROTOCOL_VERSION: usize = 12;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 2.0;

/// Floats per render instance (wire format, never changes).
pub const INSTANCE_FLOATS: usize = 20;

/// Floats in the camera block.
pub const CAMERA_FLOATS: usize = 20;

/// Floats per light: x, y, z, r, g, b, intensity, range.
pub const LIGHT_FLOATS: usize = 8;

/// Floats per game event: kind, a, b, c.
pub const EVENT_FLOATS: usize = 4;

/// Default light capacity.
pub const DEFAULT_MAX_LIGHTS: usize = 8;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_instances: usize,
    pub max_lights: usize,
    pub max_sounds: usize,
    pub max_events: usize,

    pub instance_data_offset: usize,
    pub camera_data_offset: usize,
    pub light_data_offset: usize,
    pub sound_data_offset: usize,
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(max_instances: usize, max_lights: usize, max_sounds: usize, max_events: usize) -> Self {
        let instance_data_offset = HEADER_FLOATS;
        let camera_data_offset = instance_data_offset + max_instances * INSTANCE_FLOATS;
        let light_data_offset = camera_data_offset + CAMERA_FLOATS;
        let sound_data_offset = light_data_offset + max_lights * LIGHT_FLOATS;
        let event_data_offset = sound_data_offset + max_sounds;
        let buffer_total_floats = event_data_offset + max_events * EVENT_FLOATS;

        Self {
            max_instances,
            max_lights,
            max_sounds,
            max_events,
            instance_data_offset,
            camera_data_offset,
            light_data_offset,
            sound_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.max_instances,
            config.max_lights,
            config.max_sounds,
            config.max_events,
        )
    }

    /// Header block the host reads before anything else.
    pub fn header(&self, viewport_size: f32) -> [f32; HEADER_FLOATS] {
        let mut header = [0.0; HEADER_FLOATS];
        header[HEADER_MAX_INSTANCES] = self.max_instances as f32;
        header[HEADER_VIEWPORT_SIZE] = viewport_size;
        header[HEADER_MAX_LIGHTS] = self.max_lights as f32;
        header[HEADER_MAX_SOUNDS] = self.max_sounds as f32;
        header[HEADER_MAX_EVENTS] = self.max_events as f32;
        header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        header
    }
}
