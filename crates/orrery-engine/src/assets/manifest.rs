use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Asset manifest describing the textures, models and sounds a game may request.
/// Loaded from a JSON file at runtime; paths are opaque to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Named texture paths (e.g. "earth" → "textures/earth.jpg").
    #[serde(default)]
    pub textures: HashMap<String, String>,
    /// Named 3D model paths.
    #[serde(default)]
    pub models: HashMap<String, String>,
    /// Optional audio assets.
    #[serde(default)]
    pub sounds: HashMap<String, SoundDescriptor>,
    /// Free-form game settings; the game deserializes its own config from this.
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
}

/// Describes an audio asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundDescriptor {
    /// Relative path to the audio file.
    pub path: String,
    /// Numeric event ID that triggers this sound from Rust.
    #[serde(default)]
    pub event_id: Option<u32>,
    /// Whether the host should loop the track.
    #[serde(default, rename = "loop")]
    pub looping: bool,
}

impl AssetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn texture_path(&self, name: &str) -> Option<&str> {
        self.textures.get(name).map(String::as_str)
    }

    pub fn model_path(&self, name: &str) -> Option<&str> {
        self.models.get(name).map(String::as_str)
    }
}
