//! Errors a control-panel command can fail with.
//!
//! None of these are fatal: the game turns them into error notices and the
//! simulation keeps running with its state untouched.

/// Why a command was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// Unparsable or empty user input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Planet cap or per-planet moon cap reached.
    #[error("cannot add more {what} (limit is {limit})")]
    CapacityExceeded { what: &'static str, limit: usize },

    /// A scripted model that is already in the scene.
    #[error("{0} is already in the scene")]
    DuplicateSingleton(String),

    /// The selected object does not have this attribute (e.g. the Sun's scale).
    #[error("{operation} is not supported for {target}")]
    UnsupportedTarget { target: String, operation: &'static str },

    /// The host could not fetch a texture or model.
    #[error("failed to load {path}: {reason}")]
    AssetLoadError { path: String, reason: String },

    /// The command needs a selected object and none was given.
    #[error("no object selected")]
    NoSelection,

    /// The selection or anchor no longer refers to a live body.
    #[error("{0} does not exist")]
    NoSuchBody(String),
}

pub type SimResult<T> = Result<T, SimError>;
