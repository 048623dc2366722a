use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Unique identifier for an entity in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// A sound event emitted by the simulation.
/// The numeric value maps to a track or cue in the host's audio manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

/// A game event communicated from Rust to the host via the shared buffer.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;
}

/// A control-panel command sent by the host as JSON.
///
/// `kind` is game-defined, `target` is usually a selection key
/// (e.g. `"planet-2"`), `args` carry raw user text. Parsing and validation
/// of the text is the game's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub kind: u32,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Command {
    pub fn new(kind: u32) -> Self {
        Self {
            kind,
            target: String::new(),
            args: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Argument `i`, or the empty string if the host did not send it.
    pub fn arg(&self, i: usize) -> &str {
        self.args.get(i).map(String::as_str).unwrap_or("")
    }

    /// Parse a command from the host's JSON payload.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
    /// Ask the user to confirm; on "yes" the host replays `Notice::confirm`.
    Confirm,
}

/// A blocking message for the host UI (alert / confirm dialog).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm: Option<Command>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into(), confirm: None }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into(), confirm: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into(), confirm: None }
    }

    /// A confirmation prompt; `command` is sent back verbatim if accepted.
    pub fn confirm(message: impl Into<String>, command: Command) -> Self {
        Self {
            level: NoticeLevel::Confirm,
            message: message.into(),
            confirm: Some(command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parses_with_defaults() {
        let cmd = Command::from_json(r#"{ "kind": 7 }"#).unwrap();
        assert_eq!(cmd.kind, 7);
        assert!(cmd.target.is_empty());
        assert_eq!(cmd.arg(0), "");
    }

    #[test]
    fn command_parses_args() {
        let cmd = Command::from_json(r#"{ "kind": 3, "target": "planet-1", "args": ["0.5", "x"] }"#).unwrap();
        assert_eq!(cmd.target, "planet-1");
        assert_eq!(cmd.arg(0), "0.5");
        assert_eq!(cmd.arg(1), "x");
        assert_eq!(cmd.arg(2), "");
    }

    #[test]
    fn confirm_notice_serializes_command() {
        let notice = Notice::confirm("sure?", Command::new(9).with_arg("120"));
        let json = serde_json::to_string(&notice).unwrap();
        assert!(json.contains(r#""level":"confirm""#));
        assert!(json.contains(r#""kind":9"#));

        let plain = serde_json::to_string(&Notice::warning("clamped")).unwrap();
        assert!(!plain.contains("confirm"));
    }
}
