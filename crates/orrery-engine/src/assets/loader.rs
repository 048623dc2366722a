//! Asynchronous asset requests.
//!
//! The engine cannot fetch files itself: it queues [`LoadRequest`]s, the host
//! drains them (`take_outbox_json`), loads each file, and reports back with
//! [`AssetLoader::complete`]. Every request may carry an [`OwnerToken`];
//! cancelling a token drops its in-flight requests so a late completion for a
//! removed owner is discarded instead of mutating the scene.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Texture,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(pub u32);

/// Opaque owner identity chosen by the game (e.g. a packed body handle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerToken(pub u64);

#[derive(Debug, Clone, Serialize)]
pub struct LoadRequest {
    pub id: RequestId,
    pub kind: AssetKind,
    pub path: String,
    #[serde(skip)]
    pub owner: Option<OwnerToken>,
}

/// A finished request that was still wanted when it completed.
#[derive(Debug, Clone)]
pub struct LoadCompletion {
    pub request: LoadRequest,
    /// Host-side slot of the loaded asset, or the host's error message.
    pub outcome: Result<u32, String>,
}

#[derive(Debug)]
pub struct AssetLoader {
    next_id: u32,
    in_flight: Vec<LoadRequest>,
    outbox: Vec<LoadRequest>,
}

impl AssetLoader {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            in_flight: Vec::new(),
            outbox: Vec::new(),
        }
    }

    /// Queue a load. The host sees it on its next `take_outbox_json`.
    pub fn request(&mut self, kind: AssetKind, path: impl Into<String>, owner: Option<OwnerToken>) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        let request = LoadRequest { id, kind, path: path.into(), owner };
        log::debug!("asset request {:?} {:?} {}", id, request.kind, request.path);
        self.outbox.push(request.clone());
        self.in_flight.push(request);
        id
    }

    /// Drop every pending request owned by `owner`. Returns how many were dropped.
    pub fn cancel_owner(&mut self, owner: OwnerToken) -> usize {
        let before = self.in_flight.len();
        self.in_flight.retain(|r| r.owner != Some(owner));
        self.outbox.retain(|r| r.owner != Some(owner));
        before - self.in_flight.len()
    }

    /// Resolve a request reported by the host.
    /// Returns `None` for unknown or cancelled requests.
    pub fn complete(&mut self, id: RequestId, outcome: Result<u32, String>) -> Option<LoadCompletion> {
        let Some(idx) = self.in_flight.iter().position(|r| r.id == id) else {
            log::debug!("asset completion {:?} ignored (cancelled or unknown)", id);
            return None;
        };
        let request = self.in_flight.remove(idx);
        Some(LoadCompletion { request, outcome })
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Serialize and clear the requests the host has not seen yet.
    pub fn take_outbox_json(&mut self) -> String {
        if self.outbox.is_empty() {
            return "[]".to_string();
        }
        let json = serde_json::to_string(&self.outbox).unwrap_or_else(|e| {
            log::warn!("failed to serialize asset requests: {e}");
            "[]".to_string()
        });
        self.outbox.clear();
        json
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_returns_request_once() {
        let mut loader = AssetLoader::new();
        let id = loader.request(AssetKind::Texture, "textures/mars.jpg", None);
        assert_eq!(loader.in_flight_count(), 1);

        let done = loader.complete(id, Ok(3)).unwrap();
        assert_eq!(done.request.path, "textures/mars.jpg");
        assert_eq!(done.outcome, Ok(3));
        assert!(loader.complete(id, Ok(3)).is_none());
    }

    #[test]
    fn cancelled_owner_completions_are_dropped() {
        let mut loader = AssetLoader::new();
        let owner = OwnerToken(42);
        let a = loader.request(AssetKind::Texture, "a.jpg", Some(owner));
        let b = loader.request(AssetKind::Model, "b.glb", Some(OwnerToken(7)));

        assert_eq!(loader.cancel_owner(owner), 1);
        assert!(loader.complete(a, Ok(0)).is_none());
        assert!(loader.complete(b, Err("404".into())).is_some());
    }

    #[test]
    fn outbox_drains_as_json() {
        let mut loader = AssetLoader::new();
        loader.request(AssetKind::Model, "models/tardis.glb", None);
        let json = loader.take_outbox_json();
        assert!(json.contains(r#""kind":"model""#));
        assert!(json.contains(r#""id":1"#));
        assert_eq!(loader.take_outbox_json(), "[]");
        assert_eq!(loader.in_flight_count(), 1);
    }

    #[test]
    fn cancel_removes_unsent_requests() {
        let mut loader = AssetLoader::new();
        loader.request(AssetKind::Texture, "x.jpg", Some(OwnerToken(1)));
        loader.cancel_owner(OwnerToken(1));
        assert_eq!(loader.take_outbox_json(), "[]");
    }
}
