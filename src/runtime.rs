use async_trait::async_trait;

use crate::error::EngineError;

/// Length of the identifier shown to callers
pub const SHORT_ID_LEN: usize = 10;

/// Opens connections to a container engine
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn RuntimeClient>, EngineError>;
}

/// Read-only operations against a connected engine
#[async_trait]
pub trait RuntimeClient: Send + Sync {
    /// Lists containers, stopped ones only when `include_stopped` is set
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<ContainerSummary>, EngineError>;

    async fn inspect_container(&self, id: &str) -> Result<ContainerRecord, EngineError>;

    /// Engine version reported while connecting
    fn version(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSummary {
    pub id: String,
    pub names: Vec<String>,
    pub image: String,
    /// Human readable status, e.g. "Up 2 hours"
    pub status: String,
}

impl ContainerSummary {
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

/// First ten characters of an identifier. Shorter identifiers are returned
/// whole.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => {
            if id.chars().count() < SHORT_ID_LEN {
                log::warn!("Container id '{}' is shorter than {} characters", id, SHORT_ID_LEN);
            }
            id
        }
    }
}

/// Inspection result for a single container
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerRecord {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: ContainerState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerState {
    pub status: String,
    pub running: bool,
    pub paused: bool,
    pub restarting: bool,
    pub dead: bool,
    pub error: String,
    pub exit_code: i64,
    /// The engine's state object, untouched
    pub full: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_takes_first_ten_characters() {
        let id = "f7b4d9f2f2a1c3e5d6b7a8c9d0e1f2a3b4c5d6e7f8a9b0c1d2e3f4a5b6c7d8e9";
        assert_eq!(short_id(id), "f7b4d9f2f2");
        assert_eq!(short_id("0123456789"), "0123456789");
    }

    #[test]
    fn short_id_keeps_short_identifiers_whole() {
        assert_eq!(short_id("abc123"), "abc123");
        assert_eq!(short_id(""), "");
    }

    #[test]
    fn short_id_respects_char_boundaries() {
        assert_eq!(short_id("ééééééééééé"), "éééééééééé");
    }
}
