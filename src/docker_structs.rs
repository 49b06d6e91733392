use serde::Deserialize;

use crate::runtime::{ContainerRecord, ContainerState, ContainerSummary};

#[derive(Debug, Deserialize)]
pub struct VersionResponse {
    #[serde(alias = "Version")]
    pub version: String,
    #[serde(alias = "ApiVersion")]
    pub api_version: String,
}

#[derive(Debug, Deserialize)]
pub struct ListedContainer {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(alias = "Names", default)]
    pub names: Vec<String>,
    #[serde(alias = "Image", default)]
    pub image: String,
    #[serde(alias = "Status", default)]
    pub status: String,
}

impl From<ListedContainer> for ContainerSummary {
    fn from(value: ListedContainer) -> Self {
        ContainerSummary {
            id: value.id,
            names: value.names,
            image: value.image,
            status: value.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InspectContainer {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(alias = "Image", default)]
    pub image: String,
    #[serde(alias = "State")]
    pub state: serde_json::Value,
}

/// Typed view over the fields of the engine's state object we interpret
#[derive(Debug, Deserialize)]
pub struct InspectContainerState {
    #[serde(alias = "Status", default)]
    pub status: String,
    #[serde(alias = "Running", default)]
    pub running: bool,
    #[serde(alias = "Paused", default)]
    pub paused: bool,
    #[serde(alias = "Restarting", default)]
    pub restarting: bool,
    #[serde(alias = "Dead", default)]
    pub dead: bool,
    #[serde(alias = "Error", default)]
    pub error: String,
    #[serde(alias = "ExitCode", default)]
    pub exit_code: i64,
}

impl TryFrom<InspectContainer> for ContainerRecord {
    type Error = serde_json::Error;

    fn try_from(value: InspectContainer) -> Result<Self, Self::Error> {
        let fields = InspectContainerState::deserialize(&value.state)?;
        Ok(ContainerRecord {
            id: value.id,
            name: value.name,
            image: value.image,
            state: ContainerState {
                status: fields.status,
                running: fields.running,
                paused: fields.paused,
                restarting: fields.restarting,
                dead: fields.dead,
                error: fields.error,
                exit_code: fields.exit_code,
                full: value.state,
            },
        })
    }
}

/// Body of engine error responses
#[derive(Debug, Deserialize)]
pub struct EngineMessage {
    pub message: String,
}
