//! Projection of an inspected container into the `/container/<id>` response.
//!
//! Callers pick fields with presence-only query keys (`?running&dead`). With no
//! recognised key the default summary is returned instead.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::runtime::ContainerRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Status,
    Running,
    Paused,
    Restarting,
    Dead,
    Error,
    ExitCode,
    State,
}

impl Field {
    /// Query key for the field, unknown keys give `None`
    pub fn from_key(key: &str) -> Option<Field> {
        Some(match key {
            "status" => Field::Status,
            "running" => Field::Running,
            "paused" => Field::Paused,
            "restarting" => Field::Restarting,
            "dead" => Field::Dead,
            "error" => Field::Error,
            "exitcode" => Field::ExitCode,
            "state" => Field::State,
            _ => return None,
        })
    }
}

/// Fields requested by a caller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSelection(BTreeSet<Field>);

impl FieldSelection {
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self(keys.into_iter().filter_map(Field::from_key).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains(&field)
    }
}

/// Response record, unset fields are left out of the JSON.
///
/// Fields are declared in alphabetical key order so the output is stable.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct ShapedContainer {
    #[serde(rename = "Dead", skip_serializing_if = "Option::is_none")]
    pub dead: Option<bool>,
    #[serde(rename = "Error", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "ExitCode", skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i64>,
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Image", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Paused", skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(rename = "Restarting", skip_serializing_if = "Option::is_none")]
    pub restarting: Option<bool>,
    #[serde(rename = "Running", skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,
    #[serde(rename = "State", skip_serializing_if = "Option::is_none")]
    pub state: Option<serde_json::Value>,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

pub fn shape(record: &ContainerRecord, selection: &FieldSelection) -> ShapedContainer {
    let state = &record.state;

    if selection.is_empty() {
        return ShapedContainer {
            id: Some(record.id.to_owned()),
            name: Some(record.name.to_owned()),
            image: Some(record.image.to_owned()),
            status: Some(state.status.to_owned()),
            state: Some(state.full.clone()),
            ..Default::default()
        };
    }

    let pick = |field: Field| selection.contains(field);
    ShapedContainer {
        status: pick(Field::Status).then(|| state.status.to_owned()),
        running: pick(Field::Running).then_some(state.running),
        paused: pick(Field::Paused).then_some(state.paused),
        restarting: pick(Field::Restarting).then_some(state.restarting),
        dead: pick(Field::Dead).then_some(state.dead),
        error: pick(Field::Error).then(|| state.error.to_owned()),
        exit_code: pick(Field::ExitCode).then_some(state.exit_code),
        state: pick(Field::State).then(|| state.full.clone()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::runtime::ContainerState;

    fn record() -> ContainerRecord {
        ContainerRecord {
            id: "4fa6e0f0c6786287e131c3852c58a2e01cc697a68231826813597e4994f1d6e2".into(),
            name: "/web".into(),
            image: "sha256:aa1b2c".into(),
            state: ContainerState {
                status: "running".into(),
                running: true,
                paused: false,
                restarting: false,
                dead: false,
                error: "".into(),
                exit_code: 0,
                full: json!({"Status": "running", "Running": true, "Pid": 4242}),
            },
        }
    }

    fn keys(shaped: &ShapedContainer) -> Vec<String> {
        match serde_json::to_value(shaped).unwrap() {
            Value::Object(map) => map.keys().cloned().collect(),
            other => panic!("expected an object, got {}", other),
        }
    }

    #[test]
    fn default_projection_has_five_keys() {
        let shaped = shape(&record(), &FieldSelection::default());
        assert_eq!(keys(&shaped), vec!["ID", "Image", "Name", "State", "Status"]);
        assert_eq!(shaped.state, Some(json!({"Status": "running", "Running": true, "Pid": 4242})));
    }

    #[test]
    fn selection_emits_only_requested_keys() {
        let selection = FieldSelection::from_keys(["status", "running"]);
        let shaped = shape(&record(), &selection);
        assert_eq!(keys(&shaped), vec!["Running", "Status"]);
        assert_eq!(shaped.error, None);
        assert_eq!(shaped.exit_code, None);
    }

    #[test]
    fn every_recognised_key_maps_to_a_field() {
        let selection = FieldSelection::from_keys([
            "status", "running", "paused", "restarting", "dead", "error", "exitcode", "state",
        ]);
        let shaped = shape(&record(), &selection);
        assert_eq!(
            keys(&shaped),
            vec!["Dead", "Error", "ExitCode", "Paused", "Restarting", "Running", "State", "Status"]
        );
        // An empty error string is still reported when asked for
        assert_eq!(shaped.error.as_deref(), Some(""));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let selection = FieldSelection::from_keys(["pretty", "Running", "exit_code"]);
        assert!(selection.is_empty());

        let selection = FieldSelection::from_keys(["pretty", "dead"]);
        assert_eq!(keys(&shape(&record(), &selection)), vec!["Dead"]);
    }

    #[test]
    fn shaping_is_byte_stable() {
        let selection = FieldSelection::from_keys(["state", "exitcode", "status"]);
        let first = serde_json::to_string_pretty(&shape(&record(), &selection)).unwrap();
        let second = serde_json::to_string_pretty(&shape(&record(), &selection)).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("{\n  \"ExitCode\": 0,"));
    }
}
