use rocket::http::Status;

/// Lifecycle status reported by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle<'a> {
    Created,
    Running,
    Restarting,
    Removing,
    Paused,
    Exited,
    Dead,
    Unknown(&'a str),
}

impl<'a> Lifecycle<'a> {
    pub fn parse(status: &'a str) -> Self {
        match status {
            "created" => Lifecycle::Created,
            "running" => Lifecycle::Running,
            "restarting" => Lifecycle::Restarting,
            "removing" => Lifecycle::Removing,
            "paused" => Lifecycle::Paused,
            "exited" => Lifecycle::Exited,
            "dead" => Lifecycle::Dead,
            other => Lifecycle::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthVerdict {
    pub status: Status,
    pub message: String,
}

/// Maps a container's lifecycle status to the health endpoint's answer.
/// Every status string has a verdict.
pub fn classify(id: &str, status: &str) -> HealthVerdict {
    let (status, message) = match Lifecycle::parse(status) {
        Lifecycle::Running => (
            Status::Ok,
            format!("Container {} is healthy and running.", id),
        ),
        Lifecycle::Created => (
            Status::Accepted,
            format!("Container {} is created but not running.", id),
        ),
        Lifecycle::Restarting => (
            Status::ServiceUnavailable,
            format!("Container {} is restarting.", id),
        ),
        Lifecycle::Removing => (
            Status::ServiceUnavailable,
            format!("Container {} is being removed.", id),
        ),
        Lifecycle::Paused => (Status::Locked, format!("Container {} is paused.", id)),
        Lifecycle::Exited => (Status::Gone, format!("Container {} has exited.", id)),
        Lifecycle::Dead => (
            Status::InternalServerError,
            format!("Container {} is dead.", id),
        ),
        Lifecycle::Unknown(other) => (
            Status::InternalServerError,
            format!("Container {} is in an unknown state: {}.", id, other),
        ),
    };

    HealthVerdict { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_states() {
        let cases = [
            ("running", 200, "Container web is healthy and running."),
            ("created", 202, "Container web is created but not running."),
            ("restarting", 503, "Container web is restarting."),
            ("removing", 503, "Container web is being removed."),
            ("paused", 423, "Container web is paused."),
            ("exited", 410, "Container web has exited."),
            ("dead", 500, "Container web is dead."),
        ];

        for (state, code, message) in cases {
            let verdict = classify("web", state);
            assert_eq!(verdict.status.code, code, "{}", state);
            assert_eq!(verdict.message, message);
        }
    }

    #[test]
    fn unknown_states_fall_through() {
        for state in ["", "Running", "healthy", "starting up", "exited "] {
            let verdict = classify("abc123", state);
            assert_eq!(verdict.status, Status::InternalServerError);
            assert_eq!(
                verdict.message,
                format!("Container abc123 is in an unknown state: {}.", state)
            );
        }
    }

    #[test]
    fn parse_keeps_unrecognised_text() {
        assert_eq!(Lifecycle::parse("paused"), Lifecycle::Paused);
        assert_eq!(Lifecycle::parse("migrating"), Lifecycle::Unknown("migrating"));
    }
}
