use rocket::http::Status;
use thiserror::Error;

/// Errors raised while talking to the container engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    NotFound(String),

    #[error("cannot connect to the docker engine: {0}")]
    Connection(#[from] hyper::Error),

    #[error("invalid engine request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("engine responded with {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unable to decode engine response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unsupported docker host '{0}'")]
    UnsupportedHost(String),
}

impl EngineError {
    /// HTTP status a handler should answer with when this error reaches it
    pub fn status(&self) -> Status {
        match self {
            EngineError::NotFound(_) => Status::NotFound,
            _ => Status::InternalServerError,
        }
    }
}

/// Startup configuration problems
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("unable to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("tls_certs and tls_key must be provided together")]
    IncompleteTls,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_not_found_maps_to_404() {
        let missing = EngineError::NotFound("No such container: abc".into());
        assert_eq!(missing.status(), Status::NotFound);
        assert_eq!(missing.to_string(), "No such container: abc");

        let api = EngineError::Api {
            status: 403,
            message: "permission denied".into(),
        };
        assert_eq!(api.status(), Status::InternalServerError);

        let host = EngineError::UnsupportedHost("ssh://box".into());
        assert_eq!(host.status(), Status::InternalServerError);
    }
}
