use std::path::PathBuf;

use async_trait::async_trait;
use hyper::{body::Bytes, client::HttpConnector, Body, Client, Request, StatusCode};
use hyperlocal::{UnixClientExt, UnixConnector};

use crate::docker_structs::*;
use crate::error::EngineError;
use crate::runtime::{ContainerRecord, ContainerRuntime, ContainerSummary, RuntimeClient};

/// Highest engine API version this client speaks
pub const MAX_API_VERSION: &str = "1.43";

pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";

/// Where the engine listens
#[derive(Debug, Clone, PartialEq)]
pub enum DockerHost {
    Unix(PathBuf),
    Tcp(String),
}

impl DockerHost {
    pub fn parse(address: &str) -> Result<Self, EngineError> {
        match DockerHost::get_uri_scheme(address) {
            ("unix", rest) if !rest.is_empty() => Ok(DockerHost::Unix(PathBuf::from(rest))),
            ("", rest) if rest.starts_with('/') => Ok(DockerHost::Unix(PathBuf::from(rest))),
            ("tcp" | "http", rest) if !rest.is_empty() => {
                Ok(DockerHost::Tcp(rest.trim_end_matches('/').to_owned()))
            }
            _ => Err(EngineError::UnsupportedHost(address.to_owned())),
        }
    }

    /// Splits "scheme://rest", scheme is empty when there is none
    fn get_uri_scheme(address: &str) -> (&str, &str) {
        match address.split_once("://") {
            Some((scheme, rest)) => (scheme, rest),
            None => ("", address),
        }
    }
}

/// Engine connection settings, resolved once at startup
#[derive(Debug, Clone)]
pub struct DockerSettings {
    /// Raw host string, parsed on every connect
    pub host: String,
    /// Pinned API version, skips negotiation
    pub api_version: Option<String>,
    /// TLS material was requested through the environment
    pub tls_verify: bool,
}

impl DockerSettings {
    /// Configured host first, then DOCKER_HOST, then the default socket
    pub fn from_env(configured_host: Option<String>) -> Self {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            host: configured_host
                .or_else(|| env("DOCKER_HOST"))
                .unwrap_or_else(|| DEFAULT_DOCKER_HOST.into()),
            api_version: env("DOCKER_API_VERSION"),
            tls_verify: env("DOCKER_TLS_VERIFY").is_some(),
        }
    }
}

/// Opens a fresh `DockerClient` per request
pub struct DockerConnector {
    settings: DockerSettings,
}

impl DockerConnector {
    pub fn new(settings: DockerSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl ContainerRuntime for DockerConnector {
    async fn connect(&self) -> Result<Box<dyn RuntimeClient>, EngineError> {
        let client = DockerClient::connect(&self.settings).await?;
        Ok(Box::new(client))
    }
}

enum ClientType {
    Unix(Client<UnixConnector>, PathBuf),
    Tcp(Client<HttpConnector>, String),
}

/// Read-only accessor for the Docker engine API
pub struct DockerClient {
    client: ClientType,
    api_version: String,
    engine_version: String,
}

impl DockerClient {
    /// Builds the transport and negotiates the API version with the engine
    pub async fn connect(settings: &DockerSettings) -> Result<Self, EngineError> {
        let client = match DockerHost::parse(&settings.host)? {
            DockerHost::Unix(path) => ClientType::Unix(Client::unix(), path),
            DockerHost::Tcp(_) if settings.tls_verify => {
                return Err(EngineError::UnsupportedHost(format!(
                    "{} (TLS engine connections)",
                    settings.host
                )));
            }
            DockerHost::Tcp(authority) => ClientType::Tcp(Client::new(), authority),
        };

        let mut docker = Self {
            client,
            api_version: String::new(),
            engine_version: String::new(),
        };

        let body = docker.get_request("/version").await?;
        let version: VersionResponse = serde_json::from_slice(&body)?;
        docker.api_version = match &settings.api_version {
            Some(pinned) => pinned.to_owned(),
            None => negotiate_version(MAX_API_VERSION, &version.api_version).to_owned(),
        };
        docker.engine_version = version.version;
        log::debug!(
            "Connected to docker {} using API v{}",
            docker.engine_version,
            docker.api_version
        );

        Ok(docker)
    }

    /// GET against the engine, non-2xx responses become errors
    async fn get_request(&self, path: &str) -> Result<Bytes, EngineError> {
        let (status, body) = self.request(path).await?;
        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_slice::<EngineMessage>(&body)
            .map(|m| m.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_owned());
        if status == StatusCode::NOT_FOUND {
            return Err(EngineError::NotFound(message));
        }
        Err(EngineError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn request(&self, path: &str) -> Result<(StatusCode, Bytes), EngineError> {
        let mut response = match &self.client {
            ClientType::Unix(client, socket) => {
                let url: hyper::Uri = hyperlocal::Uri::new(socket, path).into();
                client.get(url).await?
            }
            ClientType::Tcp(client, authority) => {
                let request = Request::builder()
                    .uri(format!("http://{}{}", authority, path))
                    .body(Body::empty())?;
                client.request(request).await?
            }
        };

        let body = hyper::body::to_bytes(response.body_mut()).await?;
        Ok((response.status(), body))
    }

    fn versioned(&self, path: &str) -> String {
        format!("/v{}{}", self.api_version, path)
    }
}

#[async_trait]
impl RuntimeClient for DockerClient {
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<ContainerSummary>, EngineError> {
        let path = self.versioned(&format!("/containers/json?all={}", include_stopped));
        let body = self.get_request(&path).await?;
        let containers: Vec<ListedContainer> = serde_json::from_slice(&body)?;
        Ok(containers.into_iter().map(ContainerSummary::from).collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerRecord, EngineError> {
        // Anything else cannot name a container and would not survive the request uri
        if !is_reference(id) {
            return Err(EngineError::NotFound(format!("No such container: {}", id)));
        }

        let body = self
            .get_request(&self.versioned(&format!("/containers/{}/json", id)))
            .await?;
        let inspection: InspectContainer = serde_json::from_slice(&body)?;
        Ok(ContainerRecord::try_from(inspection)?)
    }

    fn version(&self) -> &str {
        &self.engine_version
    }
}

/// Container ids and names only use these characters
fn is_reference(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Picks the lower of two "major.minor" versions; an unparsable engine
/// version falls back to the client's
pub fn negotiate_version<'a>(client: &'a str, engine: &'a str) -> &'a str {
    fn parse(v: &str) -> Option<(u32, u32)> {
        let (major, minor) = v.split_once('.')?;
        Some((major.parse().ok()?, minor.parse().ok()?))
    }

    match (parse(client), parse(engine)) {
        (Some(c), Some(e)) if e < c => engine,
        _ => client,
    }
}
