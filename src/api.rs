use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::response::content::RawJson;
use rocket::serde::{json::Json, Serialize};
use rocket::State;

use crate::config_file::AppInfo;
use crate::error::EngineError;
use crate::health::classify;
use crate::runtime::{ContainerRuntime, ContainerSummary};
use crate::shaper::{shape, FieldSelection};

pub type Runtime = Box<dyn ContainerRuntime>;

type ApiResult<T> = Result<T, (Status, String)>;

/// Who asked, on which listener. Only used for logging.
pub struct RequestMeta {
    pub server: SocketAddr,
    pub remote: Option<SocketAddr>,
}

impl fmt::Display for RequestMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.remote {
            Some(remote) => write!(f, "{} <- {}", self.server, remote),
            None => write!(f, "{}", self.server),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RequestMeta {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = request.rocket().config();
        Outcome::Success(RequestMeta {
            server: SocketAddr::new(config.address, config.port),
            remote: request.remote(),
        })
    }
}

/// Field keys are read from the raw query, values are ignored
#[rocket::async_trait]
impl<'r> FromRequest<'r> for FieldSelection {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let selection = match request.uri().query() {
            Some(query) => FieldSelection::from_keys(query.segments().map(|(key, _)| key)),
            None => FieldSelection::default(),
        };
        Outcome::Success(selection)
    }
}

fn failure(message: &str, err: impl fmt::Display, status: Status) -> (Status, String) {
    (status, format!("{}: {}\n", message, err))
}

fn engine_failure(message: &str, err: EngineError) -> (Status, String) {
    log::warn!("{}: {}", message, err);
    failure(message, &err, err.status())
}

#[get("/")]
pub fn index(meta: RequestMeta, app: &State<AppInfo>) -> String {
    log::info!("{}: got / request", meta);
    format!("Conscript version {}\n", app.version)
}

#[get("/health")]
pub fn health(meta: RequestMeta) -> &'static str {
    log::info!("got /health request from {}", meta);
    "OK\n"
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Info {
    pub application_version: String,
    pub hostname: String,
    pub uptime: String,
    pub current_time: String,
    pub runtime_version: Option<String>,
}

#[get("/info")]
pub async fn info(
    meta: RequestMeta,
    app: &State<AppInfo>,
    runtime: &State<Runtime>,
) -> ApiResult<Json<Info>> {
    log::info!("got /info request from {}", meta);

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .ok_or((Status::InternalServerError, "Failed to get hostname\n".to_string()))?;

    // /info still answers when the engine is down
    let runtime_version = match runtime.connect().await {
        Ok(docker) => Some(docker.version().to_owned()),
        Err(e) => {
            log::warn!("Unable to read docker version: {}", e);
            None
        }
    };

    Ok(Json(Info {
        application_version: app.version.to_owned(),
        hostname,
        uptime: format_uptime(app.started.elapsed()),
        current_time: chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S UTC")
            .to_string(),
        runtime_version,
    }))
}

/// Durations read like "1h2m3.51s", "2m0s" or "1.5ms"
pub fn format_uptime(elapsed: Duration) -> String {
    let nanos = elapsed.as_nanos();
    match nanos {
        0 => return "0s".into(),
        1..=999 => return format!("{}ns", nanos),
        1_000..=999_999 => return format!("{}µs", decimal(nanos, 1_000)),
        1_000_000..=999_999_999 => return format!("{}ms", decimal(nanos, 1_000_000)),
        _ => {}
    }

    let secs = elapsed.as_secs();
    let (hours, minutes) = (secs / 3600, secs / 60 % 60);
    let seconds = decimal(
        u128::from(secs % 60) * 1_000_000_000 + u128::from(elapsed.subsec_nanos()),
        1_000_000_000,
    );

    match (hours, minutes) {
        (0, 0) => format!("{}s", seconds),
        (0, _) => format!("{}m{}s", minutes, seconds),
        _ => format!("{}h{}m{}s", hours, minutes, seconds),
    }
}

/// `value / unit` with trailing zeros of the fraction dropped
fn decimal(value: u128, unit: u128) -> String {
    let (whole, rest) = (value / unit, value % unit);
    if rest == 0 {
        return whole.to_string();
    }
    let width = unit.to_string().len() - 1;
    let fraction = format!("{:0width$}", rest, width = width);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(crate = "rocket::serde")]
pub struct ContainerInfo {
    pub id: String,
    pub names: Vec<String>,
    pub image: String,
    pub status: String,
}

impl From<&ContainerSummary> for ContainerInfo {
    fn from(container: &ContainerSummary) -> Self {
        ContainerInfo {
            id: container.short_id().to_owned(),
            names: container.names.to_owned(),
            image: container.image.to_owned(),
            status: container.status.to_owned(),
        }
    }
}

#[derive(Responder)]
pub enum ContainerList {
    Json(Json<Vec<ContainerInfo>>),
    Text(String),
}

/// One line per container, names printed as "[/a /b]"
pub fn format_container_lines(containers: &[ContainerSummary]) -> String {
    containers
        .iter()
        .map(|c| {
            format!(
                "ID: {}, Name: [{}], Image: {}, Status: {}\n",
                c.short_id(),
                c.names.join(" "),
                c.image,
                c.status
            )
        })
        .collect()
}

/// Stopped containers are listed unless `all=false`
#[get("/containers?<all>&<json>")]
pub async fn list_containers(
    all: Option<&str>,
    json: Option<&str>,
    meta: RequestMeta,
    runtime: &State<Runtime>,
) -> ApiResult<ContainerList> {
    log::info!("got /containers request from {}", meta);

    let docker = runtime
        .connect()
        .await
        .map_err(|e| engine_failure("Failed to create Docker client", e))?;

    let include_stopped = all != Some("false");
    let containers = docker
        .list_containers(include_stopped)
        .await
        .map_err(|e| engine_failure("Failed to list containers", e))?;

    if json == Some("true") {
        let infos = containers.iter().map(ContainerInfo::from).collect();
        return Ok(ContainerList::Json(Json(infos)));
    }

    Ok(ContainerList::Text(format_container_lines(&containers)))
}

fn container_id(id: PathBuf) -> ApiResult<String> {
    let id = id.to_string_lossy().into_owned();
    if id.is_empty() {
        return Err((
            Status::BadRequest,
            "Container name is required\n".to_string(),
        ));
    }
    Ok(id)
}

#[get("/container/<id..>", rank = 2)]
pub async fn inspect_container(
    id: PathBuf,
    selection: FieldSelection,
    meta: RequestMeta,
    runtime: &State<Runtime>,
) -> ApiResult<RawJson<String>> {
    let id = container_id(id)?;
    log::info!("got request for container {} from {}", id, meta);

    let docker = runtime
        .connect()
        .await
        .map_err(|e| engine_failure("Failed to create Docker client", e))?;

    let record = docker
        .inspect_container(&id)
        .await
        .map_err(|e| engine_failure(&format!("Failed to inspect container '{}'", id), e))?;

    let body = serde_json::to_string_pretty(&shape(&record, &selection)).map_err(|e| {
        failure(
            "Failed to marshal container JSON",
            e,
            Status::InternalServerError,
        )
    })?;

    Ok(RawJson(body))
}

/// The verdict's status is authoritative, healthy containers get their
/// message the same way as failing ones
#[get("/container/health/<id..>", rank = 1)]
pub async fn container_health(
    id: PathBuf,
    meta: RequestMeta,
    runtime: &State<Runtime>,
) -> ApiResult<(Status, String)> {
    let id = container_id(id)?;
    log::info!("got /health request for container {} from {}", id, meta);

    let docker = runtime
        .connect()
        .await
        .map_err(|e| engine_failure("Failed to create Docker client", e))?;

    let record = docker
        .inspect_container(&id)
        .await
        .map_err(|e| engine_failure(&format!("Failed to inspect container '{}'", id), e))?;

    let verdict = classify(&id, &record.state.status);
    Ok((verdict.status, format!("{}\n", verdict.message)))
}

/// Unmatched routes and rejected parameters answer in plain text as well
#[catch(default)]
pub fn plain_text_catcher(status: Status, request: &Request<'_>) -> (Status, String) {
    log::info!("{} for {}", status, request.uri());
    (status, format!("{}\n", status.reason().unwrap_or("Error")))
}
