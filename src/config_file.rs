use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3333;
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u32 = 5;

/// On-disk JSON configuration, every key is optional
#[derive(Debug, Default, Deserialize)]
pub struct ConscriptConfig {
    pub docker_host: Option<String>,
    pub port: Option<u16>,
    pub address: Option<String>,
    pub tls_certs: Option<PathBuf>,
    pub tls_key: Option<PathBuf>,
    pub shutdown_grace_secs: Option<u32>,
}

#[derive(Debug)]
pub struct Config {
    pub docker_host: Option<String>,
    pub port: u16,
    pub address: String,
    pub tls: Option<TlsFiles>,
    pub shutdown_grace_secs: u32,
}

#[derive(Debug, Clone)]
pub struct TlsFiles {
    pub certs: PathBuf,
    pub key: PathBuf,
}

/// Static facts shown by `/` and `/info`
#[derive(Debug)]
pub struct AppInfo {
    pub version: &'static str,
    pub started: Instant,
}

impl AppInfo {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            started: Instant::now(),
        }
    }
}

pub fn read_config_file(path: &Path) -> Result<ConscriptConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Merges the optional config file with command line overrides
pub fn process_config(
    path: Option<&Path>,
    port: Option<u16>,
    address: Option<String>,
) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => read_config_file(path)?,
        None => ConscriptConfig::default(),
    };

    let tls = match (file.tls_certs, file.tls_key) {
        (Some(certs), Some(key)) => Some(TlsFiles { certs, key }),
        (None, None) => None,
        _ => return Err(ConfigError::IncompleteTls),
    };

    Ok(Config {
        docker_host: file.docker_host,
        port: port.or(file.port).unwrap_or(DEFAULT_PORT),
        address: address
            .or(file.address)
            .unwrap_or_else(|| DEFAULT_ADDRESS.into()),
        tls,
        shutdown_grace_secs: file
            .shutdown_grace_secs
            .unwrap_or(DEFAULT_SHUTDOWN_GRACE_SECS),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_a_file() {
        let config = process_config(None, None, None).unwrap();
        assert_eq!(config.port, 3333);
        assert_eq!(config.address, "0.0.0.0");
        assert_eq!(config.shutdown_grace_secs, 5);
        assert!(config.docker_host.is_none());
        assert!(config.tls.is_none());
    }

    #[test]
    fn command_line_overrides_file() {
        let file = config_file(
            r#"{"docker_host": "tcp://10.0.0.5:2375", "port": 9000, "address": "127.0.0.1"}"#,
        );
        let config = process_config(Some(file.path()), Some(8080), None).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.docker_host.as_deref(), Some("tcp://10.0.0.5:2375"));
    }

    #[test]
    fn tls_needs_both_files() {
        let file = config_file(r#"{"tls_certs": "/etc/conscript/cert.pem"}"#);
        let result = process_config(Some(file.path()), None, None);
        assert!(matches!(result, Err(ConfigError::IncompleteTls)));

        let file = config_file(
            r#"{"tls_certs": "/etc/conscript/cert.pem", "tls_key": "/etc/conscript/key.pem"}"#,
        );
        let tls = process_config(Some(file.path()), None, None)
            .unwrap()
            .tls
            .unwrap();
        assert_eq!(tls.key, PathBuf::from("/etc/conscript/key.pem"));
    }

    #[test]
    fn reports_bad_files() {
        let file = config_file("{ not json");
        assert!(matches!(
            process_config(Some(file.path()), None, None),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            read_config_file(Path::new("/nonexistent/conscript.json")),
            Err(ConfigError::Read { .. })
        ));
    }
}
