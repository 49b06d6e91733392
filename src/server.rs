use rocket::figment::Figment;
use rocket::{Build, Rocket};

use crate::api;
use crate::config_file::{AppInfo, Config};

/// Rocket settings for the listener, `debug` is the `-d` count
pub fn figment(config: &Config, debug: u8) -> Figment {
    let log_level = match debug {
        0 => "normal",
        _ => "debug",
    };

    let figment = rocket::Config::figment()
        .merge(("port", config.port))
        .merge(("address", config.address.to_owned()))
        .merge(("log_level", log_level))
        .merge(("shutdown.grace", config.shutdown_grace_secs));

    match &config.tls {
        Some(tls) => figment
            .merge(("tls.certs", tls.certs.to_owned()))
            .merge(("tls.key", tls.key.to_owned())),
        None => figment,
    }
}

pub fn build(figment: Figment, app: AppInfo, runtime: api::Runtime) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(app)
        .manage(runtime)
        .mount(
            "/",
            routes![
                api::index,
                api::health,
                api::info,
                api::list_containers,
                api::inspect_container,
                api::container_health
            ],
        )
        .register("/", catchers![api::plain_text_catcher])
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::config_file::TlsFiles;

    fn config() -> Config {
        Config {
            docker_host: None,
            port: 4444,
            address: "127.0.0.1".into(),
            tls: None,
            shutdown_grace_secs: 9,
        }
    }

    #[test]
    fn listener_settings_reach_rocket() {
        let rocket_config: rocket::Config = figment(&config(), 0).extract().unwrap();
        assert_eq!(rocket_config.port, 4444);
        assert_eq!(rocket_config.address.to_string(), "127.0.0.1");
        assert_eq!(rocket_config.shutdown.grace, 9);
        assert_eq!(rocket_config.log_level, rocket::config::LogLevel::Normal);

        let rocket_config: rocket::Config = figment(&config(), 2).extract().unwrap();
        assert_eq!(rocket_config.log_level, rocket::config::LogLevel::Debug);
    }

    #[test]
    fn tls_files_are_merged() {
        let mut config = config();
        config.tls = Some(TlsFiles {
            certs: PathBuf::from("/etc/conscript/cert.pem"),
            key: PathBuf::from("/etc/conscript/key.pem"),
        });
        let figment = figment(&config, 0);
        let certs: PathBuf = figment.extract_inner("tls.certs").unwrap();
        assert_eq!(certs, PathBuf::from("/etc/conscript/cert.pem"));
    }
}
