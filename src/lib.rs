use std::{net::SocketAddr, path::PathBuf};

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, FileFormat};
use serde::Deserialize;

use crate::domain::member_number::AllocationPolicy;

pub mod application;
pub mod domain;
pub mod infrastructure;

#[derive(Clone, Debug, Deserialize)]
pub struct MembershipConfig {
    pub server: Server,
    pub storage: Storage,
    pub allocation: Allocation,
    pub eventstore: EventStore,
    pub meilisearch: MeiliSearch,
    pub logger: Logger,
}

impl MembershipConfig {
    /// `membership.toml` と `MEMBERSHIP_` で始まる環境変数から読み込む
    ///
    /// 環境変数の階層区切りは `__`（例: `MEMBERSHIP_STORAGE__BACKEND`）。
    pub fn load() -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(config::File::with_name("membership").required(false))
            .add_source(
                config::Environment::with_prefix("MEMBERSHIP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<MembershipConfig>()
    }

    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<MembershipConfig>()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.address", "0.0.0.0:8080")?
            .set_default("storage.backend", "memory")?
            .set_default("allocation.policy", "fill_gaps")?
            .set_default("allocation.max_attempts", 16_i64)?
            .set_default("eventstore.url", "esdb://localhost:2113?tls=false")?
            .set_default("meilisearch.url", "http://localhost:7700")?
            .set_default("meilisearch.api_key", "")?
            .set_default("logger.level", "INFO")
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Server {
    pub address: SocketAddr,
    pub tls: Option<Tls>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Tls {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
    pub backend: Backend,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    EventStore,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Allocation {
    pub policy: AllocationPolicy,
    pub max_attempts: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EventStore {
    pub url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MeiliSearch {
    pub url: String,
    pub api_key: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Logger {
    pub level: Level,
}

#[derive(Clone, Debug, Deserialize)]
pub enum Level {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

impl From<&Level> for tracing::Level {
    fn from(value: &Level) -> Self {
        match value {
            Level::TRACE => tracing::Level::TRACE,
            Level::DEBUG => tracing::Level::DEBUG,
            Level::INFO => tracing::Level::INFO,
            Level::WARN => tracing::Level::WARN,
            Level::ERROR => tracing::Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MembershipConfig::from_toml("").unwrap();
        assert_eq!(config.server.address, "0.0.0.0:8080".parse().unwrap());
        assert!(config.server.tls.is_none());
        assert_eq!(config.storage.backend, Backend::Memory);
        assert_eq!(config.allocation.policy, AllocationPolicy::FillGaps);
        assert_eq!(config.allocation.max_attempts, 16);
        assert_eq!(config.eventstore.url, "esdb://localhost:2113?tls=false");
        assert_eq!(
            tracing::Level::from(&config.logger.level),
            tracing::Level::INFO
        );
    }

    #[test]
    fn test_overrides() {
        let config = MembershipConfig::from_toml(
            r#"
            [server]
            address = "127.0.0.1:3000"
            tls = { cert = "localhost.pem", key = "localhost.key" }

            [storage]
            backend = "eventstore"

            [allocation]
            policy = "append"
            max_attempts = 4

            [logger]
            level = "DEBUG"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.address, "127.0.0.1:3000".parse().unwrap());
        let tls = config.server.tls.unwrap();
        assert_eq!(tls.cert, PathBuf::from("localhost.pem"));
        assert_eq!(tls.key, PathBuf::from("localhost.key"));
        assert_eq!(config.storage.backend, Backend::EventStore);
        assert_eq!(config.allocation.policy, AllocationPolicy::Append);
        assert_eq!(config.allocation.max_attempts, 4);
        assert_eq!(
            tracing::Level::from(&config.logger.level),
            tracing::Level::DEBUG
        );
    }

    #[test]
    fn test_unknown_backend() {
        let result = MembershipConfig::from_toml(
            r#"
            [storage]
            backend = "mongodb"
            "#,
        );
        assert!(result.is_err());
    }
}
