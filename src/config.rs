use std::time::Duration;

use serde::Deserialize;

use crate::{
    prober::{DEFAULT_PORT, DEFAULT_TIMEOUT, QueryOptions},
    protocols::Dialect,
};

#[derive(Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// If set, logs are also written to daily rotating files in this
    /// directory.
    #[serde(default)]
    pub logging_dir: Option<String>,

    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Only try this dialect. By default every dialect is tried, oldest
    /// first.
    #[serde(default)]
    pub dialect: Option<Dialect>,

    /// How long each attempt gets in milliseconds. Defaults to 10 seconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// The port used when none is given on the command line. Defaults to
    /// 25565.
    #[serde(default)]
    pub port: Option<u16>,
}

impl QueryConfig {
    pub fn options(&self) -> QueryOptions {
        QueryOptions {
            dialect: self.dialect,
            timeout: self
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TIMEOUT),
        }
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}
