use super::{
    error::Error,
    relay::{RelayMode, RelayOptions},
    retry::BackoffConfig,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

fn default_poll() -> u64 {
    5
}

fn default_max_age() -> u64 {
    86400
}

fn default_rpc_concurrency() -> usize {
    4
}

/// Relayer settings as stored in `app.yaml`. Chain `src` becomes side A of the link and
/// `dest` side B.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub src: String,
    pub dest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_connection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_connection: Option<String>,
    /// Seconds between relay cycles
    #[serde(default = "default_poll")]
    pub poll: u64,
    /// Max age in seconds of the client on `dest` tracking `src`
    #[serde(default = "default_max_age")]
    pub max_age_src: u64,
    /// Max age in seconds of the client on `src` tracking `dest`
    #[serde(default = "default_max_age")]
    pub max_age_dest: u64,
    #[serde(default)]
    pub once: bool,
    #[serde(default = "default_rpc_concurrency")]
    pub rpc_concurrency: usize,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

impl AppConfig {
    pub fn new(src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
            src_connection: None,
            dest_connection: None,
            poll: default_poll(),
            max_age_src: default_max_age(),
            max_age_dest: default_max_age(),
            once: false,
            rpc_concurrency: default_rpc_concurrency(),
            backoff: BackoffConfig::default(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, Error> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.src.is_empty() || self.dest.is_empty() {
            return Err(Error::Config("src and dest must be set".into()));
        }
        if self.src == self.dest {
            return Err(Error::Config(format!("src and dest are both {}", self.src)));
        }
        if self.src_connection.is_some() != self.dest_connection.is_some() {
            return Err(Error::Config(
                "srcConnection and destConnection must be set together".into(),
            ));
        }
        if self.poll == 0 {
            return Err(Error::Config("poll must be at least one second".into()));
        }
        if self.max_age_src == 0 || self.max_age_dest == 0 {
            return Err(Error::Config("client max ages must be positive".into()));
        }
        if self.rpc_concurrency == 0 {
            return Err(Error::Config("rpcConcurrency must be positive".into()));
        }
        Ok(())
    }

    pub fn connections(&self) -> Option<(&str, &str)> {
        match (&self.src_connection, &self.dest_connection) {
            (Some(src), Some(dest)) => Some((src.as_str(), dest.as_str())),
            _ => None,
        }
    }

    /// Records the connections created by a handshake.
    pub fn with_connections(mut self, src_connection: String, dest_connection: String) -> Self {
        self.src_connection = Some(src_connection);
        self.dest_connection = Some(dest_connection);
        self
    }

    pub fn relay_options(&self) -> RelayOptions {
        RelayOptions {
            mode: if self.once {
                RelayMode::Once
            } else {
                RelayMode::Continuous
            },
            poll_interval: Duration::from_secs(self.poll),
            backoff: self.backoff,
        }
    }

    /// Max ages of the clients held on side A (`src`) and side B (`dest`).
    pub fn max_client_ages(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.max_age_dest),
            Duration::from_secs(self.max_age_src),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = AppConfig::from_yaml_str("src: juno-1\ndest: nois-1\n").unwrap();
        assert_eq!(config, AppConfig::new("juno-1", "nois-1"));
        assert_eq!(config.connections(), None);
        let options = config.relay_options();
        assert_eq!(options.mode, RelayMode::Continuous);
        assert_eq!(options.poll_interval, Duration::from_secs(5));
        assert_eq!(options.backoff, BackoffConfig::default());
    }

    #[test]
    fn full_config_is_read() {
        let yaml = r#"
src: juno-1
dest: nois-1
srcConnection: connection-31
destConnection: connection-4
poll: 10
maxAgeSrc: 600
maxAgeDest: 1200
once: true
rpcConcurrency: 2
backoff:
  initialMs: 100
  maxMs: 1000
  maxRetries: 3
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.connections(), Some(("connection-31", "connection-4")));
        assert_eq!(config.relay_options().mode, RelayMode::Once);
        assert_eq!(
            config.max_client_ages(),
            (Duration::from_secs(1200), Duration::from_secs(600))
        );
        assert_eq!(config.backoff.max_retries, 3);
        assert_eq!(config.rpc_concurrency, 2);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        for yaml in [
            "src: juno-1\ndest: juno-1\n",
            "src: juno-1\ndest: nois-1\npoll: 0\n",
            "src: juno-1\ndest: nois-1\nmaxAgeSrc: 0\n",
            "src: juno-1\ndest: nois-1\nsrcConnection: connection-1\n",
            "src: juno-1\n",
        ] {
            let err = AppConfig::from_yaml_str(yaml).unwrap_err();
            assert!(err.is_fatal(), "{}: {}", yaml, err);
        }
    }

    #[test]
    fn connections_are_persisted() {
        let path = std::env::temp_dir().join(format!("packet-relayer-{}.yaml", std::process::id()));
        let config = AppConfig::new("juno-1", "nois-1")
            .with_connections("connection-31".into(), "connection-4".into());
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(AppConfig::load(&path).is_err());
    }
}
