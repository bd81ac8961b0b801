use basalt_ring::{RingConfig, Strategy};
use serde::Deserialize;
use std::path::Path;

/// Settings of the `basalt-pump` demo.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PumpConfig {
    /// `tracing` filter directive, e.g. `info` or `basalt_ring=debug`.
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
    /// Storage size in bytes; the buffer holds one byte less.
    #[serde(default = "defaults::capacity")]
    pub capacity: usize,
    /// Strategy name as accepted by [`Strategy::from_str`](std::str::FromStr).
    #[serde(default = "defaults::strategy")]
    pub strategy: String,
    /// Bytes per producer burst.
    #[serde(default = "defaults::chunk_size")]
    pub chunk_size: usize,
    /// Bytes to move before the run ends.
    #[serde(default = "defaults::total_bytes")]
    pub total_bytes: u64,
    /// Pause between producer bursts; 0 runs flat out.
    #[serde(default = "defaults::producer_period_us")]
    pub producer_period_us: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

mod defaults {
    pub fn log_level() -> String {
        "info".into()
    }

    pub fn capacity() -> usize {
        1024
    }

    pub fn strategy() -> String {
        "lockfree".into()
    }

    pub fn chunk_size() -> usize {
        16
    }

    pub fn total_bytes() -> u64 {
        1 << 20
    }

    pub fn producer_period_us() -> u64 {
        0
    }
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level(),
            capacity: defaults::capacity(),
            strategy: defaults::strategy(),
            chunk_size: defaults::chunk_size(),
            total_bytes: defaults::total_bytes(),
            producer_period_us: defaults::producer_period_us(),
        }
    }
}

impl PumpConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: PumpConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values serde cannot: capacity range, strategy name, non-zero sizes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        RingConfig::new(self.capacity).map_err(|err| ConfigError::Invalid {
            field: "capacity",
            reason: format!("{err}: {} is outside 2..=65535", self.capacity),
        })?;
        self.strategy()?;
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                field: "chunk_size",
                reason: "must be at least 1".into(),
            });
        }
        if self.total_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "total_bytes",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn strategy(&self) -> Result<Strategy, ConfigError> {
        self.strategy
            .parse()
            .map_err(|err| ConfigError::Invalid {
                field: "strategy",
                reason: format!("{err}: got '{}'", self.strategy),
            })
    }
}
