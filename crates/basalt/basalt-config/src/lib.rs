//! Runtime configuration for the basalt binaries, loaded from TOML.

mod config;

pub use config::{ConfigError, PumpConfig};
