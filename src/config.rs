//! Sampling and server configuration.
//!
//! [`SimulationConfig`] mirrors the viewer controls. Only `point_count`
//! changes the sampled clouds, everything else is handed to the renderer.
//! [`ServerConfig`] is layered: defaults, then `ELECTRON_CLOUD_*` environment
//! variables, then CLI flags.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::{Error, Result};

pub const POINT_COUNT_RANGE: RangeInclusive<usize> = 5_000..=80_000;
pub const POINT_COUNT_STEP: usize = 5_000;
pub const OPACITY_RANGE: RangeInclusive<f32> = 0.1..=1.5;

pub const DEFAULT_POINT_COUNT: usize = 40_000;
pub const DEFAULT_OPACITY: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Points requested per orbital.
    pub point_count: usize,
    /// Material opacity, renderer only.
    pub opacity: f32,
    pub auto_rotate: bool,
    pub scale: f32,
    pub show_contours: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            point_count: DEFAULT_POINT_COUNT,
            opacity: DEFAULT_OPACITY,
            auto_rotate: true,
            scale: 1.0,
            show_contours: false,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if !POINT_COUNT_RANGE.contains(&self.point_count) {
            return Err(Error::PointCountOutOfRange {
                count: self.point_count,
                min: *POINT_COUNT_RANGE.start(),
                max: *POINT_COUNT_RANGE.end(),
            });
        }
        if !OPACITY_RANGE.contains(&self.opacity) {
            return Err(Error::OpacityOutOfRange {
                opacity: self.opacity,
                min: *OPACITY_RANGE.start(),
                max: *OPACITY_RANGE.end(),
            });
        }
        Ok(())
    }

    /// Snaps out-of-range values to the nearest bound. NaN opacity resets to the default.
    pub fn clamped(mut self) -> Self {
        self.point_count = self
            .point_count
            .clamp(*POINT_COUNT_RANGE.start(), *POINT_COUNT_RANGE.end());
        self.opacity = if self.opacity.is_nan() {
            DEFAULT_OPACITY
        } else {
            self.opacity.clamp(*OPACITY_RANGE.start(), *OPACITY_RANGE.end())
        };
        self
    }

    /// True when switching from `self` to `other` requires resampling.
    pub fn needs_resample(&self, other: &SimulationConfig) -> bool {
        self.point_count != other.point_count
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Fixed sampling seed. `None` seeds every cloud from entropy.
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            seed: None,
        }
    }
}

/// Overrides coming from the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub seed: Option<u64>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Keeps tests off the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();

        if let Some(host) = lookup("ELECTRON_CLOUD_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("ELECTRON_CLOUD_PORT") {
            config.port = parse_port(&port)?;
        }
        if let Some(level) = lookup("ELECTRON_CLOUD_LOG") {
            config.log_level = level;
        }
        if let Some(seed) = lookup("ELECTRON_CLOUD_SEED") {
            config.seed = Some(seed.parse().map_err(|_| Error::InvalidEnv {
                name: "ELECTRON_CLOUD_SEED",
                value: seed.clone(),
            })?);
        }

        Ok(config)
    }

    pub fn merge_with_cli(&mut self, cli: &CliOverrides) {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_port(value: &str) -> Result<u16> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(Error::InvalidPort(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_default_simulation_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.point_count, 40_000);
        assert_eq!(config.opacity, 1.0);
        assert!(config.validate().is_ok());
        assert_eq!(DEFAULT_POINT_COUNT % POINT_COUNT_STEP, 0);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = SimulationConfig { point_count: 100, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::PointCountOutOfRange { count: 100, .. })));

        let config = SimulationConfig { opacity: 2.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::OpacityOutOfRange { .. })));
    }

    #[test]
    fn test_clamped() {
        let config = SimulationConfig { point_count: 1_000_000, opacity: 0.0, ..Default::default() }.clamped();
        assert_eq!(config.point_count, 80_000);
        assert_eq!(config.opacity, 0.1);

        let config = SimulationConfig { opacity: f32::NAN, ..Default::default() }.clamped();
        assert_eq!(config.opacity, DEFAULT_OPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_only_point_count_is_structural() {
        let base = SimulationConfig::default();
        let cosmetic = SimulationConfig { opacity: 0.3, auto_rotate: false, scale: 2.0, ..base.clone() };
        assert!(!base.needs_resample(&cosmetic));

        let denser = SimulationConfig { point_count: 60_000, ..base.clone() };
        assert!(base.needs_resample(&denser));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SimulationConfig = serde_json::from_str(r#"{"point_count": 10000}"#).unwrap();
        assert_eq!(config.point_count, 10_000);
        assert_eq!(config.opacity, DEFAULT_OPACITY);
        assert!(config.auto_rotate);
    }

    #[test]
    fn test_server_config_from_lookup() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("ELECTRON_CLOUD_PORT", "8080"),
            ("ELECTRON_CLOUD_SEED", "42"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.socket_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_server_config_rejects_bad_values() {
        let err = ServerConfig::from_lookup(lookup_from(&[("ELECTRON_CLOUD_PORT", "0")])).unwrap_err();
        assert_eq!(err, Error::InvalidPort("0".to_string()));

        let err = ServerConfig::from_lookup(lookup_from(&[("ELECTRON_CLOUD_SEED", "abc")])).unwrap_err();
        assert!(matches!(err, Error::InvalidEnv { name: "ELECTRON_CLOUD_SEED", .. }));
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = ServerConfig::from_lookup(lookup_from(&[("ELECTRON_CLOUD_PORT", "8080")])).unwrap();
        config.merge_with_cli(&CliOverrides {
            port: Some(9000),
            log_level: Some("debug".into()),
            ..Default::default()
        });
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.seed, None);
    }
}
