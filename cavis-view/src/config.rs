//! Viewer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level configuration for the viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Network settings.
    pub network: NetworkConfig,
    /// Drawing surface settings.
    pub surface: SurfaceConfig,
    /// Default run parameters.
    pub run: RunConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Simulation source address (IP:port).
    pub address: String,
    /// Delay between a link close and the next reconnect attempt.
    pub reconnect_delay_ms: u64,
}

/// Drawing surface settings. Read once at startup and fixed after.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

/// Default run parameters offered to the source on `start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Grid dimension.
    pub n: u32,
    /// First transition weight.
    pub p: f64,
    /// Second transition weight.
    pub q: f64,
    /// Weight-coupling rule: "clamp_sum" or "clamp_half".
    pub weight_rule: String,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level.
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            surface: SurfaceConfig::default(),
            run: RunConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8080".into(),
            reconnect_delay_ms: 1000,
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 480,
            height: 480,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            n: 64,
            p: 0.3,
            q: 0.3,
            weight_rule: "clamp_sum".into(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl ViewConfig {
    /// Load from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let cfg = ViewConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("address"));
        assert!(text.contains("reconnect_delay_ms"));
        assert!(text.contains("weight_rule"));
    }

    #[test]
    fn roundtrip_config() {
        let cfg = ViewConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ViewConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.network.address, "127.0.0.1:8080");
        assert_eq!(parsed.network.reconnect_delay_ms, 1000);
        assert_eq!(parsed.surface.width, 480);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let parsed: ViewConfig = toml::from_str("[network]\naddress = \"10.0.0.5:9000\"\n").unwrap();
        assert_eq!(parsed.network.address, "10.0.0.5:9000");
        assert_eq!(parsed.network.reconnect_delay_ms, 1000);
        assert_eq!(parsed.run.weight_rule, "clamp_sum");
    }
}
