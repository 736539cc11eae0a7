// Configuration module

use crate::gate::GateConfig;
use crate::sanitizer::SanitizerConfig;
use crate::watermark::WatermarkParams;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub watermark: WatermarkConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// The only channel the submission command works in.
    pub allowed_channel_id: u64,
    /// Role required to invoke the command; 0 disables the check.
    #[serde(default)]
    pub required_role_id: u64,
    /// Command name shown in sanitizer notices.
    #[serde(default = "default_command_name")]
    pub command_name: String,
}

fn default_command_name() -> String {
    "success".to_string()
}

fn default_fetch_timeout() -> u64 {
    30 // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout for asset fetches, in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_fetch_timeout(),
        }
    }
}

fn default_width_divisor() -> u32 {
    3
}

fn default_width_floor() -> u32 {
    100
}

fn default_opacity() -> f32 {
    0.5
}

/// Watermark tuning; the same algorithm runs everywhere, deployments differ
/// only in these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkConfig {
    #[serde(default = "default_width_divisor")]
    pub width_divisor: u32,
    #[serde(default = "default_width_floor")]
    pub width_floor: u32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            width_divisor: default_width_divisor(),
            width_floor: default_width_floor(),
            opacity: default_opacity(),
        }
    }
}

fn default_health_address() -> String {
    "0.0.0.0".to_string()
}

fn default_health_port() -> u16 {
    8080
}

/// Liveness/metrics listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_health_address")]
    pub address: String,
    #[serde(default = "default_health_port")]
    pub port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            address: default_health_address(),
            port: default_health_port(),
        }
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        // Now perform the substitution (we know all vars exist)
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap() // Safe because we checked above
        });

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.service.allowed_channel_id == 0 {
            return Err("allowed_channel_id must be a non-zero channel id".to_string());
        }

        if self.service.command_name.trim().is_empty() {
            return Err("command_name cannot be empty".to_string());
        }

        if self.fetch.timeout_seconds == 0 {
            return Err("fetch timeout_seconds must be > 0".to_string());
        }

        if self.watermark.width_divisor == 0 {
            return Err("watermark width_divisor must be >= 1".to_string());
        }

        if self.watermark.width_floor == 0 {
            return Err("watermark width_floor must be >= 1 pixel".to_string());
        }

        if !(0.0..=1.0).contains(&self.watermark.opacity) {
            return Err(format!(
                "watermark opacity {} is outside [0.0, 1.0]",
                self.watermark.opacity
            ));
        }

        Ok(())
    }

    pub fn gate(&self) -> GateConfig {
        GateConfig {
            allowed_channel: self.service.allowed_channel_id,
            // A configured role of 0 means "no role restriction".
            required_role: match self.service.required_role_id {
                0 => None,
                id => Some(id),
            },
        }
    }

    pub fn watermark_params(&self) -> WatermarkParams {
        WatermarkParams {
            width_divisor: self.watermark.width_divisor,
            width_floor: self.watermark.width_floor,
            opacity: self.watermark.opacity,
        }
    }

    pub fn sanitizer(&self) -> SanitizerConfig {
        SanitizerConfig {
            channel: self.service.allowed_channel_id,
            command_name: self.service.command_name.clone(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_seconds)
    }
}
