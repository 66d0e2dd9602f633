use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return v;
        }
    }
    env_or(key, default)
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_or(profile, key, &default.to_string())
        .parse()
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_or(profile, key, &default.to_string())
        .parse()
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub openflow: OpenFlowConfig,
    pub rpc: RpcConfig,
    pub monitor: MonitorConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SDNMPI_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SDNMPI_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        Self {
            profile: p.clone(),
            openflow: OpenFlowConfig::from_env_profiled(&p),
            rpc: RpcConfig::from_env_profiled(&p),
            monitor: MonitorConfig::from_env_profiled(&p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() {
            "default"
        } else {
            &self.profile
        }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  openflow: listen={}:{}",
            self.openflow.host,
            self.openflow.port
        );
        tracing::info!("  rpc:      listen={}:{}", self.rpc.host, self.rpc.port);
        tracing::info!(
            "  monitor:  interval={}ms",
            self.monitor.poll_interval_ms
        );
    }
}

/// Southbound OpenFlow 1.0 listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenFlowConfig {
    pub host: String,
    pub port: u16,
}

impl OpenFlowConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "OPENFLOW_HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "OPENFLOW_PORT", 6633),
        }
    }
}

/// Northbound subscriber-facing websocket feed (§6, §4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl RpcConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "RPC_HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "RPC_PORT", 8080),
            cors_origin: profiled_env_or(p, "RPC_CORS_ORIGIN", "*"),
        }
    }
}

/// Port-stats polling cadence (§4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub poll_interval_ms: u64,
}

impl MonitorConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            poll_interval_ms: profiled_env_u64(p, "MONITOR_INTERVAL_MS", 1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        let cfg = Config::for_profile("");
        assert_eq!(cfg.openflow.port, 6633);
        assert_eq!(cfg.rpc.port, 8080);
        assert_eq!(cfg.monitor.poll_interval_ms, 1000);
        assert_eq!(cfg.profile_label(), "default");
    }

    #[test]
    fn profiled_key_overrides_default_key() {
        // SAFETY: test-only env mutation, no other test in this crate reads these keys.
        unsafe {
            env::set_var("OPENFLOW_PORT", "1000");
            env::set_var("TEST_OPENFLOW_PORT", "2000");
        }
        let cfg = Config::for_profile("TEST");
        assert_eq!(cfg.openflow.port, 2000);
        unsafe {
            env::remove_var("OPENFLOW_PORT");
            env::remove_var("TEST_OPENFLOW_PORT");
        }
    }
}
