//! Configuration management for the claims service
//!
//! Server settings are assembled by the binary from CLI flags and environment;
//! sampling overrides are read from environment variables with fallback to the
//! fixed defaults.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::str::FromStr;

use completion_client::SamplingConfig;

use crate::shaper::ProcessSchema;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const DEFAULT_PAYLOAD_LIMIT: usize = 256 * 1024;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub payload_limit: usize,
    pub deployment: String,
    pub prompts_dir: Option<PathBuf>,
    pub process_schema: ProcessSchema,
    pub sampling: SamplingConfig,
}

impl ServiceConfig {
    pub fn new(deployment: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKER_COUNT,
            payload_limit: DEFAULT_PAYLOAD_LIMIT,
            deployment: deployment.into(),
            prompts_dir: None,
            process_schema: ProcessSchema::default(),
            sampling: SamplingConfig::default(),
        }
    }

    /// Resolves `host`, which may be an IP literal or a DNS name.
    pub fn bind_addrs(&self) -> Result<Vec<SocketAddr>, String> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| format!("Invalid address {}:{}: {e}", self.host, self.port))?
            .collect();
        if addrs.is_empty() {
            return Err(format!(
                "Address {}:{} resolved to nothing",
                self.host, self.port
            ));
        }
        Ok(addrs)
    }
}

/// Load SamplingConfig from environment variables
///
/// Environment variables:
/// - `COMPLETION_TEMPERATURE` (default: 0.7)
/// - `COMPLETION_TOP_P` (default: 0.95)
/// - `COMPLETION_MAX_TOKENS` (default: 1000)
/// - `COMPLETION_FREQUENCY_PENALTY` (default: 0)
/// - `COMPLETION_PRESENCE_PENALTY` (default: 0)
pub fn load_sampling_config() -> SamplingConfig {
    sampling_from(|key| std::env::var(key).ok())
}

fn sampling_from(lookup: impl Fn(&str) -> Option<String>) -> SamplingConfig {
    let defaults = SamplingConfig::default();
    SamplingConfig {
        temperature: parse_or(&lookup, "COMPLETION_TEMPERATURE", defaults.temperature),
        top_p: parse_or(&lookup, "COMPLETION_TOP_P", defaults.top_p),
        max_tokens: parse_or(&lookup, "COMPLETION_MAX_TOKENS", defaults.max_tokens),
        frequency_penalty: parse_or(
            &lookup,
            "COMPLETION_FREQUENCY_PENALTY",
            defaults.frequency_penalty,
        ),
        presence_penalty: parse_or(
            &lookup,
            "COMPLETION_PRESENCE_PENALTY",
            defaults.presence_penalty,
        ),
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn sampling_defaults_without_environment() {
        let sampling = sampling_from(|_| None);
        assert_eq!(sampling, SamplingConfig::default());
        assert_eq!(sampling.temperature, 0.7);
        assert_eq!(sampling.top_p, 0.95);
        assert_eq!(sampling.max_tokens, 1000);
        assert_eq!(sampling.frequency_penalty, 0.0);
        assert_eq!(sampling.presence_penalty, 0.0);
    }

    #[test]
    fn sampling_overrides_and_ignores_garbage() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("COMPLETION_TEMPERATURE", "0.2"),
            ("COMPLETION_MAX_TOKENS", " 500 "),
            ("COMPLETION_TOP_P", "not-a-number"),
        ]);

        let sampling = sampling_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(sampling.temperature, 0.2);
        assert_eq!(sampling.max_tokens, 500);
        assert_eq!(sampling.top_p, 0.95);
    }

    #[test]
    fn service_config_has_sensible_defaults() {
        let config = ServiceConfig::new("gpt35-turbo");
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.workers > 0);
        assert!(config.payload_limit > 0);
        assert!(config.prompts_dir.is_none());
        let addrs = config.bind_addrs().unwrap();
        assert!(addrs.iter().all(|addr| addr.port() == DEFAULT_PORT));
    }

    #[test]
    fn bind_addrs_resolve_host_names() {
        let mut config = ServiceConfig::new("d");
        config.host = "localhost".to_string();
        config.port = 0;

        let addrs = config.bind_addrs().unwrap();

        assert!(!addrs.is_empty());
        assert!(addrs.iter().all(|addr| addr.ip().is_loopback()));
        assert!(std::net::TcpListener::bind(&addrs[..]).is_ok());
    }

    #[test]
    fn bind_addrs_reject_malformed_host() {
        let mut config = ServiceConfig::new("d");
        config.host = "not a host".to_string();
        assert!(config.bind_addrs().is_err());
    }
}
