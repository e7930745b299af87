// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Configuration resolution.
//!
//! Hosts hand the agent a partial [`AgentConfig`] (every field optional,
//! deserializable from the host's own config file). Resolution is a pure,
//! total function: missing fields fall back to defaults, so it never fails.
//! The result is an immutable [`ResolvedConfig`] carrying the derived
//! identity and an owned copy of the tag set; nothing about it changes for
//! the agent's lifetime.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tracing::warn;

pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_SINK_HOST: &str = "127.0.0.1";
pub const DEFAULT_SINK_PORT: u16 = 8125;
pub const DEFAULT_AGENT_NAME: &str = "uriel";

/// Raw, possibly partial user configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentConfig {
    pub server: ServerOverrides,
    pub sink: SinkOverrides,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerOverrides {
    pub shutdown_timeout_ms: Option<u64>,
    pub polling_interval_ms: Option<u64>,
    pub cycle_policy: Option<CyclePolicy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SinkOverrides {
    pub host: Option<String>,
    /// Accepts both `8125` and `"8125"` for compatibility with older
    /// config files.
    #[serde(deserialize_with = "port_from_str_or_int")]
    pub port: Option<u16>,
    pub name: Option<String>,
    pub attach_host_name: Option<bool>,
    pub use_alternate_protocol: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// How scheduler ticks behave when the previous cycle is still in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CyclePolicy {
    /// Ticks fire on schedule even while a previous cycle is still running,
    /// so cycles may overlap. Known risk: resource growth under monitors or
    /// a sink slower than the polling interval.
    #[default]
    Concurrent,
    /// A tick is dropped when the previous cycle has not settled yet.
    SkipIfBusy,
}

/// Effective configuration, built once at resolve time.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub shutdown_timeout: Duration,
    pub polling_interval: Duration,
    pub cycle_policy: CyclePolicy,
    pub sink_host: String,
    pub sink_port: u16,
    pub sink_name: String,
    pub use_alternate_protocol: bool,
    /// Identity attached to every emitted metric: the user-supplied sink
    /// name if non-empty, else the OS hostname; with `attachHostName`, the
    /// hostname is appended with an underscore unless it already matches.
    pub identity: String,
    pub tags: Vec<String>,
}

impl ResolvedConfig {
    pub fn resolve(overrides: &AgentConfig) -> Self {
        Self::resolve_with_hostname(overrides, &os_hostname())
    }

    fn resolve_with_hostname(overrides: &AgentConfig, os_host: &str) -> Self {
        let user_name = overrides
            .sink
            .name
            .as_deref()
            .filter(|name| !name.is_empty());

        let mut identity = user_name.unwrap_or(os_host).to_string();
        if overrides.sink.attach_host_name.unwrap_or(false) && identity != os_host {
            identity = format!("{identity}_{os_host}");
        }

        ResolvedConfig {
            shutdown_timeout: Duration::from_millis(
                overrides
                    .server
                    .shutdown_timeout_ms
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_MS),
            ),
            polling_interval: Duration::from_millis(
                overrides
                    .server
                    .polling_interval_ms
                    .unwrap_or(DEFAULT_POLLING_INTERVAL_MS),
            ),
            cycle_policy: overrides.server.cycle_policy.unwrap_or_default(),
            sink_host: overrides
                .sink
                .host
                .clone()
                .unwrap_or_else(|| DEFAULT_SINK_HOST.to_string()),
            sink_port: overrides.sink.port.unwrap_or(DEFAULT_SINK_PORT),
            sink_name: user_name.unwrap_or(DEFAULT_AGENT_NAME).to_string(),
            use_alternate_protocol: overrides.sink.use_alternate_protocol.unwrap_or(false),
            identity,
            tags: overrides.sink.tags.clone().unwrap_or_default(),
        }
    }
}

/// Determine the OS hostname: `HOSTNAME` env var first (containers commonly
/// set it), then the gethostname syscall, then "unknown".
pub(crate) fn os_hostname() -> String {
    if let Ok(hostname) = env::var("HOSTNAME") {
        if !hostname.is_empty() {
            return hostname;
        }
    }

    match nix::unistd::gethostname() {
        Ok(hostname) => {
            if let Some(hostname) = hostname.to_str() {
                if !hostname.is_empty() {
                    return hostname.to_string();
                }
            }
        }
        Err(err) => warn!("Failed to read system hostname: {err}"),
    }

    warn!("Could not determine hostname, using 'unknown'");
    "unknown".to_string()
}

fn port_from_str_or_int<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortRepr {
        Int(u16),
        Str(String),
    }

    match Option::<PortRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PortRepr::Int(port)) => Ok(Some(port)),
        Some(PortRepr::Str(raw)) => raw
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_overrides() {
        let config = ResolvedConfig::resolve_with_hostname(&AgentConfig::default(), "box1");
        assert_eq!(config.polling_interval, Duration::from_millis(5000));
        assert_eq!(config.shutdown_timeout, Duration::from_millis(1000));
        assert_eq!(config.cycle_policy, CyclePolicy::Concurrent);
        assert_eq!(config.sink_host, "127.0.0.1");
        assert_eq!(config.sink_port, 8125);
        assert_eq!(config.sink_name, "uriel");
        assert!(!config.use_alternate_protocol);
        assert_eq!(config.identity, "box1");
        assert!(config.tags.is_empty());
    }

    #[test]
    fn test_user_values_win_field_by_field() {
        let overrides = AgentConfig {
            server: ServerOverrides {
                polling_interval_ms: Some(250),
                ..Default::default()
            },
            sink: SinkOverrides {
                host: Some("10.0.0.7".to_string()),
                ..Default::default()
            },
        };
        let config = ResolvedConfig::resolve_with_hostname(&overrides, "box1");
        assert_eq!(config.polling_interval, Duration::from_millis(250));
        assert_eq!(config.shutdown_timeout, Duration::from_millis(1000));
        assert_eq!(config.sink_host, "10.0.0.7");
        assert_eq!(config.sink_port, 8125);
    }

    #[test]
    fn test_identity_appends_hostname_when_requested() {
        let overrides = AgentConfig {
            sink: SinkOverrides {
                name: Some("svc".to_string()),
                attach_host_name: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = ResolvedConfig::resolve_with_hostname(&overrides, "box1");
        assert_eq!(config.identity, "svc_box1");
    }

    #[test]
    fn test_identity_no_duplicate_suffix_when_name_equals_hostname() {
        let overrides = AgentConfig {
            sink: SinkOverrides {
                name: Some("box1".to_string()),
                attach_host_name: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = ResolvedConfig::resolve_with_hostname(&overrides, "box1");
        assert_eq!(config.identity, "box1");
    }

    #[test]
    fn test_empty_name_falls_back_to_hostname() {
        let overrides = AgentConfig {
            sink: SinkOverrides {
                name: Some(String::new()),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = ResolvedConfig::resolve_with_hostname(&overrides, "box1");
        assert_eq!(config.identity, "box1");
        assert_eq!(config.sink_name, "uriel");
    }

    #[test]
    fn test_tags_are_copied_at_resolve_time() {
        let mut tags = vec!["env:prod".to_string()];
        let overrides = AgentConfig {
            sink: SinkOverrides {
                tags: Some(tags.clone()),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = ResolvedConfig::resolve_with_hostname(&overrides, "box1");

        tags.push("region:us1".to_string());
        assert_eq!(config.tags, vec!["env:prod".to_string()]);
    }

    #[test]
    fn test_partial_json_with_string_port() {
        let overrides: AgentConfig = serde_json::from_str(
            r#"{
                "server": { "pollingIntervalMs": 1500 },
                "sink": { "port": "9125", "name": "svc", "attachHostName": true }
            }"#,
        )
        .expect("failed to parse overrides");
        let config = ResolvedConfig::resolve_with_hostname(&overrides, "box1");
        assert_eq!(config.polling_interval, Duration::from_millis(1500));
        assert_eq!(config.sink_port, 9125);
        assert_eq!(config.identity, "svc_box1");
    }

    #[test]
    fn test_partial_json_with_int_port_and_policy() {
        let overrides: AgentConfig = serde_json::from_str(
            r#"{
                "server": { "cyclePolicy": "skip-if-busy" },
                "sink": { "port": 9125, "tags": ["env:prod"] }
            }"#,
        )
        .expect("failed to parse overrides");
        let config = ResolvedConfig::resolve_with_hostname(&overrides, "box1");
        assert_eq!(config.cycle_policy, CyclePolicy::SkipIfBusy);
        assert_eq!(config.sink_port, 9125);
        assert_eq!(config.tags, vec!["env:prod".to_string()]);
    }

    #[test]
    fn test_os_hostname_not_empty() {
        assert!(!os_hostname().is_empty());
    }
}
