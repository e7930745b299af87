// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Metric-emission factory handed to monitors.
//!
//! A factory is bound to the agent's resolved identity and tag set at
//! construction; every line it emits carries both. The identity prefixes the
//! metric name, and tags are serialized either in dogstatsd form
//! (`name:value|type|#tag1,tag2`) or, under the alternate protocol, in
//! telegraf form (`name,tag1,tag2:value|type`).

use std::time::Duration;

use tracing::trace;

use crate::client::StatsClient;

#[derive(Clone)]
pub struct StatsFactory {
    identity: String,
    tags: Vec<String>,
    client: StatsClient,
}

impl StatsFactory {
    pub fn new(identity: impl Into<String>, client: StatsClient, tags: Vec<String>) -> Self {
        Self {
            identity: identity.into(),
            tags,
            client,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Emits a counter increment.
    pub async fn count(&self, name: &str, value: i64) {
        self.emit(name, &value.to_string(), "c").await;
    }

    /// Emits a gauge reading.
    pub async fn gauge(&self, name: &str, value: f64) {
        self.emit(name, &value.to_string(), "g").await;
    }

    /// Emits a timing value in milliseconds.
    pub async fn timing(&self, name: &str, elapsed: Duration) {
        self.emit(name, &elapsed.as_millis().to_string(), "ms").await;
    }

    async fn emit(&self, name: &str, value: &str, kind: &str) {
        let line = format_line(
            &self.identity,
            &self.tags,
            self.client.uses_alternate_protocol(),
            name,
            value,
            kind,
        );
        trace!("Emitting metric line: {line}");
        self.client.send_line(&line).await;
    }
}

fn format_line(
    identity: &str,
    tags: &[String],
    alternate_protocol: bool,
    name: &str,
    value: &str,
    kind: &str,
) -> String {
    if alternate_protocol {
        let mut head = format!("{identity}.{name}");
        for tag in tags {
            head.push(',');
            head.push_str(tag);
        }
        format!("{head}:{value}|{kind}")
    } else if tags.is_empty() {
        format!("{identity}.{name}:{value}|{kind}")
    } else {
        format!("{identity}.{name}:{value}|{kind}|#{}", tags.join(","))
    }
}
