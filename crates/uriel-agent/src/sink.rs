// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Sink-connection lifecycle.
//!
//! Owns exactly one outbound statsd client for the agent's active lifetime.
//! Opening binds identity and tags into the factory that monitors emit
//! through; transport errors after open are logged via the error callback
//! and never crash the process.

use std::sync::Arc;

use tracing::{debug, error};
use uriel_statsd::{ErrorCallback, StatsClient, StatsClientConfig, StatsFactory};

use crate::config::ResolvedConfig;
use crate::error::AgentError;

pub(crate) struct SinkConnection {
    client: StatsClient,
}

impl SinkConnection {
    /// Opens the UDP client and returns it together with the emission
    /// factory bound to the resolved identity and tag set. Connection
    /// failure here is the one error `init` propagates to the host.
    pub(crate) async fn open(
        config: &ResolvedConfig,
    ) -> Result<(Self, StatsFactory), AgentError> {
        debug!(
            "Using {} to connect to {}:{}...",
            config.identity, config.sink_host, config.sink_port
        );

        let on_error: ErrorCallback = Arc::new(|err| error!("Statsd sink transport error: {err}"));
        let client = StatsClient::connect(
            &StatsClientConfig {
                host: config.sink_host.clone(),
                port: config.sink_port,
                use_alternate_protocol: config.use_alternate_protocol,
            },
            on_error,
        )
        .await?;

        let factory = StatsFactory::new(config.identity.clone(), client.clone(), config.tags.clone());
        Ok((Self { client }, factory))
    }

    /// Releases the client. Repeated calls are no-ops.
    pub(crate) fn close(&self) {
        self.client.close();
    }
}
