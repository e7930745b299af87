// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! UDP client for the statsd sink.
//!
//! The client is cheap to clone: every clone shares the same connected
//! socket, so monitor sequences running concurrently can all emit through it
//! without external locking. UDP datagram sends are atomic per call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::debug;

use crate::errors::SinkError;

/// Callback invoked for transport errors after the connection is open.
///
/// Passed explicitly at construction time so error routing does not depend
/// on the identity of any owning object.
pub type ErrorCallback = Arc<dyn Fn(&SinkError) + Send + Sync>;

/// Connection parameters for the statsd sink.
#[derive(Debug, Clone)]
pub struct StatsClientConfig {
    /// Sink host to send datagrams to (e.g., "127.0.0.1")
    pub host: String,
    /// Sink port (e.g., 8125)
    pub port: u16,
    /// Emit metric lines in the alternate (telegraf-style) tag format
    pub use_alternate_protocol: bool,
}

/// Shared handle to the outbound statsd socket.
#[derive(Clone)]
pub struct StatsClient {
    inner: Arc<Inner>,
}

struct Inner {
    socket: UdpSocket,
    alternate_protocol: bool,
    on_error: ErrorCallback,
    closed: AtomicBool,
}

impl StatsClient {
    /// Binds an ephemeral local socket and connects it to the sink.
    ///
    /// This is the only sink operation whose failure propagates to the
    /// caller; everything after a successful connect is fire-and-forget.
    pub async fn connect(
        config: &StatsClientConfig,
        on_error: ErrorCallback,
    ) -> Result<Self, SinkError> {
        debug!(
            "Connecting to statsd sink at {}:{}",
            config.host, config.port
        );
        let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(SinkError::Bind)?;
        socket
            .connect((config.host.as_str(), config.port))
            .await
            .map_err(SinkError::Connect)?;

        Ok(Self {
            inner: Arc::new(Inner {
                socket,
                alternate_protocol: config.use_alternate_protocol,
                on_error,
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Sends one metric line as a single datagram.
    ///
    /// Transport errors go to the error callback; sending on a closed client
    /// is a silent no-op.
    pub async fn send_line(&self, line: &str) {
        if self.inner.closed.load(Ordering::Acquire) {
            return;
        }
        if let Err(err) = self.inner.socket.send(line.as_bytes()).await {
            let err = SinkError::Send(err);
            (self.inner.on_error)(&err);
        }
    }

    /// Marks the connection closed. Safe to call repeatedly; calls after the
    /// first are no-ops.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            debug!("Closing UDP connection to statsd sink");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub fn uses_alternate_protocol(&self) -> bool {
        self.inner.alternate_protocol
    }
}
