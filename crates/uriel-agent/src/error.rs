// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use uriel_statsd::SinkError;

/// Errors that can escape the agent's public surface.
///
/// Everything else is terminal where it happens: monitor phase failures and
/// transport errors are logged and swallowed per cycle, and `close` cannot
/// fail at all.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent already started")]
    AlreadyStarted,

    #[error("failed to open sink connection: {0}")]
    SinkConnect(#[from] SinkError),
}
