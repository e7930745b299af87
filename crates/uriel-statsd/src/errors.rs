// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors surfaced by the statsd sink transport.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to bind local statsd socket: {0}")]
    Bind(std::io::Error),

    #[error("failed to connect to statsd sink: {0}")]
    Connect(std::io::Error),

    #[error("failed to send metric payload: {0}")]
    Send(std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SinkError::Connect(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert_eq!(
            error.to_string(),
            "failed to connect to statsd sink: refused"
        );
    }
}
