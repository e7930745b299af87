// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Composition root and lifecycle state machine.
//!
//! A [`Server`] is `inactive` until `init` and again after `close`. The
//! sink connection, scheduler, and active flag live in one state struct
//! that exists exactly while the agent is active, so there is no partially
//! initialized in-between to reason about.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{AgentConfig, ResolvedConfig};
use crate::error::AgentError;
use crate::monitor::{MonitorBuilder, MonitorRegistry};
use crate::pipeline::PipelineRunner;
use crate::scheduler::PollingScheduler;
use crate::sink::SinkConnection;

pub struct Server {
    config: ResolvedConfig,
    builders: Vec<MonitorBuilder>,
    active: Option<ActiveState>,
}

/// Everything that exists iff the agent is active.
struct ActiveState {
    sink: SinkConnection,
    scheduler: PollingScheduler,
    is_active: Arc<AtomicBool>,
}

impl Server {
    /// Resolves the configuration eagerly; the agent starts inactive.
    /// Monitors are constructed later, at `init`, each handed the emission
    /// factory and nothing else.
    pub fn new(config: &AgentConfig, monitors: Vec<MonitorBuilder>) -> Self {
        Self {
            config: ResolvedConfig::resolve(config),
            builders: monitors,
            active: None,
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Starts the agent: opens the sink connection, builds the monitor
    /// registry, and starts the polling scheduler. Calling `init` on an
    /// already-active agent is rejected.
    pub async fn init(&mut self) -> Result<(), AgentError> {
        if self.active.is_some() {
            return Err(AgentError::AlreadyStarted);
        }

        let (sink, factory) = SinkConnection::open(&self.config).await?;

        let registry = Arc::new(MonitorRegistry::build(&self.builders, &factory));
        debug!("Registered {} monitors", registry.len());

        let is_active = Arc::new(AtomicBool::new(true));
        let runner = Arc::new(PipelineRunner::new(registry, Arc::clone(&is_active)));

        info!(
            "Running polling every {}ms",
            self.config.polling_interval.as_millis()
        );
        let scheduler = PollingScheduler::start(
            self.config.polling_interval,
            self.config.cycle_policy,
            move || {
                let runner = Arc::clone(&runner);
                async move { runner.run_cycle().await }
            },
        );

        self.active = Some(ActiveState {
            sink,
            scheduler,
            is_active,
        });
        Ok(())
    }

    /// Stops the agent. Idempotent and infallible: calling it twice, or
    /// before `init`, does nothing. Only the recurring timer is cancelled;
    /// cycles already in flight finish in the background.
    pub async fn close(&mut self) {
        let Some(state) = self.active.take() else {
            return;
        };

        state.is_active.store(false, Ordering::Release);

        debug!("Shutting down polling timer");
        state.scheduler.stop(self.config.shutdown_timeout).await;
        state.sink.close();
    }
}
