// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The monitor capability and the registry of constructed monitors.
//!
//! Monitors are pluggable collaborators: each one collects a metric value,
//! emits it through the factory it was handed at construction, and resets
//! its accumulator. The core never discovers monitors on its own; the host
//! supplies a list of [`MonitorBuilder`]s and the registry is built once at
//! init, fixed for the agent's active lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;
use uriel_statsd::StatsFactory;

/// A pluggable metric source driven by the polling pipeline.
///
/// Each phase may suspend and may fail independently; failures are isolated
/// per monitor by the pipeline. Phase timeouts, if wanted, belong to the
/// implementation.
#[async_trait]
pub trait Monitor: Send + Sync {
    fn name(&self) -> &str;

    /// Sample the underlying value into the monitor's accumulator.
    async fn collect(&self) -> anyhow::Result<()>;

    /// Emit the accumulated value through the factory. `is_active` reflects
    /// the agent's lifecycle flag at the start of the cycle.
    async fn send(&self, is_active: bool) -> anyhow::Result<()>;

    /// Reset the accumulator for the next cycle.
    async fn clear(&self) -> anyhow::Result<()>;
}

/// Constructor supplied by the host; invoked once per monitor at init with
/// the metric-emission factory, which is all a monitor gets from the core.
pub type MonitorBuilder = Box<dyn Fn(StatsFactory) -> Arc<dyn Monitor> + Send + Sync>;

pub(crate) struct MonitorRegistry {
    monitors: HashMap<String, Arc<dyn Monitor>>,
}

impl MonitorRegistry {
    pub(crate) fn build(builders: &[MonitorBuilder], factory: &StatsFactory) -> Self {
        let mut monitors: HashMap<String, Arc<dyn Monitor>> =
            HashMap::with_capacity(builders.len());
        for builder in builders {
            let monitor = builder(factory.clone());
            let name = monitor.name().to_string();
            if monitors.insert(name.clone(), monitor).is_some() {
                warn!("Duplicate monitor name '{name}', keeping the last instance");
            }
        }
        Self { monitors }
    }

    pub(crate) fn len(&self) -> usize {
        self.monitors.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<dyn Monitor>> {
        self.monitors.values()
    }
}
