// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! One polling cycle across all registered monitors.
//!
//! Each monitor runs collect → send → clear strictly in that order; across
//! monitors the sequences are spawned concurrently with no ordering. The
//! cycle settles when every sequence has finished. A failing monitor is
//! logged at error level and does not abort its siblings, and nothing is
//! retried until the next scheduled cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, error};

use crate::monitor::{Monitor, MonitorRegistry};

pub(crate) struct PipelineRunner {
    monitors: Arc<MonitorRegistry>,
    is_active: Arc<AtomicBool>,
}

impl PipelineRunner {
    pub(crate) fn new(monitors: Arc<MonitorRegistry>, is_active: Arc<AtomicBool>) -> Self {
        Self { monitors, is_active }
    }

    pub(crate) async fn run_cycle(&self) {
        debug!("Running information polling");

        // Sampled once; every send in this cycle sees the same value.
        let is_active = self.is_active.load(Ordering::Acquire);

        let mut sequences = Vec::with_capacity(self.monitors.len());
        for monitor in self.monitors.iter() {
            let monitor = Arc::clone(monitor);
            sequences.push(tokio::spawn(run_monitor(monitor, is_active)));
        }

        let mut failures = 0usize;
        for sequence in sequences {
            match sequence.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    failures += 1;
                    error!("{err:#}");
                }
                Err(err) => {
                    failures += 1;
                    error!("Monitor sequence aborted: {err}");
                }
            }
        }

        if failures == 0 {
            debug!("Polling cycle complete");
        }
    }
}

async fn run_monitor(monitor: Arc<dyn Monitor>, is_active: bool) -> anyhow::Result<()> {
    let name = monitor.name().to_string();

    debug!("Collecting ({name} monitor)");
    monitor
        .collect()
        .await
        .with_context(|| format!("({name} monitor) collect failed"))?;

    debug!("Sending ({name} monitor)");
    monitor
        .send(is_active)
        .await
        .with_context(|| format!("({name} monitor) send failed"))?;

    debug!("Updating ({name} monitor)");
    monitor
        .clear()
        .await
        .with_context(|| format!("({name} monitor) clear failed"))?;

    Ok(())
}
