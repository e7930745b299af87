// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Fixed-interval polling scheduler.
//!
//! Fires one cycle per interval, starting after the first full interval
//! elapses. Under the default [`CyclePolicy::Concurrent`] a tick fires at
//! its scheduled time whether or not the previous cycle has settled, so
//! cycles may overlap; `stop` cancels only the recurring timer and leaves
//! in-flight cycles to finish in the background.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::CyclePolicy;

pub(crate) struct PollingScheduler {
    cancel: CancellationToken,
    timer_task: JoinHandle<()>,
}

impl PollingScheduler {
    pub(crate) fn start<F, Fut>(period: Duration, policy: CyclePolicy, on_tick: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let timer_task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.tick().await; // discard first tick, which is instantaneous

            let in_flight = Arc::new(AtomicBool::new(false));
            loop {
                tokio::select! {
                    _ = ticker.tick() => match policy {
                        CyclePolicy::Concurrent => {
                            tokio::spawn(on_tick());
                        }
                        CyclePolicy::SkipIfBusy => {
                            if in_flight
                                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                                .is_ok()
                            {
                                let in_flight = Arc::clone(&in_flight);
                                let cycle = on_tick();
                                tokio::spawn(async move {
                                    cycle.await;
                                    in_flight.store(false, Ordering::Release);
                                });
                            } else {
                                debug!("Previous polling cycle still running, skipping this tick");
                            }
                        }
                    },
                    _ = token.cancelled() => break,
                }
            }
            debug!("Polling timer stopped");
        });

        Self { cancel, timer_task }
    }

    /// Cancels future ticks and waits up to `timeout` for the timer task to
    /// wind down. Cycles already in flight are not cancelled.
    pub(crate) async fn stop(self, timeout: Duration) {
        self.cancel.cancel();
        if tokio::time::timeout(timeout, self.timer_task).await.is_err() {
            warn!("Polling timer task did not stop within {timeout:?}");
        }
    }
}
