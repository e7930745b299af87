// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Long-running polling telemetry agent.
//!
//! The agent is embedded in a host process and, on a fixed interval, asks a
//! set of host-supplied monitors to collect metric values, forwards them to
//! a statsd sink over UDP, then resets each monitor for the next cycle.
//!
//! The pieces, leaf first: [`config`] resolves partial overrides into an
//! immutable [`config::ResolvedConfig`] with a derived identity and tag set;
//! the sink connection owns the UDP client for the active lifetime and hands
//! each monitor a [`uriel_statsd::StatsFactory`]; the scheduler fires one
//! pipeline cycle per interval; the pipeline runs collect → send → clear per
//! monitor, concurrently across monitors, with per-monitor failure
//! isolation. [`Server`] composes all of it behind `init`/`close`.
//!
//! Ticks are independent by default: a cycle slower than the polling
//! interval overlaps the next one. Hosts that want serialized cycles opt
//! into [`config::CyclePolicy::SkipIfBusy`].

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod monitor;
mod pipeline;
mod scheduler;
pub mod server;
mod sink;

pub use config::{AgentConfig, CyclePolicy, ResolvedConfig};
pub use error::AgentError;
pub use monitor::{Monitor, MonitorBuilder};
pub use server::Server;
