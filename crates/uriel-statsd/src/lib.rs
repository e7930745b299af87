// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Client-side statsd emission over UDP.
//!
//! This crate provides the sink collaborator for the polling agent: a shared
//! [`StatsClient`] owning the outbound UDP socket, and a [`StatsFactory`]
//! bound to the agent's identity and tag set that monitors use to push
//! metric values. Transport errors never propagate out of emission calls;
//! they are routed to the error callback supplied at connect time.

pub mod client;
pub mod errors;
pub mod factory;

pub use client::{ErrorCallback, StatsClient, StatsClientConfig};
pub use errors::SinkError;
pub use factory::StatsFactory;
