//! # stratum-client
//!
//! Remote API clients, one trait per configuration family.
//!
//! Handles:
//! - **Clients**: the client traits and the [`ClientSet`](clients::ClientSet) bundle.
//! - **Endpoints**: URL construction for every platform API.
//! - **Rest**: the blocking HTTP implementation of every trait.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod clients;
pub mod endpoints;
pub mod rest;
