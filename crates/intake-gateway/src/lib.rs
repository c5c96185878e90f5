// SPDX-FileCopyrightText: 2026 Intake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for the Intake support portal.
//!
//! The REST routes map almost 1:1 onto the storage operations; the
//! WebSocket route fans ticket events out to connected dashboard clients
//! through the broadcaster.

pub mod handlers;
pub mod server;
pub mod ws;

pub use server::{router, start_server, GatewayState, ServerConfig};
