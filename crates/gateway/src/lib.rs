// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mesh-gateway: Access-controlled gateway for the event mesh
//!
//! Exposes the `correlate` query and the `events` streaming
//! subscription over a Unix socket, gated by role/scope checks, plus
//! the collaborative annotation channel. The daemon binary is `meshd`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod annotations;
pub mod auth;
pub mod gateway;
pub mod lifecycle;
pub mod protocol;
pub mod server;

// Re-exports
pub use annotations::{Annotation, AnnotationLog, GLOBAL_THREAD};
pub use auth::{authorize, ForbiddenError, Principal, Role, Scope};
pub use gateway::{Gateway, GatewayError};
pub use protocol::{ProtocolError, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};
pub use server::{handle_connection, ServerError, ServerState};
