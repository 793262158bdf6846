// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.
//!
//! One tokio task per client connection. Request/response connections
//! are short-lived; a `Subscribe` request upgrades its connection to a
//! long-lived push stream that lives until the client disconnects.

use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncReadExt;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::Notify;
use tracing::{debug, error};

use crate::auth::Principal;
use crate::gateway::{Gateway, GatewayError};
use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION};
use mesh_core::EventFilter;

/// Shared handle passed to every connection task
#[derive(Clone)]
pub struct ServerState {
    pub gateway: Arc<Gateway>,
    pub start_time: Instant,
    /// Signalled when a client requests shutdown
    pub shutdown: Arc<Notify>,
}

impl ServerState {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            start_time: Instant::now(),
            shutdown: Arc::new(Notify::new()),
        }
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Request timeout")]
    Timeout,
}

/// Handle a single client connection
pub async fn handle_connection(state: ServerState, stream: UnixStream) -> Result<(), ServerError> {
    let (mut reader, mut writer) = stream.into_split();

    // Read request with timeout
    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("Received request: {:?}", request);

    // Subscriptions take over the connection; everything else is one
    // response frame
    match request {
        Request::Subscribe { principal, filter } => {
            handle_subscribe(state, principal, filter, reader, writer).await
        }
        other => {
            let response = handle_request(&state, other);

            debug!("Sending response: {:?}", response);

            protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
                .await
                .map_err(ServerError::Protocol)?;

            Ok(())
        }
    }
}

/// Handle a single request and return a response
fn handle_request(state: &ServerState, request: Request) -> Response {
    let gateway = &state.gateway;

    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => Response::Hello {
            version: PROTOCOL_VERSION.to_string(),
        },

        Request::Status => match gateway.stored_events() {
            Ok(stored_events) => Response::Status {
                uptime_secs: state.start_time.elapsed().as_secs(),
                subscribers: gateway.subscriber_count(),
                stored_events,
                telemetry: gateway.telemetry(),
            },
            Err(e) => error_response(e),
        },

        Request::Ingest { principal, init } => match gateway.ingest(&principal, init) {
            Ok(outcome) => Response::Ingested {
                published: outcome.is_published(),
            },
            Err(e) => error_response(e),
        },

        Request::Correlate {
            principal,
            key,
            key_type,
        } => match gateway.correlate(&principal, &key, key_type) {
            Ok(timeline) => Response::Timeline { timeline },
            Err(e) => error_response(e),
        },

        Request::Annotate {
            principal,
            job_id,
            text,
            attachments,
        } => match gateway.annotate(&principal, job_id, text, attachments) {
            Ok(message) => Response::Posted { message },
            Err(e) => error_response(e),
        },

        Request::React {
            principal,
            message_id,
            emoji,
        } => match gateway.react(&principal, &message_id, &emoji) {
            Ok(reactions) => Response::Reacted { reactions },
            Err(e) => error_response(e),
        },

        Request::Thread {
            principal,
            job_id,
            limit,
        } => match gateway.thread(&principal, job_id.as_deref(), limit) {
            Ok(messages) => Response::Messages { messages },
            Err(e) => error_response(e),
        },

        Request::Shutdown => {
            state.shutdown.notify_one();
            Response::ShuttingDown
        }

        // Handled by the caller before dispatch
        Request::Subscribe { .. } => Response::Error {
            message: "subscribe must be the first request on its connection".to_string(),
        },
    }
}

fn error_response(error: GatewayError) -> Response {
    match error {
        GatewayError::Forbidden(e) => Response::Forbidden {
            message: e.to_string(),
        },
        other => Response::Error {
            message: other.to_string(),
        },
    }
}

/// Push matching envelopes until the client goes away
///
/// The read half is watched for EOF so a disconnect is noticed even
/// while no events flow; either way the bus subscription is dropped
/// exactly once.
async fn handle_subscribe(
    state: ServerState,
    principal: Principal,
    filter: EventFilter,
    mut reader: OwnedReadHalf,
    mut writer: OwnedWriteHalf,
) -> Result<(), ServerError> {
    let (id, mut rx) = match state.gateway.subscribe(&principal, filter) {
        Ok(pair) => pair,
        Err(e) => {
            let response = error_response(e);
            protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
                .await
                .map_err(ServerError::Protocol)?;
            return Ok(());
        }
    };

    let subscribed = Response::Subscribed {
        subscription_id: id.0.clone(),
    };
    if protocol::write_response(&mut writer, &subscribed, DEFAULT_TIMEOUT)
        .await
        .is_err()
    {
        state.gateway.unsubscribe(&id);
        return Ok(());
    }

    debug!(subscriber = %id.0, "subscription started");

    let mut probe = [0u8; 64];
    loop {
        tokio::select! {
            maybe = rx.recv() => {
                // None means the bus reaped us
                let Some(envelope) = maybe else { break };
                let frame = match protocol::encode(&Response::Event { envelope }) {
                    Ok(frame) => frame,
                    Err(e) => {
                        error!(subscriber = %id.0, "failed to encode event frame: {}", e);
                        break;
                    }
                };
                if protocol::write_message(&mut writer, &frame).await.is_err() {
                    break;
                }
            }

            read = reader.read(&mut probe) => {
                match read {
                    // Client hung up
                    Ok(0) | Err(_) => break,
                    // Clients send nothing after Subscribe; ignore stray bytes
                    Ok(_) => continue,
                }
            }
        }
    }

    state.gateway.unsubscribe(&id);
    debug!(subscriber = %id.0, "subscription closed");

    Ok(())
}
