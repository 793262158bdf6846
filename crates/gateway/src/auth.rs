// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role and scope checks
//!
//! Roles form a total order (`viewer < operator < admin`); each role
//! carries a fixed scope set. A failed check raises [`ForbiddenError`]
//! and must propagate to the caller with no side effects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Operator,
    Admin,
}

impl Role {
    /// The fixed scope set granted to this role
    pub fn scopes(&self) -> &'static [Scope] {
        match self {
            Role::Viewer => &[Scope::EventsRead],
            Role::Operator | Role::Admin => &[
                Scope::EventsRead,
                Scope::CorrelateRead,
                Scope::IngestWrite,
                Scope::AnnotateWrite,
            ],
        }
    }

    pub fn grants(&self, scope: Scope) -> bool {
        self.scopes().contains(&scope)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Viewer => "viewer",
            Role::Operator => "operator",
            Role::Admin => "admin",
        };
        f.write_str(name)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(Role::Viewer),
            "operator" => Ok(Role::Operator),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "events:read")]
    EventsRead,
    #[serde(rename = "correlate:read")]
    CorrelateRead,
    #[serde(rename = "ingest:write")]
    IngestWrite,
    #[serde(rename = "annotate:write")]
    AnnotateWrite,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::EventsRead => "events:read",
            Scope::CorrelateRead => "correlate:read",
            Scope::IngestWrite => "ingest:write",
            Scope::AnnotateWrite => "annotate:write",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller identity attached to each gated request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub name: String,
    pub role: Role,
}

impl Principal {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// Role/scope check failure; no partial execution, no telemetry
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("forbidden: role {role} lacks scope {scope}")]
pub struct ForbiddenError {
    pub role: Role,
    pub scope: Scope,
}

pub fn authorize(principal: &Principal, scope: Scope) -> Result<(), ForbiddenError> {
    if principal.role.grants(scope) {
        Ok(())
    } else {
        Err(ForbiddenError {
            role: principal.role,
            scope,
        })
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
