//! Search domain - Requests, results and cache-aside outcomes

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

/// A validated search request
///
/// Both fields are guaranteed non-blank once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    search_type: String,
    search_body: String,
}

impl SearchRequest {
    /// Creates a request, rejecting missing or blank fields
    pub fn new(
        search_type: Option<String>,
        search_body: Option<String>,
    ) -> Result<Self, DomainError> {
        let search_type = require_field("searchType", search_type)?;
        let search_body = require_field("searchBody", search_body)?;

        Ok(Self {
            search_type,
            search_body,
        })
    }

    /// Upstream resource category, e.g. "users"
    pub fn search_type(&self) -> &str {
        &self.search_type
    }

    /// Query term
    pub fn search_body(&self) -> &str {
        &self.search_body
    }
}

fn require_field(name: &str, value: Option<String>) -> Result<String, DomainError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(DomainError::validation(format!("{} must not be empty", name))),
        None => Err(DomainError::validation(format!("{} is required", name))),
    }
}

/// Response payload for one search, built fresh for every response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub data: Value,
    #[serde(rename = "type")]
    pub search_type: String,
}

impl SearchResult {
    pub fn new(data: Value, search_type: impl Into<String>) -> Self {
        Self {
            data,
            search_type: search_type.into(),
        }
    }
}

/// Where a search result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    /// Served from the store
    Hit,
    /// Fetched upstream after a miss
    Miss,
    /// Fetched upstream because the store failed and the policy allows bypassing it
    Bypass,
}

impl ResultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Bypass => "BYPASS",
        }
    }
}

impl fmt::Display for ResultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search result together with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub result: SearchResult,
    pub source: ResultSource,
}

/// Tri-state result of a store lookup
#[derive(Debug)]
pub enum LookupOutcome {
    Hit(Value),
    Miss,
    StoreError(DomainError),
}

/// What the orchestrator does when the lookup itself fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreErrorPolicy {
    /// Fail the request without calling upstream
    #[default]
    Fail,
    /// Treat the failure as a miss and skip population
    Bypass,
}

/// Whether population blocks the response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulateMode {
    /// Write before responding; failures are logged
    #[default]
    Await,
    /// Spawn the write and respond immediately
    Background,
}
