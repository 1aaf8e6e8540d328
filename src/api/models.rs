//! Request and response models for the pdfdesk HTTP API
//!
//! Artifact-producing endpoints answer `201 Created` with an
//! [`ArtifactResponse`]:
//!
//! ```json
//! {
//!   "filename": "merged_1700000000_3f2a9c41d0be.pdf",
//!   "action": "merge",
//!   "timestamp": "2023-11-14T22:13:20.123456",
//!   "size": 48213
//! }
//! ```
//!
//! `GET /history` returns the ledger as a JSON array of
//! `{filename, action, timestamp}` objects, newest first.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::observability::MetricsSnapshot;
use crate::workflow::Artifact;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ArtifactResponse {
    pub filename: String,
    pub action: String,
    pub timestamp: String,
    pub size: usize,
}

impl From<Artifact> for ArtifactResponse {
    fn from(artifact: Artifact) -> Self {
        Self {
            filename: artifact.entry.filename,
            action: artifact.entry.action,
            timestamp: artifact.entry.timestamp,
            size: artifact.size,
        }
    }
}

/// `POST /split?start=1&end=5` (1-based, inclusive)
#[derive(Debug, Deserialize, Clone)]
pub struct SplitParams {
    pub start: u32,
    pub end: u32,
}

/// `POST /reorder?order=2,0,1` (0-based page indices)
#[derive(Debug, Deserialize, Clone)]
pub struct ReorderParams {
    pub order: String,
}

/// `POST /metadata?author=..&title=..`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MetadataParams {
    pub author: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub metrics: MetricsSnapshot,
    pub version: String,
}
