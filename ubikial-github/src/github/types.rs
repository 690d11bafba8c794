//! GitHub REST wire types

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{RemoteRepository, RemoteUser};

#[derive(Debug, Deserialize)]
pub(crate) struct GhUser {
    pub login: String,
    pub id: u64,
    pub name: Option<String>,
}

impl From<GhUser> for RemoteUser {
    fn from(u: GhUser) -> Self {
        Self {
            login: u.login,
            id: u.id,
            name: u.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GhOwner {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GhRepository {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    pub description: Option<String>,
    pub owner: GhOwner,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<GhRepository> for RemoteRepository {
    fn from(r: GhRepository) -> Self {
        Self {
            name: r.name,
            full_name: r.full_name,
            owner: r.owner.login,
            private: r.private,
            description: r.description,
            updated_at: r.updated_at,
        }
    }
}

/// `GET /repos/{owner}/{repo}/contents/{path}` for a file
#[derive(Debug, Deserialize)]
pub(crate) struct GhContent {
    pub path: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: Option<String>,
    pub encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GhContentRef {
    pub path: String,
    pub sha: String,
}

/// `PUT /repos/{owner}/{repo}/contents/{path}` response
#[derive(Debug, Deserialize)]
pub(crate) struct GhPutResponse {
    pub content: GhContentRef,
}

#[derive(Debug, Serialize)]
pub(crate) struct GhCreateRepository<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub private: bool,
    /// Seed an initial commit so the default branch exists.
    pub auto_init: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct GhPutContent<'a> {
    pub message: &'a str,
    /// Base64 of the file bytes
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Deserialize)]
pub(crate) struct GhErrorBody {
    pub message: String,
}

/// Decode a contents API payload.
///
/// GitHub wraps the base64 text at 60 columns, so whitespace is stripped first.
pub(crate) fn decode_content(encoded: &str) -> Result<String, String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact)
        .map_err(|e| format!("Invalid base64 content: {e}"))?;
    String::from_utf8(bytes).map_err(|e| format!("Content is not UTF-8: {e}"))
}

pub(crate) fn encode_content(content: &str) -> String {
    BASE64.encode(content.as_bytes())
}
