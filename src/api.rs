//! Query surface.
//!
//! Framework-agnostic handlers: each takes the raw query parameters of a
//! request and returns a status code plus a JSON body. Mounting them on a
//! router is left to the embedding service.
//!
//! | Handler | Parameters | 200 body |
//! |---------|------------|----------|
//! | [`graph_wide_path`] | `start`, `end` | `{"path": [[lat, lng], ...]}` |
//! | [`structural_dump`] | `floor` (optional) | `{"nodes": [...], "edges": [...]}` |
//! | [`room_to_room_path`] | `start_room_id`, `end_room_id` | `{"type": "LineString", "coordinates": [[lng, lat], ...]}` |
//!
//! Errors come back as `{"error": "<message>"}`.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::model::{FloorId, NodeId, RoomId};
use crate::storage::GraphStore;
use crate::pathfinding::LineString;
use crate::{Error, Navigator, Result};

/// Query-string parameters, already percent-decoded.
pub type QueryParams = HashMap<String, String>;

/// Status code and JSON body of a handled request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    fn ok(body: impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::from_error(&Error::from(e)),
        }
    }

    pub fn from_error(err: &Error) -> Self {
        let status = err.status_code();
        if status >= 500 {
            warn!(status, error = %err, "request failed");
        } else {
            debug!(status, error = %err, "request rejected");
        }
        Self {
            status,
            body: json!({ "error": err.to_string() }),
        }
    }

    fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result {
            Ok(body) => Self::ok(body),
            Err(e) => Self::from_error(&e),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl Error {
    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidInput(_) => 400,
            Error::NotFound(_) | Error::NoPathFound { .. } => 404,
            Error::ConstraintViolation(_) => 409,
            Error::SearchLimitExceeded { .. } | Error::SearchTimedOut { .. } | Error::Cancelled => 503,
            Error::StorageError(_) | Error::Serialization(_) | Error::Io(_) => 500,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET ?start=<node id>&end=<node id>`
pub async fn graph_wide_path<S: GraphStore>(nav: &Navigator<S>, params: &QueryParams) -> ApiResponse {
    ApiResponse::from_result(graph_wide_path_body(nav, params).await)
}

async fn graph_wide_path_body<S: GraphStore>(nav: &Navigator<S>, params: &QueryParams) -> Result<serde_json::Value> {
    let start = NodeId(required_id(params, "start")?);
    let end = NodeId(required_id(params, "end")?);
    let path = nav.graph_wide_path(start, end).await?;
    Ok(json!({ "path": path.lat_lng_pairs() }))
}

/// `GET [?floor=<floor id>]`
pub async fn structural_dump<S: GraphStore>(nav: &Navigator<S>, params: &QueryParams) -> ApiResponse {
    let result = match optional_id(params, "floor") {
        Ok(floor) => nav.structural_dump(floor.map(FloorId)).await,
        Err(e) => Err(e),
    };
    ApiResponse::from_result(result)
}

/// `GET ?start_room_id=<room id>&end_room_id=<room id>`
pub async fn room_to_room_path<S: GraphStore>(nav: &Navigator<S>, params: &QueryParams) -> ApiResponse {
    ApiResponse::from_result(room_to_room_path_body(nav, params).await)
}

async fn room_to_room_path_body<S: GraphStore>(nav: &Navigator<S>, params: &QueryParams) -> Result<LineString> {
    let start = RoomId(required_id(params, "start_room_id")?);
    let end = RoomId(required_id(params, "end_room_id")?);
    let path = nav.room_to_room_path(start, end).await?;
    Ok(path.line_string())
}

// ============================================================================
// Parameter parsing
// ============================================================================

fn required_id(params: &QueryParams, key: &str) -> Result<u64> {
    optional_id(params, key)?
        .ok_or_else(|| Error::InvalidInput(format!("missing query parameter '{key}'")))
}

/// Empty values count as missing.
fn optional_id(params: &QueryParams, key: &str) -> Result<Option<u64>> {
    match params.get(key).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| Error::InvalidInput(format!("'{key}' must be a non-negative integer, got '{raw}'"))),
    }
}
