//! Route handlers for the HTTP API
//!
//! Handlers are organized by domain:
//! - [`fetch`] — Media fetch jobs streamed over SSE
//! - [`system`] — Health and OpenAPI

use crate::types::Mode;
use serde::{Deserialize, Serialize};

mod fetch;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use fetch::*;
pub use system::*;

/// Parameters for POST /api/fetch (JSON body) and GET /api/run (query string)
///
/// Every field is optional on the wire: a missing URL simply fails
/// validation, which still produces a well-formed event stream rather than a
/// rejected request.
#[derive(Debug, Default, Clone, Deserialize, Serialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FetchParams {
    /// Media URL to download (http/https only)
    #[serde(default)]
    pub url: String,

    /// Download mode (default: video; unknown values fold to video)
    #[serde(default)]
    pub mode: Mode,

    /// Requested base filename; slugified server-side
    #[serde(default)]
    pub filename: Option<String>,
}
