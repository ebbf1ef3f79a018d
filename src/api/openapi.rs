//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the mediafetch HTTP API using
//! utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the mediafetch HTTP API
///
/// The spec can be accessed via:
/// - `/api/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (when enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "mediafetch API",
        version = "0.2.0",
        description = "Media download server: submit a URL, follow downloader progress over a server-sent event stream, receive a download link",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    paths(
        // Fetch jobs
        crate::api::routes::fetch_media,
        crate::api::routes::run_media,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::Mode,
        crate::types::StreamEvent,
        crate::api::routes::FetchParams,
    )),
    tags(
        (name = "fetch", description = "Download jobs - Submit a media URL and follow progress over SSE"),
        (name = "system", description = "System endpoints - Health check and OpenAPI spec"),
    )
)]
pub struct ApiDoc;
