//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use utoipa::OpenApi;

/// Assembled OpenAPI spec for the record lifecycle surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Confidential Record Stack API",
        version = "0.1.0",
        description = "Create encrypted business records and drive their \
proof-checked decrypt-and-verify lifecycle.\n\n\
Records carry an opaque ciphertext handle from creation. Any stakeholder \
may request verification; concurrent requests race safely and exactly one \
commit lands. Once verified, the clear value is immutable and every \
subsequent request returns it unchanged.\n\n\
Health probes (`/health/*`) are unauthenticated.",
        license(name = "AGPL-3.0-or-later")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::records::create_record,
        crate::routes::records::list_records,
        crate::routes::records::get_record,
        crate::routes::records::request_verification,
    ),
    components(schemas(
        crate::routes::records::CreateRecordRequest,
        crate::routes::records::RecordResponse,
        crate::routes::records::RecordListResponse,
        crate::routes::records::VerificationResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "records", description = "Confidential record lifecycle")
    )
)]
pub struct ApiDoc;
