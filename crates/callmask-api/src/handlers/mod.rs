//! HTTP request handlers

pub mod call_masking;
pub mod health;

use actix_web::{error::InternalError, web, HttpResponse};
use serde_json::json;
use tracing::warn;

pub use call_masking::call_masking;
pub use health::health_check;

/// Configure API routes
///
/// The masking endpoint is served both under `/api/v1` and at the root path
/// existing clients call.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .route("/call-masking", web::post().to(call_masking)),
    )
    .route("/call-masking", web::post().to(call_masking));
}

/// JSON extractor settings
///
/// Unparsable bodies get the same `400 {"error": ...}` shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            let message = err.to_string();
            warn!("Rejected request body: {}", message);
            InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(json!({
                    "error": message,
                    "code": "invalid_body",
                })),
            )
            .into()
        })
}
