//! Call masking handler
//!
//! One endpoint, four operations selected by the `action` field.

use crate::dto::{
    CallMaskingRequest, ConnectResponse, ExpireResponse, GenerateResponse, MaskingAction,
    VerifyResponse,
};
use actix_web::{web, HttpResponse};
use callmask_core::AppError;
use callmask_services::CallMaskingService;
use tracing::{debug, instrument, warn};

/// Dispatch a masking request
///
/// POST /api/v1/call-masking
#[instrument(skip(service, req), fields(action = %req.action))]
pub async fn call_masking(
    service: web::Data<CallMaskingService>,
    req: web::Json<CallMaskingRequest>,
) -> Result<HttpResponse, AppError> {
    let action = req.action()?;
    let booking_id = req.booking_id()?;

    debug!(%booking_id, "Handling {} request", action);

    let response = match action {
        MaskingAction::Generate => {
            let number = service.generate(booking_id).await?;
            HttpResponse::Ok().json(GenerateResponse {
                virtual_number: number.virtual_number,
            })
        }
        MaskingAction::Connect => {
            let caller = req.caller().map_err(|e| {
                warn!("Connect request rejected: {}", e);
                e
            })?;
            let outcome = service
                .connect(booking_id, &caller.phone_number, caller.caller_type)
                .await?;
            HttpResponse::Ok().json(ConnectResponse {
                success: true,
                virtual_number: outcome.virtual_number,
            })
        }
        MaskingAction::Expire => {
            let outcome = service.expire(booking_id).await?;
            HttpResponse::Ok().json(ExpireResponse {
                success: true,
                expired: outcome.expired,
            })
        }
        MaskingAction::Verify => {
            let outcome = service.verify(booking_id).await?;
            HttpResponse::Ok().json(VerifyResponse {
                is_valid: outcome.is_valid(),
                details: outcome.analysis.details,
            })
        }
    };

    Ok(response)
}
