//! Stripe webhook receiver.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    domain::entities::webhook_event::WebhookEvent,
    infra::webhook_signer::verify_webhook_signature,
    use_cases::billing_events::EventOutcome,
};

#[derive(Serialize)]
struct WebhookAck {
    received: bool,
}

/// POST /api/stripe-webhook
/// Verifies the signature over the raw body before anything is parsed. Every
/// verified, well-formed event is acknowledged, including ones whose CRM sync
/// failed, so Stripe does not retry them.
async fn stripe_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidSignature("Missing Stripe signature".into()))?;

    verify_webhook_signature(&body, signature, app_state.webhook_secret().expose_secret())?;

    let event = WebhookEvent::parse(&body)?;
    let event_id = event.id.clone();

    match app_state.billing_events.handle(event).await {
        EventOutcome::Reconciled(synced) => {
            tracing::info!(event_id = %event_id, contact_id = %synced.contact_id, "Webhook reconciled")
        }
        EventOutcome::SyncFailed(_) => {
            tracing::warn!(event_id = %event_id, "Webhook acknowledged without CRM sync")
        }
        EventOutcome::Unchanged { status } => {
            tracing::debug!(event_id = %event_id, status = status.as_str(), "Webhook left tags unchanged")
        }
        EventOutcome::Ignored => {}
    }

    Ok(Json(WebhookAck { received: true }))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/stripe-webhook", post(stripe_webhook))
}
