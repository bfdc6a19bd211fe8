//! Checkout and billing portal redirects for the pricing page.

use std::sync::Arc;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    use_cases::checkout::{CheckoutInput, CheckoutUseCases},
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCheckoutPayload {
    price_id: Option<String>,
    plan_name: Option<String>,
    plan_key: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePortalPayload {
    email: Option<String>,
    return_url: Option<String>,
}

#[derive(Serialize)]
struct RedirectResponse {
    url: Option<String>,
}

/// POST /api/create-checkout-session
async fn create_checkout_session(
    State(checkout): State<Arc<CheckoutUseCases>>,
    Json(payload): Json<CreateCheckoutPayload>,
) -> AppResult<impl IntoResponse> {
    let redirect = checkout
        .create_checkout_session(CheckoutInput {
            price_id: payload.price_id,
            plan_name: payload.plan_name,
            plan_key: payload.plan_key,
        })
        .await?;

    Ok(Json(RedirectResponse { url: redirect.url }))
}

/// POST /api/create-portal-session
async fn create_portal_session(
    State(checkout): State<Arc<CheckoutUseCases>>,
    Json(payload): Json<CreatePortalPayload>,
) -> AppResult<impl IntoResponse> {
    let url = checkout
        .create_portal_session(
            payload.email.as_deref().unwrap_or_default(),
            payload.return_url.as_deref(),
        )
        .await?;

    Ok(Json(RedirectResponse { url: Some(url) }))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/create-portal-session", post(create_portal_session))
}
