pub mod checkout;
pub mod lead;
pub mod stripe_webhook;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(stripe_webhook::router())
        .merge(checkout::router())
        .merge(lead::router())
}
