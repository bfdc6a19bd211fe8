use std::sync::Arc;

use axum::extract::FromRef;
use secrecy::SecretString;

use crate::{
    infra::config::AppConfig,
    use_cases::{
        billing_events::BillingEventHandler, checkout::CheckoutUseCases,
        lead_capture::LeadUseCases,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub billing_events: Arc<dyn BillingEventHandler>,
    pub checkout_use_cases: Arc<CheckoutUseCases>,
    pub lead_use_cases: Arc<LeadUseCases>,
}

impl AppState {
    pub fn webhook_secret(&self) -> &SecretString {
        &self.config.stripe_webhook_secret
    }
}

impl FromRef<AppState> for Arc<CheckoutUseCases> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.checkout_use_cases.clone()
    }
}

impl FromRef<AppState> for Arc<LeadUseCases> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.lead_use_cases.clone()
    }
}
