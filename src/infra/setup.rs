use crate::{
    adapters::{crm::lead_connector::LeadConnectorClient, http::app_state::AppState},
    application::{
        ports::crm::CrmClient,
        use_cases::{
            billing_events::BillingEventUseCases, checkout::CheckoutUseCases,
            contact_sync::ContactSyncUseCases, lead_capture::LeadUseCases,
        },
    },
    infra::{
        config::AppConfig, error::InfraError, http_client::try_build_client,
        stripe_client::StripeClient,
    },
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_app_state() -> Result<AppState, InfraError> {
    let config = AppConfig::from_env()?;
    build_app_state(config)
}

/// Constructs the vendor clients once and injects them into the use cases.
pub fn build_app_state(config: AppConfig) -> Result<AppState, InfraError> {
    let http = try_build_client()?;

    let stripe = Arc::new(StripeClient::new(
        http.clone(),
        config.stripe_secret_key.clone(),
        &config.stripe_api_base,
    ));

    let crm: Option<Arc<dyn CrmClient>> = config.crm.as_ref().map(|creds| {
        Arc::new(LeadConnectorClient::new(
            http.clone(),
            creds.api_key.clone(),
            creds.location_id.clone(),
            &config.crm_api_base,
        )) as Arc<dyn CrmClient>
    });

    let catalog = Arc::new(config.plan_prices.catalog());
    let contact_sync = Arc::new(ContactSyncUseCases::new(crm.clone()));

    let billing_events =
        BillingEventUseCases::new(stripe.clone(), catalog.clone(), contact_sync);
    let checkout_use_cases = CheckoutUseCases::new(stripe, catalog, &config.site_url);
    let lead_use_cases = LeadUseCases::new(crm, config.crm_default_tag.clone());

    Ok(AppState {
        config: Arc::new(config),
        billing_events: Arc::new(billing_events),
        checkout_use_cases: Arc::new(checkout_use_cases),
        lead_use_cases: Arc::new(lead_use_cases),
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "aria_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs), skipped when the file cannot be created.
    let json_layer = File::create("app.log").ok().map(|file| {
        fmt::layer()
            .json()
            .with_writer(file)
            .with_current_span(true)
            .with_span_list(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
