use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::get_env_default;
use secrecy::SecretString;
use url::Url;

use crate::{
    domain::entities::plan::{PlanCatalog, PlanKey},
    infra::error::InfraError,
};

pub const DEFAULT_SITE_URL: &str = "https://ariagroups.xyz";
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com/v1";
pub const DEFAULT_CRM_API_BASE: &str = "https://services.leadconnectorhq.com";
pub const DEFAULT_CORS_ORIGINS: &str =
    "https://ariagroups.xyz,https://www.ariagroups.xyz,http://localhost:5173";

/// LeadConnector credentials. Both halves are needed; with either missing the
/// CRM is treated as unconfigured.
pub struct CrmCredentials {
    pub api_key: SecretString,
    pub location_id: String,
}

/// Stripe price ids for each plan, as configured.
#[derive(Debug, Clone, Default)]
pub struct PlanPrices {
    pub trial: Option<String>,
    pub starter: Option<String>,
    pub growth: Option<String>,
}

impl PlanPrices {
    pub fn catalog(&self) -> PlanCatalog {
        PlanCatalog::new(
            [
                (self.trial.as_ref(), PlanKey::Trial),
                (self.starter.as_ref(), PlanKey::Starter),
                (self.growth.as_ref(), PlanKey::Growth),
            ]
            .into_iter()
            .filter_map(|(price, key)| price.map(|p| (p.clone(), key))),
        )
    }
}

pub struct AppConfig {
    pub stripe_secret_key: SecretString,
    pub stripe_webhook_secret: SecretString,
    pub stripe_api_base: Url,
    pub plan_prices: PlanPrices,
    /// `None` when `GHL_API_KEY` or `GHL_LOCATION_ID` is unset.
    pub crm: Option<CrmCredentials>,
    pub crm_api_base: Url,
    /// Extra tag applied to every website lead.
    pub crm_default_tag: Option<String>,
    /// Base for checkout and portal redirects.
    pub site_url: Url,
    /// Empty means no cross-origin access.
    pub cors_origins: Vec<HeaderValue>,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let stripe_secret_key = optional_env("STRIPE_SECRET_KEY")
            .or_else(|| optional_env("STRIPE_SECRET"))
            .map(secret)
            .ok_or(InfraError::ConfigMissing {
                var: "STRIPE_SECRET_KEY",
            })?;
        let stripe_webhook_secret = required_env("STRIPE_WEBHOOK_SECRET").map(secret)?;

        let plan_prices = PlanPrices {
            trial: optional_env("STRIPE_PRICE_TRIAL"),
            starter: optional_env("STRIPE_PRICE_STARTER"),
            growth: optional_env("STRIPE_PRICE_GROWTH"),
        };

        let crm = crm_credentials(optional_env("GHL_API_KEY"), optional_env("GHL_LOCATION_ID"));
        let crm_default_tag = optional_env("GHL_DEFAULT_TAG");

        let site_url = parse_url(
            "SITE_URL",
            &get_env_default("SITE_URL", DEFAULT_SITE_URL.to_string()),
        )?;
        let stripe_api_base = parse_url(
            "STRIPE_API_BASE",
            &get_env_default("STRIPE_API_BASE", DEFAULT_STRIPE_API_BASE.to_string()),
        )?;
        let crm_api_base = parse_url(
            "GHL_API_BASE",
            &get_env_default("GHL_API_BASE", DEFAULT_CRM_API_BASE.to_string()),
        )?;

        let cors_origins = parse_cors_origins(&get_env_default(
            "CORS_ORIGINS",
            DEFAULT_CORS_ORIGINS.to_string(),
        ))?;

        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3001)));

        if crm.is_none() {
            tracing::warn!("GHL_API_KEY or GHL_LOCATION_ID not set, CRM sync is disabled");
        }
        if plan_prices.catalog().is_empty() {
            tracing::warn!("No STRIPE_PRICE_* configured, plans cannot be resolved");
        }

        Ok(Self {
            stripe_secret_key,
            stripe_webhook_secret,
            stripe_api_base,
            plan_prices,
            crm,
            crm_api_base,
            crm_default_tag,
            site_url,
            cors_origins,
            bind_addr,
        })
    }
}

fn secret(value: String) -> SecretString {
    SecretString::new(value.into())
}

/// Set and non-blank, trimmed.
fn optional_env(var: &'static str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_env(var: &'static str) -> Result<String, InfraError> {
    optional_env(var).ok_or(InfraError::ConfigMissing { var })
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, InfraError> {
    Url::parse(raw.trim()).map_err(|e| InfraError::InvalidConfig {
        var,
        reason: e.to_string(),
    })
}

pub fn crm_credentials(
    api_key: Option<String>,
    location_id: Option<String>,
) -> Option<CrmCredentials> {
    Some(CrmCredentials {
        api_key: secret(api_key?),
        location_id: location_id?,
    })
}

/// Comma-separated origins, blanks skipped.
pub fn parse_cors_origins(raw: &str) -> Result<Vec<HeaderValue>, InfraError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            origin
                .trim_end_matches('/')
                .parse::<HeaderValue>()
                .map_err(|e| InfraError::InvalidConfig {
                    var: "CORS_ORIGINS",
                    reason: e.to_string(),
                })
        })
        .collect()
}
