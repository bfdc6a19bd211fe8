use std::sync::Arc;

use tracing::instrument;
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::payment_provider::{
            CHECKOUT_SOURCE, CheckoutMetadata, CheckoutRedirect, CheckoutRequest, PaymentGateway,
        },
        validators::{is_valid_email, non_blank},
    },
    domain::entities::plan::{PlanCatalog, PlanKey},
};

#[derive(Debug, Clone, Default)]
pub struct CheckoutInput {
    pub price_id: Option<String>,
    pub plan_name: Option<String>,
    pub plan_key: Option<String>,
}

#[derive(Clone)]
pub struct CheckoutUseCases {
    gateway: Arc<dyn PaymentGateway>,
    catalog: Arc<PlanCatalog>,
    site_url: String,
}

impl CheckoutUseCases {
    pub fn new(gateway: Arc<dyn PaymentGateway>, catalog: Arc<PlanCatalog>, site_url: &Url) -> Self {
        Self {
            gateway,
            catalog,
            site_url: site_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    /// Starts a subscription checkout. The resolved price is written into the
    /// session metadata, which is where the completion webhook looks first.
    #[instrument(skip(self))]
    pub async fn create_checkout_session(&self, input: CheckoutInput) -> AppResult<CheckoutRedirect> {
        let (price_id, plan_key) = self.resolve_price(&input)?;
        let plan_key = plan_key.map(|k| k.to_string()).unwrap_or_default();

        let metadata = CheckoutMetadata {
            plan_name: non_blank(input.plan_name.as_deref()).unwrap_or_else(|| plan_key.clone()),
            plan_key,
            price_id: price_id.clone(),
            source: CHECKOUT_SOURCE.to_string(),
        };

        let request = CheckoutRequest {
            price_id,
            metadata,
            success_url: format!("{}/success", self.site_url),
            cancel_url: format!("{}/canceled", self.site_url),
        };

        let redirect = self.gateway.create_checkout_session(&request).await?;
        tracing::info!(session_id = %redirect.session_id, price_id = %request.price_id, "Checkout session created");
        Ok(redirect)
    }

    /// Returns the billing portal URL for the customer with this email.
    #[instrument(skip(self))]
    pub async fn create_portal_session(
        &self,
        email: &str,
        return_url: Option<&str>,
    ) -> AppResult<String> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AppError::InvalidInput("Missing or invalid email".into()));
        }

        let return_url = match non_blank(return_url) {
            Some(url) => validate_return_url(&url)?,
            None => format!("{}/", self.site_url),
        };

        let customer = self
            .gateway
            .find_customer_by_email(email)
            .await?
            .ok_or(AppError::NotFound)?;

        self.gateway
            .create_portal_session(&customer.id, &return_url)
            .await
    }

    fn resolve_price(&self, input: &CheckoutInput) -> AppResult<(String, Option<PlanKey>)> {
        if let Some(price_id) = non_blank(input.price_id.as_deref())
            && let Some(plan) = self.catalog.resolve(Some(price_id.as_str()))
        {
            return Ok((price_id, Some(plan.key)));
        }

        let key = input
            .plan_key
            .as_deref()
            .and_then(PlanKey::from_name)
            .or_else(|| input.plan_name.as_deref().and_then(PlanKey::from_name))
            .ok_or_else(|| AppError::InvalidInput("Unable to resolve price ID for this plan".into()))?;

        let price_id = self
            .catalog
            .price_for(key)
            .ok_or_else(|| AppError::InvalidInput("Unable to resolve price ID for this plan".into()))?;

        Ok((price_id.to_string(), Some(key)))
    }
}

fn validate_return_url(raw: &str) -> AppResult<String> {
    let url = Url::parse(raw).map_err(|_| AppError::InvalidInput("Invalid returnUrl".into()))?;
    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        _ => Err(AppError::InvalidInput("Invalid returnUrl".into())),
    }
}
