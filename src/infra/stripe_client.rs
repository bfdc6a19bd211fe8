use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::{CheckoutRedirect, CheckoutRequest, PaymentGateway},
    domain::entities::webhook_event::{CustomerProfile, PriceRef},
};

const SERVICE: &str = "stripe";

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: SecretString,
    api_base: String,
}

impl StripeClient {
    pub fn new(client: Client, secret_key: SecretString, api_base: &url::Url) -> Self {
        Self {
            client,
            secret_key,
            api_base: api_base.as_str().trim_end_matches('/').to_string(),
        }
    }

    fn auth_header(&self) -> String {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:", self.secret_key.expose_secret()));
        format!("Basic {}", encoded)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .header("Authorization", self.auth_header())
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Stripe request failed: {}", e)))?;

        self.handle_response(response).await
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        let response = self
            .client
            .post(self.url(path))
            .header("Authorization", self.auth_header())
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Stripe request failed: {}", e)))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Stripe API error");

            let message = serde_json::from_str::<StripeErrorResponse>(&body)
                .map(|e| e.error.message.unwrap_or(e.error.error_type))
                .unwrap_or(body);
            return Err(AppError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                body: message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Stripe response");
            AppError::Internal(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn get_customer(&self, customer_id: &str) -> AppResult<CustomerProfile> {
        self.get(&format!("/customers/{}", customer_id), &[]).await
    }

    async fn checkout_session_price_id(&self, session_id: &str) -> AppResult<Option<String>> {
        let items: StripeList<StripeLineItem> = self
            .get(
                &format!("/checkout/sessions/{}/line_items", session_id),
                &[("limit", "1")],
            )
            .await?;
        Ok(items
            .data
            .into_iter()
            .next()
            .and_then(|item| item.price)
            .map(|price| price.id))
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> AppResult<CheckoutRedirect> {
        let metadata = &request.metadata;
        let params = [
            ("mode", "subscription"),
            ("line_items[0][price]", request.price_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("allow_promotion_codes", "true"),
            ("billing_address_collection", "auto"),
            ("phone_number_collection[enabled]", "true"),
            ("metadata[planName]", metadata.plan_name.as_str()),
            ("metadata[planKey]", metadata.plan_key.as_str()),
            ("metadata[priceId]", metadata.price_id.as_str()),
            ("metadata[source]", metadata.source.as_str()),
            ("success_url", request.success_url.as_str()),
            ("cancel_url", request.cancel_url.as_str()),
        ];

        let session: StripeCheckoutSession = self.post_form("/checkout/sessions", &params).await?;
        Ok(CheckoutRedirect {
            session_id: session.id,
            url: session.url,
        })
    }

    async fn find_customer_by_email(&self, email: &str) -> AppResult<Option<CustomerProfile>> {
        let list: StripeList<CustomerProfile> = self
            .get("/customers", &[("email", email), ("limit", "1")])
            .await?;
        Ok(list.data.into_iter().next())
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> AppResult<String> {
        let session: StripePortalSession = self
            .post_form(
                "/billing_portal/sessions",
                &[("customer", customer_id), ("return_url", return_url)],
            )
            .await?;
        Ok(session.url)
    }
}

// ============================================================================
// Stripe Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct StripeList<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StripeLineItem {
    price: Option<PriceRef>,
}

#[derive(Debug, Deserialize)]
struct StripeCheckoutSession {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripePortalSession {
    url: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    #[serde(rename = "type")]
    error_type: String,
    message: Option<String>,
}
