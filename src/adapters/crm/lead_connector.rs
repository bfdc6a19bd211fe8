//! LeadConnector (GoHighLevel) contacts API, version 2021-07-28.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::crm::{ContactUpsert, CrmClient},
};

const SERVICE: &str = "crm";
pub const API_VERSION: &str = "2021-07-28";

pub struct LeadConnectorClient {
    client: Client,
    api_key: SecretString,
    location_id: String,
    api_base: String,
}

impl LeadConnectorClient {
    pub fn new(
        client: Client,
        api_key: SecretString,
        location_id: String,
        api_base: &url::Url,
    ) -> Self {
        Self {
            client,
            api_key,
            location_id,
            api_base: api_base.as_str().trim_end_matches('/').to_string(),
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(self.api_key.expose_secret())
            .header("Version", API_VERSION)
            .header("Accept", "application/json")
            .header("LocationId", &self.location_id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn send(&self, builder: RequestBuilder) -> AppResult<String> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("CRM request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read CRM response: {}", e)))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "CRM API error");
            return Err(AppError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn parse<T: for<'de> Deserialize<'de>>(body: &str) -> AppResult<T> {
        serde_json::from_str(body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse CRM response");
            AppError::Internal(format!("Failed to parse CRM response: {}", e))
        })
    }
}

#[async_trait]
impl CrmClient for LeadConnectorClient {
    async fn upsert_contact(&self, contact: &ContactUpsert) -> AppResult<Option<String>> {
        let payload = UpsertContactBody {
            location_id: &self.location_id,
            email: contact.identity.email.as_deref(),
            phone: contact.identity.phone.as_deref(),
            first_name: contact.identity.first_name.as_deref(),
            last_name: contact.identity.last_name.as_deref(),
            company_name: contact.company_name.as_deref(),
            source: contact.source.as_deref(),
            tags: (!contact.tags.is_empty()).then_some(contact.tags.as_slice()),
        };

        let body = self
            .send(self.client.post(self.url("/contacts/")).json(&payload))
            .await?;
        let response: UpsertContactResponse = Self::parse(&body)?;
        let nested = response.contact.and_then(|c| c.id);
        Ok([nested, response.id]
            .into_iter()
            .flatten()
            .find(|id| !id.trim().is_empty()))
    }

    async fn get_contact_tags(&self, contact_id: &str) -> AppResult<Vec<String>> {
        let body = self
            .send(self.client.get(self.url(&format!("/contacts/{}", contact_id))))
            .await?;
        let response: GetContactResponse = Self::parse(&body)?;
        Ok(response.contact.map(|c| c.tags).unwrap_or_default())
    }

    async fn set_contact_tags(&self, contact_id: &str, tags: &[String]) -> AppResult<()> {
        self.send(
            self.client
                .patch(self.url(&format!("/contacts/{}", contact_id)))
                .json(&TagsBody { tags }),
        )
        .await?;
        Ok(())
    }

    async fn add_note(&self, contact_id: &str, body: &str) -> AppResult<()> {
        self.send(self.client.post(self.url("/notes/")).json(&NoteBody {
            location_id: &self.location_id,
            contact_id,
            body,
        }))
        .await?;
        Ok(())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpsertContactBody<'a> {
    location_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
}

#[derive(Serialize)]
struct TagsBody<'a> {
    tags: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NoteBody<'a> {
    location_id: &'a str,
    contact_id: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct UpsertContactResponse {
    contact: Option<ContactRef>,
    id: Option<String>,
}

#[derive(Deserialize)]
struct ContactRef {
    id: Option<String>,
}

#[derive(Deserialize)]
struct GetContactResponse {
    contact: Option<ContactTags>,
}

#[derive(Deserialize)]
struct ContactTags {
    #[serde(default)]
    tags: Vec<String>,
}
