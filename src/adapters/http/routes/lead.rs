//! Website lead form.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header::USER_AGENT},
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    application::helpers::contact_parsing::first_forwarded_ip,
    use_cases::lead_capture::{LeadInput, LeadUseCases, UtmFields},
};

/// The form posts either a single tag or a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum TagsField {
    One(String),
    Many(Vec<String>),
}

impl TagsField {
    fn into_vec(self) -> Vec<String> {
        match self {
            TagsField::One(tag) => vec![tag],
            TagsField::Many(tags) => tags,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeadPayload {
    name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    company: Option<String>,
    message: Option<String>,
    tags: Option<TagsField>,
    source: Option<String>,
    page_url: Option<String>,
    #[serde(rename = "utm_source")]
    utm_source: Option<String>,
    #[serde(rename = "utm_medium")]
    utm_medium: Option<String>,
    #[serde(rename = "utm_campaign")]
    utm_campaign: Option<String>,
    #[serde(rename = "utm_term")]
    utm_term: Option<String>,
    #[serde(rename = "utm_content")]
    utm_content: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LeadResponse {
    ok: bool,
    contact_id: Option<String>,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// POST /api/ghl-lead
async fn capture_lead(
    State(leads): State<Arc<LeadUseCases>>,
    headers: HeaderMap,
    Json(payload): Json<LeadPayload>,
) -> AppResult<impl IntoResponse> {
    let lead = LeadInput {
        name: payload.name,
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        phone: payload.phone,
        company: payload.company,
        message: payload.message,
        tags: payload.tags.map(TagsField::into_vec).unwrap_or_default(),
        source: payload.source,
        page_url: payload.page_url,
        utm: UtmFields {
            source: payload.utm_source,
            medium: payload.utm_medium,
            campaign: payload.utm_campaign,
            term: payload.utm_term,
            content: payload.utm_content,
        },
        user_agent: header_str(&headers, USER_AGENT.as_str()).map(String::from),
        client_ip: header_str(&headers, "x-forwarded-for")
            .and_then(first_forwarded_ip)
            .map(String::from),
    };

    let contact_id = leads.capture(lead).await?;

    Ok(Json(LeadResponse {
        ok: true,
        contact_id,
    }))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/ghl-lead", post(capture_lead))
}
