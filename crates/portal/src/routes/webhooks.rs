//! Webhook page handlers (local store).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::Utc;
use rand::RngCore;
use serde::Deserialize;
use tracing::instrument;

use flash_pagamentos_core::WebhookId;

use crate::db::webhooks::{NewWebhook, Webhook, WebhookRepository};
use crate::db::RepositoryError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::pages::{NavLink, Page, nav_links};
use crate::state::AppState;

/// Build the webhooks router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhooks", get(index).post(create))
        .route("/webhooks/{id}/excluir", axum::routing::post(delete))
}

/// Webhook creation form.
#[derive(Debug, Deserialize)]
pub struct CreateWebhookForm {
    pub name: String,
    pub url: String,
    pub event: String,
    /// Present ("on") when the checkbox is ticked.
    pub enabled: Option<String>,
}

/// Query parameters for result display.
#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    pub created: Option<i64>,
    pub deleted: Option<i64>,
}

/// Webhook view for templates.
#[derive(Debug, Clone)]
pub struct WebhookView {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub event: String,
    pub auth_token: String,
    pub enabled: bool,
}

impl From<&Webhook> for WebhookView {
    fn from(webhook: &Webhook) -> Self {
        Self {
            id: webhook.id.as_i64(),
            name: webhook.name.clone(),
            url: webhook.url.clone(),
            event: webhook.event.clone(),
            auth_token: webhook.auth_token.clone(),
            enabled: webhook.enabled,
        }
    }
}

/// Webhooks page template.
#[derive(Template, WebTemplate)]
#[template(path = "webhooks/index.html")]
pub struct WebhooksTemplate {
    pub nav: Vec<NavLink>,
    pub user_name: String,
    pub webhooks: Vec<WebhookView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Fetch the listing and assemble the page.
async fn build_page(
    state: &AppState,
    user: &CurrentUser,
    error: Option<String>,
    success: Option<String>,
) -> Result<WebhooksTemplate, AppError> {
    let webhooks = WebhookRepository::new(state.pool()).list_all().await?;

    Ok(WebhooksTemplate {
        nav: nav_links(user.role, Page::Webhook),
        user_name: user.name.clone(),
        webhooks: webhooks.iter().map(WebhookView::from).collect(),
        error,
        success,
    })
}

/// Webhooks page handler.
///
/// GET /webhooks
#[instrument(skip(user, state))]
async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ResultQuery>,
) -> Result<impl IntoResponse, AppError> {
    Page::Webhook.authorize(user.role)?;

    let success = query
        .created
        .map(|id| format!("Webhook criado com sucesso! ID: {id}"))
        .or_else(|| query.deleted.map(|id| format!("Webhook {id} excluído.")));

    build_page(&state, &user, None, success).await
}

/// Webhook creation handler.
///
/// POST /webhooks
#[instrument(skip(user, state, form))]
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<CreateWebhookForm>,
) -> Result<Response, AppError> {
    Page::Webhook.authorize(user.role)?;

    if let Err(message) = validate_webhook_url(&form.url) {
        let page = build_page(&state, &user, Some(message), None).await?;
        return Ok(page.into_response());
    }

    let new_webhook = NewWebhook {
        name: form.name.trim().to_string(),
        url: form.url.trim().to_string(),
        event: form.event.trim().to_string(),
        auth_token: generate_auth_token(),
        enabled: form.enabled.is_some(),
        created_at: Utc::now(),
    };

    let webhook = WebhookRepository::new(state.pool())
        .create(&new_webhook)
        .await?;

    Ok(Redirect::to(&format!("/webhooks?created={}", webhook.id)).into_response())
}

/// Webhook deletion handler.
///
/// POST /webhooks/{id}/excluir
#[instrument(skip(user, state))]
async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    Page::Webhook.authorize(user.role)?;

    match WebhookRepository::new(state.pool())
        .delete(WebhookId::new(id))
        .await
    {
        Ok(()) => Ok(Redirect::to(&format!("/webhooks?deleted={id}")).into_response()),
        Err(RepositoryError::NotFound) => {
            let page = build_page(
                &state,
                &user,
                Some(format!("Webhook {id} não encontrado.")),
                None,
            )
            .await?;
            Ok(page.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Require an absolute http(s) URL.
fn validate_webhook_url(raw: &str) -> Result<(), String> {
    match url::Url::parse(raw.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(_) => Err("A URL do webhook deve usar http ou https.".to_string()),
        Err(_) => Err("URL do webhook inválida.".to_string()),
    }
}

/// Random 128-bit token, hex encoded.
fn generate_auth_token() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_validation() {
        assert!(validate_webhook_url("https://example.com/hook").is_ok());
        assert!(validate_webhook_url("http://localhost:8000/hook").is_ok());
        assert!(validate_webhook_url("ftp://example.com").is_err());
        assert!(validate_webhook_url("not a url").is_err());
        assert!(validate_webhook_url("").is_err());
    }

    #[test]
    fn auth_tokens_are_32_hex_chars_and_unique() {
        let a = generate_auth_token();
        let b = generate_auth_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
