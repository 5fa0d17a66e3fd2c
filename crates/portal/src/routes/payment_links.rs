//! Payment link page handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use crate::asaas::types::{CreatePaymentLink, PaymentLink};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::pages::{NavLink, Page, nav_links};
use crate::routes::{format_brl, parse_decimal};
use crate::state::AppState;

/// Build the payment links router.
pub fn router() -> Router<AppState> {
    Router::new().route("/links", get(index).post(create))
}

/// Payment link creation form.
#[derive(Debug, Deserialize)]
pub struct CreateLinkForm {
    pub name: String,
    pub billing_type: String,
    pub charge_type: String,
    pub value: Option<String>,
    pub due_date_limit_days: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

/// Query parameters for result display.
#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    pub created: Option<String>,
}

/// Payment link view for templates.
#[derive(Debug, Clone)]
pub struct LinkView {
    pub name: String,
    pub value: String,
    pub billing_type: String,
    pub charge_type: String,
    pub due_date_limit_days: String,
    pub end_date: String,
    pub url: String,
}

impl From<&PaymentLink> for LinkView {
    fn from(link: &PaymentLink) -> Self {
        Self {
            name: link.name.clone(),
            value: link.value.map_or_else(|| "-".to_string(), format_brl),
            billing_type: link.billing_type.clone().unwrap_or_else(|| "-".to_string()),
            charge_type: link.charge_type.clone().unwrap_or_else(|| "-".to_string()),
            due_date_limit_days: link
                .due_date_limit_days
                .map_or_else(|| "-".to_string(), |days| format!("{days} dias")),
            end_date: link.end_date.clone().unwrap_or_else(|| "-".to_string()),
            url: link.url.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Payment links page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment_links/index.html")]
pub struct PaymentLinksTemplate {
    pub nav: Vec<NavLink>,
    pub user_name: String,
    pub links: Vec<LinkView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Fetch the listing and assemble the page.
async fn build_page(
    state: &AppState,
    user: &CurrentUser,
    error: Option<String>,
    success: Option<String>,
) -> PaymentLinksTemplate {
    let (links, fetch_error) = match state.asaas().list_payment_links().await {
        Ok(list) => (list.data.iter().map(LinkView::from).collect(), None),
        Err(e) => {
            tracing::warn!("Failed to list payment links: {e}");
            (
                Vec::new(),
                Some(format!("Erro ao carregar links de pagamento: {e}")),
            )
        }
    };

    PaymentLinksTemplate {
        nav: nav_links(user.role, Page::PaymentLink),
        user_name: user.name.clone(),
        links,
        error: error.or(fetch_error),
        success,
    }
}

/// Payment links page handler.
///
/// GET /links
#[instrument(skip(user, state))]
async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ResultQuery>,
) -> Result<impl IntoResponse, AppError> {
    Page::PaymentLink.authorize(user.role)?;

    let success = query
        .created
        .map(|id| format!("Link de pagamento criado com sucesso! ID: {id}"));

    Ok(build_page(&state, &user, None, success).await)
}

/// Payment link creation handler.
///
/// POST /links
#[instrument(skip(user, state, form))]
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<CreateLinkForm>,
) -> Result<Response, AppError> {
    Page::PaymentLink.authorize(user.role)?;

    let value = match form.value.as_deref().filter(|v| !v.trim().is_empty()) {
        Some(raw) => match parse_decimal(raw) {
            Some(value) => Some(value),
            None => {
                let error = Some("Valor do link inválido.".to_string());
                return Ok(build_page(&state, &user, error, None).await.into_response());
            }
        },
        None => None,
    };

    let due_date_limit_days = match form
        .due_date_limit_days
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(days) if days > 0 => Some(days),
            _ => {
                let error = Some("Validade do link inválida.".to_string());
                return Ok(build_page(&state, &user, error, None).await.into_response());
            }
        },
        None => None,
    };

    let body = CreatePaymentLink {
        name: form.name.trim().to_string(),
        billing_type: form.billing_type,
        charge_type: form.charge_type,
        value,
        due_date_limit_days,
        end_date: form.end_date.filter(|d| !d.trim().is_empty()),
        description: form.description.filter(|d| !d.trim().is_empty()),
    };

    match state.asaas().create_payment_link(&body).await {
        Ok(link) => Ok(Redirect::to(&format!("/links?created={}", link.id)).into_response()),
        Err(e) => {
            tracing::warn!("Failed to create payment link: {e}");
            let error = Some(format!("Erro ao criar link de pagamento: {e}"));
            Ok(build_page(&state, &user, error, None).await.into_response())
        }
    }
}
