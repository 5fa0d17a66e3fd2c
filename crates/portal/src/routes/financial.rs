//! Financial (cobrança) page handlers.

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

use crate::asaas::types::CreatePayment;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::pages::{NavLink, Page, nav_links};
use crate::routes::parse_decimal;
use crate::state::AppState;

use super::dashboard::PaymentView;

/// Build the financial router.
pub fn router() -> Router<AppState> {
    Router::new().route("/financeiro", get(index).post(create))
}

/// Cobrança creation form.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentForm {
    pub customer_id: String,
    pub value: String,
    pub due_date: String,
    pub description: Option<String>,
}

/// Query parameters for result display.
#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    pub created: Option<String>,
}

/// Financial page template.
#[derive(Template, WebTemplate)]
#[template(path = "financial/index.html")]
pub struct FinancialTemplate {
    pub nav: Vec<NavLink>,
    pub user_name: String,
    pub payments: Vec<PaymentView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Fetch the listing and assemble the page.
async fn build_page(
    state: &AppState,
    user: &CurrentUser,
    error: Option<String>,
    success: Option<String>,
) -> FinancialTemplate {
    let (payments, fetch_error) = match state.asaas().list_payments().await {
        Ok(list) => (list.data.iter().map(PaymentView::from).collect(), None),
        Err(e) => {
            tracing::warn!("Failed to list payments: {e}");
            (Vec::new(), Some(format!("Erro ao carregar cobranças: {e}")))
        }
    };

    FinancialTemplate {
        nav: nav_links(user.role, Page::Financial),
        user_name: user.name.clone(),
        payments,
        error: error.or(fetch_error),
        success,
    }
}

/// Financial page handler.
///
/// GET /financeiro
#[instrument(skip(user, state))]
async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ResultQuery>,
) -> Result<impl IntoResponse, AppError> {
    Page::Financial.authorize(user.role)?;

    let success = query
        .created
        .map(|id| format!("Cobrança criada com sucesso! ID: {id}"));

    Ok(build_page(&state, &user, None, success).await)
}

/// Cobrança creation handler.
///
/// POST /financeiro
#[instrument(skip(user, state, form))]
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<CreatePaymentForm>,
) -> Result<Response, AppError> {
    Page::Financial.authorize(user.role)?;

    let Some(value) = parse_decimal(&form.value) else {
        let error = Some("Valor da cobrança inválido.".to_string());
        return Ok(build_page(&state, &user, error, None).await.into_response());
    };

    let body = CreatePayment {
        customer_id: form.customer_id.trim().to_string(),
        value,
        due_date: form.due_date.trim().to_string(),
        description: form.description.filter(|d| !d.trim().is_empty()),
        billing_type: None,
    };

    match state.asaas().create_payment(&body).await {
        Ok(payment) => {
            Ok(Redirect::to(&format!("/financeiro?created={}", payment.id)).into_response())
        }
        Err(e) => {
            tracing::warn!("Failed to create payment: {e}");
            let error = Some(format!("Erro ao criar cobrança: {e}"));
            Ok(build_page(&state, &user, error, None).await.into_response())
        }
    }
}
