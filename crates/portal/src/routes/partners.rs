//! Partner (subaccount) page handlers.

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

use crate::asaas::types::{CreateSubaccount, Subaccount};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::pages::{NavLink, Page, nav_links};
use crate::routes::parse_decimal;
use crate::state::AppState;

/// Build the partners router.
pub fn router() -> Router<AppState> {
    Router::new().route("/parceiros", get(index).post(create))
}

/// Subaccount creation form.
#[derive(Debug, Deserialize)]
pub struct CreatePartnerForm {
    pub name: String,
    pub email: String,
    pub cpf_cnpj: String,
    pub mobile_phone: String,
    pub fixed_phone: Option<String>,
    pub income_value: String,
    pub birth_date: String,
    pub province: String,
    pub city: String,
    pub address: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub postal_code: String,
}

/// Query parameters for result display.
#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    pub created: Option<String>,
}

/// Subaccount view for templates.
#[derive(Debug, Clone)]
pub struct SubaccountView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub cpf_cnpj: String,
}

impl From<&Subaccount> for SubaccountView {
    fn from(subaccount: &Subaccount) -> Self {
        Self {
            id: subaccount.id.clone(),
            name: subaccount.name.clone(),
            email: subaccount.email.clone().unwrap_or_else(|| "-".to_string()),
            cpf_cnpj: subaccount
                .cpf_cnpj
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Partners page template.
#[derive(Template, WebTemplate)]
#[template(path = "partners/index.html")]
pub struct PartnersTemplate {
    pub nav: Vec<NavLink>,
    pub user_name: String,
    pub subaccounts: Vec<SubaccountView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Fetch the listing and assemble the page.
async fn build_page(
    state: &AppState,
    user: &CurrentUser,
    error: Option<String>,
    success: Option<String>,
) -> PartnersTemplate {
    let (subaccounts, fetch_error) = match state.asaas().list_subaccounts().await {
        Ok(list) => (list.data.iter().map(SubaccountView::from).collect(), None),
        Err(e) => {
            tracing::warn!("Failed to list subaccounts: {e}");
            (Vec::new(), Some(format!("Erro ao carregar parceiros: {e}")))
        }
    };

    PartnersTemplate {
        nav: nav_links(user.role, Page::Partner),
        user_name: user.name.clone(),
        subaccounts,
        error: error.or(fetch_error),
        success,
    }
}

/// Partners page handler.
///
/// GET /parceiros
#[instrument(skip(user, state))]
async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ResultQuery>,
) -> Result<impl IntoResponse, AppError> {
    Page::Partner.authorize(user.role)?;

    let success = query
        .created
        .map(|id| format!("Subconta criada com sucesso! ID: {id}"));

    Ok(build_page(&state, &user, None, success).await)
}

/// Subaccount creation handler.
///
/// POST /parceiros
#[instrument(skip(user, state, form))]
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<CreatePartnerForm>,
) -> Result<Response, AppError> {
    Page::Partner.authorize(user.role)?;

    let required = [
        &form.name,
        &form.email,
        &form.cpf_cnpj,
        &form.mobile_phone,
        &form.income_value,
        &form.birth_date,
        &form.province,
        &form.city,
        &form.address,
        &form.number,
        &form.neighborhood,
        &form.postal_code,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        let error = Some("Por favor, preencha todos os campos obrigatórios.".to_string());
        return Ok(build_page(&state, &user, error, None).await.into_response());
    }

    let Some(income_value) = parse_decimal(&form.income_value) else {
        let error = Some("Renda mensal inválida.".to_string());
        return Ok(build_page(&state, &user, error, None).await.into_response());
    };

    let body = CreateSubaccount {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        cpf_cnpj: form.cpf_cnpj.trim().to_string(),
        mobile_phone: form.mobile_phone.trim().to_string(),
        fixed_phone: form.fixed_phone.filter(|p| !p.trim().is_empty()),
        income_value,
        birth_date: form.birth_date.trim().to_string(),
        company_type: None,
        address: form.address.trim().to_string(),
        number: form.number.trim().to_string(),
        complement: form.complement.filter(|c| !c.trim().is_empty()),
        province: form.province.trim().to_string(),
        city: form.city.trim().to_string(),
        neighborhood: form.neighborhood.trim().to_string(),
        postal_code: form.postal_code.trim().to_string(),
    };

    match state.asaas().create_subaccount(&body).await {
        Ok(subaccount) => {
            Ok(Redirect::to(&format!("/parceiros?created={}", subaccount.id)).into_response())
        }
        Err(e) => {
            tracing::warn!("Failed to create subaccount: {e}");
            let error = Some(format!("Erro ao criar subconta: {e}"));
            Ok(build_page(&state, &user, error, None).await.into_response())
        }
    }
}
