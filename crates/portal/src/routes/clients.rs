//! Customer page handlers (create, list, delete via the payments API).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use crate::asaas::types::{CreateCustomer, Customer};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::pages::{NavLink, Page, nav_links};
use crate::state::AppState;

/// Build the clients router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clientes", get(index).post(create))
        .route("/clientes/{id}/excluir", axum::routing::post(delete))
}

// =============================================================================
// Form & Query Types
// =============================================================================

/// Customer creation form, matching the legacy form fields.
#[derive(Debug, Deserialize)]
pub struct CreateClientForm {
    pub name: String,
    pub email: String,
    pub cpf_cnpj: String,
    pub whatsapp: String,
    pub endereco: String,
    pub cep: String,
    pub bairro: String,
    pub cidade: String,
}

/// Query parameters for result display.
#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    pub created: Option<String>,
    pub deleted: Option<String>,
}

// =============================================================================
// Views & Template
// =============================================================================

/// Customer view for templates.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub cpf_cnpj: String,
    pub phone: String,
}

impl From<&Customer> for CustomerView {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.clone(),
            name: customer.name.clone(),
            email: customer.email.clone().unwrap_or_else(|| "-".to_string()),
            cpf_cnpj: customer.cpf_cnpj.clone().unwrap_or_else(|| "-".to_string()),
            phone: customer.phone.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Customers page template.
#[derive(Template, WebTemplate)]
#[template(path = "clients/index.html")]
pub struct ClientsTemplate {
    pub nav: Vec<NavLink>,
    pub user_name: String,
    pub customers: Vec<CustomerView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Fetch the listing and assemble the page, folding a fetch failure into
/// the inline error banner.
async fn build_page(
    state: &AppState,
    user: &CurrentUser,
    error: Option<String>,
    success: Option<String>,
) -> ClientsTemplate {
    let (customers, fetch_error) = match state.asaas().list_customers().await {
        Ok(list) => (list.data.iter().map(CustomerView::from).collect(), None),
        Err(e) => {
            tracing::warn!("Failed to list customers: {e}");
            (Vec::new(), Some(format!("Erro ao carregar clientes: {e}")))
        }
    };

    ClientsTemplate {
        nav: nav_links(user.role, Page::ClientCreate),
        user_name: user.name.clone(),
        customers,
        error: error.or(fetch_error),
        success,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Customers page handler.
///
/// GET /clientes
#[instrument(skip(user, state))]
async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ResultQuery>,
) -> Result<impl IntoResponse, AppError> {
    Page::ClientCreate.authorize(user.role)?;

    let success = query
        .created
        .map(|id| format!("Cliente {id} criado com sucesso!"))
        .or_else(|| query.deleted.map(|id| format!("Cliente {id} excluído.")));

    Ok(build_page(&state, &user, None, success).await)
}

/// Customer creation handler.
///
/// The provider call runs in a spawned task whose handle is awaited here;
/// join errors surface as 500s rather than disappearing.
///
/// POST /clientes
#[instrument(skip(user, state, form))]
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<CreateClientForm>,
) -> Result<Response, AppError> {
    Page::ClientCreate.authorize(user.role)?;

    let body = CreateCustomer {
        name: form.name,
        email: form.email,
        cpf: form.cpf_cnpj,
        phone: form.whatsapp,
        address: form.endereco,
        postal_code: form.cep,
        district: form.bairro,
        city: form.cidade,
    };

    let client = state.asaas().clone();
    let handle = tokio::spawn(async move { client.create_customer(&body).await });

    let result = handle
        .await
        .map_err(|e| AppError::Internal(format!("customer creation task failed: {e}")))?;

    match result {
        Ok(customer) => Ok(Redirect::to(&format!("/clientes?created={}", customer.id)).into_response()),
        Err(e) => {
            tracing::warn!("Failed to create customer: {e}");
            let error = Some(format!("Erro ao criar cliente: {e}"));
            Ok(build_page(&state, &user, error, None).await.into_response())
        }
    }
}

/// Customer deletion handler.
///
/// POST /clientes/{id}/excluir
#[instrument(skip(user, state))]
async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    Page::ClientCreate.authorize(user.role)?;

    match state.asaas().delete_customer(&id).await {
        Ok(deleted) => {
            Ok(Redirect::to(&format!("/clientes?deleted={}", deleted.id)).into_response())
        }
        Err(e) => {
            tracing::warn!(customer = %id, "Failed to delete customer: {e}");
            let error = Some(format!("Erro ao excluir cliente: {e}"));
            Ok(build_page(&state, &user, error, None).await.into_response())
        }
    }
}
