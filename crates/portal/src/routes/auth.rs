//! Authentication route handlers.
//!
//! Login, logout and the registration flow that feeds the credential store.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use flash_pagamentos_core::Role;

use crate::middleware::{OptionalAuth, clear_session, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthService, Registration};
use crate::services::notify::{RegistrationNotice, notify_registration};
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/register", get(register_page).post(register))
}

// =============================================================================
// Form & Query Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form data, mirroring the legacy credential fields.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub whatsapp: String,
    pub endereco: String,
    pub cep: String,
    pub bairro: String,
    pub cidade: String,
    pub cpf_cnpj: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Map a short redirect code to the inline message the login page shows.
fn login_message(code: &str) -> String {
    match code {
        "credentials" => "Usuário ou senha inválidos.".to_string(),
        "session" => "Não foi possível iniciar a sessão. Tente novamente.".to_string(),
        "registered" => "Cadastro criado com sucesso! Faça login.".to_string(),
        "registered_notice_failed" => {
            "Cadastro criado, mas o aviso de cadastro não pôde ser enviado.".to_string()
        }
        other => other.to_string(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Render the login page.
///
/// An already-authenticated session goes straight back to the portal.
///
/// GET /auth/login
async fn login_page(
    OptionalAuth(current): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if current.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        error: query.error.as_deref().map(login_message),
        success: query.success.as_deref().map(login_message),
    }
    .into_response()
}

/// Handle login form submission.
///
/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let service = AuthService::new(state.pool());

    match service.login(&form.username, &form.password).await {
        Ok(user) => {
            let current = CurrentUser {
                username: user.username.clone(),
                name: user.name.clone(),
                role: user.role,
            };

            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to("/auth/login?error=session").into_response();
            }

            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!(username = %form.username, "Login failed: {e}");
            Redirect::to("/auth/login?error=credentials").into_response()
        }
    }
}

/// Logout and clear session.
///
/// POST /auth/logout
async fn logout(session: Session) -> impl IntoResponse {
    let _ = clear_session(&session).await;

    Redirect::to("/auth/login")
}

/// Render the registration page.
///
/// GET /auth/register
async fn register_page() -> impl IntoResponse {
    RegisterTemplate { error: None }
}

/// Handle registration form submission.
///
/// Self-registration always creates a `cliente`; partner and admin records
/// come from the CLI. Validation failures are rendered inline; nothing is
/// persisted when they happen.
///
/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let service = AuthService::new(state.pool());

    let submission = Registration {
        username: form.username,
        name: form.name,
        email: form.email,
        password: form.password,
        role: Role::Cliente,
        whatsapp: form.whatsapp,
        address: form.endereco,
        postal_code: form.cep,
        district: form.bairro,
        city: form.cidade,
        cpf_cnpj: form.cpf_cnpj,
    };

    let user = match service.register(&submission).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Registration rejected: {e}");
            return RegisterTemplate {
                error: Some(e.to_string()),
            }
            .into_response();
        }
    };

    // Deliver the registration notice as an explicit task handle the
    // handler awaits, so a failure is reported instead of vanishing.
    if let Some(url) = state.config().notify_webhook_url.clone() {
        let http = state.http().clone();
        let username = user.username.clone();
        let name = user.name.clone();
        let email = user.email.as_str().to_string();

        let handle = tokio::spawn(async move {
            notify_registration(
                &http,
                &url,
                &RegistrationNotice {
                    username: &username,
                    name: &name,
                    email: &email,
                },
            )
            .await
        });

        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!("Registration notice failed: {e}");
                return Redirect::to("/auth/login?success=registered_notice_failed")
                    .into_response();
            }
            Err(e) => {
                tracing::warn!("Registration notice task failed: {e}");
                return Redirect::to("/auth/login?success=registered_notice_failed")
                    .into_response();
            }
        }
    }

    Redirect::to("/auth/login?success=registered").into_response()
}
