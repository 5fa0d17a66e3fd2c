//! Router-level access tests.
//!
//! Drives the real router (session layer included) over an in-memory
//! database: login state machine, per-role menus and the fail-closed page
//! guard.

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use flash_pagamentos_core::Role;
use flash_pagamentos_portal::config::{AsaasConfig, PortalConfig, SessionConfig};
use flash_pagamentos_portal::db::MIGRATOR;
use flash_pagamentos_portal::middleware::create_session_layer;
use flash_pagamentos_portal::routes;
use flash_pagamentos_portal::seed::ResolvedCookie;
use flash_pagamentos_portal::services::auth::{AuthService, Registration};
use flash_pagamentos_portal::state::AppState;

fn test_config() -> PortalConfig {
    PortalConfig {
        database_url: SecretString::from("sqlite::memory:"),
        host: "127.0.0.1".parse().expect("ip"),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session: SessionConfig {
            signing_key: SecretString::from("k".repeat(64)),
            cookie_name: None,
            expiry_days: None,
        },
        asaas: AsaasConfig {
            // Nothing listens here; provider calls fail and the pages fold
            // the failure into their inline error banner.
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: SecretString::from("aact_test_token"),
        },
        llm: None,
        credentials_file: PathBuf::from("/nonexistent/config.yaml"),
        knowledge_dir: PathBuf::from("/nonexistent/conhecimento"),
        notify_webhook_url: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
        tls: None,
    }
}

fn registration(role: Role, username: &str, email: &str) -> Registration {
    Registration {
        username: username.to_string(),
        name: format!("Usuária {username}"),
        email: email.to_string(),
        password: "senha-bem-forte".to_string(),
        role,
        whatsapp: "31900001111".to_string(),
        address: "Rua das Flores, 10".to_string(),
        postal_code: "30130000".to_string(),
        district: "Centro".to_string(),
        city: "Belo Horizonte".to_string(),
        cpf_cnpj: "12345678901".to_string(),
    }
}

/// Build the full application over an in-memory database.
///
/// The pool is capped at one connection so every query and the session
/// store see the same in-memory database.
async fn build_app() -> (Router, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    MIGRATOR.run(&pool).await.expect("migrations");

    let config = test_config();
    let cookie = ResolvedCookie {
        name: "fp_session".to_string(),
        expiry_days: 1,
    };
    let session_layer = create_session_layer(&pool, &config.session, &cookie, &config.base_url)
        .await
        .expect("session layer");

    let state = AppState::new(config, pool.clone());

    let app = Router::new()
        .merge(routes::routes())
        .layer(session_layer)
        .with_state(state);

    (app, pool)
}

async fn create_user(pool: &SqlitePool, role: Role, username: &str, email: &str) {
    let service = AuthService::new(pool);
    service
        .register(&registration(role, username, email))
        .await
        .expect("register user");
}

/// POST the login form; returns the response.
async fn post_login(app: &Router, username: &str, password: &str) -> axum::response::Response {
    let body = format!("username={username}&password={password}");
    app.clone()
        .oneshot(
            Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response")
}

/// Log in and return the session cookie pair (`name=value`).
async fn login(app: &Router, username: &str) -> String {
    let response = post_login(app, username, "senha-bem-forte").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/"
    );

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .expect("cookie str");
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

async fn get_with_cookie(app: &Router, path: &str, cookie: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::get(path)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response")
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

#[tokio::test]
async fn anonymous_requests_are_redirected_to_login() {
    let (app, _pool) = build_app().await;

    for path in ["/", "/pedido", "/dashboard", "/webhooks"] {
        let response = app
            .clone()
            .oneshot(Request::get(path).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(
            response.headers().get(header::LOCATION).expect("location"),
            "/auth/login",
            "{path}"
        );
    }
}

#[tokio::test]
async fn wrong_password_stays_anonymous() {
    let (app, pool) = build_app().await;
    create_user(&pool, Role::Cliente, "ana", "ana@example.com").await;

    let response = post_login(&app, "ana", "wrong").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/auth/login?error=credentials"
    );

    // Still anonymous: protected pages keep redirecting.
    let response = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn cliente_menu_has_two_entries_and_dashboard_is_unreachable() {
    let (app, pool) = build_app().await;
    create_user(&pool, Role::Cliente, "ana", "ana@example.com").await;

    let cookie = login(&app, "ana").await;

    let response = get_with_cookie(&app, "/", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Início"));
    assert!(body.contains("Fazer Pedido"));
    // The menu never offers pages outside the cliente set.
    assert!(!body.contains("Criar Cliente"));
    assert!(!body.contains(">Dashboard<"));
    assert!(!body.contains("Financeiro"));

    // Going around the menu straight to the URL is denied, fail-closed.
    let response = get_with_cookie(&app, "/dashboard", &cookie).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_with_cookie(&app, "/clientes", &cookie).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn parceiro_gains_client_create_but_not_webhooks() {
    let (app, pool) = build_app().await;
    create_user(&pool, Role::Parceiro, "carlos", "carlos@example.com").await;

    let cookie = login(&app, "carlos").await;

    let body = body_string(get_with_cookie(&app, "/", &cookie).await).await;
    assert!(body.contains("Criar Cliente"));
    assert!(!body.contains("Webhook"));

    let response = get_with_cookie(&app, "/webhooks", &cookie).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_reaches_every_page() {
    let (app, pool) = build_app().await;
    create_user(&pool, Role::Admin, "root", "root@example.com").await;

    let cookie = login(&app, "root").await;

    let body = body_string(get_with_cookie(&app, "/", &cookie).await).await;
    for title in [
        "Início",
        "Fazer Pedido",
        "Criar Cliente",
        "Dashboard",
        "Financeiro",
        "Link de Pagamento",
        "Parceiro",
        "Webhook",
    ] {
        assert!(body.contains(title), "menu is missing {title}");
    }

    // The webhooks page is fully local and renders an empty listing.
    let response = get_with_cookie(&app, "/webhooks", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Nenhum webhook encontrado."));
}

#[tokio::test]
async fn admin_can_create_and_delete_webhooks_through_the_forms() {
    let (app, pool) = build_app().await;
    create_user(&pool, Role::Admin, "root", "root@example.com").await;
    let cookie = login(&app, "root").await;

    let body = "name=pagamentos&url=https%3A%2F%2Fexample.com%2Fhook&event=PAYMENT_RECEIVED&enabled=on";
    let response = app
        .clone()
        .oneshot(
            Request::post("/webhooks")
                .header(header::COOKIE, cookie.as_str())
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("location")
        .to_str()
        .expect("str")
        .to_string();
    assert!(location.starts_with("/webhooks?created="));

    let listing = body_string(get_with_cookie(&app, "/webhooks", &cookie).await).await;
    assert!(listing.contains("pagamentos"));
    assert!(listing.contains("https://example.com/hook"));

    let id = location.rsplit('=').next().expect("id");
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/webhooks/{id}/excluir"))
                .header(header::COOKIE, cookie.as_str())
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let listing = body_string(get_with_cookie(&app, "/webhooks", &cookie).await).await;
    assert!(listing.contains("Nenhum webhook encontrado."));
}

#[tokio::test]
async fn registration_form_creates_a_cliente_and_redirects_to_login() {
    let (app, pool) = build_app().await;

    let body = "username=bia&name=Bia%20Ramos&email=bia%40example.com&password=senha-bem-forte\
                &whatsapp=31911112222&endereco=Rua%20A&cep=30130000&bairro=Centro\
                &cidade=Belo%20Horizonte&cpf_cnpj=98765432100";
    let response = app
        .clone()
        .oneshot(
            Request::post("/auth/register")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/auth/login?success=registered"
    );

    // The new cliente can log in and sees the two-page menu.
    let cookie = login(&app, "bia").await;
    let body = body_string(get_with_cookie(&app, "/", &cookie).await).await;
    assert!(body.contains("Fazer Pedido"));
    assert!(!body.contains(">Dashboard<"));

    // And the record is in the store with the cliente role.
    let service = AuthService::new(&pool);
    let user = service.login("bia", "senha-bem-forte").await.expect("login");
    assert_eq!(user.role, Role::Cliente);
}

#[tokio::test]
async fn duplicate_registration_renders_inline_error() {
    let (app, pool) = build_app().await;
    create_user(&pool, Role::Cliente, "ana", "ana@example.com").await;

    let body = "username=outra&name=Outra&email=ana%40example.com&password=senha-bem-forte\
                &whatsapp=31911112222&endereco=Rua%20A&cep=30130000&bairro=Centro\
                &cidade=BH&cpf_cnpj=98765432100";
    let response = app
        .clone()
        .oneshot(
            Request::post("/auth/register")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response");

    // Rendered inline, not redirected.
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("já existe um cadastro com este e-mail"));
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let (app, pool) = build_app().await;
    create_user(&pool, Role::Cliente, "ana", "ana@example.com").await;
    let cookie = login(&app, "ana").await;

    let response = app
        .clone()
        .oneshot(
            Request::post("/auth/logout")
                .header(header::COOKIE, cookie.as_str())
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // The old cookie no longer authenticates.
    let response = get_with_cookie(&app, "/", &cookie).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/auth/login"
    );
}
