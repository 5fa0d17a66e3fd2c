//! Session middleware configuration.
//!
//! Sets up SQLite-backed sessions using tower-sessions with a signed
//! cookie. Cookie name and expiry come from the environment or the legacy
//! seed file (see [`crate::seed::resolve_cookie`]); the signing key always
//! comes from the environment.

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use tower_sessions::cookie::Key;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::SessionConfig;
use crate::seed::ResolvedCookie;

/// Create the session layer with the SQLite store.
///
/// Runs the store's own migration (the `tower_sessions` table) before
/// returning the layer.
///
/// # Arguments
///
/// * `pool` - SQLite connection pool
/// * `session` - Signing key configuration
/// * `cookie` - Resolved cookie name and expiry
/// * `base_url` - Used to decide whether the cookie is `Secure`
///
/// # Errors
///
/// Returns the store's migration error.
pub async fn create_session_layer(
    pool: &SqlitePool,
    session: &SessionConfig,
    cookie: &ResolvedCookie,
    base_url: &str,
) -> Result<SessionManagerLayer<SqliteStore, tower_sessions::service::SignedCookie>, sqlx::Error> {
    let store = SqliteStore::new(pool.clone());
    store.migrate().await?;

    // Length is validated at config load (>= 32 chars).
    let key = Key::derive_from(session.signing_key.expose_secret().as_bytes());

    let is_secure = base_url.starts_with("https://");

    Ok(SessionManagerLayer::new(store)
        .with_name(cookie.name.clone())
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::days(cookie.expiry_days),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
