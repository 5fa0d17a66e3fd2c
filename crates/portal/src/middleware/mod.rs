//! HTTP middleware for the portal.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with SQLite store, signed cookie)
//! 4. Route handlers with `RequireAuth` extractors and per-page
//!    authorization (see [`crate::pages`])

pub mod auth;
pub mod session;

pub use auth::{AuthRejection, OptionalAuth, RequireAuth, clear_session, set_current_user};
pub use session::create_session_layer;
