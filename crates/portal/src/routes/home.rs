//! Home page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, response::IntoResponse, routing::get};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::pages::{NavLink, Page, nav_links};
use crate::state::AppState;

/// Build the home router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home/index.html")]
pub struct HomeTemplate {
    pub nav: Vec<NavLink>,
    pub user_name: String,
}

/// Home page handler.
///
/// GET /
async fn index(RequireAuth(user): RequireAuth) -> Result<impl IntoResponse, AppError> {
    Page::Home.authorize(user.role)?;

    Ok(HomeTemplate {
        nav: nav_links(user.role, Page::Home),
        user_name: user.name,
    })
}
