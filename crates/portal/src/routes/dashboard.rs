//! Dashboard page handler.
//!
//! Aggregates the provider's cobranças into status totals; the heavy
//! analytics of the production system stayed on the provider's side, this
//! page only folds the list it can fetch.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, response::IntoResponse, routing::get};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::asaas::types::Payment;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::pages::{NavLink, Page, nav_links};
use crate::routes::format_brl;
use crate::state::AppState;

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(index))
}

/// How many recent cobranças the table shows.
const RECENT_LIMIT: usize = 10;

/// Aggregated payment totals by status family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_count: usize,
    pub pending_total: Decimal,
    pub received_total: Decimal,
    pub overdue_total: Decimal,
}

/// Payment row for the recent table.
#[derive(Debug, Clone)]
pub struct PaymentView {
    pub id: String,
    pub value: String,
    pub due_date: String,
    pub status: String,
}

impl From<&Payment> for PaymentView {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id.clone(),
            value: format_brl(payment.value),
            due_date: payment.due_date.clone().unwrap_or_else(|| "-".to_string()),
            status: payment.status.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/index.html")]
pub struct DashboardTemplate {
    pub nav: Vec<NavLink>,
    pub user_name: String,
    pub stats: DashboardStats,
    pub recent: Vec<PaymentView>,
    pub error: Option<String>,
}

/// Fold a payment list into status totals.
fn aggregate(payments: &[Payment]) -> DashboardStats {
    let mut stats = DashboardStats {
        total_count: payments.len(),
        ..DashboardStats::default()
    };

    for payment in payments {
        match payment.status.as_deref() {
            Some("PENDING" | "AWAITING_RISK_ANALYSIS") => stats.pending_total += payment.value,
            Some("RECEIVED" | "CONFIRMED" | "RECEIVED_IN_CASH") => {
                stats.received_total += payment.value;
            }
            Some("OVERDUE") => stats.overdue_total += payment.value,
            _ => {}
        }
    }

    stats
}

/// Dashboard page handler.
///
/// GET /dashboard
#[instrument(skip(user, state))]
async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Page::Dashboard.authorize(user.role)?;

    let (stats, recent, error) = match state.asaas().list_payments().await {
        Ok(list) => {
            let stats = aggregate(&list.data);
            let recent = list
                .data
                .iter()
                .take(RECENT_LIMIT)
                .map(PaymentView::from)
                .collect();
            (stats, recent, None)
        }
        Err(e) => {
            tracing::warn!("Failed to load dashboard payments: {e}");
            (
                DashboardStats::default(),
                Vec::new(),
                Some(format!("Erro ao carregar cobranças: {e}")),
            )
        }
    };

    Ok(DashboardTemplate {
        nav: nav_links(user.role, Page::Dashboard),
        user_name: user.name,
        stats,
        recent,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(value: i64, status: Option<&str>) -> Payment {
        Payment {
            id: "pay_x".to_string(),
            value: Decimal::new(value, 2),
            due_date: None,
            status: status.map(ToString::to_string),
            description: None,
            date_created: None,
        }
    }

    #[test]
    fn aggregate_splits_by_status_family() {
        let payments = vec![
            payment(10000, Some("PENDING")),
            payment(5000, Some("RECEIVED")),
            payment(2500, Some("CONFIRMED")),
            payment(1000, Some("OVERDUE")),
            payment(999, Some("REFUNDED")),
            payment(1, None),
        ];

        let stats = aggregate(&payments);
        assert_eq!(stats.total_count, 6);
        assert_eq!(stats.pending_total, Decimal::new(10000, 2));
        assert_eq!(stats.received_total, Decimal::new(7500, 2));
        assert_eq!(stats.overdue_total, Decimal::new(1000, 2));
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        assert_eq!(aggregate(&[]), DashboardStats::default());
    }
}
