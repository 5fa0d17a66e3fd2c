//! Webhook repository.
//!
//! The production system kept webhook registrations in process memory and
//! lost them on restart; here they live in the portal store.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use flash_pagamentos_core::WebhookId;

use super::RepositoryError;

/// A registered webhook endpoint (domain type).
#[derive(Debug, Clone)]
pub struct Webhook {
    /// Database ID.
    pub id: WebhookId,
    /// Display name.
    pub name: String,
    /// Target URL deliveries are sent to.
    pub url: String,
    /// Event name that triggers delivery.
    pub event: String,
    /// Token the receiver can use to authenticate deliveries.
    pub auth_token: String,
    /// Whether the webhook is active.
    pub enabled: bool,
    /// When the webhook was registered.
    pub created_at: DateTime<Utc>,
}

/// A validated webhook ready for insertion.
#[derive(Debug, Clone)]
pub struct NewWebhook {
    pub name: String,
    pub url: String,
    pub event: String,
    pub auth_token: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Internal row type for webhook queries.
#[derive(Debug, sqlx::FromRow)]
struct WebhookRow {
    id: i64,
    name: String,
    url: String,
    event: String,
    auth_token: String,
    enabled: bool,
    created_at: DateTime<Utc>,
}

impl From<WebhookRow> for Webhook {
    fn from(row: WebhookRow) -> Self {
        Self {
            id: WebhookId::new(row.id),
            name: row.name,
            url: row.url,
            event: row.event,
            auth_token: row.auth_token,
            enabled: row.enabled,
            created_at: row.created_at,
        }
    }
}

/// Repository for webhook database operations.
pub struct WebhookRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> WebhookRepository<'a> {
    /// Create a new webhook repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all webhooks, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Webhook>, RepositoryError> {
        let rows = sqlx::query_as::<_, WebhookRow>(
            "SELECT id, name, url, event, auth_token, enabled, created_at \
             FROM webhooks ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a new webhook.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new_webhook: &NewWebhook) -> Result<Webhook, RepositoryError> {
        let row = sqlx::query_as::<_, WebhookRow>(
            "INSERT INTO webhooks (name, url, event, auth_token, enabled, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             RETURNING id, name, url, event, auth_token, enabled, created_at",
        )
        .bind(&new_webhook.name)
        .bind(&new_webhook.url)
        .bind(&new_webhook.event)
        .bind(&new_webhook.auth_token)
        .bind(new_webhook.enabled)
        .bind(new_webhook.created_at)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Delete a webhook by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no webhook has that ID.
    pub async fn delete(&self, id: WebhookId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM webhooks WHERE id = ?1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn sample_webhook(name: &str) -> NewWebhook {
        NewWebhook {
            name: name.to_string(),
            url: "https://example.com/hooks/payments".to_string(),
            event: "PAYMENT_RECEIVED".to_string(),
            auth_token: "0123456789abcdef0123456789abcdef".to_string(),
            enabled: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_list_delete_roundtrip() {
        let pool = test_pool().await;
        let repo = WebhookRepository::new(&pool);

        let created = repo.create(&sample_webhook("pagamentos")).await.unwrap();
        assert_eq!(created.name, "pagamentos");
        assert!(created.enabled);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);

        repo.delete(created.id).await.unwrap();
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let pool = test_pool().await;
        let repo = WebhookRepository::new(&pool);

        let err = repo.delete(WebhookId::new(42)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
