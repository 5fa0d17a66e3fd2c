//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::asaas::AsaasClient;
use crate::config::PortalConfig;
use crate::llm::LlmClient;
use crate::services::knowledge::load_knowledge;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool, external API clients and the
/// assistant's knowledge base.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    pool: SqlitePool,
    asaas: AsaasClient,
    llm: Option<LlmClient>,
    http: reqwest::Client,
    knowledge: Vec<String>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Builds the external API clients and loads the assistant's knowledge
    /// base from disk (missing directory means an empty knowledge base).
    #[must_use]
    pub fn new(config: PortalConfig, pool: SqlitePool) -> Self {
        let asaas = AsaasClient::new(&config.asaas);
        let llm = config.llm.as_ref().map(LlmClient::new);
        let knowledge = load_knowledge(&config.knowledge_dir);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                asaas,
                llm,
                http: reqwest::Client::new(),
                knowledge,
            }),
        }
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the payments API client.
    #[must_use]
    pub fn asaas(&self) -> &AsaasClient {
        &self.inner.asaas
    }

    /// Get a reference to the LLM client, if configured.
    #[must_use]
    pub fn llm(&self) -> Option<&LlmClient> {
        self.inner.llm.as_ref()
    }

    /// Get a reference to the plain HTTP client (registration notices).
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// The assistant's knowledge-base snippets.
    #[must_use]
    pub fn knowledge(&self) -> &[String] {
        &self.inner.knowledge
    }
}
