//! Payments provider REST client.
//!
//! One-shot request/response calls against the provider's JSON API. The
//! access token rides in the `access_token` header on every request.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::AsaasConfig;

use super::error::{AsaasError, ErrorsResponse};
use super::types::{
    CreateCustomer, CreatePayment, CreatePaymentLink, CreateSubaccount, Customer, DeletedCustomer,
    ListResponse, Payment, PaymentLink, Subaccount,
};

/// Payments provider API client.
///
/// Cheaply cloneable; the underlying HTTP client and base URL live behind
/// an `Arc`.
#[derive(Clone)]
pub struct AsaasClient {
    inner: Arc<AsaasClientInner>,
}

struct AsaasClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl AsaasClient {
    /// Create a new payments client.
    ///
    /// # Panics
    ///
    /// Panics if the access token contains invalid header characters.
    #[must_use]
    pub fn new(config: &AsaasConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "access_token",
            HeaderValue::from_str(config.api_key.expose_secret())
                .expect("Invalid access token for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(AsaasClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Create a customer.
    ///
    /// # Errors
    ///
    /// Returns [`AsaasError`] on transport failures or non-2xx responses.
    #[instrument(skip(self, customer), fields(name = %customer.name))]
    pub async fn create_customer(&self, customer: &CreateCustomer) -> Result<Customer, AsaasError> {
        self.post("/customers", customer).await
    }

    /// List customers.
    ///
    /// # Errors
    ///
    /// Returns [`AsaasError`] on transport failures or non-2xx responses.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<ListResponse<Customer>, AsaasError> {
        self.get("/customers").await
    }

    /// Delete a customer by id.
    ///
    /// # Errors
    ///
    /// Returns [`AsaasError`] on transport failures or non-2xx responses.
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, customer_id: &str) -> Result<DeletedCustomer, AsaasError> {
        let url = format!("{}/customers/{customer_id}", self.inner.base_url);
        let response = self.inner.client.delete(&url).send().await?;
        self.handle_response(response).await
    }

    // =========================================================================
    // Payments (cobranças)
    // =========================================================================

    /// Create a cobrança.
    ///
    /// # Errors
    ///
    /// Returns [`AsaasError`] on transport failures or non-2xx responses.
    #[instrument(skip(self, payment), fields(customer = %payment.customer_id))]
    pub async fn create_payment(&self, payment: &CreatePayment) -> Result<Payment, AsaasError> {
        self.post("/payments", payment).await
    }

    /// List cobranças.
    ///
    /// # Errors
    ///
    /// Returns [`AsaasError`] on transport failures or non-2xx responses.
    #[instrument(skip(self))]
    pub async fn list_payments(&self) -> Result<ListResponse<Payment>, AsaasError> {
        self.get("/payments").await
    }

    // =========================================================================
    // Payment links
    // =========================================================================

    /// Create a payment link.
    ///
    /// # Errors
    ///
    /// Returns [`AsaasError`] on transport failures or non-2xx responses.
    #[instrument(skip(self, link), fields(name = %link.name))]
    pub async fn create_payment_link(
        &self,
        link: &CreatePaymentLink,
    ) -> Result<PaymentLink, AsaasError> {
        self.post("/paymentLinks", link).await
    }

    /// List payment links.
    ///
    /// # Errors
    ///
    /// Returns [`AsaasError`] on transport failures or non-2xx responses.
    #[instrument(skip(self))]
    pub async fn list_payment_links(&self) -> Result<ListResponse<PaymentLink>, AsaasError> {
        self.get("/paymentLinks").await
    }

    // =========================================================================
    // Subaccounts
    // =========================================================================

    /// Create a subaccount.
    ///
    /// # Errors
    ///
    /// Returns [`AsaasError`] on transport failures or non-2xx responses.
    #[instrument(skip(self, subaccount), fields(name = %subaccount.name))]
    pub async fn create_subaccount(
        &self,
        subaccount: &CreateSubaccount,
    ) -> Result<Subaccount, AsaasError> {
        self.post("/accounts", subaccount).await
    }

    /// List subaccounts.
    ///
    /// # Errors
    ///
    /// Returns [`AsaasError`] on transport failures or non-2xx responses.
    #[instrument(skip(self))]
    pub async fn list_subaccounts(&self) -> Result<ListResponse<Subaccount>, AsaasError> {
        self.get("/accounts").await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AsaasError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AsaasError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self.inner.client.post(&url).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Handle a response: decode the body on success, map the error body
    /// otherwise.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AsaasError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| AsaasError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(self.handle_error_status(status, response).await)
        }
    }

    /// Handle an error status code.
    async fn handle_error_status(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> AsaasError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return AsaasError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return AsaasError::Unauthorized("Invalid access token".to_string());
        }

        match response.text().await {
            Ok(body) => {
                let message = serde_json::from_str::<ErrorsResponse>(&body)
                    .map_or(body, |parsed| parsed.first_description());
                AsaasError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
            Err(e) => AsaasError::Http(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AsaasClient>();
    }

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AsaasClient>();
    }
}
