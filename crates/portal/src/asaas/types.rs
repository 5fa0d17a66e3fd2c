//! Types for the payments provider REST API.
//!
//! Field names mirror the provider's JSON (camelCase); list endpoints wrap
//! their results in a `{data, hasMore, totalCount}` envelope.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Envelope returned by every list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub total_count: i64,
}

// =============================================================================
// Customers
// =============================================================================

/// Request body for `POST /customers`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomer {
    pub name: String,
    pub email: String,
    /// CPF or CNPJ digits.
    pub cpf: String,
    pub phone: String,
    pub address: String,
    pub postal_code: String,
    pub district: String,
    pub city: String,
}

/// A customer as returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cpf_cnpj: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<serde_json::Value>,
    #[serde(default)]
    pub date_created: Option<String>,
}

/// Response of `DELETE /customers/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeletedCustomer {
    pub deleted: bool,
    pub id: String,
}

// =============================================================================
// Payments (cobranças)
// =============================================================================

/// Request body for `POST /payments`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayment {
    /// Customer id the cobrança belongs to.
    pub customer_id: String,
    pub value: Decimal,
    /// Due date, `YYYY-MM-DD`.
    pub due_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_type: Option<String>,
}

/// A cobrança as returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub value: Decimal,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
}

// =============================================================================
// Payment links
// =============================================================================

/// Request body for `POST /paymentLinks`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentLink {
    pub name: String,
    /// BOLETO, CREDIT_CARD, PIX or UNDEFINED.
    pub billing_type: String,
    /// DETACHED, INSTALLMENT or RECURRENT.
    pub charge_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date_limit_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A payment link as returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLink {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub billing_type: Option<String>,
    #[serde(default)]
    pub charge_type: Option<String>,
    #[serde(default)]
    pub due_date_limit_days: Option<i64>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

// =============================================================================
// Subaccounts
// =============================================================================

/// Request body for `POST /accounts`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubaccount {
    pub name: String,
    pub email: String,
    pub cpf_cnpj: String,
    pub mobile_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_phone: Option<String>,
    pub income_value: Decimal,
    /// `YYYY-MM-DD`.
    pub birth_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
    pub address: String,
    /// Street number.
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    /// State (UF).
    pub province: String,
    pub city: String,
    pub neighborhood: String,
    pub postal_code: String,
}

/// A subaccount as returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subaccount {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cpf_cnpj: Option<String>,
    #[serde(default)]
    pub city: Option<serde_json::Value>,
    #[serde(default)]
    pub wallet_id: Option<String>,
}
