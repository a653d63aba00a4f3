use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A transaction as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub date: String,
    pub envelope_id: String,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Request body for POST /transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub date: String,
    pub envelope_id: String,
    pub account_id: String,
}

impl CreateTransactionRequest {
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Request body for PUT /transactions/{id}; only the set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

/// Envelope wrapped around every API payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// A successful HTTP exchange: status code plus decoded body
#[derive(Debug, Clone)]
pub struct ApiReply<T> {
    pub status: u16,
    pub data: T,
}

/// Error type for API operations
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("Failed to create auth header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),
    /// Non-2xx response; `body` is the decoded error payload
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: Value,
    },
    #[error("Failed to parse response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Error payload of a rejected request.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_request_sends_only_set_fields() {
        let update = UpdateTransactionRequest {
            amount: Some(-99.99),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "amount": -99.99 }));
    }

    #[test]
    fn test_api_response_optional_fields() {
        let raw = json!({ "success": false, "data": null, "errors": ["amount is required"] });
        let parsed: ApiResponse<Option<Transaction>> = serde_json::from_value(raw).unwrap();
        assert!(!parsed.success);
        assert!(parsed.data.is_none());
        assert!(parsed.message.is_none());
        assert_eq!(parsed.errors.as_deref(), Some(&["amount is required".to_string()][..]));
    }

    #[test]
    fn test_status_accessors() {
        let err = ApiError::Status {
            method: "GET".to_string(),
            url: "http://localhost/transactions/x".to_string(),
            status: 404,
            body: json!({ "success": false }),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body().and_then(|b| b["success"].as_bool()), Some(false));
        assert!(err.to_string().contains("returned 404"));
    }
}
