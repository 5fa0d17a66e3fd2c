//! Types for the LLM inference API.
//!
//! These match the prediction-based API format: create a prediction with
//! `stream: true`, then consume the server-sent event stream it points to.

use serde::{Deserialize, Serialize};

/// Request body for creating a prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    /// Model input.
    pub input: PredictionInput,
    /// Request a streaming URL.
    pub stream: bool,
}

/// Model input for a chat-style completion.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionInput {
    /// The user prompt.
    pub prompt: String,
    /// Optional system prompt (knowledge base + persona).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

/// A created prediction.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    /// Prediction id.
    pub id: String,
    /// Lifecycle status (starting, processing, succeeded, failed).
    #[serde(default)]
    pub status: Option<String>,
    /// Follow-up URLs.
    #[serde(default)]
    pub urls: PredictionUrls,
}

/// URLs attached to a prediction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionUrls {
    /// Server-sent event stream of output fragments.
    #[serde(default)]
    pub stream: Option<String>,
    /// Polling URL.
    #[serde(default)]
    pub get: Option<String>,
    /// Cancellation URL.
    #[serde(default)]
    pub cancel: Option<String>,
}

/// One event from the output stream.
///
/// The stream is lazy, finite and non-restartable: fragments arrive until
/// a `done` event closes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text fragment of the reply.
    Output(String),
    /// The stream finished normally.
    Done,
    /// The model or the stream failed.
    Error(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn prediction_deserializes() {
        let json = r#"{
            "id": "pred_abc123",
            "status": "starting",
            "urls": {
                "stream": "https://stream.example.com/v1/pred_abc123",
                "get": "https://api.example.com/v1/predictions/pred_abc123",
                "cancel": "https://api.example.com/v1/predictions/pred_abc123/cancel"
            }
        }"#;

        let prediction: Prediction = serde_json::from_str(json).unwrap();
        assert_eq!(prediction.id, "pred_abc123");
        assert!(prediction.urls.stream.is_some());
    }

    #[test]
    fn prediction_tolerates_missing_urls() {
        let prediction: Prediction = serde_json::from_str(r#"{"id": "pred_x"}"#).unwrap();
        assert!(prediction.urls.stream.is_none());
    }

    #[test]
    fn request_serializes_without_empty_system_prompt() {
        let request = PredictionRequest {
            input: PredictionInput {
                prompt: "Qual o cardápio de hoje?".to_string(),
                system_prompt: None,
            },
            stream: true,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], true);
        assert!(json["input"].get("system_prompt").is_none());
    }
}
