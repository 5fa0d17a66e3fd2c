//! LLM inference API client.
//!
//! Creates a streaming prediction and consumes the server-sent event stream
//! it points to. The stream is consumed once, in order; the assistant page
//! concatenates the fragments into the reply.

use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::LlmConfig;

use super::error::{ApiErrorResponse, LlmError};
use super::types::{Prediction, PredictionInput, PredictionRequest, StreamEvent};

/// LLM inference API client.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<LlmClientInner>,
}

struct LlmClientInner {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl LlmClient {
    /// Create a new LLM client.
    ///
    /// # Panics
    ///
    /// Panics if the API token contains invalid header characters.
    #[must_use]
    pub fn new(config: &LlmConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", config.api_token.expose_secret()))
                .expect("Invalid API token for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(LlmClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                model: config.model.clone(),
            }),
        }
    }

    /// Run a completion and return the whole reply.
    ///
    /// Streams internally; the fragments are concatenated in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if the prediction cannot be created or the
    /// stream reports an error.
    #[instrument(skip(self, system_prompt, prompt), fields(model = %self.inner.model))]
    pub async fn generate(
        &self,
        system_prompt: Option<String>,
        prompt: String,
    ) -> Result<String, LlmError> {
        use futures::StreamExt;

        let events = self.stream_completion(system_prompt, prompt).await?;
        let mut events = std::pin::pin!(events);

        let mut reply = String::new();
        while let Some(event) = events.next().await {
            match event? {
                StreamEvent::Output(fragment) => reply.push_str(&fragment),
                StreamEvent::Done => break,
                StreamEvent::Error(message) => return Err(LlmError::Stream(message)),
            }
        }

        Ok(reply)
    }

    /// Create a prediction and return its event stream.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if the prediction cannot be created or does not
    /// expose a stream URL.
    pub async fn stream_completion(
        &self,
        system_prompt: Option<String>,
        prompt: String,
    ) -> Result<impl Stream<Item = Result<StreamEvent, LlmError>>, LlmError> {
        let prediction = self.create_prediction(system_prompt, prompt).await?;

        let stream_url = prediction
            .urls
            .stream
            .ok_or_else(|| LlmError::Stream("prediction has no stream URL".to_string()))?;

        let response = self
            .inner
            .client
            .get(&stream_url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.handle_error_status(status, response).await);
        }

        // Return a stream that parses SSE events
        Ok(stream! {
            use futures::StreamExt;

            let mut buffer = String::new();
            let mut byte_stream = std::pin::pin!(response.bytes_stream());

            'receive: while let Some(chunk_result) = byte_stream.next().await {
                match chunk_result {
                    Ok(chunk) => {
                        let text = match std::str::from_utf8(&chunk) {
                            Ok(t) => t,
                            Err(e) => {
                                yield Err(LlmError::Parse(format!("Invalid UTF-8: {e}")));
                                continue;
                            }
                        };

                        buffer.push_str(text);

                        // Process complete SSE events
                        while let Some(event) = extract_sse_event(&mut buffer) {
                            if let Some(stream_event) = parse_sse_event(&event) {
                                let finished = stream_event == StreamEvent::Done;
                                yield Ok(stream_event);
                                if finished {
                                    break 'receive;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(LlmError::Stream(e.to_string()));
                    }
                }
            }
        })
    }

    /// Create a streaming prediction for the configured model.
    async fn create_prediction(
        &self,
        system_prompt: Option<String>,
        prompt: String,
    ) -> Result<Prediction, LlmError> {
        let url = format!(
            "{}/models/{}/predictions",
            self.inner.base_url, self.inner.model
        );
        let request = PredictionRequest {
            input: PredictionInput {
                prompt,
                system_prompt,
            },
            stream: true,
        };

        let response = self.inner.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.handle_error_status(status, response).await);
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| LlmError::Parse(format!("Failed to parse prediction: {e}")))
    }

    /// Handle an error status code.
    async fn handle_error_status(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> LlmError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return LlmError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return LlmError::Unauthorized("Invalid API token".to_string());
        }

        match response.text().await {
            Ok(body) => {
                let message = serde_json::from_str::<ApiErrorResponse>(&body)
                    .map_or(body, |parsed| parsed.detail);
                LlmError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
            Err(e) => LlmError::Http(e),
        }
    }
}

/// Extract a complete SSE event from the buffer.
///
/// Returns `Some(event)` if a complete event was found (and removes it from
/// the buffer), or `None` if no complete event is available yet.
fn extract_sse_event(buffer: &mut String) -> Option<String> {
    // SSE events are separated by double newlines
    buffer.find("\n\n").map(|idx| {
        let event = buffer[..idx].to_string();
        *buffer = buffer[idx + 2..].to_string();
        event
    })
}

/// Parse an SSE event block into a [`StreamEvent`].
///
/// The stream uses named events: `output` carries a raw text fragment in
/// its data lines, `error` a message, `done` an empty object. Anything else
/// is ignored.
fn parse_sse_event(event: &str) -> Option<StreamEvent> {
    if event.trim().is_empty() {
        return None;
    }

    let mut event_name = "message";
    let mut data_lines: Vec<&str> = Vec::new();

    for line in event.lines() {
        if let Some(name) = line.strip_prefix("event: ") {
            event_name = name.trim();
        } else if let Some(data) = line.strip_prefix("data: ") {
            data_lines.push(data);
        } else if line == "data:" {
            // An empty data line is a bare newline in the payload.
            data_lines.push("");
        }
    }

    let data = data_lines.join("\n");

    match event_name {
        "output" => Some(StreamEvent::Output(data)),
        "done" => Some(StreamEvent::Done),
        "error" => Some(StreamEvent::Error(data)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_sse_event_splits_on_blank_line() {
        let mut buffer = "event: output\ndata: Olá\n\nevent: done\ndata: {}\n\n".to_string();

        let event1 = extract_sse_event(&mut buffer);
        assert!(event1.expect("no event").contains("output"));

        let event2 = extract_sse_event(&mut buffer);
        assert!(event2.expect("no event").contains("done"));

        assert!(extract_sse_event(&mut buffer).is_none());
    }

    #[test]
    fn extract_sse_event_keeps_incomplete_tail() {
        let mut buffer = "event: output\ndata: par".to_string();
        assert!(extract_sse_event(&mut buffer).is_none());
        assert_eq!(buffer, "event: output\ndata: par");
    }

    #[test]
    fn parse_output_event() {
        let event = "event: output\nid: 1\ndata: Olá, tudo bem?";
        assert_eq!(
            parse_sse_event(event),
            Some(StreamEvent::Output("Olá, tudo bem?".to_string()))
        );
    }

    #[test]
    fn parse_multiline_output_event() {
        let event = "event: output\ndata: linha um\ndata: linha dois";
        assert_eq!(
            parse_sse_event(event),
            Some(StreamEvent::Output("linha um\nlinha dois".to_string()))
        );
    }

    #[test]
    fn parse_done_and_error_events() {
        assert_eq!(
            parse_sse_event("event: done\ndata: {}"),
            Some(StreamEvent::Done)
        );
        assert_eq!(
            parse_sse_event("event: error\ndata: model overloaded"),
            Some(StreamEvent::Error("model overloaded".to_string()))
        );
    }

    #[test]
    fn parse_ignores_unknown_and_empty_events() {
        assert_eq!(parse_sse_event("event: ping\ndata: {}"), None);
        assert_eq!(parse_sse_event("   "), None);
    }

    #[test]
    fn client_is_clone_send_sync() {
        fn assert_clone<T: Clone + Send + Sync>() {}
        assert_clone::<LlmClient>();
    }
}
