use serde::Serialize;

use crate::config::CompletionConfig;
use crate::error::Result;
use crate::model::{Message, Role};

/// Reply shown when the provider answers 429.
pub const RATE_LIMIT_REPLY: &str = "❌ Batas penggunaan model gratis harian tercapai.";

/// Reply shown when the provider answers 401.
pub const BAD_CREDENTIAL_REPLY: &str = "❌ API Key salah atau expired.";

/// Anything that turns a conversation into a single reply string.
///
/// Implementations never fail: every error is folded into the returned text
/// so it can be appended to the transcript like a normal assistant turn.
pub trait Completion: Send + Sync {
    fn complete(
        &self,
        messages: &[Message],
        api_key: &str,
    ) -> impl std::future::Future<Output = String> + Send;

    /// Model identifier recorded on assistant messages.
    fn model(&self) -> &str;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint (OpenRouter by default).
pub struct CompletionClient {
    config: CompletionConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

impl CompletionClient {
    pub fn from_config(config: &CompletionConfig) -> Self {
        Self {
            config: config.clone(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// POST the conversation. Only transport-level failures are errors here;
    /// any HTTP status is handed back for [`interpret_response`].
    async fn post(&self, messages: &[Message], api_key: &str) -> Result<(u16, String)> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
        };

        let resp = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", api_key.trim()))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;
        Ok((status, text))
    }
}

impl Completion for CompletionClient {
    async fn complete(&self, messages: &[Message], api_key: &str) -> String {
        match self.post(messages, api_key).await {
            Ok((status, body)) => {
                if status != 200 {
                    tracing::warn!("completion: provider returned {status}");
                }
                interpret_response(status, &body)
            }
            Err(e) => {
                tracing::warn!("completion: request failed: {e}");
                transport_error_reply(&e)
            }
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Map an HTTP status and body to the text shown to the user.
pub fn interpret_response(status: u16, body: &str) -> String {
    match status {
        200 => match serde_json::from_str::<serde_json::Value>(body) {
            Ok(json) => match first_choice_content(&json) {
                Ok(content) => content.to_string(),
                Err(reason) => transport_error_reply(&reason),
            },
            Err(e) => transport_error_reply(&e),
        },
        429 => RATE_LIMIT_REPLY.to_string(),
        401 => BAD_CREDENTIAL_REPLY.to_string(),
        _ => error_reply(status, body),
    }
}

/// `choices[0].message.content`, or the first step of that path that is missing.
fn first_choice_content(json: &serde_json::Value) -> std::result::Result<&str, String> {
    let choice = json
        .get("choices")
        .ok_or("'choices'")?
        .get(0)
        .ok_or("list index out of range")?;
    let content = choice
        .get("message")
        .ok_or("'message'")?
        .get("content")
        .ok_or("'content'")?;
    content
        .as_str()
        .ok_or_else(|| format!("content is not a string: {content}"))
}

fn error_reply(status: u16, body: &str) -> String {
    format!("❌ Error: {status} - {body}")
}

/// Reply for a request that never produced an HTTP response.
pub fn transport_error_reply(err: &dyn std::fmt::Display) -> String {
    format!("❌ Terjadi kesalahan: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_extracts_first_choice() {
        let body = r#"{"choices":[{"message":{"content":"X"}}]}"#;
        assert_eq!(interpret_response(200, body), "X");
    }

    #[test]
    fn test_ok_ignores_later_choices() {
        let body = concat!(
            r#"{"choices":[{"message":{"content":"first"}},"#,
            r#"{"message":{"content":"second"}}]}"#,
        );
        assert_eq!(interpret_response(200, body), "first");
    }

    #[test]
    fn test_ok_without_choices_names_missing_key() {
        assert_eq!(
            interpret_response(200, r#"{"error":"x"}"#),
            "❌ Terjadi kesalahan: 'choices'"
        );
    }

    #[test]
    fn test_ok_with_empty_choices() {
        assert_eq!(
            interpret_response(200, r#"{"choices":[]}"#),
            "❌ Terjadi kesalahan: list index out of range"
        );
    }

    #[test]
    fn test_ok_without_message_names_missing_key() {
        assert_eq!(
            interpret_response(200, r#"{"choices":[{"text":"X"}]}"#),
            "❌ Terjadi kesalahan: 'message'"
        );
    }

    #[test]
    fn test_ok_with_invalid_json_is_request_failure() {
        let reply = interpret_response(200, "<html>");
        assert!(reply.starts_with("❌ Terjadi kesalahan: "));
        assert!(!reply.contains("Error: 200"));
    }

    #[test]
    fn test_rate_limit_ignores_body() {
        assert_eq!(interpret_response(429, ""), RATE_LIMIT_REPLY);
        assert_eq!(
            interpret_response(429, r#"{"choices":[{"message":{"content":"X"}}]}"#),
            RATE_LIMIT_REPLY
        );
    }

    #[test]
    fn test_unauthorized() {
        assert_eq!(interpret_response(401, "nope"), BAD_CREDENTIAL_REPLY);
    }

    #[test]
    fn test_other_status_includes_status_and_body() {
        assert_eq!(
            interpret_response(502, "Bad Gateway"),
            "❌ Error: 502 - Bad Gateway"
        );
    }

    #[test]
    fn test_transport_error_reply() {
        assert_eq!(
            transport_error_reply(&"connection refused"),
            "❌ Terjadi kesalahan: connection refused"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let messages = [Message::system("p"), Message::user("cai")];
        let body = ChatRequest {
            model: "m",
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "m",
                "messages": [
                    {"role": "system", "content": "p"},
                    {"role": "user", "content": "cai"},
                ]
            })
        );
    }

    #[test]
    fn test_client_reports_model() {
        let client = CompletionClient::from_config(&CompletionConfig::default());
        assert_eq!(client.model(), "deepseek/deepseek-chat-v3-0324:free");
        assert!(client.endpoint().ends_with("/chat/completions"));
    }
}
