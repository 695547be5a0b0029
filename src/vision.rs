use crate::Result;
use crate::config;
use crate::logging::*;
use anyhow::anyhow;
use std::fmt::Display;

mod protocol;
use protocol::{ChatRequest, ChatResponse};

/// Fixed output bound, matching the single-shot nature of each cycle.
const MAX_TOKENS: u32 = 100;

fn get_base_url() -> String {
    config::get("VLM_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// What a capture-send cycle should display. A non-2xx reply is a displayable
/// outcome, not an error; the polling loop keeps running either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Answer(String),
    ServerError { status: u16, body: String },
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Answer(text) => write!(f, "{}", text),
            Outcome::ServerError { status, body } => {
                write!(f, "Server error: {} - {}", status, body)
            }
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait QueryBackend: Send {
    async fn describe(&self, instruction: &str, image_data_url: &str) -> Result<Outcome>;
}

pub struct VisionClient {
    base_url: String,
    client: reqwest::Client,
}

impl VisionClient {
    pub fn new(base_url: String) -> VisionClient {
        VisionClient {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn new_default() -> VisionClient {
        VisionClient::new(get_base_url())
    }
}

impl QueryBackend for VisionClient {
    async fn describe(&self, instruction: &str, image_data_url: &str) -> Result<Outcome> {
        let log = DEFAULT.new(o!("function" => "VisionClient::describe"));
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatRequest::user_with_image(instruction, image_data_url, MAX_TOKENS);

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(log, "completion failed"; "status" => status.as_u16(), "body" => %body);
            return Ok(Outcome::ServerError {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .into_first_content()
            .ok_or_else(|| anyhow!("no choices in completion response"))?;
        info!(log, "completion received"; "length" => content.len());
        Ok(Outcome::Answer(content))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_describe_extracts_first_choice_content() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["max_tokens"], 100);
                assert_eq!(body["messages"][0]["role"], "user");
                assert_eq!(body["messages"][0]["content"][0]["type"], "text");
                assert_eq!(body["messages"][0]["content"][0]["text"], "What do you see?");
                assert_eq!(
                    body["messages"][0]["content"][1]["image_url"]["url"],
                    "data:image/jpeg;base64,AAAA"
                );
                Json(json!({"choices": [{"message": {"content": "a cat"}}]}))
            }),
        );
        let client = VisionClient::new(serve(app).await);

        let outcome = client
            .describe("What do you see?", "data:image/jpeg;base64,AAAA")
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Answer("a cat".to_string()));
    }

    #[tokio::test]
    async fn test_describe_turns_non_2xx_into_server_error() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = VisionClient::new(serve(app).await);

        let outcome = client
            .describe("What do you see?", "data:image/jpeg;base64,AAAA")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::ServerError {
                status: 500,
                body: "boom".to_string(),
            }
        );
        assert_eq!(outcome.to_string(), "Server error: 500 - boom");
    }

    #[tokio::test]
    async fn test_describe_fails_on_empty_choices() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let client = VisionClient::new(serve(app).await);

        let result = client
            .describe("What do you see?", "data:image/jpeg;base64,AAAA")
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_server_error_display() {
        let outcome = Outcome::ServerError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(outcome.to_string(), "Server error: 500 - boom");
    }

    #[test]
    fn test_answer_display() {
        let outcome = Outcome::Answer("a cat".to_string());
        assert_eq!(outcome.to_string(), "a cat");
    }
}
