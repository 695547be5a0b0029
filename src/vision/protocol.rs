//! Wire types for the OpenAI-compatible chat-completion endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatRequest {
    /// One user message carrying the instruction and the captured frame.
    pub fn user_with_image(instruction: &str, image_data_url: &str, max_tokens: u32) -> ChatRequest {
        ChatRequest {
            max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: instruction.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data_url.to_string(),
                        },
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: String,
}

impl ChatResponse {
    pub fn into_first_content(self) -> Option<String> {
        self.choices.into_iter().next().map(|choice| choice.message.content)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest::user_with_image(
            "What do you see?",
            "data:image/jpeg;base64,AAAA",
            100,
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "max_tokens": 100,
                "messages": [
                    {
                        "role": "user",
                        "content": [
                            { "type": "text", "text": "What do you see?" },
                            {
                                "type": "image_url",
                                "image_url": { "url": "data:image/jpeg;base64,AAAA" }
                            }
                        ]
                    }
                ]
            })
        );
    }

    #[test]
    fn test_response_first_content() {
        let json = r#"{"choices":[{"message":{"content":"a cat"}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_first_content(), Some("a cat".to_string()));
    }

    #[test]
    fn test_response_without_choices() {
        let json = r#"{"choices":[]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_first_content(), None);
    }
}
