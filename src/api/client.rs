//! OpenAI-compatible chat completion client for sprite classification.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::Classifier;
use crate::error::SpritesortError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash-lite";

// OpenRouter requires these two headers to identify the calling app.
const APP_REFERER: &str = "https://localhost";
const APP_TITLE: &str = "spritesort";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for the classification endpoint.
#[derive(Clone, Debug)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

impl ClassifierConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key,
        }
    }
}

/// Synchronous HTTP client sending one single-turn vision request per image.
pub struct ClassifierClient {
    agent: ureq::Agent,
    config: ClassifierConfig,
}

impl ClassifierClient {
    pub fn new(config: ClassifierConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build();
        Self {
            agent: agent_config.into(),
            config,
        }
    }

    fn endpoint(&self) -> Result<Url, SpritesortError> {
        // A trailing slash keeps Url::join from replacing the last path
        // segment of the base.
        let base = Url::parse(&format!("{}/", self.config.base_url.trim_end_matches('/')))
            .map_err(|source| SpritesortError::InvalidOptions {
                message: format!("invalid base URL '{}': {source}", self.config.base_url),
            })?;
        base.join("chat/completions")
            .map_err(|source| SpritesortError::InvalidOptions {
                message: format!("invalid base URL '{}': {source}", self.config.base_url),
            })
    }
}

impl Classifier for ClassifierClient {
    fn classify(
        &self,
        image: &[u8],
        expected_letter: Option<char>,
    ) -> Result<String, SpritesortError> {
        let data_url = format!("data:image/png;base64,{}", BASE64.encode(image));

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: build_instruction(expected_letter),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
        };

        let endpoint = self.endpoint()?;
        let mut response = self
            .agent
            .post(endpoint.as_str())
            .header("Authorization", &format!("Bearer {}", self.config.api_key))
            .header("HTTP-Referer", APP_REFERER)
            .header("X-Title", APP_TITLE)
            .send_json(&body)
            .map_err(|source| SpritesortError::UnexpectedTransport {
                message: source.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SpritesortError::TransientService {
                quota_exceeded: true,
                retry_after: parse_retry_after(&response),
                message: "service rate limit hit (HTTP 429)".to_string(),
            });
        }
        if !status.is_success() {
            let detail = response
                .body_mut()
                .read_to_string()
                .unwrap_or_default();
            return Err(SpritesortError::TransientService {
                quota_exceeded: false,
                retry_after: None,
                message: format!("service error (HTTP {}): {}", status.as_u16(), detail.trim()),
            });
        }

        let parsed: ChatResponse = response.body_mut().read_json().map_err(|source| {
            SpritesortError::UnexpectedTransport {
                message: format!("failed to parse completion response: {source}"),
            }
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        first_reply_line(&content).ok_or(SpritesortError::EmptyResponse)
    }
}

/// Instruction for the model; constrained to the expected letter when given.
fn build_instruction(expected_letter: Option<char>) -> String {
    match expected_letter {
        Some(letter) => format!(
            "You are labelling a sprite image for children. \
             Identify the primary object and return a lowercase noun that starts with '{}'. \
             Keep it to one or two words, no punctuation, no numbering, and avoid adjectives. \
             If the object is unclear, make your best guess that still starts with the required letter.",
            letter.to_ascii_uppercase()
        ),
        None => "You are labelling a sprite image for children. \
                 Identify the primary object and return a lowercase noun (one or two words). \
                 No punctuation, no numbering, and avoid adjectives."
            .to_string(),
    }
}

/// First non-empty line of the reply, trimmed; `None` when the reply is
/// empty or whitespace-only.
fn first_reply_line(content: &str) -> Option<String> {
    let line = content.trim().lines().next().unwrap_or("").trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

fn parse_retry_after(response: &ureq::http::Response<ureq::Body>) -> Option<f64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<f64>().ok())
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_names_the_required_letter() {
        let prompt = build_instruction(Some('b'));
        assert!(prompt.contains("starts with 'B'"));
        assert!(build_instruction(None).contains("one or two words"));
    }

    #[test]
    fn first_reply_line_takes_the_leading_line_only() {
        assert_eq!(
            first_reply_line("Apple pie!\nSecond thought").as_deref(),
            Some("Apple pie!")
        );
        assert_eq!(first_reply_line("\n  Ant  \n").as_deref(), Some("Ant"));
        assert_eq!(first_reply_line("   \n\t"), None);
        assert_eq!(first_reply_line(""), None);
    }

    #[test]
    fn request_body_serializes_to_openai_shape() {
        let body = ChatRequest {
            model: "test-model",
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: "describe".to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/png;base64,AAAA".to_string(),
                        },
                    },
                ],
            }],
        };

        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(value["model"], "test-model");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
        assert_eq!(value["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            value["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn endpoint_is_joined_onto_the_base_url() {
        let client = ClassifierClient::new(ClassifierConfig::new("key".to_string()));
        assert_eq!(
            client.endpoint().expect("endpoint").as_str(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let mut config = ClassifierConfig::new("key".to_string());
        config.base_url = "https://example.test/api/v1/".to_string();
        let client = ClassifierClient::new(config);
        assert_eq!(
            client.endpoint().expect("endpoint").as_str(),
            "https://example.test/api/v1/chat/completions"
        );
    }

    #[test]
    fn unparseable_base_url_is_rejected() {
        let mut config = ClassifierConfig::new("key".to_string());
        config.base_url = "not a url".to_string();
        let client = ClassifierClient::new(config);
        match client.endpoint() {
            Err(SpritesortError::InvalidOptions { message }) => {
                assert!(message.contains("invalid base URL"));
            }
            other => panic!("expected InvalidOptions, got {other:?}"),
        }
    }
}
