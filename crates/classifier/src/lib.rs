//! OpenAI-compatible remote classifier.
//!
//! Sends the assembled prompt plus the rendered avatar (as a base64 data
//! URL) to a chat-completions endpoint and forces the model to answer
//! through a single `decide` tool whose `answer` parameter is the closed
//! four-house enum. The forced tool choice makes a free-text or absent
//! answer impossible by construction; the parser still refuses anything
//! outside the enum.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use sortinghat_core::classify::{ClassificationRequest, Classifier};
use sortinghat_core::error::ClassifyError;
use sortinghat_core::label::House;
use tracing::{debug, warn};

const DECIDE_TOOL: &str = "decide";

/// Chat-completions classifier against an OpenAI-compatible API.
pub struct OpenAiClassifier {
    name: String,
    api_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiClassifier {
    /// Create a new classifier with a bounded request timeout.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "openai".into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// The `decide` tool definition: one required `answer` parameter whose
    /// schema is the closed house enum.
    fn decide_tool() -> serde_json::Value {
        let houses: Vec<&str> = House::ALL.iter().map(|h| h.as_str()).collect();
        serde_json::json!({
            "type": "function",
            "function": {
                "name": DECIDE_TOOL,
                "description": "Commit to exactly one house for this user.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "answer": {
                            "type": "string",
                            "enum": houses,
                        }
                    },
                    "required": ["answer"]
                }
            }
        })
    }

    fn build_body(&self, request: &ClassificationRequest) -> serde_json::Value {
        let data_url = format!("data:image/png;base64,{}", BASE64.encode(&request.image_png));
        serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": request.prompt },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]
            }],
            "tools": [Self::decide_tool()],
            "tool_choice": {
                "type": "function",
                "function": { "name": DECIDE_TOOL }
            }
        })
    }

    fn parse_response(response: ChatResponse) -> Result<House, ClassifyError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClassifyError::InvalidAnswer("response had no choices".into()))?;

        let tool_call = choice
            .message
            .tool_calls
            .into_iter()
            .find(|tc| tc.function.name == DECIDE_TOOL)
            .ok_or_else(|| {
                ClassifyError::InvalidAnswer("model did not call the decide tool".into())
            })?;

        let args: DecideArguments =
            serde_json::from_str(&tool_call.function.arguments).map_err(|e| {
                ClassifyError::InvalidAnswer(format!("malformed tool arguments: {e}"))
            })?;

        args.answer
            .parse()
            .map_err(|_| ClassifyError::InvalidAnswer(format!("unknown house: {}", args.answer)))
    }
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(&self, request: ClassificationRequest) -> Result<House, ClassifyError> {
        let url = format!("{}/chat/completions", self.api_url);
        let body = self.build_body(&request);

        debug!(model = %self.model, "Sending classification request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifyError::Timeout(e.to_string())
                } else {
                    ClassifyError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Classifier API error");
            return Err(ClassifyError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: ChatResponse = response.json().await.map_err(|e| ClassifyError::Api {
            status_code: 200,
            message: format!("Failed to parse classifier response: {e}"),
        })?;

        let house = Self::parse_response(api_resp)?;
        debug!(house = %house, "Classification complete");
        Ok(house)
    }
}

// --- Response wire types ---

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct DecideArguments {
    answer: String,
}
