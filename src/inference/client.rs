use std::time::Duration;

use axum::async_trait;
use base64::{engine::general_purpose, Engine};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::{InferenceError, NutritionEstimate, NutritionInference};
use crate::{config::InferenceConfig, nutrition::Macros};

const REPLY_SHAPE: &str = r#"{
  "food_name": "Name of the dish",
  "description": "Short description",
  "calories": 0,
  "macros": { "protein_g": 0, "carbs_g": 0, "fat_g": 0 }
}"#;

fn image_prompt() -> String {
    format!(
        "You are an expert nutritionist. Analyze this photo of food and identify the visible \
         ingredients. Reply ONLY with JSON (no markdown) with this structure:\n{REPLY_SHAPE}\n\
         Be realistic about portion sizes. If there is no food in the photo, reply with \
         {{\"error\": \"<reason>\"}} instead."
    )
}

fn text_prompt(entry: &str) -> String {
    format!(
        "You are an expert nutritionist. A user is manually logging a food item and its \
         quantity. Estimate its nutrition facts for the stated quantity.\n\
         The user's entry is: {entry}\n\
         Reply ONLY with JSON (no markdown) with this structure:\n{REPLY_SHAPE}\n\
         Be realistic with the values. If the food cannot be identified, reply with \
         {{\"error\": \"<reason>\"}} instead."
    )
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

/// What the model is asked to answer with: an estimate or an error object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModelReply {
    Refusal {
        error: String,
    },
    Estimate {
        food_name: String,
        #[serde(default)]
        description: Option<String>,
        calories: f64,
        macros: Macros,
    },
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(cfg: &InferenceConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }

    async fn complete(&self, content: Vec<ContentPart>) -> Result<String, InferenceError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            max_tokens: 500,
            temperature: 0.2,
        };

        info!(model = %self.model, "sending nutrition inference request");
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| InferenceError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "inference api error");
            return Err(InferenceError::Upstream(format!("status {status}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Malformed(e.to_string()))?;
        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| InferenceError::Malformed("no choices in response".into()))
    }
}

#[async_trait]
impl NutritionInference for ChatCompletionsClient {
    #[instrument(skip(self, image), fields(size = image.len()))]
    async fn analyze_image(
        &self,
        image: Bytes,
        content_type: &str,
    ) -> Result<NutritionEstimate, InferenceError> {
        let data_url = format!(
            "data:{};base64,{}",
            content_type,
            general_purpose::STANDARD.encode(&image)
        );
        let reply = self
            .complete(vec![
                ContentPart::Text {
                    text: image_prompt(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
            ])
            .await?;
        parse_reply(&reply)
    }

    #[instrument(skip(self))]
    async fn analyze_text(&self, entry: &str) -> Result<NutritionEstimate, InferenceError> {
        let reply = self
            .complete(vec![ContentPart::Text {
                text: text_prompt(entry),
            }])
            .await?;
        parse_reply(&reply)
    }
}

/// Models often wrap JSON in a markdown fence despite being told not to.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub(crate) fn parse_reply(reply: &str) -> Result<NutritionEstimate, InferenceError> {
    let body = strip_code_fence(reply);
    debug!(size = body.len(), "parsing inference reply");

    let parsed: ModelReply = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "unparseable inference reply");
        InferenceError::Malformed(e.to_string())
    })?;

    match parsed {
        ModelReply::Refusal { error } => Err(InferenceError::NotFood(error)),
        ModelReply::Estimate {
            food_name,
            description,
            calories,
            macros,
        } => {
            let food_name = food_name.trim().to_string();
            if food_name.is_empty() {
                return Err(InferenceError::Malformed("empty food_name".into()));
            }
            if !(calories.is_finite() && calories >= 0.0) || !macros.is_valid() {
                return Err(InferenceError::Malformed(
                    "negative or non-finite nutrition values".into(),
                ));
            }
            Ok(NutritionEstimate {
                food_name,
                description: description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
                calories,
                macros,
            })
        }
    }
}
