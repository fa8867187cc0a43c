//! Nutrition inference oracle.
//!
//! Given a meal photo or a free-text food description, a hosted language model
//! returns a nutrition estimate. Results carry no accuracy or determinism
//! guarantee; they only ever become a draft the user confirms.

mod client;

use axum::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{errors::ApiError, nutrition::Macros};

pub use client::ChatCompletionsClient;

/// Structured estimate returned by the oracle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionEstimate {
    pub food_name: String,
    pub description: Option<String>,
    pub calories: f64,
    pub macros: Macros,
}

#[derive(Debug, Error)]
pub enum InferenceError {
    /// The model found no food in the photo or could not identify the entry.
    #[error("no food recognized: {0}")]
    NotFood(String),
    #[error("inference service unavailable: {0}")]
    Upstream(String),
    #[error("inference service returned an unusable answer: {0}")]
    Malformed(String),
}

impl InferenceError {
    pub fn into_api_error(self) -> ApiError {
        let status = match self {
            InferenceError::NotFood(_) => StatusCode::UNPROCESSABLE_ENTITY,
            InferenceError::Upstream(_) | InferenceError::Malformed(_) => StatusCode::BAD_GATEWAY,
        };
        (status, self.to_string())
    }
}

#[async_trait]
pub trait NutritionInference: Send + Sync {
    async fn analyze_image(
        &self,
        image: Bytes,
        content_type: &str,
    ) -> Result<NutritionEstimate, InferenceError>;

    async fn analyze_text(&self, entry: &str) -> Result<NutritionEstimate, InferenceError>;
}
