//! The delegated capability behind every stage.
//!
//! Stages never talk to a model directly. They compose a prompt and call
//! [`invoke`], which hands prompt + schema to an [`Agent`] and checks the
//! answer against the target [`Contract`].

use async_trait::async_trait;
use rstructor::{GeminiClient, GeminiModel, LLMClient};
use serde_json::Value;

use crate::config::Config;
use crate::config::ConfigError;
use crate::contract::{Contract, SchemaDescriptor};
use crate::error::InvocationError;

/// A text-in, schema-out capability.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Produce a JSON value intended to satisfy `schema`.
    async fn complete(
        &self,
        prompt: &str,
        schema: &SchemaDescriptor,
    ) -> Result<Value, InvocationError>;
}

/// Submit `prompt` and return a value that satisfies `T`'s contract.
///
/// No retry happens here; see [`crate::retry`].
pub async fn invoke<T: Contract>(agent: &dyn Agent, prompt: &str) -> Result<T, InvocationError> {
    let schema = SchemaDescriptor::of::<T>();
    let value = agent.complete(prompt, &schema).await?;
    let decoded: T = serde_json::from_value(value).map_err(|e| {
        InvocationError::SchemaViolation(format!("response does not match {}: {e}", schema.name))
    })?;
    decoded.validate().map_err(InvocationError::SchemaViolation)
}

/// Gemini-backed agent using rstructor.
pub struct GeminiAgent {
    client: GeminiClient,
    persona: String,
}

impl GeminiAgent {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.api_key()?;
        let model = parse_gemini_model(&config.agent.model);
        let client = GeminiClient::new(api_key)
            .map_err(|e| ConfigError::Invalid {
                field: "api.gemini_key".to_owned(),
                reason: e.to_string(),
            })?
            .model(model);
        Ok(Self {
            client,
            persona: config.agent.persona.clone(),
        })
    }

    fn compose(&self, prompt: &str, schema: &SchemaDescriptor) -> String {
        format!(
            r#"{}

{}

You MUST respond with a single JSON object that validates against this JSON Schema ({}):
{}

Do not include any markdown formatting, code blocks, or explanations. Only output the raw JSON object."#,
            self.persona,
            prompt,
            schema.name,
            schema.render()
        )
    }
}

#[async_trait]
impl Agent for GeminiAgent {
    async fn complete(
        &self,
        prompt: &str,
        schema: &SchemaDescriptor,
    ) -> Result<Value, InvocationError> {
        let full_prompt = self.compose(prompt, schema);
        let result = self
            .client
            .generate_with_metadata(&full_prompt)
            .await
            .map_err(|e| InvocationError::Transport(e.to_string()))?;

        let cleaned = strip_markdown_json(&result.text);
        serde_json::from_str(&cleaned).map_err(|e| {
            InvocationError::SchemaViolation(format!("response is not JSON ({e}): {cleaned}"))
        })
    }
}

/// Strip markdown code block wrappers from a JSON response
pub(crate) fn strip_markdown_json(text: &str) -> String {
    let trimmed = text.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        let without_prefix = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(end_idx) = without_prefix.rfind("```") {
            return without_prefix[..end_idx].trim().to_string();
        }
    }

    trimmed.to_string()
}

/// Parse a model string into a GeminiModel
fn parse_gemini_model(model: &str) -> GeminiModel {
    match model {
        "gemini-2.0-flash" => GeminiModel::Gemini20Flash,
        "gemini-2.5-flash" => GeminiModel::Gemini25Flash,
        "gemini-2.5-pro" => GeminiModel::Gemini25Pro,
        other => {
            tracing::warn!(model = other, "unknown Gemini model, using gemini-2.5-flash");
            GeminiModel::Gemini25Flash
        }
    }
}
