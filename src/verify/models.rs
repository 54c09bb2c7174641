//! Request and response bodies for the Gemini `generateContent` API

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::VerifyError;

/// First `{` through last `}` of a reply
static JSON_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

/// One text part of a prompt or reply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Sampling settings
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Low temperature for verdicts
    pub const VERDICT: Self = Self { temperature: 0.3, max_output_tokens: 200 };
    /// Livelier settings for greetings
    pub const GREETING: Self = Self { temperature: 0.8, max_output_tokens: 100 };
}

/// Request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// A single-prompt request
    pub fn prompt(text: impl Into<String>, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content { parts: vec![Part { text: text.into() }] }],
            generation_config,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
}

/// Response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Verdict the model is asked to produce
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Verdict {
    pub benar: bool,
    pub skor: u8,
    #[serde(default)]
    pub feedback: String,
}

impl Verdict {
    /// Pull the JSON verdict out of free-form reply text
    pub fn extract(text: &str) -> Result<Self, VerifyError> {
        let block = JSON_BLOCK
            .find(text)
            .ok_or_else(|| VerifyError::InvalidResponse("no JSON object in reply".to_string()))?;
        let mut verdict: Verdict = serde_json::from_str(block.as_str())?;
        verdict.skor = verdict.skor.min(100);
        Ok(verdict)
    }
}
