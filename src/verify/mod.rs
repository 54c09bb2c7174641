//! Recitation verification
//!
//! [`Verifier`] is chosen once at startup: `Gemini` when a key is stored and
//! the verifier is enabled, `Unavailable` otherwise. Every remote failure
//! degrades to the local edit-distance check, so a verdict is always
//! produced.

pub mod auth;
pub mod error;
pub mod gemini;
pub mod local;
pub mod models;

use std::time::Duration;

pub use auth::ApiKeyManager;
pub use error::VerifyError;
pub use gemini::GeminiClient;
pub use local::verify_locally;

use tokio_util::sync::CancellationToken;

use crate::config::VerifierConfig;

/// Who produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationSource {
    Remote,
    Local,
}

/// Outcome of checking one recitation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub correct: bool,
    /// Similarity score, 0 to 100
    pub score: u8,
    pub feedback: String,
    pub source: VerificationSource,
}

/// Verification strategy
pub enum Verifier {
    Gemini(GeminiClient),
    Unavailable,
}

impl Verifier {
    /// Build the verifier from config and the keyring
    pub fn from_config(config: &VerifierConfig) -> Self {
        if !config.enabled {
            return Verifier::Unavailable;
        }

        let key = match ApiKeyManager::get_api_key() {
            Ok(key) => key,
            Err(e) => {
                tracing::info!("Remote verifier disabled: {}", e);
                return Verifier::Unavailable;
            }
        };

        match GeminiClient::new(
            key,
            config.model.clone(),
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_seconds),
        ) {
            Ok(client) => Verifier::Gemini(client),
            Err(e) => {
                tracing::warn!("Failed to build verifier client: {}", e);
                Verifier::Unavailable
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Verifier::Gemini(_))
    }

    /// Judge a recitation. Never fails; falls back to the local check.
    pub async fn verify(
        &self,
        expected: &str,
        spoken: &str,
        learner_name: &str,
        cancel_token: &CancellationToken,
    ) -> Verification {
        let Verifier::Gemini(client) = self else {
            return verify_locally(expected, spoken);
        };

        match client.judge(expected, spoken, learner_name, cancel_token).await {
            Ok(verdict) => Verification {
                correct: verdict.benar,
                score: verdict.skor,
                feedback: verdict.feedback,
                source: VerificationSource::Remote,
            },
            Err(e) => {
                tracing::warn!("Verifier unavailable, using local check: {}", e);
                verify_locally(expected, spoken)
            }
        }
    }

    /// Opening line for a voice session
    pub async fn greeting(&self, learner_name: &str, juz: &[u32], cancel_token: &CancellationToken) -> String {
        if let Verifier::Gemini(client) = self {
            match client.greet(learner_name, juz, cancel_token).await {
                Ok(text) if !text.is_empty() => return text,
                Ok(_) => {}
                Err(e) => tracing::warn!("Greeting unavailable: {}", e),
            }
        }
        fallback_greeting(learner_name, juz)
    }
}

/// Greeting used without the remote verifier
pub fn fallback_greeting(learner_name: &str, juz: &[u32]) -> String {
    format!(
        "Assalamualaikum {learner_name}! Hari ini kita latihan sambung ayat dari Juz {} ya. Siap?",
        gemini::juz_list(juz)
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn unavailable_uses_local_check() {
        let token = CancellationToken::new();
        let verdict = Verifier::Unavailable.verify("قُلْ هُوَ", "قل هو", "Amina", &token).await;
        assert!(verdict.correct);
        assert_eq!(verdict.score, 100);
        assert_eq!(verdict.source, VerificationSource::Local);
    }

    #[tokio::test]
    async fn remote_failure_falls_back() {
        let client = GeminiClient::new(
            "AIza-test".into(),
            GeminiClient::DEFAULT_MODEL,
            GeminiClient::DEFAULT_ENDPOINT,
            Duration::from_secs(1),
        )
        .unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let verdict = Verifier::Gemini(client).verify("قل هو", "قل", "Amina", &token).await;
        assert_eq!(verdict.source, VerificationSource::Local);
        assert!(!verdict.correct);
    }

    #[tokio::test]
    async fn fallback_greeting_names_learner_and_juz() {
        let token = CancellationToken::new();
        let greeting = Verifier::Unavailable.greeting("Bilal", &[30], &token).await;
        assert_eq!(greeting, "Assalamualaikum Bilal! Hari ini kita latihan sambung ayat dari Juz 30 ya. Siap?");
    }

    #[test]
    fn disabled_config_is_unavailable() {
        let config = VerifierConfig { enabled: false, ..VerifierConfig::default() };
        assert!(!Verifier::from_config(&config).is_remote());
    }
}
