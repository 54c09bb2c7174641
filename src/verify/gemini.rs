//! HTTP client for the Gemini API

use std::time::Duration;

use reqwest::Client;
use tokio_util::sync::CancellationToken;

use super::error::VerifyError;
use super::models::{GenerateContentRequest, GenerateContentResponse, GenerationConfig, Verdict};

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    /// Default API base
    pub const DEFAULT_ENDPOINT: &'static str = "https://generativelanguage.googleapis.com/v1beta/models";
    /// Default model
    pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash";

    pub fn new(
        api_key: String,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VerifyError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_key, model: model.into(), endpoint: endpoint.into() })
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", self.endpoint.trim_end_matches('/'), self.model)
    }

    /// Send one prompt and return the reply text
    pub async fn generate(
        &self,
        request: &GenerateContentRequest,
        cancel_token: &CancellationToken,
    ) -> Result<String, VerifyError> {
        let send = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .header("content-type", "application/json")
            .json(request)
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => return Err(VerifyError::Cancelled),
            response = send => response?,
        };

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(VerifyError::RateLimited { retry_after_seconds: retry_after });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VerifyError::ApiError { status: status.as_u16(), message });
        }

        let body = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => return Err(VerifyError::Cancelled),
            body = response.text() => body?,
        };
        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        parsed
            .text()
            .map(str::to_string)
            .ok_or_else(|| VerifyError::InvalidResponse("reply had no text".to_string()))
    }

    /// Ask the model whether `spoken` is a faithful recitation of `expected`
    pub async fn judge(
        &self,
        expected: &str,
        spoken: &str,
        learner_name: &str,
        cancel_token: &CancellationToken,
    ) -> Result<Verdict, VerifyError> {
        let request = GenerateContentRequest::prompt(
            verdict_prompt(expected, spoken, learner_name),
            GenerationConfig::VERDICT,
        );
        let text = self.generate(&request, cancel_token).await?;
        Verdict::extract(&text)
    }

    /// Ask the model for a short opening line
    pub async fn greet(
        &self,
        learner_name: &str,
        juz: &[u32],
        cancel_token: &CancellationToken,
    ) -> Result<String, VerifyError> {
        let request =
            GenerateContentRequest::prompt(greeting_prompt(learner_name, juz), GenerationConfig::GREETING);
        Ok(self.generate(&request, cancel_token).await?.trim().to_string())
    }
}

/// Juz numbers joined for a sentence: "29 dan 30"
pub(crate) fn juz_list(juz: &[u32]) -> String {
    juz.iter().map(u32::to_string).collect::<Vec<_>>().join(" dan ")
}

fn verdict_prompt(expected: &str, spoken: &str, learner_name: &str) -> String {
    format!(
        "Kamu adalah ustadz yang menguji hafalan santri bernama {learner_name}.\n\n\
         Ayat yang seharusnya dibaca:\n\"{expected}\"\n\n\
         Hasil speech-to-text bacaan santri (bisa ada salah transkripsi):\n\"{spoken}\"\n\n\
         Bandingkan keduanya. Abaikan perbedaan harakat, ejaan huruf yang mirip, dan \
         kesalahan kecil transkripsi. Beri skor 0-100 dan tanggapan singkat dalam \
         Bahasa Indonesia.\n\n\
         Jawab HANYA dengan JSON: {{\"benar\": true/false, \"skor\": 0-100, \"feedback\": \"...\"}}"
    )
}

fn greeting_prompt(learner_name: &str, juz: &[u32]) -> String {
    format!(
        "Buat sapaan singkat (paling banyak dua kalimat) sebagai ustadz untuk santri bernama \
         {learner_name}. Sebutkan bahwa hari ini latihan sambung ayat dari Juz {}. \
         Gunakan bahasa Indonesia yang ramah. Jawab dengan teks sapaan saja.",
        juz_list(juz)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(
            "AIza-test".to_string(),
            GeminiClient::DEFAULT_MODEL,
            "https://example.invalid/v1beta/models/",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn url_joins_endpoint_and_model() {
        assert_eq!(
            client().url(),
            "https://example.invalid/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn prompts_carry_inputs() {
        let prompt = verdict_prompt("قل هو", "kul huwa", "Amina");
        assert!(prompt.contains("Amina"));
        assert!(prompt.contains("قل هو"));
        assert!(prompt.contains("\"benar\""));
        assert!(greeting_prompt("Bilal", &[29, 30]).contains("Juz 29 dan 30"));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        let request = GenerateContentRequest::prompt("hi", GenerationConfig::VERDICT);
        let err = client().generate(&request, &token).await.unwrap_err();
        assert!(matches!(err, VerifyError::Cancelled));
    }
}
