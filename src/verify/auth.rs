//! Gemini API key storage in the system keyring

use keyring::Entry;

use super::error::VerifyError;

const SERVICE_NAME: &str = "hafalan";
const API_KEY_ENTRY: &str = "gemini-api-key";

/// Reads and writes the verifier API key
pub struct ApiKeyManager;

impl ApiKeyManager {
    fn entry() -> Result<Entry, VerifyError> {
        Entry::new(SERVICE_NAME, API_KEY_ENTRY).map_err(|e| VerifyError::KeyringError(e.to_string()))
    }

    pub fn get_api_key() -> Result<String, VerifyError> {
        Self::entry()?.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => VerifyError::ApiKeyNotFound,
            _ => VerifyError::KeyringError(e.to_string()),
        })
    }

    pub fn set_api_key(key: &str) -> Result<(), VerifyError> {
        let key = key.trim();
        if !Self::validate_key_format(key) {
            return Err(VerifyError::InvalidApiKey);
        }
        Self::entry()?.set_password(key).map_err(|e| VerifyError::KeyringError(e.to_string()))
    }

    pub fn has_api_key() -> bool {
        Self::get_api_key().is_ok()
    }

    pub fn delete_api_key() -> Result<(), VerifyError> {
        Self::entry()?.delete_credential().map_err(|e| VerifyError::KeyringError(e.to_string()))
    }

    /// Google API keys start with "AIza" and use URL-safe characters
    fn validate_key_format(key: &str) -> bool {
        key.starts_with("AIza")
            && key.len() >= 30
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// Show the first six and last four characters
    pub fn mask_key(key: &str) -> String {
        if key.len() <= 12 {
            return "*".repeat(key.len());
        }
        format!("{}...{}", &key[..6], &key[key.len() - 4..])
    }
}
