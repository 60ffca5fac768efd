//! Process-wide configuration loaded once at startup.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Speech voices per agent and bounded speech timeout
//! - 1.0.0: Initial Gemini + server settings

use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";
/// Stock voices: "Adam" for the advocate, "Rachel" for the skeptic
pub const DEFAULT_VOICE_ID_A: &str = "pNInz6obpgDQGcFmaJgB";
pub const DEFAULT_VOICE_ID_B: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_SPEECH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Text-to-speech settings. Only present when an API key is configured.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub voice_id_a: String,
    pub voice_id_b: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub speech: Option<SpeechConfig>,
    pub bind_addr: String,
    /// Empty means any origin is allowed
    pub cors_allowed_origins: Vec<String>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let gemini_api_key = get("GEMINI_API_KEY")
            .ok_or_else(|| anyhow!("GEMINI_API_KEY must be set"))?;

        let speech = match get("ELEVENLABS_API_KEY") {
            Some(api_key) => Some(SpeechConfig {
                api_key,
                base_url: get("ELEVENLABS_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_ELEVENLABS_BASE_URL.to_string()),
                model: get("ELEVENLABS_MODEL")
                    .unwrap_or_else(|| DEFAULT_ELEVENLABS_MODEL.to_string()),
                voice_id_a: get("ELEVENLABS_VOICE_ID_A")
                    .unwrap_or_else(|| DEFAULT_VOICE_ID_A.to_string()),
                voice_id_b: get("ELEVENLABS_VOICE_ID_B")
                    .unwrap_or_else(|| DEFAULT_VOICE_ID_B.to_string()),
                timeout: speech_timeout(get("SPEECH_TIMEOUT_SECS"))?,
            }),
            // Speech keys are only read when speech is enabled
            None => None,
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            speech,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            cors_allowed_origins,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Whole seconds, at least one
fn speech_timeout(raw: Option<String>) -> Result<Duration> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(DEFAULT_SPEECH_TIMEOUT_SECS));
    };

    let secs = raw
        .parse::<u64>()
        .map_err(|e| anyhow!("SPEECH_TIMEOUT_SECS is not a valid number ({raw}): {e}"))?;
    if secs == 0 {
        return Err(anyhow!("SPEECH_TIMEOUT_SECS must be at least 1"));
    }

    Ok(Duration::from_secs(secs))
}
