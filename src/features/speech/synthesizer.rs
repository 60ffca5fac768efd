//! # Feature: Speech Synthesis
//!
//! ElevenLabs text-to-speech for agent responses. Audio comes back inline as a
//! `data:` URL so the client can play it without a second fetch.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.1.0: Per-agent voices, bounded request time
//! - 1.0.0: Initial release with ElevenLabs integration

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

use crate::core::SpeechConfig;
use crate::features::personas::PersonaId;

/// Outcome of a synthesis attempt. Failures are reported here, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl SpeechResult {
    fn ok(audio_url: String) -> Self {
        SpeechResult {
            success: true,
            message: None,
            audio_url: Some(audio_url),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        SpeechResult {
            success: false,
            message: Some(message.into()),
            audio_url: None,
        }
    }
}

#[derive(Clone)]
pub struct SpeechSynthesizer {
    client: reqwest::Client,
    config: Option<SpeechConfig>,
}

impl SpeechSynthesizer {
    pub fn new(config: Option<SpeechConfig>) -> Self {
        SpeechSynthesizer {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Voice configured for `agent`, if speech is enabled
    pub fn voice_for(&self, agent: PersonaId) -> Option<&str> {
        self.config.as_ref().map(|config| match agent {
            PersonaId::AgentA => config.voice_id_a.as_str(),
            PersonaId::AgentB => config.voice_id_b.as_str(),
        })
    }

    pub async fn synthesize_for(&self, agent: PersonaId, text: &str) -> SpeechResult {
        match self.voice_for(agent) {
            Some(voice_id) => self.synthesize(text, voice_id, None).await,
            None => SpeechResult::failed("Speech synthesis is not configured"),
        }
    }

    /// Resolve the voice from an explicit id, then the agent, then Agent A's voice
    pub async fn synthesize_request(
        &self,
        text: &str,
        agent: Option<PersonaId>,
        voice_id: Option<&str>,
    ) -> SpeechResult {
        let voice_id = match voice_id.filter(|v| !v.trim().is_empty()) {
            Some(voice_id) => voice_id.to_string(),
            None => match self.voice_for(agent.unwrap_or(PersonaId::AgentA)) {
                Some(voice_id) => voice_id.to_string(),
                None => return SpeechResult::failed("Speech synthesis is not configured"),
            },
        };

        self.synthesize(text, &voice_id, None).await
    }

    /// `model` overrides the configured model id
    pub async fn synthesize(&self, text: &str, voice_id: &str, model: Option<&str>) -> SpeechResult {
        let Some(config) = self.config.as_ref() else {
            return SpeechResult::failed("Speech synthesis is not configured");
        };

        if text.trim().is_empty() {
            return SpeechResult::failed("No text to synthesize");
        }

        let model = model.unwrap_or(&config.model);
        let start = Instant::now();
        info!(
            "Synthesizing {} characters with voice {voice_id}",
            text.chars().count()
        );

        match tokio::time::timeout(config.timeout, self.request_audio(config, text, voice_id, model))
            .await
        {
            Ok(Ok(audio)) => {
                info!(
                    "Speech synthesized in {:?} ({} bytes)",
                    start.elapsed(),
                    audio.len()
                );
                SpeechResult::ok(format!("data:audio/mpeg;base64,{}", STANDARD.encode(audio)))
            }
            Ok(Err(e)) => {
                error!("Speech synthesis failed: {e}");
                SpeechResult::failed(format!("Speech synthesis failed: {e}"))
            }
            Err(_) => {
                warn!("Speech synthesis timed out after {:?}", config.timeout);
                SpeechResult::failed(format!(
                    "Speech synthesis timed out after {}s",
                    config.timeout.as_secs_f32()
                ))
            }
        }
    }

    async fn request_audio(
        &self,
        config: &SpeechConfig,
        text: &str,
        voice_id: &str,
        model: &str,
    ) -> Result<Vec<u8>> {
        let url = format!(
            "{}/v1/text-to-speech/{voice_id}",
            config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &config.api_key)
            .header("Accept", "audio/mpeg")
            .json(&json!({ "text": text, "model_id": model }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "ElevenLabs API error ({}): {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            ));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
