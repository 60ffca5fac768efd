use anyhow::Result;
use dotenvy::dotenv;
use log::{info, warn};
use std::sync::Arc;

use policypulse::api::{serve, AppState};
use policypulse::core::Config;
use policypulse::features::debate::DualAgentOrchestrator;
use policypulse::features::grounding::{GeminiClient, GroundingAdapter, ModelProvider};
use policypulse::features::personas::PersonaRegistry;
use policypulse::features::speech::SpeechSynthesizer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting PolicyPulse API...");
    info!("🤖 Model: {}", config.gemini_model);

    let gemini = GeminiClient::from_config(&config);
    let model = gemini.model().to_string();
    let provider: Arc<dyn ModelProvider> = Arc::new(gemini);
    let personas = Arc::new(PersonaRegistry::new());
    let adapter = Arc::new(GroundingAdapter::new(provider));
    let orchestrator = Arc::new(DualAgentOrchestrator::new(adapter, personas.clone()));

    let speech = Arc::new(SpeechSynthesizer::new(config.speech.clone()));
    if speech.is_enabled() {
        info!("🔊 Speech synthesis enabled");
    } else {
        warn!("ELEVENLABS_API_KEY not set. Speech synthesis is disabled.");
    }

    if config.cors_allowed_origins.is_empty() {
        info!("🌐 CORS: any origin");
    } else {
        info!("🌐 CORS: {}", config.cors_allowed_origins.join(", "));
    }

    let state = AppState {
        orchestrator,
        personas,
        speech,
        model,
    };

    serve(&config, state).await
}
