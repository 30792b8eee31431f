use narrator::domain::narration::{NarrationService, NarrationServiceApi};
use narrator::error::AppResult;
use narrator::infrastructure::audio::{AudioAssembler, CommandMuxer};
use narrator::infrastructure::config::{Config, LogFormat, Provider};
use narrator::infrastructure::repositories::{
    GoogleTtsRepository, PollyTtsRepository, TtsRepository,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    if let Err(err) = run(config).await {
        tracing::error!(stage = err.stage(), error = %err, "Narration failed");
        return Err(err.into());
    }

    Ok(())
}

async fn run(config: Config) -> AppResult<()> {
    tracing::info!(
        input = %config.input_file.display(),
        output = %config.output_file.display(),
        provider = ?config.provider,
        encoding = %config.audio_encoding,
        dry_run = config.dry_run,
        "Starting narration"
    );

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Synthesis provider
    let tts_repo = create_tts_repository(&config).await?;

    // 2. Audio assembly
    let assembler = AudioAssembler::new(Arc::new(CommandMuxer::new(config.muxer_path.clone())));

    // 3. Narration service
    let service = NarrationService::new(config.narration_settings(), tts_repo, assembler)?;

    let outcome = service
        .narrate(&config.input_file, &config.output_file)
        .await?;

    match outcome.audio {
        Some(audio) => tracing::info!(
            path = %audio.path.display(),
            chunk_count = outcome.chunk_count,
            bytes_written = audio.bytes_written,
            frames = ?audio.frames,
            "Done! Audio saved"
        ),
        None => tracing::info!(
            chunk_count = outcome.chunk_count,
            wire_bytes = outcome.wire_bytes,
            voice = %outcome.voice.name,
            "Dry run finished, nothing synthesized"
        ),
    }

    Ok(())
}

async fn create_tts_repository(config: &Config) -> AppResult<Arc<dyn TtsRepository>> {
    match config.provider {
        Provider::Google => {
            let api_key = config.google_api_key.clone().unwrap_or_default();
            if api_key.is_empty() {
                tracing::warn!("GOOGLE_API_KEY not set; only a dry run can succeed");
            }
            tracing::info!(endpoint = %config.google_endpoint, "Google Cloud TTS client initialized");
            Ok(Arc::new(GoogleTtsRepository::new(
                config.google_endpoint.clone(),
                api_key,
            )))
        }
        Provider::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
            let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
            if !has_access_key || !has_secret_key {
                tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (instance metadata, etc.)");
            }

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;

            tracing::info!(region = ?aws_config.region(), "AWS configuration loaded");

            let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
            Ok(Arc::new(PollyTtsRepository::new(polly_client)))
        }
    }
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "narrator=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "narrator=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
