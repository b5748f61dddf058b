use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xtts_narrator::cli::Cli;
use xtts_narrator::controllers::NarrateController;
use xtts_narrator::domain::tts::{clean_text, ChunkPipeline, NarrationService};
use xtts_narrator::error::{AppError, AppResult};
use xtts_narrator::infrastructure::audio::AudioAssembler;
use xtts_narrator::infrastructure::config::{
    Config, ConfigStore, LogFormat, StdinPrompt, XTTS_FOLDER_KEY,
};
use xtts_narrator::infrastructure::repositories::XttsProcessRepository;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => return AppError::from(e).into_exit_code(),
    };

    // Initialize logging
    init_logging(&config);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => e.into_exit_code(),
    }
}

async fn run(cli: Cli, config: Config) -> AppResult<()> {
    let text = NarrateController::read_input(&cli)?;
    if clean_text(&text).is_empty() {
        println!("Empty text, nothing to synthesize.");
        return Ok(());
    }
    NarrateController::check_voice_sample(&cli)?;

    let backend_root = resolve_backend_root(&cli, &config)?;
    tracing::info!(
        backend_root = %backend_root.display(),
        output = %cli.output.display(),
        "Starting narration"
    );

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Repositories
    let tts_repo = Arc::new(XttsProcessRepository::new(
        config.backend_command(&backend_root),
        config.timeout,
    ));

    // 2. Services
    let assembler = AudioAssembler::new(config.chunk_pause, config.bitrate_kbps);
    let pipeline = ChunkPipeline::new(tts_repo, assembler, config.retry_policy())
        .with_chunk_extension(config.chunk_extension.clone());
    let narration_service = Arc::new(NarrationService::new(pipeline));

    // 3. Controllers
    let controller = NarrateController::new(narration_service, config.max_chars);

    controller.narrate(&cli, text).await?;
    Ok(())
}

/// Backend folder from `--xtts-folder`, else from the settings file or a prompt
fn resolve_backend_root(cli: &Cli, config: &Config) -> AppResult<PathBuf> {
    let store = ConfigStore::new(&config.database_file);

    if let Some(raw) = &cli.xtts_folder {
        return store.establish(XTTS_FOLDER_KEY, raw)?.ok_or_else(|| {
            AppError::BadInput(format!("--xtts-folder '{}' is not a directory", raw))
        });
    }

    Ok(store.resolve_path(XTTS_FOLDER_KEY, &mut StdinPrompt)?)
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "xtts_narrator=info".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(config.is_development())
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
