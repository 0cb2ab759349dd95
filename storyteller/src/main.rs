//! Command line entry point for story generation
//!
//! Wires the real Gemini backend into the orchestrator and prints the story
//! (or a classified error) for one request.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;

use shared::logging;
use storyteller::{
    CredentialSource, EnvCredentialSource, GeminiBackend, StaticCredentialSource, StoryConfig, StoryError,
    StoryOrchestrator, StoryRequest, StoryState, output,
};

/// Multi-part horror story generator
#[derive(Parser)]
#[command(name = "storyteller")]
#[command(about = "Generates a multi-part horror story with the Gemini API")]
pub struct Args {
    /// Story title
    #[arg(long, required_unless_present = "list_models")]
    pub title: Option<String>,

    /// Number of parts (1-10)
    #[arg(long, default_value = "3")]
    pub parts: String,

    /// Model name (defaults to the first configured model)
    #[arg(long)]
    pub model: Option<String>,

    /// API key; overrides GEMINI_API_KEY / GOOGLE_API_KEY / GOOGLE_AI_API_KEY
    #[arg(long)]
    pub api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Write the story to this file instead of stdout
    #[arg(long)]
    pub output: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// List configured models and exit
    #[arg(long)]
    pub list_models: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_tracing(Some(&args.log_level));

    let config = match StoryConfig::from_env() {
        Ok(config) => config,
        Err(e) => return report(&args, StoryError::from(e)),
    };

    if args.list_models {
        for name in config.catalog.names() {
            let marker = if name == config.catalog.default_model() { " (default)" } else { "" };
            println!("{name}{marker}");
        }
        return ExitCode::SUCCESS;
    }

    match run(&args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&args, e),
    }
}

async fn run(args: &Args, config: StoryConfig) -> Result<(), StoryError> {
    let credentials: Arc<dyn CredentialSource> = match &args.api_key {
        Some(key) => Arc::new(
            StaticCredentialSource::with_key(key.as_str())
                .map_err(|e| StoryError::validation("api_key", e.to_string()))?,
        ),
        None => Arc::new(EnvCredentialSource::new()),
    };

    let backend = GeminiBackend::new(&config.gemini, credentials)
        .map_err(|e| StoryError::setup("http_client", e.to_string()))?;

    let title = args.title.as_deref().unwrap_or_default();
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| config.catalog.default_model().to_string());
    let request = StoryRequest::parse(title, &args.parts, &model, &config.catalog)?;

    logging::log_startup(&format!(
        "story \"{}\" ({} part(s), model {})",
        request.title(),
        request.total_parts(),
        request.model_name()
    ));

    let orchestrator = StoryOrchestrator::new(backend, config);

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let watcher = tokio::spawn(async move {
        while let Some(state) = progress_rx.recv().await {
            if let StoryState::Generating { part_index, total_parts } = state {
                eprintln!("Writing part {} of {}...", part_index + 1, total_parts);
            }
        }
    });

    let result = orchestrator.generate_with_progress(request, progress_tx).await;
    let _ = watcher.await;
    let story = result?;

    let rendered = output::render(&Ok(story), args.json);
    match &args.output {
        Some(path) => output::write_output(Path::new(path), &rendered).await?,
        None => println!("{rendered}"),
    }

    Ok(())
}

fn report(args: &Args, error: StoryError) -> ExitCode {
    tracing::debug!(kind = ?error.kind(), "Exiting with failure");
    let rendered = output::render(&Err(error), args.json);
    if args.json {
        println!("{rendered}");
    } else {
        eprintln!("{rendered}");
    }
    ExitCode::FAILURE
}
