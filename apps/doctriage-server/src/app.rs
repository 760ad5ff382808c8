//! Application state and initialization

use anyhow::{Context, Result};
use doctriage_classify::{
    ClassificationPipeline, GeminiClassifier, NoopClassifier, PipelineConfig, PrimaryClassifier,
};
use doctriage_core::{AppConfig, BlobStore, ClassifierConfig, DocumentRepository};
use doctriage_ingestion::ExtractionService;
use doctriage_notify::{LogNotifier, NotifierChain, WebhookNotifier};
use doctriage_store::{InMemoryRepository, JsonFileRepository, LocalBlobStore};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cli::Args;
use crate::server::Server;

/// Environment variable consulted when no classifier key is configured.
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ClassificationPipeline>,
    pub extraction: Arc<ExtractionService>,
    pub documents: Arc<dyn DocumentRepository>,
    pub blobs: Arc<dyn BlobStore>,
    pub notifier: Arc<NotifierChain>,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create a new application state with all dependencies
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        info!("Initializing application components");

        let classifier = build_classifier(&config.classifier)?;
        info!(classifier = classifier.name(), "Primary classifier ready");

        let pipeline = ClassificationPipeline::new(
            classifier,
            PipelineConfig::from(&config.classifier),
        );

        let extraction = ExtractionService::from_config(&config.extraction);
        info!(extensions = ?extraction.registry().extensions(), "Text extractors registered");

        let documents: Arc<dyn DocumentRepository> = match &config.storage.records_path {
            Some(path) => Arc::new(
                JsonFileRepository::open(path)
                    .await
                    .with_context(|| format!("Failed to open records file {}", path.display()))?,
            ),
            None => {
                info!("No records path configured, documents are kept in memory");
                Arc::new(InMemoryRepository::new())
            }
        };

        let blobs = Arc::new(LocalBlobStore::new(&config.storage.upload_dir));

        let mut notifier = NotifierChain::new().with(Arc::new(LogNotifier::new()));
        if let Some(webhook) = WebhookNotifier::from_config(&config.notification)
            .context("Invalid webhook configuration")?
        {
            info!(url = webhook.url(), signed = webhook.is_signed(), "Webhook notifications enabled");
            notifier.push(Arc::new(webhook));
        }

        Ok(Self {
            pipeline: Arc::new(pipeline),
            extraction: Arc::new(extraction),
            documents,
            blobs,
            notifier: Arc::new(notifier),
            max_upload_bytes: config.server.max_upload_bytes,
        })
    }
}

/// Picks the primary classifier for the configured provider.
fn build_classifier(config: &ClassifierConfig) -> Result<Arc<dyn PrimaryClassifier>> {
    if !config.is_enabled() {
        info!("Primary classifier disabled, keyword rules only");
        return Ok(Arc::new(NoopClassifier));
    }

    match config.provider.trim().to_ascii_lowercase().as_str() {
        "gemini" => {
            let mut config = config.clone();
            if config.api_key.trim().is_empty() {
                config.api_key = std::env::var(GEMINI_API_KEY_ENV).unwrap_or_default();
            }

            let classifier =
                GeminiClassifier::from_config(&config).context("Failed to build Gemini client")?;
            if !classifier.has_credential() {
                warn!("No Gemini API key configured, every document will use the fallback classification");
            }
            Ok(Arc::new(classifier))
        }
        other => anyhow::bail!("unknown classifier provider: {}", other),
    }
}

/// Main application
pub struct App {
    config: AppConfig,
    state: AppState,
}

impl App {
    /// Build the application with all dependencies
    pub async fn build(args: Args) -> Result<Self> {
        args.validate().context("Invalid command line arguments")?;

        let mut config = match &args.config {
            Some(path) => AppConfig::load_from_file(&path.to_string_lossy())
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => AppConfig::load().context("Failed to load configuration")?,
        };
        if let Some(port) = args.port {
            config.server.port = port;
        }

        let state = AppState::from_config(&config).await?;

        Ok(Self { config, state })
    }

    /// Run the application
    pub async fn run(self) -> Result<()> {
        info!("Starting server");
        info!("HTTP address: {}", self.config.server.address());

        let server = Server::new(self.config.server, self.state);
        server.run().await?;

        Ok(())
    }
}
