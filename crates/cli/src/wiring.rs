//! Builds the concrete adapters and the executor from configuration.
//!
//! Optional adapters are only constructed when their credentials are present;
//! the stages treat a missing adapter as a degraded step, not an error.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use enrichment::{ClearbitClient, HunterClient};
use llm::{OllamaChat, OllamaEmbedder};
use nodes::{Drafter, Enricher, PipelineExecutor, Publisher, PublisherConfig, Qualifier, Retriever};
use pipeline::ports::{EnrichmentProvider, Notifier, TaskTracker};
use pipeline::{ChannelId, TaskDestinationId};
use search::QdrantSearch;
use tracing::{info, warn};
use tracker::{DiscordNotifier, NotionTracker, TrelloTracker};

use crate::config::{EnrichmentProviderKind, ScoutConfig, TrackerProviderKind};

pub fn build_executor(config: &ScoutConfig) -> anyhow::Result<PipelineExecutor> {
    let timeout = Duration::from_secs(config.llm.timeout_secs);
    let retry = config.retry.to_retry_config();

    let model = Arc::new(
        OllamaChat::new(&config.llm.base_url, &config.llm.model, timeout)
            .context("failed to create language model client")?,
    );
    let embedder = Arc::new(
        OllamaEmbedder::new(&config.llm.base_url, config.embedding_model(), timeout)
            .context("failed to create embedding client")?,
    );
    let search = Arc::new(
        QdrantSearch::new(&config.search.url, &config.search.collection, embedder, timeout)
            .context("failed to create search client")?
            .with_top_k(config.search.top_k),
    );

    let publisher_config = PublisherConfig {
        task_destination: config
            .tracker
            .destination
            .as_deref()
            .and_then(TaskDestinationId::new),
        notify_channel: config.notifier.channel.as_deref().and_then(ChannelId::new),
    };

    Ok(PipelineExecutor::new(
        Retriever::new(search, retry),
        Qualifier::new(model.clone(), retry).with_temperature(config.llm.qualify_temperature),
        Enricher::new(enrichment_provider(config)?),
        Drafter::new(model, retry).with_temperature(config.llm.draft_temperature),
        Publisher::new(task_tracker(config)?, notifier(config)?, publisher_config),
    ))
}

fn enrichment_provider(config: &ScoutConfig) -> anyhow::Result<Option<Arc<dyn EnrichmentProvider>>> {
    let section = &config.enrichment;
    let provider: Option<Arc<dyn EnrichmentProvider>> = match section.provider {
        EnrichmentProviderKind::Hunter => match &section.hunter_api_key {
            Some(key) => Some(Arc::new(HunterClient::new(key)?)),
            None => None,
        },
        EnrichmentProviderKind::Clearbit => match &section.clearbit_api_key {
            Some(key) => Some(Arc::new(ClearbitClient::new(key)?)),
            None => None,
        },
    };
    log_adapter("enrichment", provider.as_ref().map(|p| p.name()));
    Ok(provider)
}

fn task_tracker(config: &ScoutConfig) -> anyhow::Result<Option<Arc<dyn TaskTracker>>> {
    let section = &config.tracker;
    let tracker: Option<Arc<dyn TaskTracker>> = match section.provider {
        TrackerProviderKind::Trello => match (&section.trello_api_key, &section.trello_token) {
            (Some(key), Some(token)) => Some(Arc::new(TrelloTracker::new(key, token)?)),
            _ => None,
        },
        TrackerProviderKind::Notion => match &section.notion_api_key {
            Some(key) => Some(Arc::new(NotionTracker::new(key)?)),
            None => None,
        },
    };
    log_adapter("tracker", tracker.as_ref().map(|t| t.name()));
    Ok(tracker)
}

fn notifier(config: &ScoutConfig) -> anyhow::Result<Option<Arc<dyn Notifier>>> {
    let notifier: Option<Arc<dyn Notifier>> = match &config.notifier.discord_bot_token {
        Some(token) => Some(Arc::new(DiscordNotifier::new(token)?)),
        None => None,
    };
    log_adapter("notifier", notifier.as_ref().map(|n| n.name()));
    Ok(notifier)
}

fn log_adapter(role: &'static str, name: Option<&'static str>) {
    match name {
        Some(name) => info!(role, provider = name, "adapter configured"),
        None => warn!(role, "credentials not configured, step will degrade"),
    }
}
