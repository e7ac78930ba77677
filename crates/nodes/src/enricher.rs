//! Enrich stage.

use std::sync::Arc;

use pipeline::ports::{EnrichmentProvider, EnrichmentQuery, ProviderError};
use pipeline::{identified_entity, EnrichmentResult};
use tracing::{debug, instrument, warn};

/// Looks up contact and company data for the identified entity.
///
/// Never fails: provider errors, including an unconfigured provider, become
/// [`EnrichmentResult::Error`].
pub struct Enricher {
    provider: Option<Arc<dyn EnrichmentProvider>>,
}

impl Enricher {
    /// `None` means no provider credentials were configured.
    pub fn new(provider: Option<Arc<dyn EnrichmentProvider>>) -> Self {
        Self { provider }
    }

    /// Looks up `entity_name`. Never fails: unidentified entities and provider
    /// errors become markers in the result.
    #[instrument(name = "enrich", skip(self))]
    pub async fn enrich(&self, entity_name: &str) -> EnrichmentResult {
        let Some(entity) = identified_entity(entity_name) else {
            debug!("no entity identified, skipping lookup");
            return EnrichmentResult::NoEntity;
        };

        let Some(provider) = &self.provider else {
            let err = ProviderError::MissingCredentials {
                provider: "enrichment",
            };
            warn!(error = %err, "enrichment unavailable");
            return EnrichmentResult::error(err.to_string());
        };

        match provider.lookup(&EnrichmentQuery::by_name(entity)).await {
            Ok(data) => {
                debug!(provider = provider.name(), fields = data.len(), "entity enriched");
                EnrichmentResult::Success { data }
            }
            Err(err) => {
                warn!(provider = provider.name(), error = %err, "enrichment failed");
                EnrichmentResult::error(err.to_string())
            }
        }
    }
}
