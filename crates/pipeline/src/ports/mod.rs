//! Port traits for every external collaborator.
//!
//! One trait per provider, one method per operation. Infrastructure crates
//! implement these; the `nodes` crate consumes them as `Arc<dyn Trait>`, which
//! lets tests substitute in-memory fakes without network access.

mod llm;
mod providers;
mod search;

pub use llm::{CompletionRequest, LanguageModel, LlmError, OutputSchema};
pub use providers::{
    EnrichmentProvider, EnrichmentQuery, NewTask, Notifier, ProviderError, TaskTracker,
};
pub use search::{Embedder, SearchBackend, SearchError};
