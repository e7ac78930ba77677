//! In-memory port implementations for stage and driver tests.

use std::sync::Mutex;

use async_trait::async_trait;
use pipeline::ports::{
    CompletionRequest, EnrichmentProvider, EnrichmentQuery, LanguageModel, LlmError, NewTask,
    Notifier, OutputSchema, ProviderError, SearchBackend, SearchError, TaskTracker,
};
use pipeline::{ChannelId, Passage, TaskDestinationId, TaskReference};
use serde_json::{Map, Value};

pub const FAKE_DRAFT: &str = "Hello, we build web projects.";

// ---------------------------------------------------------------------------

pub struct FakeSearch {
    response: Result<Vec<Passage>, SearchError>,
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn returning(passages: Vec<Passage>) -> Self {
        Self {
            response: Ok(passages),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: SearchError) -> Self {
        Self {
            response: Err(err),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for FakeSearch {
    async fn search(&self, query: &str) -> Result<Vec<Passage>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------

pub struct FakeModel {
    structured: Result<Value, LlmError>,
    text: Result<String, LlmError>,
    structured_requests: Mutex<Vec<CompletionRequest>>,
    text_requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeModel {
    fn new(structured: Result<Value, LlmError>, text: Result<String, LlmError>) -> Self {
        Self {
            structured,
            text,
            structured_requests: Mutex::new(Vec::new()),
            text_requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers structured calls with `value` and drafts with [`FAKE_DRAFT`].
    pub fn structured(value: Value) -> Self {
        Self::new(Ok(value), Ok(FAKE_DRAFT.to_string()))
    }

    pub fn drafting(text: &str) -> Self {
        Self::new(
            Err(LlmError::MalformedResponse {
                message: "no structured answer configured".into(),
            }),
            Ok(text.to_string()),
        )
    }

    pub fn failing_structured(err: LlmError) -> Self {
        Self::new(Err(err), Ok(FAKE_DRAFT.to_string()))
    }

    pub fn failing_text(err: LlmError) -> Self {
        Self::new(Ok(Value::Null), Err(err))
    }

    pub fn with_text_failure(mut self, err: LlmError) -> Self {
        self.text = Err(err);
        self
    }

    pub fn structured_requests(&self) -> Vec<CompletionRequest> {
        self.structured_requests.lock().unwrap().clone()
    }

    pub fn text_requests(&self) -> Vec<CompletionRequest> {
        self.text_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.text_requests.lock().unwrap().push(request.clone());
        self.text.clone()
    }

    async fn complete_structured(
        &self,
        request: &CompletionRequest,
        _schema: &OutputSchema,
    ) -> Result<Value, LlmError> {
        self.structured_requests.lock().unwrap().push(request.clone());
        self.structured.clone()
    }
}

// ---------------------------------------------------------------------------

pub struct FakeEnrichment {
    response: Result<Map<String, Value>, ProviderError>,
    queries: Mutex<Vec<EnrichmentQuery>>,
}

impl FakeEnrichment {
    /// `data` must be a JSON object.
    pub fn returning(data: Value) -> Self {
        let Value::Object(map) = data else {
            panic!("fake enrichment data must be an object");
        };
        Self {
            response: Ok(map),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            response: Err(err),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<EnrichmentQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnrichmentProvider for FakeEnrichment {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn lookup(&self, query: &EnrichmentQuery) -> Result<Map<String, Value>, ProviderError> {
        self.queries.lock().unwrap().push(query.clone());
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------

pub struct FakeTracker {
    response: Result<TaskReference, ProviderError>,
    tasks: Mutex<Vec<(TaskDestinationId, NewTask)>>,
}

impl FakeTracker {
    pub fn returning(reference: &str) -> Self {
        Self {
            response: Ok(TaskReference::new(reference).unwrap()),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            response: Err(err),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn tasks(&self) -> Vec<(TaskDestinationId, NewTask)> {
        self.tasks.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskTracker for FakeTracker {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn create_task(
        &self,
        destination: &TaskDestinationId,
        task: &NewTask,
    ) -> Result<TaskReference, ProviderError> {
        self.tasks
            .lock()
            .unwrap()
            .push((destination.clone(), task.clone()));
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------

pub struct FakeNotifier {
    response: Result<(), ProviderError>,
    messages: Mutex<Vec<(ChannelId, String)>>,
}

impl FakeNotifier {
    pub fn ok() -> Self {
        Self {
            response: Ok(()),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            response: Err(err),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<(ChannelId, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn post_message(&self, channel: &ChannelId, text: &str) -> Result<(), ProviderError> {
        self.messages
            .lock()
            .unwrap()
            .push((channel.clone(), text.to_string()));
        self.response.clone()
    }
}
