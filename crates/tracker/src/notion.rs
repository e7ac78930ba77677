use async_trait::async_trait;
use pipeline::ports::{NewTask, ProviderError, TaskTracker};
use pipeline::{TaskDestinationId, TaskReference};
use serde_json::{json, Value};
use tracing::debug;

use crate::{api_url, http_client, send};

const PROVIDER: &str = "notion";
const API_BASE_URL: &str = "https://api.notion.com";
const NOTION_VERSION: &str = "2022-06-28";

/// Notion limits a single rich-text run to this many characters.
const RICH_TEXT_LIMIT: usize = 2000;

/// Adds one page per lead to a Notion database. The destination id is the
/// database id; the database needs a `Title` title property and a `Details`
/// rich-text property.
pub struct NotionTracker {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NotionTracker {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client(PROVIDER)?,
            base_url: API_BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Splits `text` into rich-text runs no longer than [`RICH_TEXT_LIMIT`]
/// characters.
fn rich_text(text: &str) -> Vec<Value> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(RICH_TEXT_LIMIT)
        .map(|chunk| json!({ "text": { "content": chunk.iter().collect::<String>() } }))
        .collect()
}

fn page_body(database_id: &str, task: &NewTask) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Title": { "title": rich_text(&task.title) },
            "Details": { "rich_text": rich_text(&task.description) }
        }
    })
}

#[async_trait]
impl TaskTracker for NotionTracker {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn create_task(
        &self,
        destination: &TaskDestinationId,
        task: &NewTask,
    ) -> Result<TaskReference, ProviderError> {
        debug!(database = %destination, title = %task.title, "creating notion page");

        let request = self
            .http
            .post(api_url(&self.base_url, "/v1/pages"))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&page_body(destination.as_str(), task));

        let page = send(PROVIDER, request).await?;
        page.get("url")
            .and_then(Value::as_str)
            .and_then(TaskReference::new)
            .ok_or(ProviderError::InvalidResponse {
                provider: PROVIDER,
                message: "page has no url".to_string(),
            })
    }
}
