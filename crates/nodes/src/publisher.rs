//! Publish stage.

use std::sync::Arc;

use pipeline::ports::{NewTask, Notifier, ProviderError, TaskTracker};
use pipeline::prompts::{notification_message, task_description, task_title};
use pipeline::{
    ChannelId, EnrichmentResult, NotificationOutcome, Qualification, TaskDestinationId,
    TaskOutcome,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

pub const NO_TASK_DESTINATION: &str = "no task destination configured";
pub const NO_NOTIFY_CHANNEL: &str = "no notification channel configured";

/// Where the Publisher sends things. An absent destination skips that side
/// effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublisherConfig {
    pub task_destination: Option<TaskDestinationId>,
    pub notify_channel: Option<ChannelId>,
}

/// The two independent Publisher outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub task: TaskOutcome,
    pub notification: NotificationOutcome,
}

/// Files the lead with the task tracker and announces it on chat.
///
/// Neither side effect can fail the run, and neither blocks the other.
pub struct Publisher {
    tracker: Option<Arc<dyn TaskTracker>>,
    notifier: Option<Arc<dyn Notifier>>,
    config: PublisherConfig,
}

impl Publisher {
    /// `None` adapters mean their credentials were not configured.
    pub fn new(
        tracker: Option<Arc<dyn TaskTracker>>,
        notifier: Option<Arc<dyn Notifier>>,
        config: PublisherConfig,
    ) -> Self {
        Self {
            tracker,
            notifier,
            config,
        }
    }

    /// Creates the task, then posts the notification. Both outcomes are
    /// returned; neither failure aborts the run.
    #[instrument(name = "publish", skip_all, fields(entity = %entity_name))]
    pub async fn publish(
        &self,
        qualification: &Qualification,
        enrichment: &EnrichmentResult,
        draft: &str,
        entity_name: &str,
    ) -> Publication {
        let task = self
            .create_task(NewTask {
                title: task_title(entity_name),
                description: task_description(qualification, enrichment, draft),
            })
            .await;
        let notification = self
            .notify(&notification_message(qualification, entity_name, &task))
            .await;

        info!(
            task = outcome_label(&task),
            notification = notification_label(&notification),
            "lead published"
        );
        Publication { task, notification }
    }

    async fn create_task(&self, task: NewTask) -> TaskOutcome {
        let Some(destination) = &self.config.task_destination else {
            return TaskOutcome::Skipped {
                reason: NO_TASK_DESTINATION.to_string(),
            };
        };
        let Some(tracker) = &self.tracker else {
            return TaskOutcome::Failed {
                message: ProviderError::MissingCredentials { provider: "tracker" }.to_string(),
            };
        };

        match tracker.create_task(destination, &task).await {
            Ok(reference) => TaskOutcome::Created { reference },
            Err(err) => {
                warn!(provider = tracker.name(), error = %err, "task creation failed");
                TaskOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    async fn notify(&self, text: &str) -> NotificationOutcome {
        let Some(channel) = &self.config.notify_channel else {
            return NotificationOutcome::Skipped {
                reason: NO_NOTIFY_CHANNEL.to_string(),
            };
        };
        let Some(notifier) = &self.notifier else {
            return NotificationOutcome::Failed {
                message: ProviderError::MissingCredentials { provider: "notifier" }.to_string(),
            };
        };

        match notifier.post_message(channel, text).await {
            Ok(()) => NotificationOutcome::Sent,
            Err(err) => {
                warn!(provider = notifier.name(), error = %err, "notification failed");
                NotificationOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }
}

fn outcome_label(task: &TaskOutcome) -> &'static str {
    match task {
        TaskOutcome::Created { .. } => "created",
        TaskOutcome::Skipped { .. } => "skipped",
        TaskOutcome::Failed { .. } => "failed",
    }
}

fn notification_label(notification: &NotificationOutcome) -> &'static str {
    match notification {
        NotificationOutcome::Sent => "sent",
        NotificationOutcome::Skipped { .. } => "skipped",
        NotificationOutcome::Failed { .. } => "failed",
    }
}
