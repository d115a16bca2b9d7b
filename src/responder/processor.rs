use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::models::{Message, ThreadMessage};
use crate::error::{AppError, AppResult};
use crate::gateway::MailboxGateway;
use crate::mail::mime;

use super::compose::{self, ReplyEnvelope};
use super::labels::LabelRegistry;

const SENT_LABEL: &str = "SENT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    ResolveLabel,
    ApplyLabel,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::ResolveLabel => "resolve label",
            Stage::ApplyLabel => "apply label",
        };
        f.write_str(name)
    }
}

/// Why a message was labeled without a reply going out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyReplied,
    NoRecipients,
    SendFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyReplied => f.write_str("thread already has a reply"),
            SkipReason::NoRecipients => f.write_str("no recipients in To or Cc"),
            SkipReason::SendFailed(error) => write!(f, "send failed: {error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProcessingOutcome {
    /// Reply sent and marker label applied.
    Completed,
    /// Marker label applied, no reply sent.
    Skipped { reason: SkipReason },
    /// Message left unhandled; it stays eligible for the next poll cycle.
    Failed { stage: Stage, error: String },
}

impl ProcessingOutcome {
    fn failed(stage: Stage, error: &AppError) -> Self {
        Self::Failed {
            stage,
            error: error.to_string(),
        }
    }
}

/// Runs one message through reply and labeling.
///
/// Every step is safe to repeat: the thread check keeps a second pass from
/// replying twice and label resolution converges on one id, so a message that
/// failed half way can simply be picked up again by a later cycle.
pub struct MessageProcessor<'a, G: ?Sized> {
    gateway: &'a G,
    labels: LabelRegistry<'a, G>,
    label_name: String,
    reply_body: String,
}

impl<'a, G: MailboxGateway + ?Sized> MessageProcessor<'a, G> {
    pub fn new(
        gateway: &'a G,
        label_name: impl Into<String>,
        reply_body: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            labels: LabelRegistry::new(gateway),
            label_name: label_name.into(),
            reply_body: reply_body.into(),
        }
    }

    pub async fn process(&self, message_id: &str) -> ProcessingOutcome {
        let message = match self.gateway.get_message(message_id).await {
            Ok(message) => message,
            Err(err) => {
                warn!(message_id, error = %err, "failed to fetch message");
                return ProcessingOutcome::failed(Stage::Fetch, &err);
            }
        };

        let reply = compose::compose(&message, &self.reply_body);
        let skipped = self.reply(&message, &reply).await.err();

        let label_id = match self.labels.ensure_label(&self.label_name).await {
            Ok(id) => id,
            Err(err) => {
                warn!(message_id, label = %self.label_name, error = %err, "failed to resolve marker label");
                return ProcessingOutcome::failed(Stage::ResolveLabel, &err);
            }
        };

        if let Err(err) = self
            .gateway
            .modify_message(message_id, std::slice::from_ref(&label_id))
            .await
        {
            if matches!(err, AppError::NotFound(_)) {
                self.labels.forget(&self.label_name);
            }
            warn!(message_id, label_id = %label_id, error = %err, "failed to apply marker label");
            return ProcessingOutcome::failed(Stage::ApplyLabel, &err);
        }

        match skipped {
            None => {
                info!(message_id, "message acknowledged and labeled");
                ProcessingOutcome::Completed
            }
            Some(reason) => {
                info!(message_id, %reason, "message labeled without reply");
                ProcessingOutcome::Skipped { reason }
            }
        }
    }

    /// Sends the reply unless the thread shows it already went out. Any
    /// failure comes back as the reason no reply was sent.
    async fn reply(&self, message: &Message, reply: &ReplyEnvelope) -> Result<(), SkipReason> {
        match self.already_replied(message).await {
            Ok(true) => {
                debug!(message_id = %message.id, thread_id = %message.thread_id, "reply found in thread");
                return Err(SkipReason::AlreadyReplied);
            }
            Ok(false) => {}
            Err(err) => {
                warn!(message_id = %message.id, error = %err, "thread lookup failed, not replying");
                return Err(SkipReason::SendFailed(err.to_string()));
            }
        }

        if reply.recipients.is_empty() {
            warn!(message_id = %message.id, "no recipients to reply to");
            return Err(SkipReason::NoRecipients);
        }

        let raw = mime::build_raw_reply(reply);
        match self
            .gateway
            .send_message(&raw, Some(reply.thread_id.as_str()))
            .await
        {
            Ok(sent) => {
                info!(
                    message_id = %message.id,
                    reply_id = %sent.id,
                    recipients = reply.recipients.len(),
                    "reply sent"
                );
                Ok(())
            }
            Err(err) => {
                warn!(message_id = %message.id, error = %err, "failed to send reply");
                Err(SkipReason::SendFailed(err.to_string()))
            }
        }
    }

    async fn already_replied(&self, message: &Message) -> AppResult<bool> {
        let thread = self.gateway.get_thread(&message.thread_id).await?;
        Ok(has_later_reply(message, &thread))
    }
}

/// True when the thread holds a message sent from this account after `original`.
///
/// Without a date on the original, only entries listed after it in the thread
/// count. Gmail returns thread messages oldest first.
fn has_later_reply(original: &Message, thread: &[ThreadMessage]) -> bool {
    let is_sent = |entry: &ThreadMessage| {
        entry.id != original.id && entry.label_ids.iter().any(|label| label == SENT_LABEL)
    };

    match original.internal_date {
        Some(original_date) => thread.iter().any(|entry| {
            is_sent(entry) && entry.internal_date.is_some_and(|date| date > original_date)
        }),
        None => thread
            .iter()
            .skip_while(|entry| entry.id != original.id)
            .any(|entry| is_sent(entry)),
    }
}
