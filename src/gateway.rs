//! Remote mailbox operations consumed by the responder.
//!
//! Implementations are thin I/O wrappers: they carry no retry or policy of
//! their own. The responder only ever talks to the mailbox through this trait,
//! which lets tests substitute an in-memory mailbox.

use async_trait::async_trait;

use crate::api::models::{Label, LabelSpec, Message, MessageRef, SendResult, ThreadMessage};
use crate::error::AppResult;

#[async_trait]
pub trait MailboxGateway: Send + Sync {
    /// Message references matching `query`, in the order the mailbox returns them.
    async fn list_messages(&self, query: &str, limit: u32) -> AppResult<Vec<MessageRef>>;

    async fn get_message(&self, id: &str) -> AppResult<Message>;

    async fn get_thread(&self, thread_id: &str) -> AppResult<Vec<ThreadMessage>>;

    /// Sends a base64url encoded RFC 2822 message, optionally inside `thread_id`.
    async fn send_message(&self, raw: &str, thread_id: Option<&str>) -> AppResult<SendResult>;

    /// Fails with `AppError::Conflict` when a label with the same name exists.
    async fn create_label(&self, spec: &LabelSpec) -> AppResult<Label>;

    async fn list_labels(&self) -> AppResult<Vec<Label>>;

    async fn modify_message(&self, id: &str, add_label_ids: &[String]) -> AppResult<()>;
}
