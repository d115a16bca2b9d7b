use async_trait::async_trait;
use tracing::info;

use crate::api::models::{Label, LabelSpec, Message, MessageRef, SendResult, ThreadMessage};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::gateway::MailboxGateway;

/// Authorized handle on the account mailbox, shared read-only by every
/// component for the life of the process.
#[derive(Debug)]
pub struct Session<'a> {
    ctx: &'a AppContext,
}

impl<'a> Session<'a> {
    /// Verifies that usable credentials exist before any polling starts.
    pub async fn authorize(ctx: &'a AppContext) -> AppResult<Self> {
        let token = ctx.token().await?;
        info!(
            profile = %ctx.profile,
            email = token.email.as_deref().unwrap_or("unknown"),
            "session authorized"
        );
        Ok(Self { ctx })
    }

    async fn access_token(&self) -> AppResult<String> {
        Ok(self.ctx.token().await?.access_token)
    }
}

#[async_trait]
impl MailboxGateway for Session<'_> {
    async fn list_messages(&self, query: &str, limit: u32) -> AppResult<Vec<MessageRef>> {
        let token = self.access_token().await?;
        self.ctx
            .gmail_client
            .list_message_refs(query, limit, &token)
            .await
    }

    async fn get_message(&self, id: &str) -> AppResult<Message> {
        let token = self.access_token().await?;
        self.ctx.gmail_client.get_msg(id, &token).await
    }

    async fn get_thread(&self, thread_id: &str) -> AppResult<Vec<ThreadMessage>> {
        let token = self.access_token().await?;
        self.ctx.gmail_client.get_thread(thread_id, &token).await
    }

    async fn send_message(&self, raw: &str, thread_id: Option<&str>) -> AppResult<SendResult> {
        let token = self.access_token().await?;
        self.ctx.gmail_client.send(raw, thread_id, &token).await
    }

    async fn create_label(&self, spec: &LabelSpec) -> AppResult<Label> {
        let token = self.access_token().await?;
        self.ctx.gmail_client.create_label(spec, &token).await
    }

    async fn list_labels(&self) -> AppResult<Vec<Label>> {
        let token = self.access_token().await?;
        self.ctx.gmail_client.list_labels(&token).await
    }

    async fn modify_message(&self, id: &str, add_label_ids: &[String]) -> AppResult<()> {
        let token = self.access_token().await?;
        self.ctx
            .gmail_client
            .add_labels(id, add_label_ids, &token)
            .await
    }
}
