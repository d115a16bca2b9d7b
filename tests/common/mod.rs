#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use gmail_autoreply::api::models::{
    Header, Label, LabelSpec, Message, MessageRef, SendResult, ThreadMessage,
};
use gmail_autoreply::error::{AppError, AppResult};
use gmail_autoreply::gateway::MailboxGateway;

const RECEIVED_AT: i64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Get(String),
    Thread(String),
    Send { thread_id: Option<String> },
    CreateLabel(String),
    ListLabels,
    Modify { id: String, label_ids: Vec<String> },
}

/// A reply captured by the fake, decoded back from its raw form.
#[derive(Debug, Clone)]
pub struct SentReply {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Api,
    NotFound,
}

impl Failure {
    fn error(self, what: &str) -> AppError {
        match self {
            Failure::Api => AppError::Api(format!("{what} failed")),
            Failure::NotFound => AppError::NotFound(format!("{what} not found")),
        }
    }
}

#[derive(Default)]
struct State {
    listing: Vec<MessageRef>,
    messages: HashMap<String, Message>,
    threads: HashMap<String, Vec<ThreadMessage>>,
    labels: Vec<Label>,
    applied: HashMap<String, Vec<String>>,
    calls: Vec<Call>,
    sent: Vec<SentReply>,
    fail_list: bool,
    fail_fetch: HashSet<String>,
    fail_thread: bool,
    fail_send: bool,
    fail_create: bool,
    fail_apply: Option<Failure>,
    next_id: u32,
}

/// In-memory mailbox that records every gateway call.
#[derive(Default)]
pub struct FakeMailbox {
    state: Mutex<State>,
}

impl FakeMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(self, id: &str, thread_id: &str, headers: &[(&str, &str)]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.listing.push(MessageRef {
                id: id.to_string(),
                thread_id: thread_id.to_string(),
            });
            state.messages.insert(
                id.to_string(),
                Message {
                    id: id.to_string(),
                    thread_id: thread_id.to_string(),
                    headers: headers
                        .iter()
                        .map(|(name, value)| Header::new(*name, *value))
                        .collect(),
                    snippet: None,
                    label_ids: vec!["INBOX".to_string(), "UNREAD".to_string()],
                    internal_date: Some(RECEIVED_AT),
                },
            );
            state
                .threads
                .entry(thread_id.to_string())
                .or_default()
                .push(ThreadMessage {
                    id: id.to_string(),
                    label_ids: vec!["INBOX".to_string(), "UNREAD".to_string()],
                    internal_date: Some(RECEIVED_AT),
                });
        }
        self
    }

    pub fn with_label(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().labels.push(Label {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn failing_list(self) -> Self {
        self.state.lock().unwrap().fail_list = true;
        self
    }

    pub fn failing_fetch(self, id: &str) -> Self {
        self.state.lock().unwrap().fail_fetch.insert(id.to_string());
        self
    }

    pub fn failing_thread(self) -> Self {
        self.state.lock().unwrap().fail_thread = true;
        self
    }

    pub fn failing_send(self) -> Self {
        self.state.lock().unwrap().fail_send = true;
        self
    }

    pub fn failing_create(self) -> Self {
        self.state.lock().unwrap().fail_create = true;
        self
    }

    pub fn failing_apply(self, failure: Failure) -> Self {
        self.state.lock().unwrap().fail_apply = Some(failure);
        self
    }

    pub fn set_apply_failure(&self, failure: Option<Failure>) {
        self.state.lock().unwrap().fail_apply = failure;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| matches(call)).count()
    }

    pub fn sent(&self) -> Vec<SentReply> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn labels(&self) -> Vec<Label> {
        self.state.lock().unwrap().labels.clone()
    }

    pub fn applied(&self, message_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .applied
            .get(message_id)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl MailboxGateway for FakeMailbox {
    async fn list_messages(&self, query: &str, _limit: u32) -> AppResult<Vec<MessageRef>> {
        self.record(Call::List(query.to_string()));
        let state = self.state.lock().unwrap();
        if state.fail_list {
            return Err(AppError::Api("list failed".to_string()));
        }
        Ok(state.listing.clone())
    }

    async fn get_message(&self, id: &str) -> AppResult<Message> {
        self.record(Call::Get(id.to_string()));
        let state = self.state.lock().unwrap();
        if state.fail_fetch.contains(id) {
            return Err(AppError::Api(format!("fetch {id} failed")));
        }
        state
            .messages
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("message {id}")))
    }

    async fn get_thread(&self, thread_id: &str) -> AppResult<Vec<ThreadMessage>> {
        self.record(Call::Thread(thread_id.to_string()));
        let state = self.state.lock().unwrap();
        if state.fail_thread {
            return Err(AppError::Api("thread lookup failed".to_string()));
        }
        Ok(state.threads.get(thread_id).cloned().unwrap_or_default())
    }

    async fn send_message(&self, raw: &str, thread_id: Option<&str>) -> AppResult<SendResult> {
        self.record(Call::Send {
            thread_id: thread_id.map(ToOwned::to_owned),
        });
        let mut state = self.state.lock().unwrap();
        if state.fail_send {
            return Err(AppError::Api("send failed".to_string()));
        }

        state.next_id += 1;
        let id = format!("sent-{}", state.next_id);
        let sent_at = RECEIVED_AT + i64::from(state.next_id);
        if let Some(thread_id) = thread_id {
            state
                .threads
                .entry(thread_id.to_string())
                .or_default()
                .push(ThreadMessage {
                    id: id.clone(),
                    label_ids: vec!["SENT".to_string()],
                    internal_date: Some(sent_at),
                });
        }
        state.sent.push(decode_reply(raw, thread_id));

        Ok(SendResult {
            id,
            thread_id: thread_id.map(ToOwned::to_owned),
        })
    }

    async fn create_label(&self, spec: &LabelSpec) -> AppResult<Label> {
        self.record(Call::CreateLabel(spec.name.clone()));
        let mut state = self.state.lock().unwrap();
        if state.fail_create {
            return Err(AppError::Auth("insufficient permission".to_string()));
        }
        if state
            .labels
            .iter()
            .any(|label| label.name.eq_ignore_ascii_case(&spec.name))
        {
            return Err(AppError::Conflict(
                "Label name exists or conflicts".to_string(),
            ));
        }

        state.next_id += 1;
        let label = Label {
            id: format!("Label_{}", state.next_id),
            name: spec.name.clone(),
        };
        state.labels.push(label.clone());
        Ok(label)
    }

    async fn list_labels(&self) -> AppResult<Vec<Label>> {
        self.record(Call::ListLabels);
        Ok(self.labels())
    }

    async fn modify_message(&self, id: &str, add_label_ids: &[String]) -> AppResult<()> {
        self.record(Call::Modify {
            id: id.to_string(),
            label_ids: add_label_ids.to_vec(),
        });
        let mut state = self.state.lock().unwrap();
        if let Some(failure) = state.fail_apply {
            return Err(failure.error("modify"));
        }
        state
            .applied
            .entry(id.to_string())
            .or_default()
            .extend(add_label_ids.iter().cloned());
        Ok(())
    }
}

fn decode_reply(raw: &str, thread_id: Option<&str>) -> SentReply {
    let bytes = URL_SAFE_NO_PAD.decode(raw).expect("raw reply is base64url");
    let text = String::from_utf8(bytes).expect("raw reply is utf8");
    let (head, body) = text.split_once("\r\n\r\n").expect("header/body separator");

    let header = |name: &str| {
        head.split("\r\n")
            .find_map(|line| line.strip_prefix(&format!("{name}: ")).map(ToOwned::to_owned))
            .unwrap_or_default()
    };

    SentReply {
        to: header("To")
            .split(", ")
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
        subject: header("Subject"),
        body: body.to_string(),
        thread_id: thread_id.map(ToOwned::to_owned),
    }
}
