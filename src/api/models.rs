use serde::Serialize;

/// Entry returned by a message list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRef {
    pub id: String,
    pub thread_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub headers: Vec<Header>,
    pub snippet: Option<String>,
    pub label_ids: Vec<String>,
    pub internal_date: Option<i64>,
}

impl Message {
    /// First header matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn subject(&self) -> Option<&str> {
        self.header("Subject")
    }
}

/// Minimal view of a message inside a thread.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadMessage {
    pub id: String,
    pub label_ids: Vec<String>,
    pub internal_date: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendResult {
    pub id: String,
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelListVisibility {
    Show,
    ShowIfUnread,
    Hide,
}

impl LabelListVisibility {
    pub fn as_api_str(self) -> &'static str {
        match self {
            Self::Show => "labelShow",
            Self::ShowIfUnread => "labelShowIfUnread",
            Self::Hide => "labelHide",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageListVisibility {
    Show,
    Hide,
}

impl MessageListVisibility {
    pub fn as_api_str(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Hide => "hide",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSpec {
    pub name: String,
    pub label_list_visibility: LabelListVisibility,
    pub message_list_visibility: MessageListVisibility,
}

impl LabelSpec {
    /// Visible both in the label list and in the message list.
    pub fn visible(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label_list_visibility: LabelListVisibility::Show,
            message_list_visibility: MessageListVisibility::Show,
        }
    }
}
