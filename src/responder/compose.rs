//! Derives the acknowledgement reply for an incoming message.

use serde::Serialize;

use crate::api::models::Message;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyEnvelope {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    pub thread_id: String,
    pub in_reply_to: Option<String>,
    pub references: Option<String>,
}

/// Builds the reply to `message`. Never fails: missing headers degrade to an
/// empty recipient list and an empty original subject.
pub fn compose(message: &Message, body: &str) -> ReplyEnvelope {
    let to = message.header("To");
    let cc = message.header("Cc");
    let in_reply_to = message.header("Message-ID").map(ToOwned::to_owned);

    ReplyEnvelope {
        recipients: recipient_set(to.into_iter().chain(cc)),
        subject: format!("Re: {}", message.subject().unwrap_or_default()),
        body: body.to_string(),
        thread_id: message.thread_id.clone(),
        references: merge_references(message.header("References"), in_reply_to.as_deref()),
        in_reply_to,
    }
}

/// Splits address header values, dropping blanks and repeated mailboxes while
/// keeping the first-seen entry in order.
fn recipient_set<'a>(header_values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut recipients: Vec<String> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for address in header_values.flat_map(split_addresses) {
        let key = mailbox_key(&address);
        if !seen.iter().any(|known| known.eq_ignore_ascii_case(&key)) {
            seen.push(key);
            recipients.push(address);
        }
    }

    recipients
}

// `Name <addr>` compares by the bracketed address, bare entries by themselves
fn mailbox_key(entry: &str) -> String {
    entry
        .rfind('<')
        .and_then(|start| {
            let rest = &entry[start + 1..];
            rest.find('>').map(|end| &rest[..end])
        })
        .unwrap_or(entry)
        .trim()
        .to_string()
}

// commas inside a quoted display name do not separate addresses
fn split_addresses(value: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in value.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                current.push(ch);
            }
            ',' if !quoted => out.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    out.push(current);

    out.into_iter()
        .map(|address| address.trim().to_string())
        .filter(|address| !address.is_empty())
        .collect()
}

fn merge_references(existing: Option<&str>, message_id: Option<&str>) -> Option<String> {
    let mut refs = existing
        .unwrap_or_default()
        .split_whitespace()
        .map(ToOwned::to_owned)
        .collect::<Vec<_>>();

    if let Some(message_id) = message_id.map(str::trim).filter(|id| !id.is_empty()) {
        if !refs.iter().any(|value| value == message_id) {
            refs.push(message_id.to_string());
        }
    }

    if refs.is_empty() {
        None
    } else {
        Some(refs.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Header;

    fn message(headers: &[(&str, &str)]) -> Message {
        Message {
            id: "m1".to_string(),
            thread_id: "t1".to_string(),
            headers: headers
                .iter()
                .map(|(name, value)| Header::new(*name, *value))
                .collect(),
            snippet: None,
            label_ids: Vec::new(),
            internal_date: None,
        }
    }

    #[test]
    fn recipients_keep_to_before_cc_without_duplicates() {
        let original = message(&[
            ("To", "x@y.com, a@y.com"),
            ("Cc", "z@y.com, x@y.com, , A@y.com"),
            ("Subject", "Quarterly numbers"),
        ]);

        let reply = compose(&original, "ack");
        assert_eq!(reply.recipients, ["x@y.com", "a@y.com", "z@y.com"]);
        assert_eq!(reply.subject, "Re: Quarterly numbers");
        assert_eq!(reply.body, "ack");
        assert_eq!(reply.thread_id, "t1");
    }

    #[test]
    fn display_name_and_bare_address_collapse_to_one_recipient() {
        let original = message(&[
            ("To", "Alice <a@y.com>, \"Bob\" <b@y.com>"),
            ("Cc", "A@Y.com, Robert <B@y.com>, c@y.com"),
        ]);

        assert_eq!(
            compose(&original, "").recipients,
            ["Alice <a@y.com>", "\"Bob\" <b@y.com>", "c@y.com"]
        );
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let original = message(&[("tO", "w@y.com"), ("CC", "v@y.com")]);
        assert_eq!(compose(&original, "").recipients, ["w@y.com", "v@y.com"]);
    }

    #[test]
    fn quoted_display_names_keep_their_commas() {
        let original = message(&[("To", "\"Doe, Jane\" <jane@y.com>, bob@y.com")]);
        assert_eq!(
            compose(&original, "").recipients,
            ["\"Doe, Jane\" <jane@y.com>", "bob@y.com"]
        );
    }

    #[test]
    fn missing_headers_degrade_to_empty_reply() {
        let reply = compose(&message(&[]), "Thank you for your Message!");

        assert!(reply.recipients.is_empty());
        assert_eq!(reply.subject, "Re: ");
        assert_eq!(reply.in_reply_to, None);
        assert_eq!(reply.references, None);
    }

    #[test]
    fn threads_reply_under_original_message_id() {
        let original = message(&[
            ("To", "x@y.com"),
            ("Message-ID", "<b@y.com>"),
            ("References", "<a@y.com>"),
        ]);

        let reply = compose(&original, "ack");
        assert_eq!(reply.in_reply_to.as_deref(), Some("<b@y.com>"));
        assert_eq!(reply.references.as_deref(), Some("<a@y.com> <b@y.com>"));
    }

    #[test]
    fn does_not_mutate_input() {
        let original = message(&[("To", "x@y.com"), ("Subject", "hi")]);
        let before = original.headers.clone();
        let _ = compose(&original, "ack");
        assert_eq!(original.headers, before);
    }
}
