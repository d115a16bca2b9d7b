use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::responder::compose::ReplyEnvelope;

/// Renders `reply` as a text/plain RFC 2822 message, base64url encoded for the
/// gmail send endpoint.
pub fn build_raw_reply(reply: &ReplyEnvelope) -> String {
    let mut headers = vec![
        format!("To: {}", sanitize_header_value(&reply.recipients.join(", "))),
        format!("Subject: {}", encode_header_text(&reply.subject)),
    ];

    if let Some(in_reply_to) = &reply.in_reply_to {
        headers.push(format!("In-Reply-To: {}", sanitize_header_value(in_reply_to)));
    }
    if let Some(references) = &reply.references {
        headers.push(format!("References: {}", sanitize_header_value(references)));
    }

    headers.push("MIME-Version: 1.0".to_string());
    headers.push("Content-Type: text/plain; charset=utf-8".to_string());
    headers.push("Content-Transfer-Encoding: 8bit".to_string());

    let payload = format!("{}\r\n\r\n{}", headers.join("\r\n"), normalize_newlines(&reply.body));
    URL_SAFE_NO_PAD.encode(payload.as_bytes())
}

fn sanitize_header_value(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|value| *value != '\r' && *value != '\n')
        .collect()
}

// non-ascii subjects go out as an RFC 2047 encoded word
fn encode_header_text(input: &str) -> String {
    let clean = sanitize_header_value(input);
    if clean.is_ascii() {
        return clean;
    }

    format!("=?UTF-8?B?{}?=", STANDARD.encode(clean.as_bytes()))
}

fn normalize_newlines(body: &str) -> String {
    body.replace("\r\n", "\n").replace('\n', "\r\n")
}
