pub fn message_endpoint(id: &str) -> String {
    format!("/gmail/v1/users/me/messages/{id}")
}

pub fn thread_endpoint(id: &str) -> String {
    format!("/gmail/v1/users/me/threads/{id}")
}

pub fn list_endpoint() -> &'static str {
    "/gmail/v1/users/me/messages"
}

pub fn send_endpoint() -> &'static str {
    "/gmail/v1/users/me/messages/send"
}

pub fn get_query() -> Vec<(String, String)> {
    let mut query = vec![("format".to_string(), "metadata".to_string())];

    for header in [
        "Subject",
        "From",
        "To",
        "Cc",
        "Date",
        "Message-ID",
        "References",
    ] {
        query.push(("metadataHeaders".to_string(), header.to_string()));
    }

    query
}

pub fn thread_query() -> Vec<(String, String)> {
    vec![("format".to_string(), "minimal".to_string())]
}

pub fn list_query(limit: u32, query: &str) -> Vec<(String, String)> {
    let mut params = vec![("maxResults".to_string(), limit.to_string())];
    let query = query.trim();
    if !query.is_empty() {
        params.push(("q".to_string(), query.to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_skips_blank_search() {
        assert_eq!(
            list_query(25, "   "),
            vec![("maxResults".to_string(), "25".to_string())]
        );
    }

    #[test]
    fn metadata_query_requests_recipient_headers() {
        let query = get_query();
        assert!(query.contains(&("metadataHeaders".to_string(), "To".to_string())));
        assert!(query.contains(&("metadataHeaders".to_string(), "Cc".to_string())));
    }
}
