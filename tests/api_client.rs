mod error {
    pub use gmail_autoreply::error::*;
}

mod labels {
    pub use gmail_autoreply::api::labels::*;
}

mod messages {
    pub use gmail_autoreply::api::messages::*;
}

mod models {
    pub use gmail_autoreply::api::models::*;
}

mod client_under_test {
    #![allow(dead_code)]

    include!("../src/api/client.rs");

    #[test]
    fn maps_message_resource_to_message() {
        let resource = GmailMessageResource {
            id: "msg-123".to_string(),
            thread_id: "thread-456".to_string(),
            snippet: Some("hello world".to_string()),
            label_ids: Some(vec!["INBOX".to_string(), "UNREAD".to_string()]),
            internal_date: Some("1771236000000".to_string()),
            payload: Some(GmailMessagePayload {
                headers: Some(vec![
                    GmailMessageHeader {
                        name: "Subject".to_string(),
                        value: "hello".to_string(),
                    },
                    GmailMessageHeader {
                        name: "To".to_string(),
                        value: "a@example.com, b@example.com".to_string(),
                    },
                    GmailMessageHeader {
                        name: "cc".to_string(),
                        value: "c@example.com".to_string(),
                    },
                ]),
            }),
        };

        let message = resource.into_message();
        assert_eq!(message.id, "msg-123");
        assert_eq!(message.thread_id, "thread-456");
        assert_eq!(message.subject(), Some("hello"));
        assert_eq!(message.header("CC"), Some("c@example.com"));
        assert_eq!(message.internal_date, Some(1_771_236_000_000));
        assert_eq!(message.label_ids, ["INBOX", "UNREAD"]);
    }

    #[test]
    fn missing_payload_yields_no_headers() {
        let resource = GmailMessageResource {
            id: "msg-1".to_string(),
            thread_id: "thread-1".to_string(),
            snippet: None,
            label_ids: None,
            internal_date: Some("not-a-number".to_string()),
            payload: None,
        };

        let message = resource.into_message();
        assert!(message.headers.is_empty());
        assert_eq!(message.subject(), None);
        assert_eq!(message.internal_date, None);
    }

    #[test]
    fn create_label_request_uses_api_visibility_names() {
        let spec = LabelSpec::visible("UNREADMSG");
        let request = GmailCreateLabelRequest {
            name: spec.name.clone(),
            label_list_visibility: spec.label_list_visibility.as_api_str(),
            message_list_visibility: spec.message_list_visibility.as_api_str(),
        };

        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["name"], "UNREADMSG");
        assert_eq!(json["labelListVisibility"], "labelShow");
        assert_eq!(json["messageListVisibility"], "show");
    }

    #[test]
    fn send_request_omits_missing_thread() {
        let request = GmailSendRequest {
            raw: "abc".to_string(),
            thread_id: None,
        };

        let json = serde_json::to_string(&request).expect("serialize");
        assert_eq!(json, r#"{"raw":"abc"}"#);
    }

    #[test]
    fn maps_unauthorized_as_auth_error() {
        let error = map_api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"code":401,"message":"Request had invalid authentication credentials.","status":"UNAUTHENTICATED"}}"#,
        );

        match error {
            AppError::Auth(message) => {
                assert!(message.contains("invalid authentication credentials"));
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[test]
    fn maps_conflict_as_conflict_error() {
        let error = map_api_error(
            StatusCode::CONFLICT,
            r#"{"error":{"code":409,"message":"Label name exists or conflicts","status":"ALREADY_EXISTS","errors":[{"reason":"alreadyExists"}]}}"#,
        );

        match error {
            AppError::Conflict(message) => {
                assert!(message.contains("Label name exists"));
                assert!(message.contains("reason=alreadyExists"));
            }
            other => panic!("expected conflict error, got {other:?}"),
        }
    }

    #[test]
    fn maps_not_found_as_not_found_error() {
        let error = map_api_error(
            StatusCode::NOT_FOUND,
            r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#,
        );

        assert!(matches!(error, AppError::NotFound(message) if message.contains("not found")));
    }

    #[test]
    fn falls_back_to_raw_body_for_unknown_errors() {
        let error = map_api_error(StatusCode::BAD_GATEWAY, "upstream unavailable");

        match error {
            AppError::Api(message) => assert!(message.contains("upstream unavailable")),
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
