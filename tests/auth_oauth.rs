mod config {
    pub use gmail_autoreply::config::*;
}

mod error {
    pub use gmail_autoreply::error::*;
}

mod token {
    pub use gmail_autoreply::auth::token::*;
}

mod token_store {
    pub use gmail_autoreply::auth::token_store::*;
}

mod oauth_under_test {
    #![allow(dead_code)]

    include!("../src/auth/oauth.rs");

    #[test]
    fn parses_callback_code() {
        let code = extract_callback_code("/callback?code=abc123&state=xyz", "/callback", "xyz")
            .expect("callback should parse");
        assert_eq!(code, "abc123");
    }

    #[test]
    fn rejects_state_mismatch() {
        let result =
            extract_callback_code("/callback?code=abc123&state=wrong", "/callback", "expected");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_wrong_callback_path() {
        let result = extract_callback_code("/other?code=abc&state=xyz", "/callback", "xyz");
        assert!(matches!(result, Err(AppError::Auth(message)) if message.contains("path mismatch")));
    }

    #[test]
    fn surfaces_provider_denial() {
        let result = extract_callback_code(
            "/callback?error=access_denied&error_description=user+said+no&state=xyz",
            "/callback",
            "xyz",
        );
        assert!(matches!(result, Err(AppError::Auth(message)) if message.contains("access_denied")));
    }

    #[test]
    fn refresh_grant_carries_client_secret() {
        let config = OAuthConfig {
            client_id: "client".to_string(),
            client_secret: Some("secret".to_string()),
            redirect_uri: "http://127.0.0.1:8787/callback".to_string(),
        };
        let form = Grant::RefreshToken {
            refresh_token: "refresh",
        }
        .form(&config);

        assert!(form.contains(&("grant_type", "refresh_token".to_string())));
        assert!(form.contains(&("refresh_token", "refresh".to_string())));
        assert!(form.contains(&("client_secret", "secret".to_string())));
        assert!(!form.iter().any(|(key, _)| *key == "redirect_uri"));
    }

    #[test]
    fn describes_structured_oauth_errors() {
        let description =
            describe_oauth_error(r#"{"error":"invalid_grant","error_description":"Bad Request"}"#);
        assert_eq!(description, "invalid_grant (Bad Request)");
        assert_eq!(describe_oauth_error(" plain failure "), "plain failure");
    }

    #[test]
    fn builds_pkce_challenge() {
        let challenge = pkce_challenge("test_verifier_value");
        assert_eq!(challenge.len(), 43);
    }

    #[test]
    fn random_token_is_non_empty() {
        let token = random_token(32);
        assert!(token.len() >= 43);
    }
}
