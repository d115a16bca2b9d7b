use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AppError, AppResult};

use super::labels;
use super::messages;
use super::models::{Header, Label, LabelSpec, Message, MessageRef, SendResult, ThreadMessage};

const GMAIL_API_BASE_URL: &str = "https://gmail.googleapis.com";

#[derive(Debug, Clone)]
pub struct GmailClient {
    http: Client,
    base_url: String,
}

impl GmailClient {
    pub fn new() -> Self {
        Self::with_base_url(GMAIL_API_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn list_message_refs(
        &self,
        query: &str,
        limit: u32,
        access_token: &str,
    ) -> AppResult<Vec<MessageRef>> {
        let endpoint = messages::list_endpoint();
        let query_params = messages::list_query(limit, query);
        let list_resource: GmailMessageListResource = self
            .get_json(endpoint, access_token, Some(&query_params))
            .await?;

        Ok(list_resource
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|entry| MessageRef {
                id: entry.id,
                thread_id: entry.thread_id,
            })
            .collect())
    }

    pub async fn get_msg(&self, id: &str, access_token: &str) -> AppResult<Message> {
        let endpoint = messages::message_endpoint(id);
        let query = messages::get_query();
        let resource: GmailMessageResource =
            self.get_json(&endpoint, access_token, Some(&query)).await?;
        Ok(resource.into_message())
    }

    pub async fn get_thread(
        &self,
        thread_id: &str,
        access_token: &str,
    ) -> AppResult<Vec<ThreadMessage>> {
        let endpoint = messages::thread_endpoint(thread_id);
        let query = messages::thread_query();
        let resource: GmailThreadResource =
            self.get_json(&endpoint, access_token, Some(&query)).await?;

        Ok(resource
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|message| ThreadMessage {
                internal_date: parse_internal_date(message.internal_date.as_deref()),
                id: message.id,
                label_ids: message.label_ids.unwrap_or_default(),
            })
            .collect())
    }

    pub async fn send(
        &self,
        raw_message: &str,
        thread_id: Option<&str>,
        access_token: &str,
    ) -> AppResult<SendResult> {
        let endpoint = messages::send_endpoint();
        let request = GmailSendRequest {
            raw: raw_message.to_string(),
            thread_id: thread_id.map(ToOwned::to_owned),
        };
        let response: GmailSendResponse = self.post_json(endpoint, access_token, &request).await?;

        Ok(SendResult {
            id: response.id,
            thread_id: response.thread_id,
        })
    }

    pub async fn create_label(&self, spec: &LabelSpec, access_token: &str) -> AppResult<Label> {
        let endpoint = labels::labels_endpoint();
        let request = GmailCreateLabelRequest {
            name: spec.name.clone(),
            label_list_visibility: spec.label_list_visibility.as_api_str(),
            message_list_visibility: spec.message_list_visibility.as_api_str(),
        };
        let label: GmailLabelResource = self.post_json(endpoint, access_token, &request).await?;

        Ok(Label {
            id: label.id,
            name: label.name,
        })
    }

    pub async fn list_labels(&self, access_token: &str) -> AppResult<Vec<Label>> {
        let endpoint = labels::labels_endpoint();
        let response: GmailLabelListResponse = self.get_json(endpoint, access_token, None).await?;

        Ok(response
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(|label| Label {
                id: label.id,
                name: label.name,
            })
            .collect())
    }

    pub async fn add_labels(
        &self,
        id: &str,
        label_ids: &[String],
        access_token: &str,
    ) -> AppResult<()> {
        let endpoint = labels::modify_labels_endpoint(id);
        let body = GmailModifyLabelsRequest {
            add_label_ids: label_ids.to_vec(),
        };

        let _: GmailModifyLabelsResponse = self.post_json(&endpoint, access_token, &body).await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        access_token: &str,
        query: Option<&[(String, String)]>,
    ) -> AppResult<T> {
        let url = self.endpoint_url(endpoint)?;
        let mut request = self.http.get(url).bearer_auth(access_token);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await?;
        self.parse_json_response(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        access_token: &str,
        body: &B,
    ) -> AppResult<T> {
        let url = self.endpoint_url(endpoint)?;
        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        self.parse_json_response(response).await
    }

    fn endpoint_url(&self, endpoint: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.set_path(endpoint.trim_start_matches('/'));
        Ok(url)
    }

    async fn parse_json_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_api_error(status, &body))
    }
}

impl Default for GmailClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct GmailMessageResource {
    id: String,
    #[serde(rename = "threadId")]
    thread_id: String,
    snippet: Option<String>,
    #[serde(rename = "labelIds")]
    label_ids: Option<Vec<String>>,
    #[serde(rename = "internalDate")]
    internal_date: Option<String>,
    payload: Option<GmailMessagePayload>,
}

impl GmailMessageResource {
    fn into_message(self) -> Message {
        let headers = self
            .payload
            .and_then(|payload| payload.headers)
            .unwrap_or_default()
            .into_iter()
            .map(|header| Header::new(header.name, header.value))
            .collect();

        Message {
            id: self.id,
            thread_id: self.thread_id,
            headers,
            snippet: self.snippet,
            label_ids: self.label_ids.unwrap_or_default(),
            internal_date: parse_internal_date(self.internal_date.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GmailMessagePayload {
    headers: Option<Vec<GmailMessageHeader>>,
}

#[derive(Debug, Deserialize)]
struct GmailMessageListResource {
    messages: Option<Vec<GmailMessageListEntry>>,
}

#[derive(Debug, Deserialize)]
struct GmailMessageListEntry {
    id: String,
    #[serde(rename = "threadId")]
    thread_id: String,
}

#[derive(Debug, Deserialize)]
struct GmailThreadResource {
    messages: Option<Vec<GmailThreadMessage>>,
}

#[derive(Debug, Deserialize)]
struct GmailThreadMessage {
    id: String,
    #[serde(rename = "labelIds")]
    label_ids: Option<Vec<String>>,
    #[serde(rename = "internalDate")]
    internal_date: Option<String>,
}

#[derive(Debug, Serialize)]
struct GmailSendRequest {
    raw: String,
    #[serde(rename = "threadId", skip_serializing_if = "Option::is_none")]
    thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GmailSendResponse {
    id: String,
    #[serde(rename = "threadId")]
    thread_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct GmailCreateLabelRequest {
    name: String,
    #[serde(rename = "labelListVisibility")]
    label_list_visibility: &'static str,
    #[serde(rename = "messageListVisibility")]
    message_list_visibility: &'static str,
}

#[derive(Debug, Deserialize)]
struct GmailLabelListResponse {
    labels: Option<Vec<GmailLabelResource>>,
}

#[derive(Debug, Deserialize)]
struct GmailLabelResource {
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct GmailModifyLabelsRequest {
    #[serde(rename = "addLabelIds")]
    add_label_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GmailModifyLabelsResponse {}

#[derive(Debug, Deserialize)]
struct GmailMessageHeader {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct GmailApiErrorEnvelope {
    error: GmailApiError,
}

#[derive(Debug, Deserialize)]
struct GmailApiError {
    code: Option<u16>,
    status: Option<String>,
    message: Option<String>,
    errors: Option<Vec<GmailApiErrorDetail>>,
}

#[derive(Debug, Deserialize)]
struct GmailApiErrorDetail {
    reason: Option<String>,
}

// gmail sends internalDate as a string of epoch milliseconds
fn parse_internal_date(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse().ok())
}

fn map_api_error(status: StatusCode, body: &str) -> AppError {
    let message = parse_api_error_message(body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            "no error details in response body".to_string()
        } else {
            body.to_string()
        }
    });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Auth(format!(
            "gmail api authorization failed ({status}): {message}. run `gmail-autoreply auth login`"
        )),
        StatusCode::NOT_FOUND => AppError::NotFound(format!("gmail api ({status}): {message}")),
        StatusCode::CONFLICT => AppError::Conflict(format!("gmail api ({status}): {message}")),
        _ => AppError::Api(format!("gmail api request failed ({status}): {message}")),
    }
}

fn parse_api_error_message(body: &str) -> Option<String> {
    let envelope = serde_json::from_str::<GmailApiErrorEnvelope>(body).ok()?;
    let mut parts = Vec::new();

    if let Some(message) = envelope.error.message {
        parts.push(message);
    }

    if let Some(status) = envelope.error.status {
        parts.push(format!("status={status}"));
    }

    if let Some(code) = envelope.error.code {
        parts.push(format!("code={code}"));
    }

    if let Some(reason) = envelope
        .error
        .errors
        .and_then(|errors| errors.into_iter().find_map(|detail| detail.reason))
    {
        parts.push(format!("reason={reason}"));
    }

    if parts.is_empty() {
        return None;
    }

    Some(parts.join(", "))
}
