use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::model::{
    ActionType, AffirmationDraft, AffirmationRef, CategoryFilter, CategorySelection,
    RandomAffirmation, ServerReply,
};

/// Anything that can produce a random affirmation for a filter.
#[async_trait]
pub trait AffirmationSource: Send + Sync {
    async fn random(&self, filter: CategoryFilter) -> ApiResult<RandomAffirmation>;
}

/// HTTP client for the affirmations site.
///
/// Mutation endpoints resolve to the server's `message` text when it sends one.
#[derive(Clone)]
pub struct AffirmationsClient {
    client: Client,
    base_url: String,
}

impl AffirmationsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a client that sends `session` as the cookie header on every request.
    pub fn with_session(base_url: &str, session: Option<&str>) -> Result<Self> {
        let Some(session) = session else {
            return Ok(Self::new(base_url));
        };

        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(session)
            .map_err(|e| anyhow!("Invalid session cookie: {}", e))?;
        headers.insert(COOKIE, value);

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn random_affirmation(&self, filter: CategoryFilter) -> ApiResult<RandomAffirmation> {
        let url = format!("{}/affirmations/random", self.base_url);
        debug!(%filter, "requesting random affirmation");

        let response = self
            .client
            .get(&url)
            .query(&[("category", filter.as_query())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ServerReply>()
                .await
                .ok()
                .and_then(|reply| reply.error.or(reply.message));
            return Err(ApiError::from_lookup_status(status, message));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn save(&self, affirmation_id: i64) -> ApiResult<Option<String>> {
        self.post_json("/affirmations/save", &AffirmationRef { affirmation_id }).await
    }

    pub async fn unsave(&self, affirmation_id: i64) -> ApiResult<Option<String>> {
        self.post_json("/affirmations/unsave", &AffirmationRef { affirmation_id }).await
    }

    pub async fn select_category(&self, affirmation_id: i64, category_id: i64) -> ApiResult<Option<String>> {
        let body = CategorySelection { affirmation_id, category_id };
        self.post_json("/affirmations/select-category", &body).await
    }

    pub async fn action(&self, action: ActionType, affirmation_id: i64) -> ApiResult<Option<String>> {
        let path = format!("/affirmations/action/{}", action.as_str());
        self.post_json(&path, &AffirmationRef { affirmation_id }).await
    }

    pub async fn pin(&self, affirmation_id: i64) -> ApiResult<Option<String>> {
        self.action(ActionType::Pin, affirmation_id).await
    }

    /// Drops every pin/favorite the user holds on the affirmation.
    pub async fn unpin(&self, affirmation_id: i64) -> ApiResult<Option<String>> {
        self.action(ActionType::Delete, affirmation_id).await
    }

    pub async fn add_affirmation(&self, draft: &AffirmationDraft) -> ApiResult<Option<String>> {
        self.post_json("/affirmations/add", draft).await
    }

    pub async fn edit_affirmation(&self, affirmation_id: i64, draft: &AffirmationDraft) -> ApiResult<Option<String>> {
        let path = format!("/affirmations/edit/{}", affirmation_id);
        self.post_json(&path, draft).await
    }

    pub async fn delete_affirmation(&self, affirmation_id: i64) -> ApiResult<Option<String>> {
        let path = format!("/affirmations/delete/{}", affirmation_id);
        self.post_json(&path, &serde_json::json!({})).await
    }

    // Category routes read form fields, not JSON.
    pub async fn add_category(&self, name: &str) -> ApiResult<Option<String>> {
        self.post_form("/categories/add", &[("name", name)]).await
    }

    pub async fn edit_category(&self, category_id: i64, name: &str) -> ApiResult<Option<String>> {
        let path = format!("/categories/edit/{}", category_id);
        self.post_form(&path, &[("name", name)]).await
    }

    pub async fn delete_category(&self, category_id: i64) -> ApiResult<Option<String>> {
        let path = format!("/categories/delete/{}", category_id);
        self.post_form(&path, &[]).await
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Option<String>> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        read_reply(path, response).await
    }

    async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> ApiResult<Option<String>> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).form(fields).send().await?;
        read_reply(path, response).await
    }
}

#[async_trait]
impl AffirmationSource for AffirmationsClient {
    async fn random(&self, filter: CategoryFilter) -> ApiResult<RandomAffirmation> {
        self.random_affirmation(filter).await
    }
}

/// An `{error}` body wins over the status code; a 2xx body that is not JSON is still success.
async fn read_reply(path: &str, response: Response) -> ApiResult<Option<String>> {
    let status = response.status();
    let body = response.text().await?;
    let reply: Option<ServerReply> = serde_json::from_str(&body).ok();

    if let Some(error) = reply.as_ref().and_then(|r| r.error.clone()) {
        return Err(ApiError::from_server_message(error));
    }
    if !status.is_success() {
        return Err(ApiError::Status { status });
    }

    info!(path, %status, "request completed");
    Ok(reply.and_then(|r| r.message))
}
