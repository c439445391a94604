use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::task::Task;

#[derive(Debug, Error)]
#[error("store request failed: {0}")]
pub struct StoreError(pub String);

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.to_string())
    }
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Task>, StoreError>;

    async fn insert(&self, text: &str) -> Result<Task, StoreError>;

    async fn set_complete(&self, id: &str, value: bool) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpStore {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let url = cfg
            .get("store.url")
            .unwrap_or_else(|| "https://demo.supabase.co".to_string());
        let api_key = cfg
            .get("store.key")
            .unwrap_or_else(|| "demo_key".to_string());

        let client = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;

        let base_url = url.trim_end_matches('/').to_string();
        debug!(url = %base_url, "task store endpoint resolved");

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/todos", self.base_url)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

#[async_trait]
impl TaskStore for HttpStore {
    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let response = self
            .authed(self.client.get(self.endpoint()))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError(format!("list returned HTTP {status}")));
        }

        let rows: Vec<Task> = response.json().await?;
        debug!(count = rows.len(), "listed todos");
        Ok(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn insert(&self, text: &str) -> Result<Task, StoreError> {
        let response = self
            .authed(self.client.post(self.endpoint()))
            .header("Prefer", "return=representation")
            .json(&json!([{ "task": text }]))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError(format!("insert returned HTTP {status}")));
        }

        let mut rows: Vec<Task> = response.json().await?;
        if rows.is_empty() {
            return Err(StoreError("insert returned no rows".to_string()));
        }

        let created = rows.remove(0);
        debug!(id = %created.id, "inserted todo");
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    async fn set_complete(&self, id: &str, value: bool) -> Result<(), StoreError> {
        let response = self
            .authed(self.client.patch(self.endpoint()))
            .query(&[("id", format!("eq.{id}"))])
            .json(&json!({ "is_complete": value }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError(format!("update returned HTTP {status}")));
        }

        debug!(id, value, "updated todo");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let response = self
            .authed(self.client.delete(self.endpoint()))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError(format!("delete returned HTTP {status}")));
        }

        debug!(id, "deleted todo");
        Ok(())
    }
}
