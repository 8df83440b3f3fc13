//! Supabase (PostgREST) Client
//!
//! Only the three table operations the runs need: append a row, test a
//! column value for existence, count rows.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, StoreError};

/// Postgres `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

/// Supabase connection settings
#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,

    /// Anonymous (public) API key
    pub anon_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Deserialize, Default)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// PostgREST client for one Supabase project
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.config.url.trim_end_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error: PostgrestError = serde_json::from_str(&body).unwrap_or_default();
        let message = error.message.unwrap_or(body);

        if status == StatusCode::CONFLICT || error.code.as_deref() == Some(UNIQUE_VIOLATION) {
            return Err(StoreError::Duplicate(message));
        }
        Err(StoreError::Http {
            status: status.as_u16(),
            message,
        })
    }

    /// Append one row
    pub async fn insert(&self, table: &str, row: &Value) -> Result<()> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(row);
        Self::check(self.authorized(request).send().await?).await?;
        Ok(())
    }

    /// Whether any row has `column = value`
    pub async fn exists(&self, table: &str, column: &str, value: &str) -> Result<bool> {
        let filter = format!("eq.{value}");
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "id"), (column, filter.as_str()), ("limit", "1")]);
        let response = Self::check(self.authorized(request).send().await?).await?;
        let rows: Vec<Value> = response.json().await?;
        Ok(!rows.is_empty())
    }

    /// Exact row count, read from `Content-Range`
    pub async fn count_rows(&self, table: &str) -> Result<u64> {
        let request = self
            .client
            .head(self.table_url(table))
            .query(&[("select", "*")])
            .header("Prefer", "count=exact");
        let response = Self::check(self.authorized(request).send().await?).await?;

        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|range| range.rsplit('/').next())
            .and_then(|total| total.parse().ok())
            .ok_or_else(|| StoreError::Http {
                status: response.status().as_u16(),
                message: "missing row count".into(),
            })
    }
}
