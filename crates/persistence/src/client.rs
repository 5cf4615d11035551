// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Minimal `PostgREST` client for the Supabase REST endpoint.

use crate::error::{PersistenceError, UNIQUE_VIOLATION};
use reqwest::StatusCode;
use reqwest::header::CONTENT_RANGE;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::time::Duration;
use tracing::debug;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Filters and modifiers for one `PostgREST` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    /// An empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns (and embedded resources) to return.
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push((String::from("select"), columns.to_string()));
        self
    }

    /// `column = value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.params.push((column.to_string(), format!("eq.{value}")));
        self
    }

    /// `column IN (values)`.
    #[must_use]
    pub fn in_list<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let joined = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((column.to_string(), format!("in.({joined})")));
        self
    }

    /// Ascending sort on `column`.
    #[must_use]
    pub fn order_asc(mut self, column: &str) -> Self {
        self.params.push((String::from("order"), format!("{column}.asc")));
        self
    }

    /// Descending sort on `column`.
    #[must_use]
    pub fn order_desc(mut self, column: &str) -> Self {
        self.params.push((String::from("order"), format!("{column}.desc")));
        self
    }

    /// Skip the first `n` rows.
    #[must_use]
    pub fn offset(mut self, n: u64) -> Self {
        self.params.push((String::from("offset"), n.to_string()));
        self
    }

    /// At most `n` rows.
    #[must_use]
    pub fn limit(mut self, n: u32) -> Self {
        self.params.push((String::from("limit"), n.to_string()));
        self
    }

    /// The encoded query parameters.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// HTTP client for a Supabase project's REST API.
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    rest_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl PostgrestClient {
    /// Creates a client for the project at `project_url`, authenticating
    /// with `api_key` (the service role key).
    #[must_use]
    pub fn new(project_url: &str, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            api_key: api_key.into(),
            client,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.rest_url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Reads rows from `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the rows cannot be decoded.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &'static str,
        query: &Query,
    ) -> Result<Vec<T>, PersistenceError> {
        debug!(table, params = ?query.params(), "select");
        let response = self
            .authorized(self.client.get(self.table_url(table)))
            .query(query.params())
            .send()
            .await?;
        let response = check_status(table, response).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    /// Reads at most one row from `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the row cannot be decoded.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &'static str,
        query: Query,
    ) -> Result<Option<T>, PersistenceError> {
        let rows = self.select(table, &query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Reads one page of rows from `table` along with the number of rows
    /// matching the filters overall.
    ///
    /// The total comes from the `Content-Range` header returned for
    /// `Prefer: count=exact`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the rows cannot be decoded,
    /// or the server does not report a total.
    pub async fn select_page<T: DeserializeOwned>(
        &self,
        table: &'static str,
        query: &Query,
    ) -> Result<(Vec<T>, u64), PersistenceError> {
        debug!(table, params = ?query.params(), "select page");
        let response = self
            .authorized(self.client.get(self.table_url(table)))
            .query(query.params())
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = check_status(table, response).await?;
        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_total)
            .ok_or_else(|| PersistenceError::InvalidRow {
                table,
                message: String::from("response carried no row count"),
            })?;
        Ok((response.json::<Vec<T>>().await?, total))
    }

    /// Inserts one row into `table`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Conflict`] if a unique constraint
    /// rejects the row, or another error if the request fails.
    pub async fn insert<B: Serialize + Sync>(
        &self,
        table: &'static str,
        row: &B,
    ) -> Result<(), PersistenceError> {
        debug!(table, "insert");
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        check_status(table, response).await?;
        Ok(())
    }

    /// Applies `patch` to every row matching `query` and returns the
    /// updated rows. An empty result means no row matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the rows cannot be decoded.
    pub async fn update<B, T>(
        &self,
        table: &'static str,
        query: &Query,
        patch: &B,
    ) -> Result<Vec<T>, PersistenceError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        debug!(table, params = ?query.params(), "update");
        let response = self
            .authorized(self.client.patch(self.table_url(table)))
            .query(query.params())
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;
        let response = check_status(table, response).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    /// Calls a stored procedure.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn rpc<B: Serialize + Sync>(
        &self,
        function: &'static str,
        args: &B,
    ) -> Result<(), PersistenceError> {
        debug!(function, "rpc");
        let response = self
            .authorized(self.client.post(format!("{}/rpc/{function}", self.rest_url)))
            .json(args)
            .send()
            .await?;
        check_status(function, response).await?;
        Ok(())
    }
}

/// The total from a `Content-Range` value such as `0-9/42` or `*/0`.
fn parse_total(content_range: &str) -> Option<u64> {
    content_range.rsplit_once('/')?.1.trim().parse().ok()
}

async fn check_status(
    table: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, PersistenceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<PostgrestErrorBody>(&text).ok();
    let code = body.as_ref().and_then(|b| b.code.clone());
    let message = body.and_then(|b| b.message).unwrap_or(text);

    if status == StatusCode::CONFLICT || code.as_deref() == Some(UNIQUE_VIOLATION) {
        return Err(PersistenceError::Conflict { table, message });
    }
    Err(PersistenceError::QueryFailed {
        status: status.as_u16(),
        message,
    })
}
