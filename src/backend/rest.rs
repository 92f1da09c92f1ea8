// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{BackendError, Query, Store};
use crate::config::BackendConfig;
use reqwest::Method;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::Value;

const UA: &str = concat!(
    "clubadmin/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/clubadmin)"
);

const RETURN_ROWS: &str = "return=representation";
const MERGE_ROWS: &str = "resolution=merge-duplicates,return=representation";

/// PostgREST client for `<url>/rest/v1/<table>`.
pub struct RestStore {
    client: Client,
    base: Url,
    api_key: String,
    bearer: String,
}

impl RestStore {
    pub fn new(cfg: &BackendConfig) -> Result<Self, BackendError> {
        let mut root = cfg.url.trim().to_string();
        if !root.ends_with('/') {
            root.push('/');
        }
        let base = Url::parse(&root)
            .and_then(|u| u.join("rest/v1/"))
            .map_err(|_| BackendError::Url(cfg.url.clone()))?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent(UA)
            .build()
            .map_err(|source| BackendError::Transport {
                table: String::new(),
                source,
            })?;
        Ok(Self {
            client,
            base,
            api_key: cfg.api_key.clone(),
            bearer: cfg.bearer().to_string(),
        })
    }

    /// Full request URL for `table` with the query encoded as PostgREST
    /// parameters.
    pub fn table_url(&self, table: &str, query: &Query) -> Result<Url, BackendError> {
        let mut url = self
            .base
            .join(table)
            .map_err(|_| BackendError::Url(format!("{}{}", self.base, table)))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            for f in &query.filters {
                pairs.append_pair(&f.column, &format!("{}.{}", f.op.as_str(), f.value));
            }
            if let Some((col, desc)) = &query.order {
                let dir = if *desc { "desc" } else { "asc" };
                pairs.append_pair("order", &format!("{}.{}", col, dir));
            }
            if let Some(n) = query.limit {
                pairs.append_pair("limit", &n.to_string());
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer)
    }

    fn send(&self, table: &str, rb: RequestBuilder) -> Result<Response, BackendError> {
        let resp = rb.send().map_err(|source| BackendError::Transport {
            table: table.to_string(),
            source,
        })?;
        let status = resp.status();
        tracing::debug!(table, status = status.as_u16(), "backend response");
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        Err(BackendError::Http {
            table: table.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    fn rows(&self, table: &str, resp: Response) -> Result<Vec<Value>, BackendError> {
        let text = resp.text().map_err(|source| BackendError::Transport {
            table: table.to_string(),
            source,
        })?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = serde_json::from_str(&text).map_err(|source| BackendError::Codec {
            table: table.to_string(),
            source,
        })?;
        Ok(match value {
            Value::Array(items) => items,
            other => vec![other],
        })
    }

    fn first_row(&self, table: &str, resp: Response) -> Result<Value, BackendError> {
        self.rows(table, resp)?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound {
                table: table.to_string(),
                filter: "(returned row)".into(),
            })
    }
}

impl Store for RestStore {
    fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(table, query)?;
        tracing::debug!(%url, "select");
        let resp = self.send(table, self.request(Method::GET, url))?;
        self.rows(table, resp)
    }

    fn insert(&self, table: &str, row: &Value) -> Result<Value, BackendError> {
        let url = self.table_url(table, &Query::new())?;
        tracing::debug!(%url, "insert");
        let rb = self
            .request(Method::POST, url)
            .header("Prefer", RETURN_ROWS)
            .json(row);
        let resp = self.send(table, rb)?;
        self.first_row(table, resp)
    }

    fn upsert(
        &self,
        table: &str,
        row: &Value,
        conflict_column: &str,
    ) -> Result<Value, BackendError> {
        let mut url = self.table_url(table, &Query::new())?;
        url.query_pairs_mut()
            .append_pair("on_conflict", conflict_column);
        tracing::debug!(%url, "upsert");
        let rb = self
            .request(Method::POST, url)
            .header("Prefer", MERGE_ROWS)
            .json(row);
        let resp = self.send(table, rb)?;
        self.first_row(table, resp)
    }

    fn update(
        &self,
        table: &str,
        query: &Query,
        patch: &Value,
    ) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(table, query)?;
        tracing::debug!(%url, "update");
        let rb = self
            .request(Method::PATCH, url)
            .header("Prefer", RETURN_ROWS)
            .json(patch);
        let resp = self.send(table, rb)?;
        self.rows(table, resp)
    }

    fn delete(&self, table: &str, query: &Query) -> Result<usize, BackendError> {
        let url = self.table_url(table, query)?;
        tracing::debug!(%url, "delete");
        let rb = self.request(Method::DELETE, url).header("Prefer", RETURN_ROWS);
        let resp = self.send(table, rb)?;
        Ok(self.rows(table, resp)?.len())
    }

    fn count(&self, table: &str, query: &Query) -> Result<usize, BackendError> {
        let url = self.table_url(table, &query.clone().limit(1))?;
        tracing::debug!(%url, "count");
        let rb = self.request(Method::HEAD, url).header("Prefer", "count=exact");
        let resp = self.send(table, rb)?;
        let range = resp
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        parse_content_range(&range).ok_or_else(|| BackendError::Http {
            table: table.to_string(),
            status: resp.status().as_u16(),
            body: format!("missing or invalid Content-Range '{}'", range),
        })
    }
}

/// Reads the total from a PostgREST `Content-Range` header such as
/// `0-24/342` or `*/0`.
pub fn parse_content_range(header: &str) -> Option<usize> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.trim().parse().ok()
}
