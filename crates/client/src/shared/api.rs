//! HTTP gateway to the hosted reporting backend
//!
//! Every backend round trip in this crate goes through `RpcGateway`: named
//! function calls via POST /rest/v1/rpc/{function} and view reads via
//! GET /rest/v1/{view} with PostgREST-style filters.

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::shared::config::ApiConfig;
use crate::shared::error::FetchError;

/// Shared connection pool; per-call deadlines are enforced by the callers
/// through the timeout wrapper.
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client")
});

/// HTTP-клиент для обращения к отчётному backend
pub struct RpcGateway {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl RpcGateway {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key: config.key.clone(),
        }
    }

    /// Вызвать именованную функцию backend
    ///
    /// `Ok(None)` means the function does not exist on the backend (the
    /// defined not-supported outcome). Every other non-success answer is a
    /// genuine error.
    pub async fn rpc<P, T>(&self, function: &str, params: &P) -> Result<Option<T>, FetchError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, function, "POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .json(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if is_missing_function(status.as_u16(), &body) {
            tracing::debug!(%request_id, function, "backend function not found");
            return Ok(None);
        }

        if !status.is_success() {
            tracing::error!(
                %request_id,
                function,
                "API request failed with status {}: {}",
                status,
                body
            );
            return Err(FetchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<T>(&body) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                let preview = body_preview(&body);
                tracing::error!(
                    %request_id,
                    function,
                    "Failed to parse API response: {}. Body: {}",
                    e,
                    preview
                );
                Err(FetchError::Decode(format!(
                    "{} (function {}): {}",
                    e, function, preview
                )))
            }
        }
    }

    /// Прочитать строки из view с фильтрами в синтаксисе PostgREST
    ///
    /// Filter values like "gte.2025-01-01" are passed as given; only the
    /// URL encoding is handled here.
    pub async fn select<T>(
        &self,
        view: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let url = self.select_url(view, filters);
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, view, "GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                %request_id,
                view,
                "API request failed with status {}: {}",
                status,
                body
            );
            return Err(FetchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<Vec<T>>(&body) {
            Ok(rows) => {
                tracing::debug!(%request_id, view, "received {} rows", rows.len());
                Ok(rows)
            }
            Err(e) => {
                let preview = body_preview(&body);
                tracing::error!(
                    %request_id,
                    view,
                    "Failed to parse API response: {}. Body: {}",
                    e,
                    preview
                );
                Err(FetchError::Decode(format!(
                    "{} (view {}): {}",
                    e, view, preview
                )))
            }
        }
    }

    fn select_url(&self, view: &str, filters: &[(&str, String)]) -> String {
        let mut url = format!("{}/rest/v1/{}", self.base_url, view);
        for (i, (key, value)) in filters.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            url.push(sep);
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }
}

/// The backend reports a missing function as 404 with code PGRST202 in the
/// body; that exact combination is the fallback trigger, nothing else is.
fn is_missing_function(status: u16, body: &str) -> bool {
    status == 404 && body.contains("PGRST202")
}

fn body_preview(body: &str) -> String {
    let preview: String = body.chars().take(500).collect();
    if preview.len() < body.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}
