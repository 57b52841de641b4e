use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::errors::ApiError;
use crate::wire::{ErrorBody, ScheduleRecord};

const FALLBACK_ERROR: &str = "An error occurred";

/// reqwest-backed client for `{api_url}/schedules`.
#[derive(Debug, Clone)]
pub struct HttpScheduleApi {
    base: Url,
    client: Client,
}

impl HttpScheduleApi {
    /// `base` is the full collection url, e.g. `http://localhost:8000/api/schedules`.
    pub fn new(base: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let base = Url::parse(base).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base.to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { base, client })
    }

    /// Collection url with `id` appended as one percent-encoded path segment.
    fn item_url(&self, id: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id);
        }
        url
    }
}

/// Read the body of `resp`, turning non-2xx into `ApiError::Status` with the
/// body's `error` field when present.
async fn read_body(resp: Response) -> Result<String, ApiError> {
    let status = resp.status();
    let text = resp.text().await?;
    tracing::debug!(%status, bytes = text.len(), "schedule api response");

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_ERROR.to_string());
        tracing::warn!(%status, %message, "schedule api error");
        return Err(ApiError::Status { status: status.as_u16(), message });
    }
    Ok(text)
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl super::ScheduleApi for HttpScheduleApi {
    async fn list(&self) -> Result<Vec<ScheduleRecord>, ApiError> {
        tracing::debug!(url = %self.base, "GET schedules");
        let resp = self.client.get(self.base.clone()).send().await?;
        let text = read_body(resp).await?;
        decode(&text)
    }

    async fn create(&self, record: &ScheduleRecord) -> Result<ScheduleRecord, ApiError> {
        tracing::debug!(url = %self.base, id = %record.id, "POST schedule");
        let resp = self.client.post(self.base.clone()).json(record).send().await?;
        let text = read_body(resp).await?;

        // Some backends answer with `{"message": ...}` instead of the record.
        match serde_json::from_str::<ScheduleRecord>(&text) {
            Ok(created) => Ok(created),
            Err(_) => Ok(record.clone()),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.item_url(id);
        tracing::debug!(%url, "DELETE schedule");
        let resp = self.client.delete(url).send().await?;
        read_body(resp).await?;
        Ok(())
    }
}
