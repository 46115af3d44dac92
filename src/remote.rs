use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ApiError;
use crate::stats::SessionRecord;

/// Aggregates as served by `GET /stats`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStats {
    pub average_wpm: u32,
    pub average_accuracy: u32,
    pub total_practice_minutes: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// The remote sessions API
pub trait StatsApi {
    fn fetch_sessions(&self) -> Result<Vec<SessionRecord>, ApiError>;
    fn add_session(&self, record: &SessionRecord) -> Result<SessionRecord, ApiError>;
    fn fetch_stats(&self) -> Result<RemoteStats, ApiError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewSession<'a> {
    #[serde(flatten)]
    record: &'a SessionRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
}

/// Blocking HTTP client for the sessions API
#[derive(Debug, Clone)]
pub struct HttpStatsApi {
    client: Client,
    base_url: String,
    user_id: Option<String>,
}

impl HttpStatsApi {
    pub fn new(base_url: impl Into<String>, user_id: Option<String>) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status(status.as_u16()))
    }
}

impl StatsApi for HttpStatsApi {
    fn fetch_sessions(&self) -> Result<Vec<SessionRecord>, ApiError> {
        let response = self.client.get(self.url("sessions")).send()?;
        Ok(ensure_success(response)?.json()?)
    }

    fn add_session(&self, record: &SessionRecord) -> Result<SessionRecord, ApiError> {
        let body = NewSession {
            record,
            user_id: self.user_id.as_deref(),
        };
        let response = self.client.post(self.url("sessions")).json(&body).send()?;
        Ok(ensure_success(response)?.json()?)
    }

    fn fetch_stats(&self) -> Result<RemoteStats, ApiError> {
        let mut request = self.client.get(self.url("stats"));
        if let Some(user_id) = &self.user_id {
            request = request.query(&[("userId", user_id)]);
        }
        Ok(ensure_success(request.send()?)?.json()?)
    }
}
