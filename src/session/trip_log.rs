//! Fire-and-forget trip logging to the backend.
//!
//! Submission is best-effort: spawned, never awaited, never retried. A
//! failure costs one log line, not the session.

use crate::session::types::TripRecord;
use std::time::Duration;

/// Client for the trip persistence endpoint.
#[derive(Clone)]
pub struct TripLogClient {
    http: reqwest::Client,
    base_url: String,
}

impl TripLogClient {
    /// Create a client for the given backend base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Submit a completed trip without awaiting the result.
    pub fn submit(&self, record: TripRecord) {
        let http = self.http.clone();
        let url = format!("{}/trips", self.base_url);
        let trip_id = record.id;

        tokio::spawn(async move {
            match http.post(&url).json(&record).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!("Trip {} logged", trip_id);
                }
                Ok(response) => {
                    tracing::warn!(
                        "Trip log for {} rejected with status {}",
                        trip_id,
                        response.status()
                    );
                }
                Err(err) => {
                    tracing::warn!("Trip log for {} failed: {}", trip_id, err);
                }
            }
        });
    }
}
