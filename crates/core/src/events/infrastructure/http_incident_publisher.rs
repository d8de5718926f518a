use std::time::Duration;

use crate::events::domain::incident::Incident;
use crate::events::domain::incident_publisher::IncidentPublisher;

/// POSTs each incident as JSON to the ingestion endpoint.
///
/// Blocks for at most the configured timeout. Non-2xx responses, timeouts
/// and transport errors are logged and the incident is discarded.
pub struct HttpIncidentPublisher {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpIncidentPublisher {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl IncidentPublisher for HttpIncidentPublisher {
    fn publish(&self, incident: Incident) {
        let result = self
            .client
            .post(&self.endpoint)
            .json(&incident)
            .send()
            .and_then(|r| r.error_for_status());

        match result {
            Ok(_) => log::info!(
                "[EVENT] {}",
                serde_json::to_string(&incident).unwrap_or_default()
            ),
            Err(e) => log::warn!("Failed to publish incident to {}: {e}", self.endpoint),
        }
    }
}
