use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;

use super::{ClaimApi, ClaimError, ClaimFuture};
use crate::models::ClaimResponse;
use crate::settings::ClaimEndpointSettings;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompleteTaskRequest {
    task_id: String,
}

/// `completeTask` over HTTP: `POST {base_url}/tasks/complete` with a JSON body.
#[derive(Clone)]
pub struct HttpClaimApi {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClaimApi {
    pub fn new(settings: &ClaimEndpointSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("failed to build claim HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/tasks/complete", settings.base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ClaimApi for HttpClaimApi {
    fn complete_task(&self, task_id: &str) -> ClaimFuture {
        let request = self.client.post(&self.endpoint).json(&CompleteTaskRequest {
            task_id: task_id.to_string(),
        });

        Box::pin(async move {
            let response = request.send().await.map_err(transport_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(ClaimError::Http(status.as_u16()));
            }

            response
                .json::<ClaimResponse>()
                .await
                .map_err(|err| ClaimError::Malformed(err.to_string()))
        })
    }
}

fn transport_error(err: reqwest::Error) -> ClaimError {
    if err.is_timeout() {
        ClaimError::Timeout
    } else {
        ClaimError::Network(err.to_string())
    }
}
