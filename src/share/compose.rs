use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{CastConfirmation, ComposeAction, ComposeRequest, ShareError};

#[derive(Debug, Deserialize)]
struct ComposeResponse {
    cast: Option<CastConfirmation>,
}

/// Compose action backed by an HTTP endpoint that accepts a
/// [`ComposeRequest`] and answers `{ "cast": { "hash": ... } }` once a post
/// exists.
#[derive(Clone)]
pub struct HttpComposeAction {
    client: reqwest::Client,
    endpoint: Option<Url>,
}

impl HttpComposeAction {
    pub fn new(endpoint: Option<Url>, timeout: Duration) -> Result<Self, ShareError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ComposeAction for HttpComposeAction {
    async fn compose(
        &self,
        request: &ComposeRequest,
    ) -> Result<Option<CastConfirmation>, ShareError> {
        let Some(endpoint) = &self.endpoint else {
            return Err(ShareError::Unavailable);
        };

        let response = self.client.post(endpoint.clone()).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShareError::Rejected(format!(
                "compose endpoint returned {}",
                status
            )));
        }

        let body: ComposeResponse = response.json().await?;
        Ok(body.cast)
    }
}
