//! Background delivery of contact form submissions.
//!
//! Each submission is POSTed as JSON on its own task; the outcome comes
//! back over a channel so the main loop can feed it to
//! [`AppState::acknowledge`](super::state::AppState::acknowledge).

use std::time::Duration;

use reqwest::header::{HeaderValue, USER_AGENT};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::core::form::Submission;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT_VALUE: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Outcome of one delivery, in the shape the form state machine takes.
pub type SubmitResult = Result<(), String>;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no contact endpoint configured")]
    NoEndpoint,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint answered HTTP {status}")]
    Status { status: reqwest::StatusCode },
}

#[derive(Clone)]
pub struct Submitter {
    client: reqwest::Client,
    endpoint: Option<String>,
    results: mpsc::UnboundedSender<SubmitResult>,
}

impl Submitter {
    pub fn new(endpoint: Option<String>, results: mpsc::UnboundedSender<SubmitResult>) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            results,
        })
    }

    /// Fire and forget; the result arrives on the channel.
    pub fn dispatch(&self, submission: Submission) {
        let this = self.clone();
        tokio::spawn(async move {
            let result = this.post(&submission).await.map_err(|err| err.to_string());
            if this.results.send(result).is_err() {
                tracing::debug!("submit result dropped, receiver gone");
            }
        });
    }

    async fn post(&self, submission: &Submission) -> Result<(), SubmitError> {
        let endpoint = self.endpoint.as_deref().ok_or(SubmitError::NoEndpoint)?;
        tracing::debug!(endpoint, "posting contact form");

        let response = self
            .client
            .post(endpoint)
            .header(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE))
            .json(submission)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Status { status });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn missing_endpoint_is_reported_on_the_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let submitter = Submitter::new(None, tx).unwrap();
        submitter.dispatch(Submission {
            fields: BTreeMap::from([("name".to_string(), "Ada".to_string())]),
        });
        assert_eq!(rx.recv().await, Some(Err("no contact endpoint configured".to_string())));
    }
}
