use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::context::SessionContext;
use crate::error::{Error, Result};

/// External AI grading collaborator. Returns the free-text `data` payload.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GradingClient: Send + Sync {
    async fn grade(&self, ctx: &SessionContext, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GradingRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GradingEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Clone)]
pub struct HttpGradingClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpGradingClient {
    pub fn new(client: Client, endpoint: String, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            timeout,
        }
    }
}

#[async_trait]
impl GradingClient for HttpGradingClient {
    async fn grade(&self, ctx: &SessionContext, prompt: &str) -> Result<String> {
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&ctx.access_token)
            .json(&GradingRequest { prompt })
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Grading(format!("grading request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            tracing::error!(%status, body = %text, "grading endpoint returned an error");
            return Err(Error::Grading(format!("grading endpoint returned {}", status)));
        }

        let envelope: GradingEnvelope = res
            .json()
            .await
            .map_err(|e| Error::Grading(format!("unreadable grading response: {}", e)))?;

        parse_envelope(envelope)
    }
}

fn parse_envelope(envelope: GradingEnvelope) -> Result<String> {
    match envelope {
        GradingEnvelope {
            success: true,
            data: Some(data),
        } => Ok(data),
        GradingEnvelope { success: true, data: None } => {
            Err(Error::Grading("grading response had no data".into()))
        }
        GradingEnvelope { success: false, .. } => {
            Err(Error::Grading("grading service reported failure".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_requires_success_and_data() {
        let ok: GradingEnvelope = serde_json::from_str(r#"{"success": true, "data": "```json\n{}\n```"}"#).unwrap();
        assert_eq!(parse_envelope(ok).unwrap(), "```json\n{}\n```");

        let failed: GradingEnvelope = serde_json::from_str(r#"{"success": false, "data": "quota"}"#).unwrap();
        assert!(matches!(parse_envelope(failed), Err(Error::Grading(_))));

        let empty: GradingEnvelope = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(parse_envelope(empty), Err(Error::Grading(_))));
    }

    #[test]
    fn request_body_is_a_bare_prompt() {
        let body = serde_json::to_value(GradingRequest { prompt: "grade this" }).unwrap();
        assert_eq!(body, serde_json::json!({ "prompt": "grade this" }));
    }
}
