use std::time::Duration;

use async_trait::async_trait;
use remindme_models::settings::PushSettings;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{PushError, PushMessage, PushProvider};

const UNREGISTERED: &str = "UNREGISTERED";

/// Client for the FCM HTTP v1 `messages:send` endpoint.
///
/// Owned by whoever constructs it; [`FcmPushProvider::shutdown`] aborts in-flight
/// sends and rejects new ones.
pub struct FcmPushProvider {
    client: reqwest::Client,
    send_url: String,
    access_token: String,
    closed: CancellationToken,
}

impl FcmPushProvider {
    pub fn new(settings: &PushSettings) -> Result<Self, PushError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let send_url = format!(
            "{}/v1/projects/{}/messages:send",
            settings.endpoint.trim_end_matches('/'),
            settings.project_id
        );

        log::info!(
            "Push client initialised [project_id = {}, timeout_secs = {}]",
            settings.project_id,
            settings.timeout_secs
        );

        Ok(Self {
            client,
            send_url,
            access_token: settings.access_token.clone(),
            closed: CancellationToken::new(),
        })
    }

    pub fn shutdown(&self) {
        if !self.closed.is_cancelled() {
            log::info!("Push client shutting down");
            self.closed.cancel();
        }
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
}

#[derive(Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

impl<'a> SendRequest<'a> {
    fn new(token: &'a str, message: &'a PushMessage) -> Self {
        Self {
            message: FcmMessage {
                token,
                notification: FcmNotification {
                    title: &message.title,
                    body: &message.body,
                    image: message.image.as_deref(),
                },
            },
        }
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

#[async_trait]
impl PushProvider for FcmPushProvider {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<(), PushError> {
        if self.closed.is_cancelled() {
            return Err(PushError::ShutDown);
        }

        let request = self
            .client
            .post(&self.send_url)
            .bearer_auth(&self.access_token)
            .json(&SendRequest::new(token, message))
            .send();

        let response = tokio::select! {
            _ = self.closed.cancelled() => return Err(PushError::ShutDown),
            response = request => response?,
        };

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status.as_u16(), &body))
    }
}

/// Maps an FCM error response onto [`PushError`].
///
/// 404 and the `UNREGISTERED` error code mean the token will never work again.
/// Everything else is treated as transient.
fn classify_failure(status: u16, body: &str) -> PushError {
    let parsed = serde_json::from_str::<ErrorResponse>(body).ok();
    let unregistered = parsed.as_ref().is_some_and(|response| {
        response
            .error
            .details
            .iter()
            .any(|detail| detail.error_code.as_deref() == Some(UNREGISTERED))
    });

    if status == 404 || unregistered {
        return PushError::InvalidToken;
    }

    let message = parsed
        .map(|response| response.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.to_string());

    PushError::Rejected { status, message }
}
