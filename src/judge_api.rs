use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(10);

const FINISHED_STATE: &str = "SUCCESS";
const ACCEPTED_STATUS: &str = "Accepted";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    RequestError(#[from] ReqwestError),
    #[error("API error: {status_code} - {message}")]
    ApiError {
        status_code: reqwest::StatusCode,
        message: String,
    },
    #[error("Malformed check response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Decoded body of a submission check request.
#[derive(Debug, Clone)]
pub struct CheckResponse {
    pub state: String,
    pub status_msg: Option<String>,
    /// The whole judge payload, passed on untouched.
    pub payload: Value,
}

impl CheckResponse {
    pub fn from_payload(payload: Value) -> Result<Self, ApiError> {
        #[derive(serde::Deserialize)]
        struct Head {
            state: String,
            #[serde(default)]
            status_msg: Option<Value>,
        }

        // Only `state` has to be well formed; an odd `status_msg` just means
        // the submission was not accepted.
        let head: Head = serde_json::from_value(payload.clone())?;
        Ok(Self {
            state: head.state,
            status_msg: head
                .status_msg
                .as_ref()
                .and_then(Value::as_str)
                .map(str::to_string),
            payload,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.state == FINISHED_STATE
    }

    pub fn is_accepted(&self) -> bool {
        self.is_finished() && self.status_msg.as_deref() == Some(ACCEPTED_STATUS)
    }
}

#[async_trait]
pub trait SubmissionChecker: Send + Sync {
    async fn check_submission(&self, url: &str) -> Result<CheckResponse, ApiError>;
}

pub struct JudgeApi {
    client: Client,
}

impl JudgeApi {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SubmissionChecker for JudgeApi {
    /// Fetch the check endpoint and decode the grading state.
    async fn check_submission(&self, url: &str) -> Result<CheckResponse, ApiError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::ApiError {
                status_code: status,
                message: response.text().await.unwrap_or_default(),
            });
        }

        let payload: Value = response.json().await?;
        CheckResponse::from_payload(payload)
    }
}
