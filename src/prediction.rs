use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::config::PredictionSettings;

/// Status strings reported by the predictions API. Strings this proxy does
/// not know are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Other(String),
}

impl JobStatus {
    /// Terminal statuses never change again on the remote side.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed | JobStatus::Canceled)
    }
}

impl From<String> for JobStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "starting" => JobStatus::Starting,
            "processing" => JobStatus::Processing,
            "succeeded" => JobStatus::Succeeded,
            "failed" => JobStatus::Failed,
            "canceled" => JobStatus::Canceled,
            _ => JobStatus::Other(status),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Starting => "starting".to_string(),
            JobStatus::Processing => "processing".to_string(),
            JobStatus::Succeeded => "succeeded".to_string(),
            JobStatus::Failed => "failed".to_string(),
            JobStatus::Canceled => "canceled".to_string(),
            JobStatus::Other(other) => other,
        }
    }
}

/// Model output in whichever shape the model produced it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<Value>", into = "Option<Value>")]
pub enum JobOutput {
    #[default]
    Absent,
    Text(String),
    List(Vec<String>),
    Structured(Value),
}

impl From<Option<Value>> for JobOutput {
    fn from(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => JobOutput::Absent,
            Some(Value::String(text)) => JobOutput::Text(text),
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => JobOutput::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            Some(other) => JobOutput::Structured(other),
        }
    }
}

impl From<JobOutput> for Option<Value> {
    fn from(output: JobOutput) -> Self {
        match output {
            JobOutput::Absent => None,
            JobOutput::Text(text) => Some(Value::String(text)),
            JobOutput::List(items) => Some(Value::from(items)),
            JobOutput::Structured(value) => Some(value),
        }
    }
}

/// One remote prediction as last seen by this process.
///
/// Fields the proxy does not interpret (`logs`, `metrics`, `urls`, ...) are
/// kept in `extra` so the record can be echoed back for diagnostics.
/// A response without a `status` is a finished synchronous answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionJob {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub output: JobOutput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PredictionJob {
    /// Whether polling can stop. Responses without a status are final.
    pub fn is_settled(&self) -> bool {
        self.status.as_ref().map_or(true, JobStatus::is_terminal)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({ "id": self.id }))
    }
}

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Server not configured with {0}")]
    Config(&'static str),
    #[error("Remote request failed: {message}")]
    Remote {
        message: String,
        detail: Option<Value>,
    },
    #[error("Model prediction failed")]
    Failed { job: Box<PredictionJob> },
    /// The attempt ceiling ran out; the job may still finish remotely.
    #[error("Model prediction {id} still running after {attempts} status checks")]
    Timeout { id: String, attempts: u32 },
}

impl PredictionError {
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::Config(_) => "config",
            PredictionError::Remote { .. } => "remote",
            PredictionError::Failed { .. } => "prediction_failed",
            PredictionError::Timeout { .. } => "prediction_timeout",
        }
    }

    /// Diagnostic payload worth returning to the caller, if any.
    pub fn detail(&self) -> Option<Value> {
        match self {
            PredictionError::Config(_) => None,
            PredictionError::Remote { detail, .. } => detail.clone(),
            PredictionError::Failed { job } => Some(job.to_json()),
            PredictionError::Timeout { id, attempts } => {
                Some(json!({ "id": id, "attempts": attempts }))
            }
        }
    }
}

#[derive(Serialize)]
struct CreatePrediction<'a> {
    version: &'a str,
    input: PredictionInput<'a>,
}

#[derive(Serialize)]
struct PredictionInput<'a> {
    prompt: &'a str,
    max_new_tokens: u32,
    temperature: f32,
}

/// Client for the hosted predictions API: creates a prediction and follows
/// it to a terminal status.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: Client,
    settings: Arc<PredictionSettings>,
}

impl PredictionClient {
    pub fn new(settings: PredictionSettings) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client for the predictions API")?;
        Ok(Self {
            http,
            settings: Arc::new(settings),
        })
    }

    fn token(&self) -> Result<&str, PredictionError> {
        self.settings
            .api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(PredictionError::Config("REPLICATE_API_TOKEN"))
    }

    fn model_version(&self) -> Result<&str, PredictionError> {
        self.settings
            .model_version
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(PredictionError::Config(
                "REPLICATE_MODEL_VERSION (or REPLICATE_MODEL)",
            ))
    }

    fn authorize(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        let value = if self.settings.auth_scheme.is_empty() {
            token.to_string()
        } else {
            format!("{} {}", self.settings.auth_scheme, token)
        };
        request.header(self.settings.auth_header.as_str(), value)
    }

    /// Create a prediction for `prompt`.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn submit(&self, prompt: &str) -> Result<PredictionJob, PredictionError> {
        let token = self.token()?;
        let version = self.model_version()?;
        let url = format!("{}/predictions", self.settings.api_base);

        let body = CreatePrediction {
            version,
            input: PredictionInput {
                prompt,
                max_new_tokens: self.settings.max_new_tokens,
                temperature: self.settings.temperature,
            },
        };

        let request = self
            .http
            .post(&url)
            .json(&body)
            .timeout(self.settings.submit_timeout);
        let response = self
            .authorize(request, token)
            .send()
            .await
            .map_err(|e| transport_error("create", &url, e))?;

        let job = decode_job(response, "create").await?;
        info!(id = %job.id, status = ?job.status, "Prediction submitted");
        Ok(job)
    }

    /// Read the current state of a prediction.
    pub async fn fetch(&self, id: &str) -> Result<PredictionJob, PredictionError> {
        let token = self.token()?;
        if id.is_empty() {
            return Err(PredictionError::Remote {
                message: "prediction is still running but has no id to poll".to_string(),
                detail: None,
            });
        }
        let url = format!("{}/predictions/{}", self.settings.api_base, id);

        let request = self.http.get(&url).timeout(self.settings.poll_timeout);
        let response = self
            .authorize(request, token)
            .send()
            .await
            .map_err(|e| transport_error("status", &url, e))?;

        decode_job(response, "status").await
    }

    /// Poll until the job reaches a terminal status or the attempt ceiling
    /// is hit. Returns the terminal job whatever its outcome.
    #[instrument(skip(self, job), fields(id = %job.id))]
    pub async fn poll_until_terminal(
        &self,
        mut job: PredictionJob,
    ) -> Result<PredictionJob, PredictionError> {
        let max_attempts = self.settings.max_poll_attempts;
        for attempt in 1..=max_attempts {
            if job.is_settled() {
                return Ok(job);
            }
            tokio::time::sleep(self.settings.poll_interval).await;
            let latest = self.fetch(&job.id).await?;
            debug!(attempt, status = ?latest.status, "Polled prediction");
            job = latest;
        }

        if job.is_settled() {
            return Ok(job);
        }
        warn!(attempts = max_attempts, "Prediction still running, giving up");
        Err(PredictionError::Timeout {
            id: job.id,
            attempts: max_attempts,
        })
    }

    /// Submit `prompt` and follow the job to success.
    pub async fn run(&self, prompt: &str) -> Result<PredictionJob, PredictionError> {
        let job = self.submit(prompt).await?;
        let job = if job.is_settled() {
            job
        } else {
            self.poll_until_terminal(job).await?
        };

        if matches!(job.status, None | Some(JobStatus::Succeeded)) {
            return Ok(job);
        }
        error!(id = %job.id, status = ?job.status, error = ?job.error, "Prediction failed");
        Err(PredictionError::Failed { job: Box::new(job) })
    }
}

fn transport_error(what: &str, url: &str, e: reqwest::Error) -> PredictionError {
    error!(%url, error = %e, "Prediction {} request failed", what);
    let message = if e.is_timeout() {
        format!("{} request to {} timed out", what, url)
    } else {
        format!("{} request to {} failed: {}", what, url, e)
    };
    PredictionError::Remote {
        message,
        detail: None,
    }
}

async fn decode_job(response: Response, what: &str) -> Result<PredictionJob, PredictionError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        error!(%status, %body, "Prediction {} request rejected", what);
        let detail = serde_json::from_str(&body).unwrap_or_else(|_| Value::String(body));
        return Err(PredictionError::Remote {
            message: format!("{} request returned {}", what, status),
            detail: Some(detail),
        });
    }

    response
        .json::<PredictionJob>()
        .await
        .map_err(|e| PredictionError::Remote {
            message: format!("Failed to parse {} response: {}", what, e),
            detail: None,
        })
}
