//! Async client for the task-scoring service.
//!
//! Failures are typed, never thrown past the boundary: a non-2xx response
//! becomes `Error::Service` carrying the verbatim body for display, and a
//! transport failure becomes `Error::Network`. Batch validation happens
//! before any network activity.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::task::{Cycle, ScoredTask, Task};
use crate::error::{Error, Result};
use crate::tlog_debug;

/// A scoring response: the annotated batch plus any dependency cycles the
/// service detected. Both fields default to empty when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub tasks: Vec<ScoredTask>,
    #[serde(default)]
    pub cycles: Vec<Cycle>,
}

#[derive(Debug, Deserialize)]
struct Suggestions {
    #[serde(default)]
    suggestions: Vec<ScoredTask>,
}

/// HTTP client bound to one service endpoint.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AnalysisClient {
    /// Create a client for the given base endpoint, e.g.
    /// `http://127.0.0.1:8000`.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            http: reqwest::Client::builder()
                .user_agent("triage/0.1")
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("reqwest client should build"),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Parse a pasted batch. The text must be a JSON array of tasks;
    /// anything else is a validation failure raised before any request.
    pub fn parse_batch(text: &str) -> Result<Vec<Task>> {
        let value: serde_json::Value = serde_json::from_str(text.trim())
            .map_err(|e| Error::Validation(format!("invalid JSON: {}", e)))?;
        if !value.is_array() {
            return Err(Error::Validation(
                "tasks must be a JSON array".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| Error::Validation(format!("invalid task: {}", e)))
    }

    /// Submit a batch for scoring.
    ///
    /// `strategy` is forwarded verbatim; `today` optionally pins the
    /// scorer's reference date for deterministic runs.
    pub async fn analyze(
        &self,
        tasks: &[Task],
        strategy: &str,
        today: Option<NaiveDate>,
    ) -> Result<Analysis> {
        let url = format!("{}/api/tasks/analyze/", self.endpoint);
        tlog_debug!(
            "analyze: {} tasks, strategy={}, url={}",
            tasks.len(),
            strategy,
            url
        );

        let mut query: Vec<(&str, String)> = vec![("strategy", strategy.to_string())];
        if let Some(date) = today {
            query.push(("today", date.to_string()));
        }

        let response = self
            .http
            .post(&url)
            .query(&query)
            .json(&tasks)
            .send()
            .await
            .map_err(transport_error)?;
        read_response(response).await
    }

    /// Record per-task feedback. Success is signaled by HTTP status alone;
    /// the response body is ignored.
    pub async fn feedback(&self, task_id: &str, helpful: bool) -> Result<()> {
        let url = format!("{}/api/tasks/feedback/", self.endpoint);
        tlog_debug!("feedback: task_id={}, helpful={}", task_id, helpful);

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "task_id": task_id, "helpful": helpful }))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(transport_error)?;
            return Err(Error::Service {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Ask the service for its top suggestions for a batch. The service
    /// reads the batch from the request body of a GET.
    pub async fn suggest(&self, tasks: &[Task], strategy: &str) -> Result<Vec<ScoredTask>> {
        let url = format!("{}/api/tasks/suggest/", self.endpoint);
        tlog_debug!("suggest: {} tasks, strategy={}", tasks.len(), strategy);

        let response = self
            .http
            .get(&url)
            .query(&[("strategy", strategy)])
            .json(&serde_json::json!({ "tasks": tasks }))
            .send()
            .await
            .map_err(transport_error)?;
        let suggestions: Suggestions = read_response(response).await?;
        Ok(suggestions.suggestions)
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    Error::Network(e.to_string())
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(transport_error)?;
    decode_response(status, &body)
}

/// Classify a completed HTTP exchange: non-2xx carries the body out as a
/// service error; a 2xx body must decode as `T`.
fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    if !(200..300).contains(&status) {
        return Err(Error::Service {
            status,
            body: body.to_string(),
        });
    }
    Ok(serde_json::from_str(body)?)
}
