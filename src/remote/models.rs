// ABOUTME: Wire types for the cluster reindex and tasks APIs
// ABOUTME: Request bodies are serialized to JSON, task responses deserialized from it

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::RemoteCredentials;

#[derive(Debug, Clone, Serialize)]
pub struct ReindexRequest {
    pub source: ReindexSource,
    pub dest: ReindexDest,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReindexSource {
    pub remote: RemoteSpec,
    pub index: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteSpec {
    pub host: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReindexDest {
    pub index: String,
}

impl ReindexRequest {
    pub fn from_remote(remote: &RemoteCredentials, source_index: &str, dest_index: &str) -> Self {
        Self {
            source: ReindexSource {
                remote: RemoteSpec {
                    host: remote.host.clone(),
                    username: remote.username.clone(),
                    password: remote.password.clone(),
                },
                index: source_index.to_string(),
            },
            dest: ReindexDest {
                index: dest_index.to_string(),
            },
        }
    }
}

/// Response to `POST _reindex?wait_for_completion=false`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSubmission {
    pub task: String,
}

/// Response to `GET _tasks/{task_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskStatus {
    pub completed: bool,
    pub task: Option<TaskInfo>,
    pub response: Option<TaskResponse>,
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskInfo {
    pub status: Option<ReindexProgress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReindexProgress {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub updated: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskResponse {
    #[serde(default)]
    pub failures: Vec<Value>,
}

impl TaskStatus {
    #[cfg(test)]
    pub fn in_progress() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn completed() -> Self {
        Self {
            completed: true,
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            completed: true,
            error: Some(Value::String(reason.into())),
            ..Self::default()
        }
    }

    /// Human readable error, `"{type}: {reason}"` for structured cluster errors.
    pub fn error_message(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        let message = match error {
            Value::Null => return None,
            Value::String(s) => s.clone(),
            Value::Object(map) => match (map.get("type"), map.get("reason")) {
                (Some(Value::String(kind)), Some(Value::String(reason))) => {
                    format!("{}: {}", kind, reason)
                }
                (None, Some(Value::String(reason))) => reason.clone(),
                _ => error.to_string(),
            },
            other => other.to_string(),
        };
        Some(message)
    }

    pub fn progress(&self) -> Option<&ReindexProgress> {
        self.task.as_ref()?.status.as_ref()
    }

    /// Document-level failures reported for a finished task.
    pub fn failure_count(&self) -> usize {
        self.response.as_ref().map_or(0, |r| r.failures.len())
    }
}
