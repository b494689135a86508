// ABOUTME: HTTP client for the target cluster's reindex and tasks APIs
// ABOUTME: Handles reindex submission, task status polling, and error handling

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use std::time::Duration;
use tracing::{debug, info};

use super::models::{ReindexRequest, TaskStatus, TaskSubmission};
use crate::config::{RemoteCredentials, TargetClusterConfig};
use crate::error::MigratorError;

/// `requests_per_second` value the cluster reads as "no throttling".
const UNLIMITED_REQUESTS_PER_SECOND: &str = "-1";

/// The two cluster operations the migration needs.
#[async_trait]
pub trait SearchClusterClient: Send + Sync {
    /// Starts an asynchronous remote reindex and returns the server task id.
    async fn submit_reindex(
        &self,
        source_index: &str,
        dest_index: &str,
        remote: &RemoteCredentials,
    ) -> Result<String>;

    async fn get_task_status(&self, task_id: &str) -> Result<TaskStatus>;
}

pub struct ClusterClient {
    client: Client,
    base_url: String,
    auth: Option<(String, String)>,
}

impl ClusterClient {
    /// Builds a client for the first configured host.
    pub fn new(config: &TargetClusterConfig) -> Result<Self, MigratorError> {
        let base_url = config
            .base_urls()
            .into_iter()
            .next()
            .ok_or_else(|| MigratorError::ClientInit("es_target_config.hosts is empty".into()))?;

        Url::parse(&base_url).map_err(|e| {
            MigratorError::ClientInit(format!("Invalid target host '{}': {}", base_url, e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .danger_accept_invalid_certs(!config.verify_certs)
            .build()
            .map_err(|e| {
                MigratorError::ClientInit(format!("Failed to create HTTP client: {}", e))
            })?;

        info!("Initialized search client for target cluster at {}", base_url);

        Ok(Self {
            client,
            base_url,
            auth: config.http_auth.clone(),
        })
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some((user, pass)) => request.basic_auth(user, Some(pass)),
            None => request,
        }
    }
}

#[async_trait]
impl SearchClusterClient for ClusterClient {
    async fn submit_reindex(
        &self,
        source_index: &str,
        dest_index: &str,
        remote: &RemoteCredentials,
    ) -> Result<String> {
        let url = format!("{}/_reindex", self.base_url);
        let body = ReindexRequest::from_remote(remote, source_index, dest_index);

        let response = self
            .authorized(self.client.post(&url))
            .query(&[
                ("wait_for_completion", "false"),
                ("requests_per_second", UNLIMITED_REQUESTS_PER_SECOND),
            ])
            .json(&body)
            .send()
            .await
            .context("Failed to submit reindex request to target cluster")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Reindex submission failed with status {}: {}", status, body);
        }

        let submission: TaskSubmission = response
            .json()
            .await
            .context("Failed to parse reindex response")?;

        if submission.task.trim().is_empty() {
            anyhow::bail!("Reindex response for {} did not include a task id", source_index);
        }

        debug!("Reindex of {} accepted as task {}", source_index, submission.task);
        Ok(submission.task)
    }

    async fn get_task_status(&self, task_id: &str) -> Result<TaskStatus> {
        let url = format!("{}/_tasks/{}", self.base_url, task_id);

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .context("Failed to get task status from target cluster")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Task status request failed with status {}: {}", status, body);
        }

        let task_status: TaskStatus = response
            .json()
            .await
            .context("Failed to parse task status")?;

        Ok(task_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostSpec;

    fn target(hosts: Vec<HostSpec>) -> TargetClusterConfig {
        TargetClusterConfig {
            hosts,
            http_auth: None,
            use_ssl: false,
            verify_certs: true,
            timeout: 30,
        }
    }

    #[test]
    fn test_client_creation() {
        let client =
            ClusterClient::new(&target(vec![HostSpec::Url("https://es.example.com/".into())]));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url(), "https://es.example.com");
    }

    #[test]
    fn test_client_uses_first_host() {
        let client = ClusterClient::new(&target(vec![
            HostSpec::Url("http://es-1:9200".into()),
            HostSpec::Url("http://es-2:9200".into()),
        ]))
        .unwrap();
        assert_eq!(client.base_url(), "http://es-1:9200");
    }

    #[test]
    fn test_no_hosts_is_client_init_error() {
        let err = ClusterClient::new(&target(vec![])).err().unwrap();
        assert!(matches!(err, MigratorError::ClientInit(_)));
    }

    #[test]
    fn test_invalid_host_is_client_init_error() {
        let err = ClusterClient::new(&target(vec![HostSpec::Url("http://bad host".into())]))
            .err()
            .unwrap();
        assert!(matches!(err, MigratorError::ClientInit(_)));
    }
}
