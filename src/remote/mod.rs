// ABOUTME: Target cluster access for remote reindex migrations
// ABOUTME: Capability trait, HTTP implementation and wire models

pub mod client;
pub mod models;

pub use client::{ClusterClient, SearchClusterClient};
pub use models::{ReindexProgress, ReindexRequest, TaskStatus};
