//! Dispatching restore requests to the restore command.
//!
//! The restore command is external: it resolves packages and writes the lock
//! file. This module sequences the calls, bounds how many run at once, and
//! guarantees nothing is committed once cancellation has been requested.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use restore_fs::NormalizedPath;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::lock_file::{LockFile, PackageIdentity, get_added_packages};
use crate::request::RestoreSummaryRequest;
use crate::settings::{DEFAULT_MAX_PARALLELISM, Settings};

/// Outcome of executing one request, not yet committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreResult {
    pub success: bool,
    pub lock_file: LockFile,
    pub lock_file_path: NormalizedPath,
}

/// What a finished restore reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreSummary {
    pub unique_name: String,
    pub input_path: NormalizedPath,
    pub lock_file_path: NormalizedPath,
    /// Packages the new lock file has that the previous one did not.
    pub added_packages: Vec<PackageIdentity>,
}

/// Options for a batch of restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Upper bound on restores in flight.
    pub max_parallelism: usize,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            max_parallelism: DEFAULT_MAX_PARALLELISM,
        }
    }
}

impl RestoreOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_parallelism: settings.max_parallelism(),
        }
    }
}

/// The external command that performs a restore.
#[async_trait]
pub trait RestoreCommand: Send + Sync {
    /// Resolve the request. Long-running work should watch `token`.
    async fn execute(
        &self,
        request: &RestoreSummaryRequest,
        token: &CancellationToken,
    ) -> Result<RestoreResult>;

    /// Write the outputs of `result`.
    async fn commit(&self, result: &RestoreResult, token: &CancellationToken) -> Result<()>;
}

/// Execute and commit one request.
///
/// A failed restore is still committed so its lock file records the failure.
///
/// # Errors
///
/// `Error::Canceled` when `token` is canceled before execution or before the
/// commit; nothing is written in that case.
pub async fn restore(
    request: &RestoreSummaryRequest,
    command: &dyn RestoreCommand,
    token: &CancellationToken,
) -> Result<RestoreResult> {
    if token.is_cancelled() {
        return Err(Error::Canceled);
    }

    tracing::info!(project = %request.unique_name, "restore started");
    let result = command.execute(request, token).await?;

    if token.is_cancelled() {
        tracing::debug!(project = %request.unique_name, "restore canceled before commit");
        return Err(Error::Canceled);
    }

    command.commit(&result, token).await?;

    if result.success {
        tracing::info!(project = %request.unique_name, "restore succeeded");
    } else {
        tracing::warn!(project = %request.unique_name, "restore failed");
    }

    Ok(result)
}

/// Restore every request with at most `options.max_parallelism` in flight.
///
/// Results come back in request order. A restore the command reports as
/// unsuccessful yields `Error::RestoreFailed`.
pub async fn restore_all(
    requests: Vec<RestoreSummaryRequest>,
    command: Arc<dyn RestoreCommand>,
    options: &RestoreOptions,
    token: &CancellationToken,
) -> Vec<Result<RestoreSummary>> {
    let limit = options.max_parallelism.max(1);
    tracing::debug!(requests = requests.len(), limit, "dispatching restores");

    let mut results: Vec<(usize, Result<RestoreSummary>)> =
        stream::iter(requests.into_iter().enumerate())
            .map(|(index, request)| {
                let command = Arc::clone(&command);
                let token = token.clone();
                async move { (index, restore_one(&request, command.as_ref(), &token).await) }
            })
            .buffer_unordered(limit)
            .collect()
            .await;

    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}

async fn restore_one(
    request: &RestoreSummaryRequest,
    command: &dyn RestoreCommand,
    token: &CancellationToken,
) -> Result<RestoreSummary> {
    let previous = LockFile::load(&request.request.lock_file_path)?;
    let result = restore(request, command, token).await?;

    if !result.success {
        return Err(Error::RestoreFailed {
            project: request.unique_name.clone(),
        });
    }

    Ok(RestoreSummary {
        unique_name: request.unique_name.clone(),
        input_path: request.input_path.clone(),
        lock_file_path: result.lock_file_path.clone(),
        added_packages: get_added_packages(previous.as_ref(), &result.lock_file),
    })
}
