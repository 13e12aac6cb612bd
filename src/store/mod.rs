//! Client-side state for the projects listing and admin screens.
//!
//! [`ProjectStore`] owns the last fetched page plus loading, error and
//! pagination metadata. State is only changed by the store's own
//! operations; everyone else reads it through [`ProjectStore::state`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiError, PageQuery, ProjectApi};
use crate::models::{NewProject, Project, ProjectUpdate};

#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    /// Projects of the last applied page only
    pub projects: Vec<Project>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub success_message: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_projects: u64,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            projects: Vec::new(),
            is_loading: false,
            error: None,
            success_message: None,
            current_page: 1,
            total_pages: 1,
            total_projects: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
    Get,
}

impl Operation {
    /// Fixed message stored in [`StoreState::error`] when the operation fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Fetch => "Failed to fetch projects",
            Operation::Create => "Failed to create project",
            Operation::Update => "Failed to update project",
            Operation::Delete => "Failed to delete project",
            Operation::Get => "Failed to get project",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Fetch => "fetch",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Get => "get",
        };
        f.write_str(name)
    }
}

/// Failure of a store operation, tagged with what was attempted and why it failed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", .operation.failure_message())]
pub struct StoreError {
    pub operation: Operation,
    #[source]
    pub cause: ApiError,
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self.cause, ApiError::NotFound)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.cause, ApiError::Validation { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self.cause, ApiError::Transport(_))
    }
}

/// What happened to the response of a [`ProjectStore::fetch_page`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was written into the store.
    Applied,
    /// A newer fetch was issued while this one was in flight; its response was dropped.
    Superseded,
}

pub struct ProjectStore<A> {
    api: A,
    state: Mutex<StoreState>,
    fetch_seq: AtomicU64,
}

impl<A: ProjectApi> ProjectStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Mutex::new(StoreState::default()),
            fetch_seq: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> StoreState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // A panic while holding the lock cannot leave the plain-data state half-built.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) {
        let mut state = self.lock();
        state.is_loading = true;
        state.error = None;
    }

    fn fail(&self, operation: Operation, cause: ApiError) -> StoreError {
        record_failure(&mut self.lock(), operation, cause)
    }

    /// Fetch one window of projects and replace the loaded page with it.
    ///
    /// On failure the previously loaded page stays in place. Only the most
    /// recently issued fetch may write to the store.
    pub async fn fetch_page(&self, limit: u32, offset: u32) -> Result<FetchOutcome, StoreError> {
        // Tickets are issued and checked under the state lock.
        let ticket = {
            let mut state = self.lock();
            state.is_loading = true;
            state.error = None;
            self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
        };
        debug!(ticket, limit, offset, "fetching projects page");

        let result = self.api.list(PageQuery { limit, offset }).await;

        let mut state = self.lock();
        if self.fetch_seq.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "discarding superseded projects page");
            return Ok(FetchOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                state.projects = page.projects;
                state.total_projects = page.total;
                state.current_page = page.current_page;
                state.total_pages = page.total_pages;
                state.is_loading = false;
                debug!(
                    current_page = state.current_page,
                    total_pages = state.total_pages,
                    loaded = state.projects.len(),
                    "projects page applied"
                );
                Ok(FetchOutcome::Applied)
            }
            Err(cause) => Err(record_failure(&mut state, Operation::Fetch, cause)),
        }
    }

    /// Create a project. The loaded page is not touched; callers re-fetch.
    pub async fn create(&self, project: &NewProject) -> Result<Project, StoreError> {
        self.begin();

        match self.api.create(project).await {
            Ok(reply) => {
                info!(id = %reply.value.id, "project created");
                let mut state = self.lock();
                state.is_loading = false;
                state.success_message = reply.message;
                Ok(reply.value)
            }
            Err(cause) => Err(self.fail(Operation::Create, cause)),
        }
    }

    /// Apply a partial update to an existing project.
    pub async fn update(&self, id: &str, changes: &ProjectUpdate) -> Result<Project, StoreError> {
        self.begin();

        match self.api.update(id, changes).await {
            Ok(reply) => {
                info!(id, "project updated");
                let mut state = self.lock();
                state.is_loading = false;
                state.success_message = reply.message;
                Ok(reply.value)
            }
            Err(cause) => Err(self.fail(Operation::Update, cause)),
        }
    }

    /// Delete a project.
    ///
    /// Returns `Ok(true)` and drops the project from the loaded page only
    /// when the server confirms with status `Success`; any other status
    /// yields `Ok(false)` and leaves the page as it was.
    pub async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        self.begin();

        match self.api.delete(id).await {
            Ok(reply) if reply.confirmed => {
                info!(id, "project deleted");
                let mut state = self.lock();
                state.projects.retain(|project| project.id != id);
                state.is_loading = false;
                state.success_message = reply.message;
                Ok(true)
            }
            Ok(_) => {
                warn!(id, "server declined to delete project");
                self.lock().is_loading = false;
                Ok(false)
            }
            Err(cause) => Err(self.fail(Operation::Delete, cause)),
        }
    }

    /// Load a single project without touching the loaded page.
    pub async fn get_by_id(&self, id: &str) -> Result<Project, StoreError> {
        self.begin();

        match self.api.get(id).await {
            Ok(reply) => {
                let mut state = self.lock();
                state.is_loading = false;
                state.success_message = reply.message;
                Ok(reply.value)
            }
            Err(cause) => Err(self.fail(Operation::Get, cause)),
        }
    }

    pub fn set_current_page(&self, page: u32) {
        self.lock().current_page = page;
    }
}

fn record_failure(state: &mut StoreState, operation: Operation, cause: ApiError) -> StoreError {
    warn!(%operation, error = %cause, "project store operation failed");
    state.is_loading = false;
    state.error = Some(operation.failure_message().to_string());
    StoreError { operation, cause }
}
