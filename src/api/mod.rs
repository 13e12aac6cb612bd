//! Client side of the portfolio projects API.
//!
//! [`ProjectApi`] is the seam between the store and the remote service;
//! [`HttpProjectApi`] is the production implementation.

mod http;

use std::future::Future;

use thiserror::Error;

use crate::models::{NewProject, Project, ProjectPage, ProjectUpdate};

pub use http::HttpProjectApi;

/// Window requested from the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: u32,
    pub offset: u32,
}

/// A value returned by the API together with the server's message, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub value: T,
    pub message: Option<String>,
}

/// Outcome of a delete request that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteReply {
    /// `true` only when the server answered with status `Success`
    pub confirmed: bool,
    pub message: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("resource not found")]
    NotFound,
    #[error("rejected by server ({status}): {message}")]
    Validation { status: u16, message: String },
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

pub trait ProjectApi: Send + Sync {
    fn list(&self, query: PageQuery) -> impl Future<Output = Result<ProjectPage, ApiError>> + Send;

    fn create(
        &self,
        project: &NewProject,
    ) -> impl Future<Output = Result<Reply<Project>, ApiError>> + Send;

    fn update(
        &self,
        id: &str,
        changes: &ProjectUpdate,
    ) -> impl Future<Output = Result<Reply<Project>, ApiError>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<DeleteReply, ApiError>> + Send;

    fn get(&self, id: &str) -> impl Future<Output = Result<Reply<Project>, ApiError>> + Send;
}
