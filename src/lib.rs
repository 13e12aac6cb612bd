pub mod api;
pub mod config;
pub mod controller;
pub mod models;
pub mod store;

pub use api::{ApiError, HttpProjectApi, ProjectApi};
pub use controller::ListController;
pub use models::{NewProject, Project, ProjectPage, ProjectUpdate};
pub use store::{FetchOutcome, ProjectStore, StoreError, StoreState};
