mod fake_api;
pub use fake_api::*;

// Re-export commonly used types from portfolio_manager for tests
pub use portfolio_manager::api::{ApiError, PageQuery};
pub use portfolio_manager::models::{NewProject, Project, ProjectUpdate};
pub use portfolio_manager::store::{FetchOutcome, Operation, ProjectStore};
