//! Kanban board data-access layer.
//! Tags, users and work items persisted in SQLite behind repository traits.

pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use context::KanbanContext;
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::tag::{TagCreate, TagId, TagRecord, TagUpdate};
pub use model::user::{UserCreate, UserId, UserRecord, UserUpdate};
pub use model::validation::ValidationError;
pub use model::work_item::{
    DeleteTransition, WorkItemCreate, WorkItemDetails, WorkItemId, WorkItemRecord, WorkItemState,
    WorkItemUpdate,
};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::work_item_repo::{SqliteWorkItemRepository, WorkItemRepository};
pub use repo::{Outcome, RepoError, RepoResult, Response};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
