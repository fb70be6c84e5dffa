//! Kanban domain model.
//!
//! # Responsibility
//! - Define write payloads accepted by repositories and the read models
//!   (DTOs) they return.
//! - Own input bounds so repositories enforce them in one place.
//!
//! # Invariants
//! - Payload `validate()` is the single source of truth for length bounds.
//! - Read models are detached projections; they never alias stored rows.

pub mod tag;
pub mod user;
pub mod validation;
pub mod work_item;
